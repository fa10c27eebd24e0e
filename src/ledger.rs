use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;

use crate::model::{HourSlot, Ms};

/// Whether one customer may hold several tables in the same hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicatePolicy {
    #[default]
    Allow,
    /// A name already booked at the slot cannot book it again.
    Reject,
}

impl DuplicatePolicy {
    fn admits(self, booked: &[String], name: &str) -> bool {
        match self {
            DuplicatePolicy::Allow => true,
            DuplicatePolicy::Reject => !booked.iter().any(|n| n == name),
        }
    }
}

impl FromStr for DuplicatePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "allow" => Ok(DuplicatePolicy::Allow),
            "reject" => Ok(DuplicatePolicy::Reject),
            other => Err(format!("unknown duplicate policy: {other}")),
        }
    }
}

/// Who holds a table at which hour, under a fixed table count.
///
/// Every operation normalizes its timestamp with [`HourSlot::of`] first, so
/// 18:00 and 18:45 address the same slot. Slots appear on the first booking
/// attempt and are never removed; a fully cancelled slot reports zero.
///
/// No interior locking: the owner serializes access.
#[derive(Debug, Clone)]
pub struct Ledger {
    capacity: u32,
    duplicates: DuplicatePolicy,
    /// Names per slot, in booking order.
    bookings: HashMap<HourSlot, Vec<String>>,
}

impl Ledger {
    pub fn new(capacity: u32) -> Self {
        Self::with_policy(capacity, DuplicatePolicy::default())
    }

    pub fn with_policy(capacity: u32, duplicates: DuplicatePolicy) -> Self {
        debug_assert!(capacity > 0, "ledger capacity must be positive");
        Self {
            capacity,
            duplicates,
            bookings: HashMap::new(),
        }
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    pub fn duplicate_policy(&self) -> DuplicatePolicy {
        self.duplicates
    }

    /// Book a table for `name` if one is free. Returns false, leaving the
    /// slot's bookings untouched, when the hour is full.
    pub fn reserve(&mut self, name: &str, at: Ms) -> bool {
        let booked = self.bookings.entry(HourSlot::of(at)).or_default();
        if booked.len() as u32 >= self.capacity || !self.duplicates.admits(booked, name) {
            return false;
        }
        booked.push(name.to_string());
        true
    }

    /// Exact, case-sensitive match.
    pub fn exists(&self, name: &str, at: Ms) -> bool {
        self.bookings
            .get(&HourSlot::of(at))
            .is_some_and(|booked| booked.iter().any(|n| n == name))
    }

    /// Remove the earliest booking under `name`. One occurrence per call.
    pub fn cancel(&mut self, name: &str, at: Ms) -> bool {
        let Some(booked) = self.bookings.get_mut(&HourSlot::of(at)) else {
            return false;
        };
        match booked.iter().position(|n| n == name) {
            Some(pos) => {
                booked.remove(pos);
                true
            }
            None => false,
        }
    }

    pub fn occupants(&self, at: Ms) -> u32 {
        self.bookings
            .get(&HourSlot::of(at))
            .map_or(0, |booked| booked.len() as u32)
    }

    pub fn free_count(&self, at: Ms) -> u32 {
        self.capacity - self.occupants(at)
    }

    /// Occupant count of every slot ever booked, including emptied ones.
    pub fn counts_by_hour(&self) -> BTreeMap<HourSlot, u32> {
        self.bookings
            .iter()
            .map(|(slot, booked)| (*slot, booked.len() as u32))
            .collect()
    }

    pub fn contains_slot(&self, at: Ms) -> bool {
        self.bookings.contains_key(&HourSlot::of(at))
    }

    pub fn slot_count(&self) -> usize {
        self.bookings.len()
    }

    /// Booking order at a slot.
    pub fn names_at(&self, at: Ms) -> &[String] {
        self.bookings
            .get(&HourSlot::of(at))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}
