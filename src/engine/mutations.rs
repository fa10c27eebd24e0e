use std::collections::HashSet;

use tracing::{debug, info};

use crate::limits::*;
use crate::model::*;
use crate::observability::{CANCELLATIONS_TOTAL, RESERVATIONS_TOTAL};

use super::validate::{validate_reservation, validate_timestamp};
use super::{Engine, EngineError};

impl Engine {
    /// Book a table for `name` at the hour containing `at`.
    ///
    /// `Ok(false)` means the hour is full (or, under the reject policy, the
    /// name already holds a table there). Errors are input problems only.
    pub async fn reserve(&self, name: &str, at: Ms, now: Ms) -> Result<bool, EngineError> {
        let results = self.reserve_batch(&[(name, at)], now).await?;
        Ok(results.first().copied().unwrap_or(false))
    }

    /// Reserve several (name, time) pairs in order under one lock.
    ///
    /// Every row is validated before any is booked: one bad row rejects the
    /// whole batch. Returns per-row outcomes as [`Engine::reserve`] would.
    pub async fn reserve_batch<S: AsRef<str>>(
        &self,
        rows: &[(S, Ms)],
        now: Ms,
    ) -> Result<Vec<bool>, EngineError> {
        let mut validated = Vec::with_capacity(rows.len());
        for (name, at) in rows {
            match validate_reservation(name.as_ref(), *at, now) {
                Ok((name, slot)) => validated.push((name, slot, *at)),
                Err(e) => {
                    metrics::counter!(RESERVATIONS_TOTAL, "outcome" => "rejected")
                        .increment(rows.len() as u64);
                    debug!("reservation rejected: {e}");
                    return Err(e);
                }
            }
        }

        let mut guard = self.ledger.write().await;
        let new_slots: HashSet<HourSlot> = validated
            .iter()
            .filter(|(_, _, at)| !guard.contains_slot(*at))
            .map(|(_, slot, _)| *slot)
            .collect();
        if guard.slot_count() + new_slots.len() > MAX_SLOTS_PER_LEDGER {
            metrics::counter!(RESERVATIONS_TOTAL, "outcome" => "rejected")
                .increment(rows.len() as u64);
            return Err(EngineError::LimitExceeded("too many slots"));
        }

        let mut results = Vec::with_capacity(validated.len());
        for (name, slot, at) in validated {
            let booked = guard.reserve(name, at);
            if booked {
                metrics::counter!(RESERVATIONS_TOTAL, "outcome" => "booked").increment(1);
                info!(
                    "reserved {slot} for {name:?} ({} tables left)",
                    guard.free_count(at)
                );
            } else {
                metrics::counter!(RESERVATIONS_TOTAL, "outcome" => "full").increment(1);
                debug!("no table for {name:?} at {slot}");
            }
            results.push(booked);
        }
        Ok(results)
    }

    /// Drop one booking held by `name` at the hour containing `at`.
    pub async fn cancel(&self, name: &str, at: Ms) -> Result<bool, EngineError> {
        validate_timestamp(at)?;
        let name = name.trim();
        let cancelled = self.ledger.write().await.cancel(name, at);

        let slot = HourSlot::of(at);
        if cancelled {
            metrics::counter!(CANCELLATIONS_TOTAL, "outcome" => "cancelled").increment(1);
            info!("cancelled {slot} for {name:?}");
        } else {
            metrics::counter!(CANCELLATIONS_TOTAL, "outcome" => "not_found").increment(1);
            debug!("nothing to cancel for {name:?} at {slot}");
        }
        Ok(cancelled)
    }
}
