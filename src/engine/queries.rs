use crate::model::*;

use super::validate::validate_timestamp;
use super::{Engine, EngineError};

impl Engine {
    pub async fn check(&self, name: &str, at: Ms) -> Result<bool, EngineError> {
        validate_timestamp(at)?;
        Ok(self.ledger.read().await.exists(name.trim(), at))
    }

    pub async fn free_tables(&self, at: Ms) -> Result<u32, EngineError> {
        validate_timestamp(at)?;
        Ok(self.ledger.read().await.free_count(at))
    }

    /// Every slot ever booked with its current count, oldest first.
    pub async fn reservation_counts(&self) -> Vec<SlotCount> {
        self.ledger
            .read()
            .await
            .counts_by_hour()
            .into_iter()
            .map(|(slot, reservations)| SlotCount { slot, reservations })
            .collect()
    }

    /// Free tables for each hour of the opening window as of `now`.
    pub async fn availability(&self, now: Ms) -> Vec<SlotAvailability> {
        let window = self.hours.window(now);
        let guard = self.ledger.read().await;
        window
            .into_iter()
            .map(|slot| {
                let free = guard.free_count(slot.start_ms());
                SlotAvailability {
                    slot,
                    free,
                    status: Occupancy::classify(free, self.capacity),
                }
            })
            .collect()
    }
}
