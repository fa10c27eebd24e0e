mod error;
mod mutations;
mod queries;
mod validate;

pub use error::EngineError;

use tokio::sync::RwLock;

use crate::ledger::Ledger;
use crate::schedule::OpeningHours;

/// One restaurant's bookings, shared across connections.
///
/// The ledger sits behind a single lock over the whole mapping, so the
/// capacity check and the append in `reserve` happen as one step.
/// Input checks the ledger leaves to its caller (empty names, past hours,
/// out-of-range timestamps) happen here, before the lock is taken.
pub struct Engine {
    ledger: RwLock<Ledger>,
    capacity: u32,
    hours: OpeningHours,
}

impl Engine {
    pub fn new(ledger: Ledger, hours: OpeningHours) -> Self {
        Self {
            capacity: ledger.capacity(),
            ledger: RwLock::new(ledger),
            hours,
        }
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    pub fn opening_hours(&self) -> OpeningHours {
        self.hours
    }
}
