use crate::limits::*;
use crate::model::*;

use super::EngineError;

pub(crate) fn validate_timestamp(at: Ms) -> Result<(), EngineError> {
    if !(MIN_VALID_TIMESTAMP_MS..=MAX_VALID_TIMESTAMP_MS).contains(&at) {
        return Err(EngineError::LimitExceeded("timestamp out of range"));
    }
    Ok(())
}

/// Trimmed name, or an error if nothing is left or it is too long.
pub(crate) fn validate_name(name: &str) -> Result<&str, EngineError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(EngineError::EmptyName);
    }
    if name.len() > MAX_NAME_LEN {
        return Err(EngineError::LimitExceeded("customer name too long"));
    }
    Ok(name)
}

/// Booking is allowed for the current hour and later.
pub(crate) fn check_not_past(at: Ms, now: Ms) -> Result<HourSlot, EngineError> {
    let slot = HourSlot::of(at);
    let current = HourSlot::of(now);
    if slot < current {
        return Err(EngineError::PastSlot { slot, current });
    }
    Ok(slot)
}

pub(crate) fn validate_reservation(
    name: &str,
    at: Ms,
    now: Ms,
) -> Result<(&str, HourSlot), EngineError> {
    let name = validate_name(name)?;
    validate_timestamp(at)?;
    let slot = check_not_past(at, now)?;
    Ok((name, slot))
}
