use crate::model::HourSlot;

#[derive(Debug, PartialEq, Eq)]
pub enum EngineError {
    EmptyName,
    PastSlot { slot: HourSlot, current: HourSlot },
    LimitExceeded(&'static str),
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::EmptyName => write!(f, "customer name must not be empty"),
            EngineError::PastSlot { slot, current } => {
                write!(f, "cannot reserve for past slot {slot} (current hour {current})")
            }
            EngineError::LimitExceeded(msg) => write!(f, "limit exceeded: {msg}"),
        }
    }
}

impl std::error::Error for EngineError {}
