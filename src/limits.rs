use crate::model::Ms;

/// Longest customer name accepted at the boundary, in bytes.
pub const MAX_NAME_LEN: usize = 256;

/// Upper bound on tables per restaurant.
pub const MAX_TABLES: u32 = 10_000;

/// Distinct hour slots one ledger may hold. Slots are never evicted.
pub const MAX_SLOTS_PER_LEDGER: usize = 100_000;

pub const MAX_TENANTS: usize = 1024;
pub const MAX_TENANT_NAME_LEN: usize = 128;

/// Rows accepted in one multi-row INSERT.
pub const MAX_BATCH_ROWS: usize = 1000;

pub const MIN_VALID_TIMESTAMP_MS: Ms = 0;
/// 9999-12-31T23:59:59.999
pub const MAX_VALID_TIMESTAMP_MS: Ms = 253_402_300_799_999;
