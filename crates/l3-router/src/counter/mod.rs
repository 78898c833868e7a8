//! Router interface counters.
//!
//! A counter is allocated for a rif explicitly and lives in the rif's table
//! entry. The counting path only needs shared access: every field is an
//! atomic, and READ_CLEAR swaps each field to zero so increments that race
//! with a clear are reported by the next read instead of being lost.

mod types;

pub use types::{CounterDirection, DirectionStats, RifCounter, RifCounterSnapshot};
