//! Counter storage and snapshots.

use chrono::{DateTime, Utc};
use l3_sdk::CounterReadMode;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

/// Traffic direction relative to the router interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CounterDirection {
    Ingress,
    Egress,
}

/// Values of one direction at the time of a read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DirectionStats {
    pub packets: u64,
    pub bytes: u64,
    pub drops: u64,
    pub errors: u64,
}

/// Result of a counter read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RifCounterSnapshot {
    pub ingress: DirectionStats,
    pub egress: DirectionStats,
    pub allocated_at: DateTime<Utc>,
    /// Time of the last READ_CLEAR, `None` if never cleared.
    pub last_cleared: Option<DateTime<Utc>>,
}

#[derive(Debug, Default)]
struct DirectionCounters {
    packets: AtomicU64,
    bytes: AtomicU64,
    drops: AtomicU64,
    errors: AtomicU64,
}

impl DirectionCounters {
    fn read(&self, mode: CounterReadMode) -> DirectionStats {
        let take = |counter: &AtomicU64| match mode {
            CounterReadMode::Read => counter.load(Ordering::Acquire),
            CounterReadMode::ReadClear => counter.swap(0, Ordering::AcqRel),
        };
        DirectionStats {
            packets: take(&self.packets),
            bytes: take(&self.bytes),
            drops: take(&self.drops),
            errors: take(&self.errors),
        }
    }
}

/// Live counter of one router interface.
#[derive(Debug)]
pub struct RifCounter {
    ingress: DirectionCounters,
    egress: DirectionCounters,
    allocated_at: DateTime<Utc>,
    last_cleared: Mutex<Option<DateTime<Utc>>>,
}

impl Default for RifCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl RifCounter {
    pub fn new() -> Self {
        Self {
            ingress: DirectionCounters::default(),
            egress: DirectionCounters::default(),
            allocated_at: Utc::now(),
            last_cleared: Mutex::new(None),
        }
    }

    fn direction(&self, direction: CounterDirection) -> &DirectionCounters {
        match direction {
            CounterDirection::Ingress => &self.ingress,
            CounterDirection::Egress => &self.egress,
        }
    }

    pub fn count(&self, direction: CounterDirection, packets: u64, bytes: u64) {
        let counters = self.direction(direction);
        counters.packets.fetch_add(packets, Ordering::AcqRel);
        counters.bytes.fetch_add(bytes, Ordering::AcqRel);
    }

    pub fn count_drops(&self, direction: CounterDirection, packets: u64) {
        self.direction(direction)
            .drops
            .fetch_add(packets, Ordering::AcqRel);
    }

    pub fn count_errors(&self, direction: CounterDirection, packets: u64) {
        self.direction(direction)
            .errors
            .fetch_add(packets, Ordering::AcqRel);
    }

    /// Reads every field, clearing each one atomically for READ_CLEAR.
    pub fn read(&self, mode: CounterReadMode) -> RifCounterSnapshot {
        let ingress = self.ingress.read(mode);
        let egress = self.egress.read(mode);

        let last_cleared = match self.last_cleared.lock() {
            Ok(mut cleared) => {
                if mode == CounterReadMode::ReadClear {
                    *cleared = Some(Utc::now());
                }
                *cleared
            }
            Err(_) => None,
        };

        RifCounterSnapshot {
            ingress,
            egress,
            allocated_at: self.allocated_at,
            last_cleared,
        }
    }
}
