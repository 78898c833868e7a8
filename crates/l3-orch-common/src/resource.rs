//! Capacity accounting for router tables.
//!
//! A [`ResourceGauge`] tracks how many entries of one kind are in use across
//! every router, the way CRM tracks used/available counters per resource.
//! Tables take a slot with [`ResourceGauge::try_acquire`] before they
//! mutate, so a full table fails without touching any state.

use std::sync::atomic::{AtomicU32, Ordering};

/// Lock-free used/limit counter for one resource kind.
#[derive(Debug)]
pub struct ResourceGauge {
    name: &'static str,
    limit: u32,
    used: AtomicU32,
}

impl ResourceGauge {
    pub fn new(name: &'static str, limit: u32) -> Self {
        Self {
            name,
            limit,
            used: AtomicU32::new(0),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn used(&self) -> u32 {
        self.used.load(Ordering::Acquire)
    }

    pub fn available(&self) -> u32 {
        self.limit.saturating_sub(self.used())
    }

    /// Takes `n` slots at once, or none if fewer than `n` are free.
    pub fn try_acquire(&self, n: u32) -> bool {
        self.used
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |used| {
                used.checked_add(n).filter(|total| *total <= self.limit)
            })
            .is_ok()
    }

    /// Returns `n` slots. Saturates at zero.
    pub fn release(&self, n: u32) {
        let result = self
            .used
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |used| {
                Some(used.saturating_sub(n))
            });
        if let Ok(prev) = result {
            if prev < n {
                log::warn!(
                    "{} gauge released {} slots with only {} in use",
                    self.name,
                    n,
                    prev
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_acquire_until_full() {
        let gauge = ResourceGauge::new("neighbors", 3);
        assert!(gauge.try_acquire(2));
        assert!(!gauge.try_acquire(2));
        assert_eq!(gauge.used(), 2);
        assert!(gauge.try_acquire(1));
        assert_eq!(gauge.available(), 0);

        gauge.release(3);
        assert_eq!(gauge.used(), 0);
    }

    #[test]
    fn test_release_saturates() {
        let gauge = ResourceGauge::new("rifs", 4);
        assert!(gauge.try_acquire(1));
        gauge.release(5);
        assert_eq!(gauge.used(), 0);
    }

    #[test]
    fn test_concurrent_acquire_never_exceeds_limit() {
        let gauge = Arc::new(ResourceGauge::new("routes", 100));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let gauge = Arc::clone(&gauge);
                thread::spawn(move || (0..50).filter(|_| gauge.try_acquire(1)).count())
            })
            .collect();
        let taken: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(taken, 100);
        assert_eq!(gauge.used(), 100);
    }
}
