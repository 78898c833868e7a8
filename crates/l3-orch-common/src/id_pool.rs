//! Lowest-free ID allocator.
//!
//! Router and router-interface IDs are small integers handed back to the
//! caller on ADD. The pool always returns the lowest ID not in use, so a
//! released ID is the next one handed out.

use std::collections::BTreeSet;

/// Allocator for IDs in `0..capacity`.
#[derive(Debug, Clone)]
pub struct IdPool {
    capacity: u32,
    in_use: BTreeSet<u32>,
}

impl IdPool {
    pub fn new(capacity: u32) -> Self {
        Self {
            capacity,
            in_use: BTreeSet::new(),
        }
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    pub fn used(&self) -> usize {
        self.in_use.len()
    }

    pub fn is_exhausted(&self) -> bool {
        self.in_use.len() >= self.capacity as usize
    }

    pub fn is_allocated(&self, id: u32) -> bool {
        self.in_use.contains(&id)
    }

    /// Returns the lowest free ID without taking it.
    pub fn peek(&self) -> Option<u32> {
        // The in-use set is dense from 0 up to the first gap.
        let mut expected = 0u32;
        for &id in &self.in_use {
            if id != expected {
                break;
            }
            expected += 1;
        }
        (expected < self.capacity).then_some(expected)
    }

    /// Takes the lowest free ID, or `None` if the pool is exhausted.
    pub fn allocate(&mut self) -> Option<u32> {
        let id = self.peek()?;
        self.in_use.insert(id);
        Some(id)
    }

    /// Takes a specific ID. Returns false if it is out of range or taken.
    pub fn reserve(&mut self, id: u32) -> bool {
        id < self.capacity && self.in_use.insert(id)
    }

    /// Returns an ID to the pool. Returns false if it was not allocated.
    pub fn release(&mut self, id: u32) -> bool {
        self.in_use.remove(&id)
    }
}
