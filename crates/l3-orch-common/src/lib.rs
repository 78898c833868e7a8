//! Table primitives shared by the L3 router orchs.
//!
//! - [`SyncMap`]: ordered map that never auto-creates entries and pages
//!   with first/next cursors
//! - [`IdPool`]: lowest-free ID allocator for routers and interfaces
//! - [`ResourceGauge`]: lock-free capacity accounting shared across tables
//! - [`BufferFill`]: result of copying a list into a caller-sized buffer
//!
//! # Example
//!
//! ```
//! use l3_orch_common::SyncMap;
//!
//! let mut table: SyncMap<u32, &str> = (1..=5).map(|k| (k, "v")).collect();
//! let first = table.page_first(2);
//! assert_eq!(first.iter().map(|(k, _)| *k).collect::<Vec<_>>(), vec![1, 2]);
//!
//! // The cursor need not exist any more.
//! table.remove(&2);
//! let next = table.page_after(&2, 2);
//! assert_eq!(next.iter().map(|(k, _)| *k).collect::<Vec<_>>(), vec![3, 4]);
//! ```

mod buffer;
mod id_pool;
mod resource;
mod sync_map;

pub use buffer::BufferFill;
pub use id_pool::IdPool;
pub use resource::ResourceGauge;
pub use sync_map::{HasRefCount, SyncMap, SyncMapError};
