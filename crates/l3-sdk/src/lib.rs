//! Call-surface contract of the L3 router control plane.
//!
//! Everything a caller of the router API exchanges with it that is not a
//! plain network value lives here:
//!
//! - [`types`]: type-safe router and router-interface IDs
//! - [`error`]: status codes with fixed numeric values and [`RouterError`]
//! - [`cmd`]: access commands and the typed read protocol ([`Query`])
//! - [`ext`]: the opaque vendor-extension slot
//!
//! # Example
//!
//! ```
//! use l3_sdk::{AccessCmd, Query, Status};
//!
//! // A raw GET_NEXT with a cursor key and a page size of 16.
//! let cmd = AccessCmd::try_from(AccessCmd::GetNext.as_raw()).unwrap();
//! let query = Query::from_cmd(cmd, Some(7u32), 16).unwrap();
//! assert_eq!(query.count(), 16);
//!
//! // GET_FIRST without a page size is rejected before touching any table.
//! let err = Query::<u32>::from_cmd(AccessCmd::GetFirst, None, 0).unwrap_err();
//! assert_eq!(err.status(), Status::ParamError);
//! ```

pub mod cmd;
pub mod error;
pub mod ext;
pub mod types;

pub use cmd::{AccessCmd, CounterReadMode, Query};
pub use error::{RouterError, RouterResult, Status};
pub use ext::VendorExt;
pub use types::{ObjectId, ObjectKind, RawObjectId, RifId, RouterInterfaceKind, VirtualRouterKind, VrId};
