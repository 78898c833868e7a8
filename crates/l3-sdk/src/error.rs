//! Status codes and error handling.
//!
//! Every failure of the router API is a [`RouterError`], and every
//! [`RouterError`] maps to exactly one [`Status`]. The numeric values of
//! [`Status`] are part of the call-surface contract and never change.

use std::fmt;
use thiserror::Error;

/// Status codes returned across the router call surface.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    Success = 0,
    Error = 1,
    ParamError = 2,
    ParamNull = 3,
    ParamExceedsRange = 4,
    NoResources = 5,
    EntryNotFound = 6,
    EntryAlreadyExists = 7,
    ResourceInUse = 8,
    CmdUnsupported = 9,
}

impl Status {
    /// Creates a Status from a raw i32 value.
    ///
    /// Unknown values map to [`Status::Error`].
    pub fn from_raw(status: i32) -> Self {
        match status {
            0 => Status::Success,
            2 => Status::ParamError,
            3 => Status::ParamNull,
            4 => Status::ParamExceedsRange,
            5 => Status::NoResources,
            6 => Status::EntryNotFound,
            7 => Status::EntryAlreadyExists,
            8 => Status::ResourceInUse,
            9 => Status::CmdUnsupported,
            _ => Status::Error,
        }
    }

    pub const fn as_raw(self) -> i32 {
        self as i32
    }

    pub fn is_success(&self) -> bool {
        *self == Status::Success
    }

    /// Collapses a call result into its status code.
    pub fn of<T>(result: &RouterResult<T>) -> Self {
        match result {
            Ok(_) => Status::Success,
            Err(e) => e.status(),
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Status::Success => "STATUS_SUCCESS",
            Status::Error => "STATUS_ERROR",
            Status::ParamError => "STATUS_PARAM_ERROR",
            Status::ParamNull => "STATUS_PARAM_NULL",
            Status::ParamExceedsRange => "STATUS_PARAM_EXCEEDS_RANGE",
            Status::NoResources => "STATUS_NO_RESOURCES",
            Status::EntryNotFound => "STATUS_ENTRY_NOT_FOUND",
            Status::EntryAlreadyExists => "STATUS_ENTRY_ALREADY_EXISTS",
            Status::ResourceInUse => "STATUS_RESOURCE_IN_USE",
            Status::CmdUnsupported => "STATUS_CMD_UNSUPPORTED",
        };
        write!(f, "{}", s)
    }
}

/// Error type for router operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouterError {
    /// Malformed input.
    #[error("Invalid parameter: {message}")]
    InvalidParameter { message: String },

    /// A mandatory argument was not supplied.
    #[error("Missing parameter: {param}")]
    MissingParameter { param: String },

    /// A numeric argument is outside its allowed range.
    #[error("Parameter out of range: {message}")]
    OutOfRange { message: String },

    /// The table or resource pool is full.
    #[error("No resources: {table}")]
    NoResources { table: String },

    #[error("Entry not found: {item}")]
    NotFound { item: String },

    #[error("Entry already exists: {item}")]
    AlreadyExists { item: String },

    /// The object still has dependents and cannot be removed.
    #[error("Object in use: {object}")]
    InUse { object: String },

    /// The access command is not valid for this operation.
    #[error("Command {cmd} not supported by {operation}")]
    CmdUnsupported { cmd: String, operation: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl RouterError {
    /// Returns the status code this error is reported as.
    pub fn status(&self) -> Status {
        match self {
            RouterError::InvalidParameter { .. } => Status::ParamError,
            RouterError::MissingParameter { .. } => Status::ParamNull,
            RouterError::OutOfRange { .. } => Status::ParamExceedsRange,
            RouterError::NoResources { .. } => Status::NoResources,
            RouterError::NotFound { .. } => Status::EntryNotFound,
            RouterError::AlreadyExists { .. } => Status::EntryAlreadyExists,
            RouterError::InUse { .. } => Status::ResourceInUse,
            RouterError::CmdUnsupported { .. } => Status::CmdUnsupported,
            RouterError::Internal { .. } => Status::Error,
        }
    }

    pub fn invalid_parameter(message: impl Into<String>) -> Self {
        RouterError::InvalidParameter {
            message: message.into(),
        }
    }

    pub fn missing_parameter(param: impl Into<String>) -> Self {
        RouterError::MissingParameter {
            param: param.into(),
        }
    }

    pub fn out_of_range(message: impl Into<String>) -> Self {
        RouterError::OutOfRange {
            message: message.into(),
        }
    }

    pub fn no_resources(table: impl Into<String>) -> Self {
        RouterError::NoResources {
            table: table.into(),
        }
    }

    pub fn not_found(item: impl Into<String>) -> Self {
        RouterError::NotFound { item: item.into() }
    }

    pub fn already_exists(item: impl Into<String>) -> Self {
        RouterError::AlreadyExists { item: item.into() }
    }

    pub fn in_use(object: impl Into<String>) -> Self {
        RouterError::InUse {
            object: object.into(),
        }
    }

    pub fn cmd_unsupported(cmd: impl fmt::Display, operation: impl Into<String>) -> Self {
        RouterError::CmdUnsupported {
            cmd: cmd.to_string(),
            operation: operation.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        RouterError::Internal {
            message: message.into(),
        }
    }

    /// Returns true if this is an [`RouterError::NotFound`].
    ///
    /// Lookups and deletes of missing keys are an ordinary outcome that
    /// callers commonly branch on.
    pub fn is_not_found(&self) -> bool {
        matches!(self, RouterError::NotFound { .. })
    }
}

/// Result type for router operations.
pub type RouterResult<T> = Result<T, RouterError>;

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_status_raw_values_are_stable() {
        assert_eq!(Status::Success.as_raw(), 0);
        assert_eq!(Status::ParamError.as_raw(), 2);
        assert_eq!(Status::EntryNotFound.as_raw(), 6);
        assert_eq!(Status::CmdUnsupported.as_raw(), 9);
    }

    #[test]
    fn test_status_from_raw() {
        assert_eq!(Status::from_raw(0), Status::Success);
        assert_eq!(Status::from_raw(5), Status::NoResources);
        assert_eq!(Status::from_raw(1), Status::Error);
        assert_eq!(Status::from_raw(-42), Status::Error);
    }

    #[test]
    fn test_error_status_mapping() {
        assert_eq!(RouterError::not_found("rif 3").status(), Status::EntryNotFound);
        assert_eq!(RouterError::in_use("vrid 1").status(), Status::ResourceInUse);
        assert_eq!(RouterError::no_resources("neighbors").status(), Status::NoResources);
        assert_eq!(RouterError::missing_parameter("key").status(), Status::ParamNull);
        assert_eq!(RouterError::out_of_range("mtu").status(), Status::ParamExceedsRange);
        assert_eq!(
            RouterError::cmd_unsupported("GET_ACTIVITY", "uc_route_get").status(),
            Status::CmdUnsupported
        );
    }

    #[test]
    fn test_status_of_result() {
        let ok: RouterResult<u32> = Ok(1);
        let err: RouterResult<u32> = Err(RouterError::internal("boom"));
        assert_eq!(Status::of(&ok), Status::Success);
        assert_eq!(Status::of(&err), Status::Error);
    }

    #[test]
    fn test_display() {
        assert_eq!(Status::NoResources.to_string(), "STATUS_NO_RESOURCES");
        let err = RouterError::cmd_unsupported("EDIT", "mc_route_set");
        assert_eq!(err.to_string(), "Command EDIT not supported by mc_route_set");
    }
}
