//! Access commands and the typed read protocol.
//!
//! On the call surface a single command code selects what a `*_set` or
//! `*_get` call does. [`AccessCmd`] keeps those codes stable; [`Query`] is
//! the typed form of the four read modes and is what the tables page with.

use crate::error::{RouterError, RouterResult};
use std::fmt;

/// Access command codes.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessCmd {
    Add = 1,
    Edit = 2,
    Delete = 3,
    DeleteAll = 4,
    Get = 5,
    GetNext = 6,
    GetFirst = 7,
    Set = 8,
    GetActivity = 9,
    Read = 10,
    ReadClear = 11,
}

impl AccessCmd {
    pub const fn as_raw(self) -> u32 {
        self as u32
    }

    /// Returns true for the commands that only read state.
    pub const fn is_read(&self) -> bool {
        matches!(
            self,
            AccessCmd::Get
                | AccessCmd::GetNext
                | AccessCmd::GetFirst
                | AccessCmd::GetActivity
                | AccessCmd::Read
        )
    }
}

impl TryFrom<u32> for AccessCmd {
    type Error = RouterError;

    fn try_from(raw: u32) -> Result<Self, Self::Error> {
        Ok(match raw {
            1 => AccessCmd::Add,
            2 => AccessCmd::Edit,
            3 => AccessCmd::Delete,
            4 => AccessCmd::DeleteAll,
            5 => AccessCmd::Get,
            6 => AccessCmd::GetNext,
            7 => AccessCmd::GetFirst,
            8 => AccessCmd::Set,
            9 => AccessCmd::GetActivity,
            10 => AccessCmd::Read,
            11 => AccessCmd::ReadClear,
            other => return Err(RouterError::cmd_unsupported(other, "access command decode")),
        })
    }
}

impl fmt::Display for AccessCmd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AccessCmd::Add => "ADD",
            AccessCmd::Edit => "EDIT",
            AccessCmd::Delete => "DELETE",
            AccessCmd::DeleteAll => "DELETE_ALL",
            AccessCmd::Get => "GET",
            AccessCmd::GetNext => "GET_NEXT",
            AccessCmd::GetFirst => "GET_FIRST",
            AccessCmd::Set => "SET",
            AccessCmd::GetActivity => "GET_ACTIVITY",
            AccessCmd::Read => "READ",
            AccessCmd::ReadClear => "READ_CLEAR",
        };
        write!(f, "{}", s)
    }
}

/// One of the four read modes of a keyed table.
///
/// `count` is the number of entries the caller has room for. `GetNext`
/// pages strictly after `after`, which does not have to be present in the
/// table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query<K> {
    Get(K),
    GetActivity(K),
    GetFirst { count: usize },
    GetNext { after: K, count: usize },
}

impl<K> Query<K> {
    /// Builds a query from a raw command, an optional key and a count.
    ///
    /// GET and GET_ACTIVITY need a key and a count of exactly 1. GET_FIRST
    /// ignores the key. GET_FIRST and GET_NEXT need a non-zero count.
    pub fn from_cmd(cmd: AccessCmd, key: Option<K>, count: usize) -> RouterResult<Self> {
        match cmd {
            AccessCmd::Get | AccessCmd::GetActivity => {
                if count != 1 {
                    return Err(RouterError::invalid_parameter(format!(
                        "{} requires a count of 1, got {}",
                        cmd, count
                    )));
                }
                let key = key.ok_or_else(|| RouterError::missing_parameter("key"))?;
                Ok(if cmd == AccessCmd::Get {
                    Query::Get(key)
                } else {
                    Query::GetActivity(key)
                })
            }
            AccessCmd::GetFirst => {
                if count == 0 {
                    return Err(RouterError::invalid_parameter("GET_FIRST with a count of 0"));
                }
                Ok(Query::GetFirst { count })
            }
            AccessCmd::GetNext => {
                if count == 0 {
                    return Err(RouterError::invalid_parameter("GET_NEXT with a count of 0"));
                }
                let after = key.ok_or_else(|| RouterError::missing_parameter("key"))?;
                Ok(Query::GetNext { after, count })
            }
            other => Err(RouterError::cmd_unsupported(other, "query")),
        }
    }

    /// Maximum number of entries this query can return.
    pub fn count(&self) -> usize {
        match self {
            Query::Get(_) | Query::GetActivity(_) => 1,
            Query::GetFirst { count } | Query::GetNext { count, .. } => *count,
        }
    }

    /// The access command this query corresponds to.
    pub fn cmd(&self) -> AccessCmd {
        match self {
            Query::Get(_) => AccessCmd::Get,
            Query::GetActivity(_) => AccessCmd::GetActivity,
            Query::GetFirst { .. } => AccessCmd::GetFirst,
            Query::GetNext { .. } => AccessCmd::GetNext,
        }
    }
}

/// Counter read semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CounterReadMode {
    Read,
    /// Read and reset to zero in one atomic step per counter.
    ReadClear,
}

impl TryFrom<AccessCmd> for CounterReadMode {
    type Error = RouterError;

    fn try_from(cmd: AccessCmd) -> Result<Self, Self::Error> {
        match cmd {
            AccessCmd::Read | AccessCmd::Get => Ok(CounterReadMode::Read),
            AccessCmd::ReadClear => Ok(CounterReadMode::ReadClear),
            other => Err(RouterError::cmd_unsupported(other, "counter read")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Status;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_cmd_raw_round_trip() {
        for cmd in [
            AccessCmd::Add,
            AccessCmd::DeleteAll,
            AccessCmd::GetNext,
            AccessCmd::GetActivity,
            AccessCmd::ReadClear,
        ] {
            assert_eq!(AccessCmd::try_from(cmd.as_raw()).unwrap(), cmd);
        }
    }

    #[test]
    fn test_unknown_cmd_is_unsupported() {
        let err = AccessCmd::try_from(0).unwrap_err();
        assert_eq!(err.status(), Status::CmdUnsupported);
        assert!(AccessCmd::try_from(99).is_err());
    }

    #[test]
    fn test_get_requires_count_one_and_key() {
        assert_eq!(
            Query::from_cmd(AccessCmd::Get, Some(4u32), 1).unwrap(),
            Query::Get(4)
        );
        assert_eq!(
            Query::from_cmd(AccessCmd::Get, Some(4u32), 2).unwrap_err().status(),
            Status::ParamError
        );
        assert_eq!(
            Query::<u32>::from_cmd(AccessCmd::GetActivity, None, 1)
                .unwrap_err()
                .status(),
            Status::ParamNull
        );
    }

    #[test]
    fn test_get_first_ignores_key() {
        let query = Query::from_cmd(AccessCmd::GetFirst, Some(1u32), 8).unwrap();
        assert_eq!(query, Query::GetFirst { count: 8 });
        assert_eq!(query.cmd(), AccessCmd::GetFirst);
    }

    #[test]
    fn test_get_next_needs_cursor() {
        let query = Query::from_cmd(AccessCmd::GetNext, Some(10u32), 3).unwrap();
        assert_eq!(query, Query::GetNext { after: 10, count: 3 });
        assert!(Query::<u32>::from_cmd(AccessCmd::GetNext, None, 3).is_err());
    }

    #[test]
    fn test_write_cmd_is_not_a_query() {
        let err = Query::from_cmd(AccessCmd::Add, Some(1u32), 1).unwrap_err();
        assert_eq!(err.status(), Status::CmdUnsupported);
    }

    #[test]
    fn test_counter_read_mode() {
        assert_eq!(
            CounterReadMode::try_from(AccessCmd::ReadClear).unwrap(),
            CounterReadMode::ReadClear
        );
        assert!(CounterReadMode::try_from(AccessCmd::Delete).is_err());
    }
}
