//! Lock and read-protocol helpers shared by the tables.

use l3_orch_common::SyncMap;
use l3_sdk::{Query, RouterError, RouterResult};
use std::fmt::Display;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

pub(crate) fn read<'a, T>(lock: &'a RwLock<T>, what: &str) -> RouterResult<RwLockReadGuard<'a, T>> {
    lock.read()
        .map_err(|_| RouterError::internal(format!("{} lock poisoned", what)))
}

pub(crate) fn write<'a, T>(
    lock: &'a RwLock<T>,
    what: &str,
) -> RouterResult<RwLockWriteGuard<'a, T>> {
    lock.write()
        .map_err(|_| RouterError::internal(format!("{} lock poisoned", what)))
}

/// Runs GET, GET_FIRST or GET_NEXT against an ordered table.
///
/// GET of a missing key is `EntryNotFound`. GET_ACTIVITY is only
/// meaningful for tables that track activity; here it is unsupported.
pub(crate) fn run_query<K, V>(
    table: &SyncMap<K, V>,
    query: &Query<K>,
    operation: &str,
) -> RouterResult<Vec<(K, V)>>
where
    K: Ord + Clone + Display,
    V: Clone,
{
    match query {
        Query::Get(key) => table
            .get(key)
            .map(|value| vec![(key.clone(), value.clone())])
            .ok_or_else(|| RouterError::not_found(key.to_string())),
        Query::GetFirst { count } => Ok(table.page_first(*count)),
        Query::GetNext { after, count } => Ok(table.page_after(after, *count)),
        Query::GetActivity(_) => Err(RouterError::cmd_unsupported(query.cmd(), operation)),
    }
}
