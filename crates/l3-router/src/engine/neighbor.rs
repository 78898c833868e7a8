//! Neighbor table calls.

use l3_sdk::{AccessCmd, Query, RouterResult, VendorExt, VrId};
use l3_types::IpAddress;

use super::L3Router;
use crate::neigh::{NeighborData, NeighborOp, NeighborReply};
use crate::table::{read, write};

impl L3Router {
    /// Adds, edits or deletes neighbors from a raw command.
    ///
    /// For DELETE_ALL a valid rif in `data` limits the delete to that
    /// interface.
    pub fn neigh_set(
        &self,
        cmd: AccessCmd,
        vrid: VrId,
        key: Option<IpAddress>,
        data: Option<&NeighborData>,
        ext: Option<&VendorExt>,
    ) -> RouterResult<()> {
        self.vendor_ext("neigh_set", ext);
        self.neigh_apply(vrid, NeighborOp::from_cmd(cmd, key, data)?)
    }

    pub fn neigh_apply(&self, vrid: VrId, op: NeighborOp) -> RouterResult<()> {
        self.with_router(vrid, |router| {
            let mut intfs = write(&router.tables.intfs, "interface table")?;
            let mut neigh = write(&router.tables.neigh, "neighbor table")?;
            match op {
                NeighborOp::Add(ip, data) => {
                    neigh.add_neighbor(&mut intfs, ip, data.clone())?;
                    self.notify(|cb| cb.on_neighbor_added(vrid, &ip, &data));
                }
                NeighborOp::Edit(ip, data) => {
                    neigh.update_neighbor(&mut intfs, ip, data)?;
                }
                NeighborOp::Delete(ip) => {
                    neigh.remove_neighbor(&mut intfs, &ip)?;
                    self.notify(|cb| cb.on_neighbor_removed(vrid, &ip));
                }
                NeighborOp::DeleteAll { rif } => {
                    for ip in neigh.remove_all(&mut intfs, rif)? {
                        self.notify(|cb| cb.on_neighbor_removed(vrid, &ip));
                    }
                }
            }
            Ok(())
        })
    }

    /// Reads neighbors with GET, GET_ACTIVITY, GET_FIRST or GET_NEXT.
    ///
    /// `count` must be 1 for GET and GET_ACTIVITY; `key` is ignored by
    /// GET_FIRST.
    pub fn neigh_get(
        &self,
        cmd: AccessCmd,
        vrid: VrId,
        key: Option<IpAddress>,
        count: usize,
        ext: Option<&VendorExt>,
    ) -> RouterResult<NeighborReply> {
        self.vendor_ext("neigh_get", ext);
        self.neigh_query(vrid, &Query::from_cmd(cmd, key, count)?)
    }

    /// Only GET_ACTIVITY takes the neighbor table exclusively.
    pub fn neigh_query(&self, vrid: VrId, query: &Query<IpAddress>) -> RouterResult<NeighborReply> {
        self.with_router(vrid, |router| match query {
            Query::GetActivity(_) => write(&router.tables.neigh, "neighbor table")?.query(query),
            _ => read(&router.tables.neigh, "neighbor table")?.read_entries(query),
        })
    }

    /// Marks a neighbor as used by the datapath.
    pub fn neigh_touch(&self, vrid: VrId, ip: &IpAddress) -> RouterResult<()> {
        self.with_router(vrid, |router| {
            write(&router.tables.neigh, "neighbor table")?.touch(ip)
        })
    }
}
