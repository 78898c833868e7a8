//! Neighbor orchestration logic.

use log::{debug, info};
use l3_orch_common::SyncMap;
use l3_sdk::{Query, RifId, RouterError, RouterResult, VrId};
use l3_types::IpAddress;
use std::sync::Arc;

use super::types::{NeighborData, NeighborEntry, NeighborReply};
use crate::intfs::IntfsOrch;
use crate::resources::{acquire, RouterResources};
use crate::table::run_query;

#[derive(Debug, Clone, Default)]
pub struct NeighOrchStats {
    pub neighbors_added: u64,
    pub neighbors_removed: u64,
    pub neighbors_updated: u64,
    pub ipv4_neighbors: u64,
    pub ipv6_neighbors: u64,
}

impl NeighOrchStats {
    fn count(&mut self, ip: &IpAddress, added: bool) {
        let family = if ip.is_ipv4() {
            &mut self.ipv4_neighbors
        } else {
            &mut self.ipv6_neighbors
        };
        if added {
            *family = family.saturating_add(1);
            self.neighbors_added = self.neighbors_added.saturating_add(1);
        } else {
            *family = family.saturating_sub(1);
            self.neighbors_removed = self.neighbors_removed.saturating_add(1);
        }
    }
}

/// Neighbor table of one virtual router.
#[derive(Debug)]
pub struct NeighOrch {
    vrid: VrId,
    resources: Arc<RouterResources>,
    stats: NeighOrchStats,
    neighbors: SyncMap<IpAddress, NeighborData>,
}

impl NeighOrch {
    pub fn new(vrid: VrId, resources: Arc<RouterResources>) -> Self {
        Self {
            vrid,
            resources,
            stats: NeighOrchStats::default(),
            neighbors: SyncMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.neighbors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.neighbors.is_empty()
    }

    pub fn contains(&self, ip: &IpAddress) -> bool {
        self.neighbors.contains_key(ip)
    }

    pub fn get_neighbor(&self, ip: &IpAddress) -> Option<&NeighborData> {
        self.neighbors.get(ip)
    }

    pub fn stats(&self) -> &NeighOrchStats {
        &self.stats
    }

    fn not_found(&self, ip: &IpAddress) -> RouterError {
        RouterError::not_found(format!("neighbor {} in {}", ip, self.vrid))
    }

    pub fn add_neighbor(
        &mut self,
        intfs: &mut IntfsOrch,
        ip: IpAddress,
        mut data: NeighborData,
    ) -> RouterResult<()> {
        data.validate(&ip)?;
        if self.neighbors.contains_key(&ip) {
            return Err(RouterError::already_exists(format!(
                "neighbor {} in {}",
                ip, self.vrid
            )));
        }
        intfs.acquire_refs(&[data.rif])?;
        if let Err(e) = acquire(&self.resources.neighbors, 1) {
            intfs.release_refs(&[data.rif]);
            return Err(e);
        }

        data.activity = false;
        debug!("Added neighbor {} -> {} on {} in {}", ip, data.mac, data.rif, self.vrid);
        self.neighbors.insert(ip, data);
        self.stats.count(&ip, true);
        Ok(())
    }

    /// Replaces the data of an existing neighbor, moving it to another rif
    /// if the rif changed. The activity flag is kept.
    pub fn update_neighbor(
        &mut self,
        intfs: &mut IntfsOrch,
        ip: IpAddress,
        mut data: NeighborData,
    ) -> RouterResult<()> {
        data.validate(&ip)?;
        let (old_rif, activity) = self
            .neighbors
            .get(&ip)
            .map(|old| (old.rif, old.activity))
            .ok_or_else(|| self.not_found(&ip))?;
        data.activity = activity;

        if old_rif != data.rif {
            intfs.acquire_refs(&[data.rif])?;
            intfs.release_refs(&[old_rif]);
        }
        self.neighbors.insert(ip, data);
        self.stats.neighbors_updated = self.stats.neighbors_updated.saturating_add(1);

        debug!("Updated neighbor {} in {}", ip, self.vrid);
        Ok(())
    }

    pub fn remove_neighbor(
        &mut self,
        intfs: &mut IntfsOrch,
        ip: &IpAddress,
    ) -> RouterResult<NeighborData> {
        let data = self
            .neighbors
            .remove(ip)
            .ok_or_else(|| self.not_found(ip))?;

        intfs.release_refs(&[data.rif]);
        self.resources.neighbors.release(1);
        self.stats.count(ip, false);

        debug!("Removed neighbor {} from {}", ip, self.vrid);
        Ok(data)
    }

    /// Removes the neighbors learned on `rif`, or every neighbor if `None`.
    ///
    /// Returns the removed addresses in table order.
    pub fn remove_all(
        &mut self,
        intfs: &mut IntfsOrch,
        rif: Option<RifId>,
    ) -> RouterResult<Vec<IpAddress>> {
        if let Some(rif) = rif {
            if !intfs.contains(rif) {
                return Err(RouterError::not_found(format!("{} in {}", rif, self.vrid)));
            }
        }

        let removed: Vec<(IpAddress, RifId)> = self
            .neighbors
            .iter()
            .filter(|(_, data)| rif.map_or(true, |r| data.rif == r))
            .map(|(ip, data)| (*ip, data.rif))
            .collect();

        for (ip, neighbor_rif) in &removed {
            self.neighbors.remove(ip);
            intfs.release_refs(&[*neighbor_rif]);
            self.stats.count(ip, false);
        }
        self.resources.neighbors.release(removed.len() as u32);

        match rif {
            Some(rif) => info!(
                "Removed {} neighbors of {} from {}",
                removed.len(),
                rif,
                self.vrid
            ),
            None => info!("Removed all {} neighbors from {}", removed.len(), self.vrid),
        }
        Ok(removed.into_iter().map(|(ip, _)| ip).collect())
    }

    /// Runs one of the four read modes.
    ///
    /// GET_ACTIVITY returns the activity flag and clears it.
    pub fn query(&mut self, query: &Query<IpAddress>) -> RouterResult<NeighborReply> {
        match query {
            Query::GetActivity(ip) => self.take_activity(ip),
            _ => self.read_entries(query),
        }
    }

    fn take_activity(&mut self, ip: &IpAddress) -> RouterResult<NeighborReply> {
        let vrid = self.vrid;
        let data = self
            .neighbors
            .get_mut(ip)
            .ok_or_else(|| RouterError::not_found(format!("neighbor {} in {}", ip, vrid)))?;
        let active = std::mem::replace(&mut data.activity, false);
        Ok(NeighborReply::Activity { ip: *ip, active })
    }

    /// Runs GET, GET_FIRST or GET_NEXT without touching activity flags.
    ///
    /// GET_ACTIVITY needs [`NeighOrch::query`] and is rejected here.
    pub fn read_entries(&self, query: &Query<IpAddress>) -> RouterResult<NeighborReply> {
        if let Query::GetActivity(ip) = query {
            return Err(RouterError::invalid_parameter(format!(
                "GET_ACTIVITY of {} needs exclusive access",
                ip
            )));
        }
        let page = run_query(&self.neighbors, query, "neigh_get")?;
        Ok(NeighborReply::Entries(
            page.into_iter()
                .map(|(ip, data)| NeighborEntry { ip, data })
                .collect(),
        ))
    }

    /// Marks a neighbor as recently used.
    pub fn touch(&mut self, ip: &IpAddress) -> RouterResult<()> {
        let vrid = self.vrid;
        let data = self
            .neighbors
            .get_mut(ip)
            .ok_or_else(|| RouterError::not_found(format!("neighbor {} in {}", ip, vrid)))?;
        data.activity = true;
        Ok(())
    }
}
