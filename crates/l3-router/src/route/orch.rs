//! RouteOrch implementation.
//!
//! Manages the unicast FIB of one virtual router. Every next hop holds a
//! reference on its router interface, so an interface cannot disappear
//! from under a route.

use log::{debug, info};
use l3_orch_common::SyncMap;
use l3_sdk::{Query, RouterError, RouterResult, VrId};
use l3_types::{IpAddress, IpPrefix};
use std::sync::Arc;

use super::nexthop::NextHop;
use super::types::{UcRouteData, UcRouteEntry};
use crate::intfs::IntfsOrch;
use crate::neigh::NeighOrch;
use crate::resources::{acquire, RouterResources};
use crate::table::run_query;

/// Statistics for RouteOrch operations.
#[derive(Debug, Clone, Default)]
pub struct RouteOrchStats {
    pub routes_added: u64,
    pub routes_removed: u64,
    /// SETs that replaced an existing route.
    pub routes_replaced: u64,
}

/// RouteOrch - unicast FIB of one virtual router.
#[derive(Debug)]
pub struct RouteOrch {
    vrid: VrId,
    resources: Arc<RouterResources>,
    stats: RouteOrchStats,
    routes: SyncMap<IpPrefix, UcRouteData>,
}

impl RouteOrch {
    pub fn new(vrid: VrId, resources: Arc<RouterResources>) -> Self {
        Self {
            vrid,
            resources,
            stats: RouteOrchStats::default(),
            routes: SyncMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn stats(&self) -> &RouteOrchStats {
        &self.stats
    }

    pub fn get_route(&self, prefix: &IpPrefix) -> Option<&UcRouteData> {
        self.routes.get(prefix)
    }

    fn not_found(&self, prefix: &IpPrefix) -> RouterError {
        RouterError::not_found(format!("route {} in {}", prefix, self.vrid))
    }

    /// Inserts a new route; the prefix must not be present.
    pub fn add_route(
        &mut self,
        intfs: &mut IntfsOrch,
        prefix: IpPrefix,
        data: UcRouteData,
    ) -> RouterResult<()> {
        data.validate(&prefix, self.resources.max_ecmp_paths)?;
        if self.routes.contains_key(&prefix) {
            return Err(RouterError::already_exists(format!(
                "route {} in {}",
                prefix, self.vrid
            )));
        }
        self.insert_new(intfs, prefix, data)
    }

    /// Creates the route or replaces its action and entire next-hop list.
    ///
    /// Returns true if the route was created.
    pub fn set_route(
        &mut self,
        intfs: &mut IntfsOrch,
        prefix: IpPrefix,
        data: UcRouteData,
    ) -> RouterResult<bool> {
        data.validate(&prefix, self.resources.max_ecmp_paths)?;
        let old_rifs = match self.routes.get(&prefix) {
            Some(old) => old.rifs(),
            None => {
                self.insert_new(intfs, prefix, data)?;
                return Ok(true);
            }
        };

        // New references first so a missing rif leaves the old route intact.
        intfs.acquire_refs(&data.rifs())?;
        intfs.release_refs(&old_rifs);

        debug!(
            "Replaced route {} in {}: {} with {} next hops",
            prefix,
            self.vrid,
            data.action,
            data.next_hops.len()
        );
        self.routes.insert(prefix, data);
        self.stats.routes_replaced += 1;
        Ok(false)
    }

    fn insert_new(
        &mut self,
        intfs: &mut IntfsOrch,
        prefix: IpPrefix,
        data: UcRouteData,
    ) -> RouterResult<()> {
        let rifs = data.rifs();
        intfs.acquire_refs(&rifs)?;
        if let Err(e) = acquire(&self.resources.uc_routes, 1) {
            intfs.release_refs(&rifs);
            return Err(e);
        }

        debug!(
            "Added route {} in {}: {} with {} next hops",
            prefix,
            self.vrid,
            data.action,
            data.next_hops.len()
        );
        self.routes.insert(prefix, data);
        self.stats.routes_added += 1;
        Ok(())
    }

    pub fn remove_route(
        &mut self,
        intfs: &mut IntfsOrch,
        prefix: &IpPrefix,
    ) -> RouterResult<UcRouteData> {
        let data = self
            .routes
            .remove(prefix)
            .ok_or_else(|| self.not_found(prefix))?;

        intfs.release_refs(&data.rifs());
        self.resources.uc_routes.release(1);
        self.stats.routes_removed += 1;

        debug!("Removed route {} from {}", prefix, self.vrid);
        Ok(data)
    }

    /// Removes every route of the router and returns their prefixes.
    pub fn remove_all(&mut self, intfs: &mut IntfsOrch) -> Vec<IpPrefix> {
        let removed: Vec<IpPrefix> = self.routes.keys().copied().collect();
        for data in self.routes.values() {
            intfs.release_refs(&data.rifs());
        }
        self.routes.clear();
        self.resources.uc_routes.release(removed.len() as u32);
        self.stats.routes_removed += removed.len() as u64;

        info!("Removed all {} routes from {}", removed.len(), self.vrid);
        removed
    }

    /// Runs GET, GET_FIRST or GET_NEXT. GET_ACTIVITY is unsupported.
    pub fn query(&self, query: &Query<IpPrefix>) -> RouterResult<Vec<UcRouteEntry>> {
        Ok(run_query(&self.routes, query, "uc_route_get")?
            .into_iter()
            .map(|(prefix, data)| UcRouteEntry { prefix, data })
            .collect())
    }

    /// Longest-prefix match of `addr`.
    pub fn lookup(&self, addr: &IpAddress) -> Option<UcRouteEntry> {
        let max_len = addr.family().max_prefix_len();
        (0..=max_len).rev().find_map(|len| {
            let prefix = IpPrefix::covering(*addr, len).ok()?;
            self.routes.get(&prefix).map(|data| UcRouteEntry {
                prefix,
                data: data.clone(),
            })
        })
    }

    /// Next hops of a route whose gateway has no neighbor entry yet.
    ///
    /// Attached next hops are never reported.
    pub fn unresolved(&self, prefix: &IpPrefix, neigh: &NeighOrch) -> RouterResult<Vec<NextHop>> {
        let data = self.routes.get(prefix).ok_or_else(|| self.not_found(prefix))?;
        Ok(data
            .next_hops
            .iter()
            .filter(|nh| !nh.is_attached() && !neigh.contains(&nh.ip))
            .copied()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RouterConfig;
    use crate::intfs::{RifAttributes, RifBinding};
    use crate::neigh::NeighborData;
    use crate::types::ForwardAction;
    use l3_sdk::{RifId, Status};
    use l3_types::{IpFamily, PortId};
    use pretty_assertions::assert_eq;

    struct Fixture {
        intfs: IntfsOrch,
        neigh: NeighOrch,
        routes: RouteOrch,
        rifs: Vec<RifId>,
    }

    fn fixture_with(config: RouterConfig) -> Fixture {
        let resources = Arc::new(RouterResources::new(&config));
        let vrid = VrId::new(0);
        let mut intfs = IntfsOrch::new(vrid, Arc::clone(&resources));
        let rifs = (1..=3)
            .map(|port| {
                intfs
                    .add_rif(
                        RifBinding::Port(PortId::new(port).unwrap()),
                        RifAttributes::new("00:11:22:33:44:55".parse().unwrap(), 1500),
                    )
                    .unwrap()
            })
            .collect();
        Fixture {
            intfs,
            neigh: NeighOrch::new(vrid, Arc::clone(&resources)),
            routes: RouteOrch::new(vrid, resources),
            rifs,
        }
    }

    fn fixture() -> Fixture {
        fixture_with(RouterConfig::default())
    }

    fn prefix(s: &str) -> IpPrefix {
        s.parse().unwrap()
    }

    fn nh(ip: &str, rif: RifId) -> NextHop {
        NextHop::new(ip.parse().unwrap(), rif)
    }

    #[test]
    fn test_add_and_duplicate() {
        let mut f = fixture();
        let data = UcRouteData::forward(vec![nh("10.0.0.1", f.rifs[0])]);
        f.routes
            .add_route(&mut f.intfs, prefix("192.168.0.0/16"), data.clone())
            .unwrap();
        assert_eq!(f.routes.get_route(&prefix("192.168.0.0/16")), Some(&data));
        assert_eq!(f.intfs.ref_count(f.rifs[0]), Some(1));

        let err = f
            .routes
            .add_route(&mut f.intfs, prefix("192.168.0.0/16"), data)
            .unwrap_err();
        assert_eq!(err.status(), Status::EntryAlreadyExists);
        assert_eq!(f.intfs.ref_count(f.rifs[0]), Some(1));
    }

    #[test]
    fn test_set_replaces_next_hops() {
        let mut f = fixture();
        let (a, b, c) = (f.rifs[0], f.rifs[1], f.rifs[2]);
        let p = prefix("10.10.0.0/16");

        let created = f
            .routes
            .set_route(
                &mut f.intfs,
                p,
                UcRouteData::forward(vec![nh("10.0.0.1", a), nh("10.0.0.2", b)]),
            )
            .unwrap();
        assert!(created);

        let replacement = UcRouteData::forward(vec![nh("10.0.0.3", c)]);
        let created = f.routes.set_route(&mut f.intfs, p, replacement.clone()).unwrap();
        assert!(!created);
        assert_eq!(f.routes.get_route(&p), Some(&replacement));
        assert_eq!(f.intfs.ref_count(a), Some(0));
        assert_eq!(f.intfs.ref_count(b), Some(0));
        assert_eq!(f.intfs.ref_count(c), Some(1));
        assert_eq!(f.routes.stats().routes_replaced, 1);
    }

    #[test]
    fn test_failed_set_keeps_old_route() {
        let mut f = fixture();
        let p = prefix("10.10.0.0/16");
        let old = UcRouteData::forward(vec![nh("10.0.0.1", f.rifs[0])]);
        f.routes.set_route(&mut f.intfs, p, old.clone()).unwrap();

        let bad = UcRouteData::forward(vec![nh("10.0.0.9", RifId::new(500))]);
        let err = f.routes.set_route(&mut f.intfs, p, bad).unwrap_err();
        assert_eq!(err.status(), Status::EntryNotFound);
        assert_eq!(f.routes.get_route(&p), Some(&old));
        assert_eq!(f.intfs.ref_count(f.rifs[0]), Some(1));
    }

    #[test]
    fn test_capacity() {
        let mut f = fixture_with(RouterConfig {
            max_uc_routes: 1,
            ..Default::default()
        });
        let data = UcRouteData::forward(vec![nh("10.0.0.1", f.rifs[0])]);
        f.routes.add_route(&mut f.intfs, prefix("10.1.0.0/16"), data.clone()).unwrap();
        let err = f
            .routes
            .set_route(&mut f.intfs, prefix("10.2.0.0/16"), data)
            .unwrap_err();
        assert_eq!(err.status(), Status::NoResources);
        assert_eq!(f.routes.len(), 1);
        assert_eq!(f.intfs.ref_count(f.rifs[0]), Some(1));
    }

    #[test]
    fn test_remove_releases_references() {
        let mut f = fixture();
        let a = f.rifs[0];
        for p in ["10.1.0.0/16", "10.2.0.0/16"] {
            f.routes
                .add_route(&mut f.intfs, prefix(p), UcRouteData::forward(vec![nh("10.0.0.1", a)]))
                .unwrap();
        }
        assert_eq!(f.intfs.ref_count(a), Some(2));

        f.routes.remove_route(&mut f.intfs, &prefix("10.1.0.0/16")).unwrap();
        assert_eq!(f.intfs.ref_count(a), Some(1));
        let err = f
            .routes
            .remove_route(&mut f.intfs, &prefix("10.1.0.0/16"))
            .unwrap_err();
        assert!(err.is_not_found());

        assert_eq!(f.routes.remove_all(&mut f.intfs), vec![prefix("10.2.0.0/16")]);
        assert_eq!(f.intfs.ref_count(a), Some(0));
    }

    #[test]
    fn test_longest_prefix_match() {
        let mut f = fixture();
        let a = f.rifs[0];
        for (p, gw) in [
            ("0.0.0.0/0", "10.0.0.1"),
            ("10.0.0.0/8", "10.0.0.2"),
            ("10.1.0.0/16", "10.0.0.3"),
            ("10.1.2.0/24", "10.0.0.4"),
        ] {
            f.routes
                .add_route(&mut f.intfs, prefix(p), UcRouteData::forward(vec![nh(gw, a)]))
                .unwrap();
        }

        let hit = |addr: &str| f.routes.lookup(&addr.parse().unwrap()).map(|e| e.prefix);
        assert_eq!(hit("10.1.2.3"), Some(prefix("10.1.2.0/24")));
        assert_eq!(hit("10.1.3.3"), Some(prefix("10.1.0.0/16")));
        assert_eq!(hit("10.200.0.1"), Some(prefix("10.0.0.0/8")));
        assert_eq!(hit("172.16.0.1"), Some(prefix("0.0.0.0/0")));
        assert_eq!(hit("2001:db8::1"), None);
    }

    #[test]
    fn test_unresolved_next_hops() {
        let mut f = fixture();
        let a = f.rifs[0];
        let p = prefix("10.1.0.0/16");
        f.routes
            .add_route(
                &mut f.intfs,
                p,
                UcRouteData::new(
                    ForwardAction::Trap,
                    vec![
                        nh("10.0.0.1", a),
                        nh("10.0.0.2", a),
                        NextHop::attached(IpFamily::V4, a),
                    ],
                ),
            )
            .unwrap();
        f.neigh
            .add_neighbor(
                &mut f.intfs,
                "10.0.0.1".parse().unwrap(),
                NeighborData::new(
                    a,
                    "00:aa:bb:cc:dd:ee".parse().unwrap(),
                    ForwardAction::Forward,
                ),
            )
            .unwrap();

        assert_eq!(
            f.routes.unresolved(&p, &f.neigh).unwrap(),
            vec![nh("10.0.0.2", a)]
        );
    }

    #[test]
    fn test_query_pages() {
        let mut f = fixture();
        let a = f.rifs[0];
        for p in ["10.3.0.0/16", "10.1.0.0/16", "10.0.0.0/8", "10.1.0.0/24"] {
            f.routes
                .add_route(&mut f.intfs, prefix(p), UcRouteData::forward(vec![nh("10.0.0.1", a)]))
                .unwrap();
        }

        let first = f.routes.query(&Query::GetFirst { count: 2 }).unwrap();
        let keys: Vec<_> = first.iter().map(|e| e.prefix).collect();
        assert_eq!(keys, vec![prefix("10.0.0.0/8"), prefix("10.1.0.0/16")]);

        let next = f
            .routes
            .query(&Query::GetNext {
                after: prefix("10.1.0.0/16"),
                count: 5,
            })
            .unwrap();
        let keys: Vec<_> = next.iter().map(|e| e.prefix).collect();
        assert_eq!(keys, vec![prefix("10.1.0.0/24"), prefix("10.3.0.0/16")]);

        let err = f
            .routes
            .query(&Query::GetActivity(prefix("10.0.0.0/8")))
            .unwrap_err();
        assert_eq!(err.status(), Status::CmdUnsupported);
    }
}
