//! IntfsOrch implementation.
//!
//! One `IntfsOrch` holds the router interfaces of one virtual router. The
//! other tables of the router borrow it mutably to check that the rifs they
//! reference exist and to take references on them.

use log::{debug, info, warn};
use l3_orch_common::{BufferFill, SyncMap};
use l3_sdk::{RifId, RouterError, RouterResult, VrId};
use l3_types::MacAddress;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use super::types::{
    MacListOp, RifAdminState, RifAttributes, RifBinding, RifEntry, RouterInterface,
};
use crate::counter::RifCounter;
use crate::resources::{acquire, RouterResources};

/// Statistics for IntfsOrch operations.
#[derive(Debug, Clone, Default)]
pub struct IntfsOrchStats {
    pub rifs_created: u64,
    pub rifs_removed: u64,
    pub rifs_updated: u64,
    pub macs_added: u64,
    pub macs_removed: u64,
    pub counters_allocated: u64,
    pub counters_released: u64,
}

/// Router interface table of one virtual router.
#[derive(Debug)]
pub struct IntfsOrch {
    vrid: VrId,
    resources: Arc<RouterResources>,
    stats: IntfsOrchStats,
    rifs: SyncMap<RifId, RifEntry>,
    /// Reverse lookup: binding -> rif. A binding carries one rif per router.
    bindings: HashMap<RifBinding, RifId>,
}

impl IntfsOrch {
    pub fn new(vrid: VrId, resources: Arc<RouterResources>) -> Self {
        Self {
            vrid,
            resources,
            stats: IntfsOrchStats::default(),
            rifs: SyncMap::new(),
            bindings: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.rifs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rifs.is_empty()
    }

    pub fn contains(&self, rif: RifId) -> bool {
        self.rifs.contains_key(&rif)
    }

    pub fn stats(&self) -> &IntfsOrchStats {
        &self.stats
    }

    fn entry(&self, rif: RifId) -> RouterResult<&RifEntry> {
        self.rifs
            .get(&rif)
            .ok_or_else(|| RouterError::not_found(format!("{} in {}", rif, self.vrid)))
    }

    fn entry_mut(&mut self, rif: RifId) -> RouterResult<&mut RifEntry> {
        let vrid = self.vrid;
        self.rifs
            .get_mut(&rif)
            .ok_or_else(|| RouterError::not_found(format!("{} in {}", rif, vrid)))
    }

    /// Creates a router interface and returns its allocated ID.
    pub fn add_rif(&mut self, binding: RifBinding, attrs: RifAttributes) -> RouterResult<RifId> {
        attrs.validate()?;
        if let Some(existing) = self.bindings.get(&binding) {
            return Err(RouterError::already_exists(format!(
                "{} already bound to {} in {}",
                binding, existing, self.vrid
            )));
        }

        let rif = self.resources.allocate_rif()?;
        self.rifs.insert(rif, RifEntry::new(binding, attrs));
        self.bindings.insert(binding, rif);
        self.stats.rifs_created += 1;

        info!("Created {} on {} in {}", rif, binding, self.vrid);
        Ok(rif)
    }

    /// Replaces the attributes of a router interface.
    pub fn edit_rif(
        &mut self,
        rif: RifId,
        binding: Option<RifBinding>,
        attrs: RifAttributes,
    ) -> RouterResult<()> {
        attrs.validate()?;
        let entry = self.entry_mut(rif)?;
        if let Some(binding) = binding {
            if binding != entry.binding {
                return Err(RouterError::invalid_parameter(format!(
                    "{} is bound to {}, cannot rebind to {}",
                    rif, entry.binding, binding
                )));
            }
        }
        entry.attrs = attrs;
        self.stats.rifs_updated += 1;

        debug!("Updated attributes of {} in {}", rif, self.vrid);
        Ok(())
    }

    /// Removes a router interface that nothing references.
    pub fn remove_rif(&mut self, rif: RifId) -> RouterResult<()> {
        let entry = self.entry(rif)?;
        if entry.is_in_use() {
            return Err(RouterError::in_use(format!(
                "{} (ref_count={}, counter={})",
                rif,
                entry.ref_count,
                entry.counter.is_some()
            )));
        }

        if let Some(entry) = self.rifs.remove(&rif) {
            self.bindings.remove(&entry.binding);
        }
        self.resources.release_rif(rif);
        self.stats.rifs_removed += 1;

        info!("Removed {} from {}", rif, self.vrid);
        Ok(())
    }

    /// Removes every router interface of the router.
    ///
    /// Fails without removing anything if any interface is still in use.
    pub fn remove_all(&mut self) -> RouterResult<Vec<RifId>> {
        if let Some((rif, entry)) = self.rifs.iter().find(|(_, e)| e.is_in_use()) {
            return Err(RouterError::in_use(format!(
                "{} (ref_count={}, counter={})",
                rif,
                entry.ref_count,
                entry.counter.is_some()
            )));
        }

        let removed: Vec<RifId> = self.rifs.keys().copied().collect();
        for rif in &removed {
            self.resources.release_rif(*rif);
        }
        self.rifs.clear();
        self.bindings.clear();
        self.stats.rifs_removed += removed.len() as u64;

        info!("Removed all {} interfaces from {}", removed.len(), self.vrid);
        Ok(removed)
    }

    pub fn get_rif(&self, rif: RifId) -> RouterResult<RouterInterface> {
        let entry = self.entry(rif)?;
        Ok(RouterInterface {
            rif,
            binding: entry.binding,
            attrs: entry.attrs.clone(),
            counter_enabled: entry.counter.is_some(),
        })
    }

    /// Returns the IDs of all interfaces in ascending order.
    pub fn rif_ids(&self) -> Vec<RifId> {
        self.rifs.keys().copied().collect()
    }

    pub fn set_admin_state(&mut self, rif: RifId, state: RifAdminState) -> RouterResult<()> {
        let entry = self.entry_mut(rif)?;
        entry.admin = state;
        debug!("Set admin state of {} to {:?}", rif, state);
        Ok(())
    }

    pub fn admin_state(&self, rif: RifId) -> RouterResult<RifAdminState> {
        Ok(self.entry(rif)?.admin)
    }

    /// Applies a change to the additional MAC list of an interface.
    ///
    /// The whole list is validated first; an invalid, duplicate, missing or
    /// already-present MAC fails the call without changing the list.
    pub fn apply_mac_op(&mut self, rif: RifId, op: MacListOp) -> RouterResult<()> {
        let max_macs = self.resources.max_macs_per_rif;
        let entry = self.entry_mut(rif)?;

        let (added, removed) = match op {
            MacListOp::Add(macs) => {
                let mut seen = BTreeSet::new();
                for mac in &macs {
                    if !mac.is_valid_station() {
                        return Err(RouterError::invalid_parameter(format!(
                            "{} is not a unicast station address",
                            mac
                        )));
                    }
                    if !seen.insert(*mac) {
                        return Err(RouterError::invalid_parameter(format!(
                            "{} listed twice",
                            mac
                        )));
                    }
                    if entry.macs.contains(mac) {
                        return Err(RouterError::already_exists(format!("{} on {}", mac, rif)));
                    }
                }
                if entry.macs.len() + macs.len() > max_macs {
                    return Err(RouterError::no_resources(format!(
                        "MAC list of {} ({} of {} used)",
                        rif,
                        entry.macs.len(),
                        max_macs
                    )));
                }
                let added = macs.len();
                entry.macs.extend(macs);
                (added, 0)
            }
            MacListOp::Delete(macs) => {
                if let Some(missing) = macs.iter().find(|m| !entry.macs.contains(m)) {
                    return Err(RouterError::not_found(format!("{} on {}", missing, rif)));
                }
                let before = entry.macs.len();
                entry.macs.retain(|m| !macs.contains(m));
                (0, before - entry.macs.len())
            }
            MacListOp::DeleteAll => {
                let removed = entry.macs.len();
                entry.macs.clear();
                (0, removed)
            }
        };
        self.stats.macs_added += added as u64;
        self.stats.macs_removed += removed as u64;
        Ok(())
    }

    /// Copies up to `capacity` MACs of an interface, in insertion order.
    pub fn mac_list(&self, rif: RifId, capacity: usize) -> RouterResult<BufferFill<MacAddress>> {
        Ok(BufferFill::fill(&self.entry(rif)?.macs, capacity))
    }

    /// Returns true if `mac` is the interface MAC or in its MAC list.
    pub fn terminates_mac(&self, rif: RifId, mac: &MacAddress) -> RouterResult<bool> {
        let entry = self.entry(rif)?;
        Ok(entry.attrs.mac == *mac || entry.macs.contains(mac))
    }

    /// Takes one reference on each listed interface.
    ///
    /// Every rif is checked before any count changes.
    pub fn acquire_refs(&mut self, rifs: &[RifId]) -> RouterResult<()> {
        if let Some(missing) = rifs.iter().find(|rif| !self.contains(**rif)) {
            return Err(RouterError::not_found(format!("{} in {}", missing, self.vrid)));
        }
        for rif in rifs {
            self.rifs
                .increment_ref(rif)
                .map_err(|e| RouterError::internal(format!("{}: {}", rif, e)))?;
        }
        Ok(())
    }

    /// Drops one reference on each listed interface.
    pub fn release_refs(&mut self, rifs: &[RifId]) {
        for rif in rifs {
            if let Err(e) = self.rifs.decrement_ref(rif) {
                warn!("Failed to release reference on {} in {}: {}", rif, self.vrid, e);
            }
        }
    }

    pub fn ref_count(&self, rif: RifId) -> Option<u32> {
        self.rifs.ref_count(&rif)
    }

    /// Allocates the counter of an interface.
    pub fn enable_counter(&mut self, rif: RifId) -> RouterResult<()> {
        let resources = Arc::clone(&self.resources);
        let entry = self.entry_mut(rif)?;
        if entry.counter.is_some() {
            return Err(RouterError::already_exists(format!("counter of {}", rif)));
        }
        acquire(&resources.counters, 1)?;
        entry.counter = Some(Arc::new(RifCounter::new()));
        self.stats.counters_allocated += 1;

        debug!("Allocated counter for {} in {}", rif, self.vrid);
        Ok(())
    }

    /// Releases the counter of an interface. Its values are discarded.
    pub fn disable_counter(&mut self, rif: RifId) -> RouterResult<()> {
        let resources = Arc::clone(&self.resources);
        let entry = self.entry_mut(rif)?;
        if entry.counter.take().is_none() {
            return Err(RouterError::not_found(format!("counter of {}", rif)));
        }
        resources.counters.release(1);
        self.stats.counters_released += 1;

        debug!("Released counter for {} in {}", rif, self.vrid);
        Ok(())
    }

    /// Returns the counter of an interface, `None` if none is allocated.
    pub fn counter(&self, rif: RifId) -> RouterResult<Option<Arc<RifCounter>>> {
        Ok(self.entry(rif)?.counter.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RouterConfig;
    use l3_sdk::Status;
    use l3_types::{AdminState, PortId, VlanId};
    use pretty_assertions::assert_eq;

    fn orch_with(config: RouterConfig) -> IntfsOrch {
        IntfsOrch::new(VrId::new(0), Arc::new(RouterResources::new(&config)))
    }

    fn orch() -> IntfsOrch {
        orch_with(RouterConfig::default())
    }

    fn mac(last: u8) -> MacAddress {
        MacAddress::new([0x00, 0x11, 0x22, 0x33, 0x44, last])
    }

    fn vlan(id: u16) -> RifBinding {
        RifBinding::Vlan(VlanId::new(id).unwrap())
    }

    fn attrs() -> RifAttributes {
        RifAttributes::new(mac(1), 1500)
    }

    #[test]
    fn test_add_and_get() {
        let mut orch = orch();
        let rif = orch.add_rif(vlan(10), attrs()).unwrap();
        assert_eq!(rif, RifId::new(0));

        let got = orch.get_rif(rif).unwrap();
        assert_eq!(got.binding, vlan(10));
        assert_eq!(got.attrs, attrs());
        assert!(!got.counter_enabled);
        assert_eq!(orch.stats().rifs_created, 1);
    }

    #[test]
    fn test_binding_carries_one_rif() {
        let mut orch = orch();
        orch.add_rif(vlan(10), attrs()).unwrap();
        let err = orch.add_rif(vlan(10), attrs()).unwrap_err();
        assert_eq!(err.status(), Status::EntryAlreadyExists);

        let port = RifBinding::Port(PortId::new(1).unwrap());
        assert!(orch.add_rif(port, attrs()).is_ok());
    }

    #[test]
    fn test_invalid_attributes_allocate_nothing() {
        let mut orch = orch();
        let err = orch
            .add_rif(vlan(10), RifAttributes::new(mac(1), 20))
            .unwrap_err();
        assert_eq!(err.status(), Status::ParamExceedsRange);
        assert!(orch.is_empty());
        assert_eq!(orch.add_rif(vlan(10), attrs()).unwrap(), RifId::new(0));
    }

    #[test]
    fn test_rif_pool_exhaustion() {
        let mut orch = orch_with(RouterConfig {
            max_rifs: 1,
            ..Default::default()
        });
        orch.add_rif(vlan(10), attrs()).unwrap();
        let err = orch.add_rif(vlan(20), attrs()).unwrap_err();
        assert_eq!(err.status(), Status::NoResources);
        assert_eq!(orch.len(), 1);
    }

    #[test]
    fn test_edit_cannot_rebind() {
        let mut orch = orch();
        let rif = orch.add_rif(vlan(10), attrs()).unwrap();

        let new_attrs = RifAttributes::new(mac(2), 9000);
        orch.edit_rif(rif, Some(vlan(10)), new_attrs.clone()).unwrap();
        assert_eq!(orch.get_rif(rif).unwrap().attrs, new_attrs);

        let err = orch.edit_rif(rif, Some(vlan(11)), attrs()).unwrap_err();
        assert_eq!(err.status(), Status::ParamError);
    }

    #[test]
    fn test_referenced_rif_cannot_be_removed() {
        let mut orch = orch();
        let rif = orch.add_rif(vlan(10), attrs()).unwrap();
        orch.acquire_refs(&[rif]).unwrap();

        assert_eq!(orch.remove_rif(rif).unwrap_err().status(), Status::ResourceInUse);
        assert_eq!(orch.remove_all().unwrap_err().status(), Status::ResourceInUse);

        orch.release_refs(&[rif]);
        orch.remove_rif(rif).unwrap();
        assert!(orch.is_empty());
    }

    #[test]
    fn test_acquire_refs_is_all_or_nothing() {
        let mut orch = orch();
        let rif = orch.add_rif(vlan(10), attrs()).unwrap();
        let err = orch.acquire_refs(&[rif, RifId::new(77)]).unwrap_err();
        assert_eq!(err.status(), Status::EntryNotFound);
        assert_eq!(orch.ref_count(rif), Some(0));
    }

    #[test]
    fn test_counter_blocks_removal() {
        let mut orch = orch();
        let rif = orch.add_rif(vlan(10), attrs()).unwrap();
        orch.enable_counter(rif).unwrap();
        assert_eq!(
            orch.enable_counter(rif).unwrap_err().status(),
            Status::EntryAlreadyExists
        );
        assert_eq!(orch.remove_rif(rif).unwrap_err().status(), Status::ResourceInUse);

        orch.disable_counter(rif).unwrap();
        assert_eq!(orch.disable_counter(rif).unwrap_err().status(), Status::EntryNotFound);
        orch.remove_rif(rif).unwrap();
    }

    #[test]
    fn test_mac_list() {
        let mut orch = orch();
        let rif = orch.add_rif(vlan(10), attrs()).unwrap();

        orch.apply_mac_op(rif, MacListOp::Add(vec![mac(2), mac(3), mac(4)]))
            .unwrap();
        let err = orch
            .apply_mac_op(rif, MacListOp::Add(vec![mac(5), mac(3)]))
            .unwrap_err();
        assert_eq!(err.status(), Status::EntryAlreadyExists);
        assert_eq!(orch.mac_list(rif, 16).unwrap().total, 3);

        let fill = orch.mac_list(rif, 2).unwrap();
        assert_eq!(fill.items, vec![mac(2), mac(3)]);
        assert!(fill.is_truncated());

        orch.apply_mac_op(rif, MacListOp::Delete(vec![mac(3)])).unwrap();
        assert_eq!(orch.mac_list(rif, 16).unwrap().items, vec![mac(2), mac(4)]);
        assert!(orch.terminates_mac(rif, &mac(1)).unwrap());
        assert!(orch.terminates_mac(rif, &mac(4)).unwrap());

        orch.apply_mac_op(rif, MacListOp::DeleteAll).unwrap();
        assert_eq!(orch.mac_list(rif, 0).unwrap().total, 0);
    }

    #[test]
    fn test_mac_list_capacity() {
        let mut orch = orch_with(RouterConfig {
            max_macs_per_rif: 2,
            ..Default::default()
        });
        let rif = orch.add_rif(vlan(10), attrs()).unwrap();
        let err = orch
            .apply_mac_op(rif, MacListOp::Add(vec![mac(2), mac(3), mac(4)]))
            .unwrap_err();
        assert_eq!(err.status(), Status::NoResources);
        assert_eq!(orch.mac_list(rif, 0).unwrap().total, 0);
    }

    #[test]
    fn test_admin_state() {
        let mut orch = orch();
        let rif = orch.add_rif(vlan(10), attrs()).unwrap();
        assert_eq!(orch.admin_state(rif).unwrap(), RifAdminState::default());

        let down = RifAdminState::all(AdminState::Down);
        orch.set_admin_state(rif, down).unwrap();
        assert_eq!(orch.admin_state(rif).unwrap(), down);
    }
}
