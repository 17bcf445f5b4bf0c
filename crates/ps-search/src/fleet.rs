//! Live search vehicles, keyed by `VehicleId` and iterated in creation order.

use std::collections::BTreeMap;

use ps_core::VehicleId;

use crate::{SearchError, SearchResult, SearchVehicle};

#[cfg(feature = "fx-hash")]
type IdMap = rustc_hash::FxHashMap<VehicleId, u64>;
#[cfg(not(feature = "fx-hash"))]
type IdMap = std::collections::HashMap<VehicleId, u64>;

/// Id-indexed vehicle collection.
///
/// Vehicles are stored under a monotonically increasing creation sequence
/// number, so iteration follows creation order regardless of id values.
/// Lookup and removal by id go through a hash index.
#[derive(Debug, Default)]
pub struct VehicleFleet {
    by_seq:   BTreeMap<u64, SearchVehicle>,
    index:    IdMap,
    next_seq: u64,
}

impl VehicleFleet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a vehicle.  Two live vehicles never share an id.
    pub fn insert(&mut self, vehicle: SearchVehicle) -> SearchResult<()> {
        let id = vehicle.id();
        if self.index.contains_key(&id) {
            return Err(SearchError::DuplicateVehicle(id));
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        self.index.insert(id, seq);
        self.by_seq.insert(seq, vehicle);
        Ok(())
    }

    pub fn contains(&self, id: VehicleId) -> bool {
        self.index.contains_key(&id)
    }

    pub fn get(&self, id: VehicleId) -> Option<&SearchVehicle> {
        self.index.get(&id).and_then(|seq| self.by_seq.get(seq))
    }

    pub fn get_mut(&mut self, id: VehicleId) -> Option<&mut SearchVehicle> {
        let seq = self.index.get(&id)?;
        self.by_seq.get_mut(seq)
    }

    pub fn remove(&mut self, id: VehicleId) -> Option<SearchVehicle> {
        let seq = self.index.remove(&id)?;
        self.by_seq.remove(&seq)
    }

    /// Vehicles in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &SearchVehicle> + '_ {
        self.by_seq.values()
    }

    /// Ids in creation order.
    pub fn ids(&self) -> Vec<VehicleId> {
        self.by_seq.values().map(SearchVehicle::id).collect()
    }

    pub fn len(&self) -> usize {
        self.by_seq.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_seq.is_empty()
    }

    /// Vehicles whose search has not finished.
    pub fn searching_count(&self) -> usize {
        self.by_seq.values().filter(|v| v.is_searching()).count()
    }
}
