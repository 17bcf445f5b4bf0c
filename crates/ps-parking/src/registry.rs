//! The parking-space registry.
//!
//! # Layout
//!
//! Spaces are created edge by edge in `EdgeId` order and, within an edge, in
//! ascending offset.  The spaces of one edge are therefore a contiguous run
//! of the `spaces` vector, indexed with a CSR row pointer:
//!
//! ```text
//! spaces[ edge_start[e] .. edge_start[e+1] ]
//! ```
//!
//! and a `SpaceId` is simply the position in `spaces`.

use log::info;
use rand::seq::index;

use ps_core::{EdgeId, ScanParams, SimRng, SpaceId, VehicleId};
use ps_spatial::RoadGraph;

use crate::{ParkingError, ParkingResult};

// ── ParkingSpace ──────────────────────────────────────────────────────────────

/// One parking-capable position on an edge.
#[derive(Debug, Clone, PartialEq)]
pub struct ParkingSpace {
    id:        SpaceId,
    edge:      EdgeId,
    offset:    f64,
    available: bool,
    assigned:  Option<VehicleId>,
}

impl ParkingSpace {
    pub fn id(&self) -> SpaceId {
        self.id
    }

    pub fn edge(&self) -> EdgeId {
        self.edge
    }

    /// Distance from the start of the edge, in metres.
    pub fn offset(&self) -> f64 {
        self.offset
    }

    pub fn is_available(&self) -> bool {
        self.available
    }

    /// The vehicle that claimed this space, if any.
    pub fn assigned(&self) -> Option<VehicleId> {
        self.assigned
    }
}

// ── ParkingSpaceRegistry ──────────────────────────────────────────────────────

/// Every parking space of the network with its availability and assignment.
///
/// Invariant: a space with an assigned vehicle is never available.
#[derive(Debug, Clone)]
pub struct ParkingSpaceRegistry {
    spaces:     Vec<ParkingSpace>,
    /// CSR row pointer, length `edge_count + 1`.
    edge_start: Vec<u32>,
    available:  usize,
}

impl ParkingSpaceRegistry {
    /// Lay out spaces along every edge of `graph`.
    pub fn scan(graph: &RoadGraph, params: &ScanParams) -> ParkingResult<Self> {
        Self::scan_lengths(graph.edge_lengths(), params)
    }

    /// Lay out spaces from explicit edge lengths (indexed by `EdgeId`).
    ///
    /// For every edge strictly longer than `min_edge_length`, spaces sit at
    /// `start_offset + k * spacing` for as long as the offset stays below
    /// `length - end_margin`.  All spaces start unavailable.
    pub fn scan_lengths(lengths: &[f64], params: &ScanParams) -> ParkingResult<Self> {
        params.validate()?;

        let mut spaces = Vec::new();
        let mut edge_start = Vec::with_capacity(lengths.len() + 1);

        for (i, &length) in lengths.iter().enumerate() {
            edge_start.push(spaces.len() as u32);
            if length <= params.min_edge_length {
                continue;
            }
            let limit = length - params.end_margin;
            // Offsets are computed from the index, not accumulated, so long
            // edges do not drift.
            let mut k = 0u32;
            loop {
                let offset = params.start_offset + f64::from(k) * params.spacing;
                if offset >= limit {
                    break;
                }
                spaces.push(ParkingSpace {
                    id:        SpaceId(spaces.len() as u32),
                    edge:      EdgeId(i as u32),
                    offset,
                    available: false,
                    assigned:  None,
                });
                k += 1;
            }
        }
        edge_start.push(spaces.len() as u32);

        Ok(Self { spaces, edge_start, available: 0 })
    }

    // ── Queries ───────────────────────────────────────────────────────────

    /// Total number of spaces created by the scan.
    pub fn len(&self) -> usize {
        self.spaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spaces.is_empty()
    }

    /// Number of spaces currently available.
    pub fn available_count(&self) -> usize {
        self.available
    }

    pub fn get(&self, space: SpaceId) -> Option<&ParkingSpace> {
        self.spaces.get(space.index())
    }

    /// All spaces in creation order.
    pub fn iter(&self) -> std::slice::Iter<'_, ParkingSpace> {
        self.spaces.iter()
    }

    /// Spaces on `edge` in ascending offset.  Unknown edges have none.
    ///
    /// The iterator is `Clone`, so a caller can walk it more than once.
    pub fn spaces_on(&self, edge: EdgeId) -> std::slice::Iter<'_, ParkingSpace> {
        match (self.edge_start.get(edge.index()), self.edge_start.get(edge.index() + 1)) {
            (Some(&start), Some(&end)) => self.spaces[start as usize..end as usize].iter(),
            _ => [].iter(),
        }
    }

    // ── Mutation ──────────────────────────────────────────────────────────

    /// Mark `count` distinct, uniformly chosen spaces available.
    ///
    /// Only spaces that are neither available nor claimed are candidates.
    /// Asking for more than that is a configuration error, reported rather
    /// than truncated.
    pub fn mark_available(&mut self, count: usize, rng: &mut SimRng) -> ParkingResult<Vec<SpaceId>> {
        let candidates: Vec<usize> = self
            .spaces
            .iter()
            .enumerate()
            .filter(|(_, s)| !s.available && s.assigned.is_none())
            .map(|(i, _)| i)
            .collect();

        if count > candidates.len() {
            return Err(ParkingError::InsufficientCapacity {
                requested: count,
                capacity:  candidates.len(),
            });
        }

        let picked: Vec<SpaceId> = index::sample(rng.inner(), candidates.len(), count)
            .into_iter()
            .map(|i| {
                let space = &mut self.spaces[candidates[i]];
                space.available = true;
                space.id
            })
            .collect();
        self.available += picked.len();

        info!(
            "marked {} of {} parking spaces available",
            picked.len(),
            self.spaces.len()
        );
        Ok(picked)
    }

    /// Mark one specific space available.  Already-available spaces are left
    /// alone; a claimed space cannot be freed.
    pub fn make_available(&mut self, space: SpaceId) -> ParkingResult<()> {
        let entry = self
            .spaces
            .get_mut(space.index())
            .ok_or(ParkingError::UnknownSpace(space))?;
        if entry.assigned.is_some() {
            return Err(ParkingError::AlreadyClaimed { space, holder: entry.assigned });
        }
        if !entry.available {
            entry.available = true;
            self.available += 1;
        }
        Ok(())
    }

    /// Hand an available space to `vehicle`.  The space stays unavailable for
    /// the rest of the run.
    pub fn claim(&mut self, space: SpaceId, vehicle: VehicleId) -> ParkingResult<()> {
        let entry = self
            .spaces
            .get_mut(space.index())
            .ok_or(ParkingError::UnknownSpace(space))?;
        if !entry.available {
            return Err(ParkingError::AlreadyClaimed { space, holder: entry.assigned });
        }
        entry.available = false;
        entry.assigned = Some(vehicle);
        self.available -= 1;
        Ok(())
    }
}
