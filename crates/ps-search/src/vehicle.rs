//! Per-vehicle search state machine.
//!
//! ```text
//! Created ──observe──▶ Searching ──space claimed──▶ Parked
//!    │                    │
//!    │                    ├──no continuation──▶ Failed(DeadEnd)
//!    │                    └──remove──────────▶ Removed
//!    └──no route──▶ Failed(Unreachable)
//! ```
//!
//! `Parked`, `Removed` and `Failed` are terminal.

use log::debug;
use ps_core::{EdgeId, SpaceId, Step, VehicleId, VehicleRng};
use ps_parking::ParkingSpaceRegistry;
use ps_spatial::{RoadGraph, SpatialError};

use crate::routes::PlannedRoutes;
use crate::{SearchError, SearchResult};

// ── Small types ───────────────────────────────────────────────────────────────

/// Which precomputed route a vehicle follows.  Fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Strategy {
    Individual,
    Cooperative,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchFailure {
    /// No route to the destination existed.
    Unreachable,
    /// The vehicle ran out of legal continuation edges.
    DeadEnd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchState {
    Created,
    Searching,
    Parked(SpaceId),
    Removed,
    Failed(SearchFailure),
}

impl SearchState {
    pub fn is_terminal(self) -> bool {
        !matches!(self, SearchState::Created | SearchState::Searching)
    }
}

/// Where the engine reports a vehicle: an edge and metres from its start.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgePosition {
    pub edge:   EdgeId,
    pub offset: f64,
}

impl EdgePosition {
    pub fn new(edge: EdgeId, offset: f64) -> Self {
        Self { edge, offset }
    }
}

/// A successful search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchOutcome {
    pub vehicle:  VehicleId,
    pub space:    SpaceId,
    pub strategy: Strategy,
    /// Step at which the space was claimed.
    pub step:     Step,
    /// Steps since departure.
    pub elapsed:  u64,
    /// Metres driven since departure, up to the space.
    pub distance: f64,
}

// ── SearchVehicle ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct SearchVehicle {
    id:          VehicleId,
    strategy:    Strategy,
    state:       SearchState,
    departure:   Step,
    route:       Vec<EdgeId>,
    /// Index into `route` of the edge the vehicle was last seen on.
    pointer:     usize,
    current:     Option<EdgeId>,
    /// Offset of the last report on `current`; spaces before it are done.
    last_offset: f64,
    /// Lengths of all completed edges.
    travelled:   f64,
    rng:         VehicleRng,
}

impl SearchVehicle {
    /// Create a vehicle and fix its strategy with one draw from `rng`.
    pub fn new(
        id:                VehicleId,
        departure:         Step,
        routes:            &PlannedRoutes,
        cooperation_ratio: f64,
        mut rng:           VehicleRng,
    ) -> Self {
        let strategy = if rng.unit() < cooperation_ratio {
            Strategy::Cooperative
        } else {
            Strategy::Individual
        };
        let (route, state) = match routes.for_strategy(strategy) {
            Some(r) if !r.is_empty() => (r.to_vec(), SearchState::Created),
            _ => (Vec::new(), SearchState::Failed(SearchFailure::Unreachable)),
        };
        debug!("{id} departs at {departure} as {strategy:?} with {} route edges", route.len());
        Self {
            id,
            strategy,
            state,
            departure,
            route,
            pointer: 0,
            current: None,
            last_offset: 0.0,
            travelled: 0.0,
            rng,
        }
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn id(&self) -> VehicleId {
        self.id
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub fn state(&self) -> SearchState {
        self.state
    }

    pub fn departure(&self) -> Step {
        self.departure
    }

    /// The full route in force, including appended continuation edges.
    pub fn route(&self) -> &[EdgeId] {
        &self.route
    }

    pub fn current_edge(&self) -> Option<EdgeId> {
        self.current
    }

    /// Metres of completed edges so far.
    pub fn travelled(&self) -> f64 {
        self.travelled
    }

    pub fn is_searching(&self) -> bool {
        !self.state.is_terminal()
    }

    /// `true` once the vehicle is on the final edge of its route.
    pub fn is_on_last_route_segment(&self) -> bool {
        self.current.is_some() && self.pointer + 1 >= self.route.len()
    }

    // ── Transitions ───────────────────────────────────────────────────────

    /// Take a position report.  Claims and returns the first available space
    /// passed on the current edge since the previous report.
    pub fn observe(
        &mut self,
        position: EdgePosition,
        step:     Step,
        graph:    &RoadGraph,
        registry: &mut ParkingSpaceRegistry,
    ) -> SearchResult<Option<SearchOutcome>> {
        if self.state.is_terminal() {
            return Ok(None);
        }
        if position.edge.index() >= graph.edge_count() {
            return Err(SpatialError::EdgeNotFound(position.edge).into());
        }

        match self.current {
            None => self.enter_first(position.edge),
            Some(cur) if cur != position.edge => self.advance_to(position.edge, graph),
            Some(_) => {}
        }
        self.state = SearchState::Searching;

        let (from, to) = (self.last_offset, position.offset);
        let found = registry
            .spaces_on(position.edge)
            .find(|s| s.is_available() && s.offset() >= from && s.offset() <= to)
            .map(|s| (s.id(), s.offset()));
        self.last_offset = self.last_offset.max(position.offset);

        let Some((space, offset)) = found else {
            return Ok(None);
        };
        registry.claim(space, self.id)?;
        self.state = SearchState::Parked(space);

        let outcome = SearchOutcome {
            vehicle:  self.id,
            space,
            strategy: self.strategy,
            step,
            elapsed:  step.since(self.departure),
            distance: self.travelled + offset,
        };
        debug!("{} parked in {} after {} steps", self.id, space, outcome.elapsed);
        Ok(Some(outcome))
    }

    /// The edge to take after the current one.
    ///
    /// Before the end of the route this is the next planned edge.  On the
    /// last segment a continuation is drawn uniformly from the successors of
    /// the current edge minus its opposite, and appended to the route.
    pub fn choose_next_edge(&mut self, graph: &RoadGraph) -> SearchResult<EdgeId> {
        let current = self.current.ok_or(SearchError::NotOnNetwork(self.id))?;
        if !self.is_on_last_route_segment() {
            return Ok(self.route[self.pointer + 1]);
        }

        let opposite = graph.opposite(current);
        let candidates: Vec<EdgeId> = graph
            .successors(current)
            .iter()
            .copied()
            .filter(|&e| Some(e) != opposite)
            .collect();

        match self.rng.choose(&candidates) {
            Some(&next) => {
                self.route.push(next);
                Ok(next)
            }
            None => {
                self.state = SearchState::Failed(SearchFailure::DeadEnd);
                Err(SearchError::DeadEnd { vehicle: self.id, edge: current })
            }
        }
    }

    /// Forced removal by the engine.  No effect on a finished search.
    pub fn remove(&mut self) {
        if !self.state.is_terminal() {
            self.state = SearchState::Removed;
        }
    }

    // ── Route bookkeeping ─────────────────────────────────────────────────

    fn enter_first(&mut self, edge: EdgeId) {
        if self.route.first() != Some(&edge) {
            self.route.insert(0, edge);
        }
        self.pointer = 0;
        self.current = Some(edge);
        self.last_offset = 0.0;
    }

    /// Move onto `edge`.  Edges skipped within one step that lie on the
    /// route are counted as driven; any other edge replaces the rest of the
    /// route.
    fn advance_to(&mut self, edge: EdgeId, graph: &RoadGraph) {
        let ahead = self.route[self.pointer + 1..].iter().position(|&e| e == edge);
        match ahead {
            Some(skip) => {
                let next = self.pointer + 1 + skip;
                self.travelled += self.route[self.pointer..next]
                    .iter()
                    .map(|&e| graph.edge_length(e))
                    .sum::<f64>();
                self.pointer = next;
            }
            None => {
                self.travelled += graph.edge_length(self.route[self.pointer]);
                self.route.truncate(self.pointer + 1);
                self.route.push(edge);
                self.pointer += 1;
            }
        }
        self.current = Some(edge);
        self.last_offset = 0.0;
    }
}
