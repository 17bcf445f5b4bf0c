//! One parking search run: the state shared by every vehicle.

use std::collections::BTreeMap;

use log::{debug, warn};
use ps_core::{EdgeId, SearchConfig, Step, VehicleId, VehicleRng};
use ps_parking::ParkingSpaceRegistry;
use ps_search::{
    EdgePosition, PlannedRoutes, RouteBook, SearchError, SearchOutcome, SearchState, SearchVehicle, Trip,
    VehicleFleet,
};
use ps_spatial::RoadGraph;

use crate::{RunSummary, SimError, SimResult};

/// Road graph, parking spaces, precomputed routes and live vehicles of one
/// run.  Build with [`SessionBuilder`][crate::SessionBuilder].
///
/// The session is push-driven: the caller reports departures, positions and
/// arrivals, and asks for continuation edges.  Vehicles are created on
/// departure and leave the fleet as soon as their search ends.
pub struct SearchSession<'g> {
    pub(crate) graph:    &'g RoadGraph,
    pub(crate) config:   SearchConfig,
    pub(crate) run_seed: u64,
    pub(crate) registry: ParkingSpaceRegistry,
    pub(crate) routes:   RouteBook,
    pub(crate) trips:    BTreeMap<VehicleId, Trip>,
    pub(crate) fleet:    VehicleFleet,
    pub(crate) summary:  RunSummary,
}

impl<'g> SearchSession<'g> {
    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn graph(&self) -> &'g RoadGraph {
        self.graph
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// The seed every random draw of this run derives from.
    pub fn run_seed(&self) -> u64 {
        self.run_seed
    }

    pub fn registry(&self) -> &ParkingSpaceRegistry {
        &self.registry
    }

    pub fn routes(&self) -> &RouteBook {
        &self.routes
    }

    /// All trips, ordered by vehicle id.
    pub fn trips(&self) -> impl Iterator<Item = &Trip> + '_ {
        self.trips.values()
    }

    pub fn fleet(&self) -> &VehicleFleet {
        &self.fleet
    }

    pub fn summary(&self) -> &RunSummary {
        &self.summary
    }

    // ── Engine notifications ──────────────────────────────────────────────

    /// Create the search vehicle for a departed trip.
    ///
    /// A vehicle with no route for its strategy is recorded as unreachable
    /// and never enters the fleet.
    pub fn on_departed(&mut self, vehicle: VehicleId, step: Step) -> SimResult<SearchState> {
        if !self.trips.contains_key(&vehicle) {
            return Err(SimError::UnknownTrip(vehicle));
        }
        let no_route = PlannedRoutes::default();
        let planned = self.routes.get(vehicle).unwrap_or(&no_route);
        let rng = VehicleRng::new(self.run_seed, vehicle);
        let v = SearchVehicle::new(vehicle, step, planned, self.config.cooperation_ratio, rng);

        let (strategy, state) = (v.strategy(), v.state());
        if state.is_terminal() {
            self.summary.unreachable += 1;
            warn!("{vehicle} departed at {step} without a route");
        } else {
            self.fleet.insert(v)?;
        }
        self.summary.record_departure(strategy);
        Ok(state)
    }

    /// The engine let `vehicle` go.  Returns its final state, or `None` if
    /// its search had already ended.
    pub fn on_arrived(&mut self, vehicle: VehicleId) -> Option<SearchState> {
        let mut v = self.fleet.remove(vehicle)?;
        if v.is_searching() {
            v.remove();
            self.summary.removed += 1;
            debug!("{vehicle} removed without a space");
        }
        Some(v.state())
    }

    /// Report `vehicle`'s position.  Returns the outcome if it parked.
    pub fn evaluate(
        &mut self,
        vehicle:  VehicleId,
        position: EdgePosition,
        step:     Step,
    ) -> SimResult<Option<SearchOutcome>> {
        let v = self
            .fleet
            .get_mut(vehicle)
            .ok_or(SearchError::UnknownVehicle(vehicle))?;
        let outcome = v.observe(position, step, self.graph, &mut self.registry)?;
        if let Some(o) = &outcome {
            self.fleet.remove(vehicle);
            self.summary.record_parked(o);
        }
        Ok(outcome)
    }

    /// The edge `vehicle` should take next.
    ///
    /// A dead end ends the vehicle's search: it is counted, dropped from the
    /// fleet, and the [`SearchError::DeadEnd`] is returned so the caller can
    /// take it off the network.
    pub fn next_edge(&mut self, vehicle: VehicleId) -> SimResult<EdgeId> {
        let v = self
            .fleet
            .get_mut(vehicle)
            .ok_or(SearchError::UnknownVehicle(vehicle))?;
        match v.choose_next_edge(self.graph) {
            Ok(edge) => Ok(edge),
            Err(e @ SearchError::DeadEnd { .. }) => {
                self.fleet.remove(vehicle);
                self.summary.dead_ends += 1;
                warn!("{e}");
                Err(e.into())
            }
            Err(e) => Err(e.into()),
        }
    }

    // ── Queries ───────────────────────────────────────────────────────────

    /// The route `vehicle` follows, if it is searching.
    pub fn active_route(&self, vehicle: VehicleId) -> Option<&[EdgeId]> {
        self.fleet.get(vehicle).map(SearchVehicle::route)
    }

    pub fn is_searching(&self, vehicle: VehicleId) -> bool {
        self.fleet.get(vehicle).is_some_and(SearchVehicle::is_searching)
    }

    pub fn is_on_last_route_segment(&self, vehicle: VehicleId) -> bool {
        self.fleet.get(vehicle).is_some_and(SearchVehicle::is_on_last_route_segment)
    }

    /// Searching vehicles in creation order.
    pub fn searching(&self) -> Vec<VehicleId> {
        self.fleet.ids()
    }

    pub fn searching_count(&self) -> usize {
        self.fleet.searching_count()
    }

    /// Summary so far, with the vehicles still in the fleet counted as
    /// `still_searching`.
    pub fn snapshot(&self) -> RunSummary {
        let mut summary = self.summary.clone();
        summary.still_searching = self.fleet.searching_count();
        summary
    }
}
