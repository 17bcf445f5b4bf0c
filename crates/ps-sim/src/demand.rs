//! Random in-memory demand.
//!
//! Edges are split into two pools by name: origins (where vehicles enter the
//! network) and destinations (everything else).  Each vehicle draws one of
//! each uniformly.

use ps_core::{EdgeId, SimRng, Step, VehicleId};
use ps_search::Trip;
use ps_spatial::RoadGraph;

use crate::{SimError, SimResult};

#[derive(Debug, Clone)]
pub struct TripGenerator {
    origins:      Vec<EdgeId>,
    destinations: Vec<EdgeId>,
    first_depart: Step,
    window:       u64,
}

impl TripGenerator {
    /// Split the edges of `graph` with `is_origin` applied to edge names.
    /// Both pools must be non-empty.
    pub fn new(graph: &RoadGraph, is_origin: impl Fn(&str) -> bool) -> SimResult<Self> {
        let (origins, destinations): (Vec<EdgeId>, Vec<EdgeId>) =
            graph.edges().partition(|&e| is_origin(graph.edge_name(e)));
        if origins.is_empty() {
            return Err(SimError::Config("no origin edges in the network".into()));
        }
        if destinations.is_empty() {
            return Err(SimError::Config("no destination edges in the network".into()));
        }
        Ok(Self { origins, destinations, first_depart: Step(1), window: 1 })
    }

    /// Origins are the edges whose name contains `entry`.
    pub fn entries(graph: &RoadGraph) -> SimResult<Self> {
        Self::new(graph, |name| name.contains("entry"))
    }

    /// Spread departures uniformly over `steps` steps starting at `first`.
    /// The default is every vehicle departing at step 1.
    pub fn departures(mut self, first: Step, steps: u64) -> Self {
        self.first_depart = first;
        self.window = steps.max(1);
        self
    }

    pub fn origins(&self) -> &[EdgeId] {
        &self.origins
    }

    pub fn destinations(&self) -> &[EdgeId] {
        &self.destinations
    }

    /// `n` trips for vehicles `0..n`.
    pub fn generate(&self, n: usize, rng: &mut SimRng) -> Vec<Trip> {
        (0..n)
            .filter_map(|i| {
                let origin = *rng.choose(&self.origins)?;
                let destination = *rng.choose(&self.destinations)?;
                let depart = self.first_depart + rng.gen_range(0..self.window);
                Some(Trip {
                    vehicle: VehicleId(i as u32),
                    origin,
                    destination,
                    depart,
                })
            })
            .collect()
    }
}
