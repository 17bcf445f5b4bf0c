//! Fluent builder for a [`SearchSession`].

use std::collections::BTreeMap;

use log::{info, warn};
use ps_core::{SearchConfig, SimRng, SpaceId};
use ps_parking::{ParkingError, ParkingSpaceRegistry};
use ps_search::{RouteBook, Trip, VehicleFleet};
use ps_spatial::{EdgeWeights, RoadGraph, StaticLengths};

use crate::{RunSummary, SearchSession, SimError, SimResult, TripGenerator};

/// Child-stream offsets of the run RNG, one per setup stage.
const AVAILABILITY_STREAM: u64 = 1;
const DEMAND_STREAM: u64 = 2;

/// Fluent builder for [`SearchSession`].
///
/// # Required inputs
///
/// - `&RoadGraph` — the network, borrowed for the whole run
/// - [`SearchConfig`] — validated in [`build`](Self::build)
/// - demand: explicit [`trips`](Self::trips) or a [`TripGenerator`]
///
/// # Optional inputs (have defaults)
///
/// | Method                      | Default                                   |
/// |-----------------------------|-------------------------------------------|
/// | `.run(i)`                   | `0`; selects the seed `config.seed + i`   |
/// | `.cooperative_weights(w)`   | `StaticLengths`                           |
/// | `.available_spaces(ids)`    | `config.available_spaces` random spaces   |
///
/// # Example
///
/// ```rust,ignore
/// let session = SessionBuilder::new(&graph, config)
///     .trips(trips)
///     .cooperative_weights(|g: &RoadGraph, e| g.edge_length(e) * 0.5)
///     .run(3)
///     .build()?;
/// ```
pub struct SessionBuilder<'g> {
    graph:       &'g RoadGraph,
    config:      SearchConfig,
    run:         u32,
    trips:       Option<Vec<Trip>>,
    demand:      Option<TripGenerator>,
    cooperative: Option<Box<dyn EdgeWeights + 'g>>,
    available:   Option<Vec<SpaceId>>,
}

impl<'g> SessionBuilder<'g> {
    pub fn new(graph: &'g RoadGraph, config: SearchConfig) -> Self {
        Self {
            graph,
            config,
            run:         0,
            trips:       None,
            demand:      None,
            cooperative: None,
            available:   None,
        }
    }

    /// Index of this run within the batch.
    pub fn run(mut self, run: u32) -> Self {
        self.run = run;
        self
    }

    /// Use these trips.  Takes precedence over [`demand`](Self::demand).
    pub fn trips(mut self, trips: Vec<Trip>) -> Self {
        self.trips = Some(trips);
        self
    }

    /// Draw `config.vehicles` trips from `generator` with the run's seed.
    pub fn demand(mut self, generator: TripGenerator) -> Self {
        self.demand = Some(generator);
        self
    }

    /// Edge-weight strategy for the cooperative routes.
    pub fn cooperative_weights(mut self, weights: impl EdgeWeights + 'g) -> Self {
        self.cooperative = Some(Box::new(weights));
        self
    }

    /// Mark exactly these spaces available instead of a random selection.
    pub fn available_spaces(mut self, spaces: Vec<SpaceId>) -> Self {
        self.available = Some(spaces);
        self
    }

    /// Validate the configuration, scan the network for spaces, pick the
    /// available ones and precompute every route.
    ///
    /// Everything that can make a run meaningless fails here, before the
    /// first step.
    pub fn build(self) -> SimResult<SearchSession<'g>> {
        let config = self.config;
        config.validate()?;

        let run_seed = config.run_seed(self.run).unwrap_or_else(rand::random);
        let mut rng = SimRng::new(run_seed);

        // ── Parking spaces ────────────────────────────────────────────────
        let mut registry = ParkingSpaceRegistry::scan(self.graph, &config.scan)?;
        match self.available {
            Some(spaces) => {
                for space in spaces {
                    registry.make_available(space)?;
                }
            }
            None => {
                let mut stream = rng.child(AVAILABILITY_STREAM);
                registry
                    .mark_available(config.available_spaces, &mut stream)
                    .map_err(|e| match e {
                        ParkingError::InsufficientCapacity { .. } => SimError::Config(e.to_string()),
                        other => other.into(),
                    })?;
            }
        }

        // ── Demand ────────────────────────────────────────────────────────
        let trips = match (self.trips, self.demand) {
            (Some(trips), _) => trips,
            (None, Some(generator)) => {
                generator.generate(config.vehicles, &mut rng.child(DEMAND_STREAM))
            }
            (None, None) => {
                return Err(SimError::Config("no trips and no demand generator supplied".into()));
            }
        };
        if registry.available_count() < trips.len() {
            warn!(
                "only {} available spaces for {} vehicles",
                registry.available_count(),
                trips.len()
            );
        }

        // ── Routes ────────────────────────────────────────────────────────
        let routes = match &self.cooperative {
            Some(weights) => RouteBook::precompute(self.graph, &trips, weights.as_ref())?,
            None => RouteBook::precompute(self.graph, &trips, &StaticLengths)?,
        };

        info!(
            "run {} (seed {}): {} spaces, {} available, {} trips",
            self.run,
            run_seed,
            registry.len(),
            registry.available_count(),
            trips.len()
        );

        Ok(SearchSession {
            graph: self.graph,
            config,
            run_seed,
            registry,
            routes,
            trips: trips.into_iter().map(|t| (t.vehicle, t)).collect::<BTreeMap<_, _>>(),
            fleet: VehicleFleet::new(),
            summary: RunSummary::default(),
        })
    }
}
