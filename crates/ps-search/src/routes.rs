//! Route precomputation for every trip, before the stepping loop starts.
//!
//! A trip starts on its origin edge and ends on its destination edge.  The
//! planned route is
//!
//! ```text
//! [origin] ++ shortest node path(to(origin) → from(destination)) ++ [destination]
//! ```
//!
//! so both end edges are always part of the route, and all trips sharing an
//! origin edge share one shortest-path tree.

use std::collections::BTreeMap;

use log::{info, warn};
use ps_core::{EdgeId, NodeId, Step, VehicleId};
use ps_spatial::{EdgeWeights, RoadGraph, Router, ShortestPathForest, SpatialError, StaticLengths};

use crate::vehicle::Strategy;
use crate::{SearchError, SearchResult};

/// One vehicle's demand.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Trip {
    pub vehicle:     VehicleId,
    pub origin:      EdgeId,
    pub destination: EdgeId,
    pub depart:      Step,
}

/// Both precomputed routes of one trip.  `None` means the destination is
/// unreachable under that strategy's weights.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlannedRoutes {
    pub individual:  Option<Vec<EdgeId>>,
    pub cooperative: Option<Vec<EdgeId>>,
}

impl PlannedRoutes {
    pub fn for_strategy(&self, strategy: Strategy) -> Option<&[EdgeId]> {
        match strategy {
            Strategy::Individual  => self.individual.as_deref(),
            Strategy::Cooperative => self.cooperative.as_deref(),
        }
    }
}

/// Precomputed routes keyed by vehicle.
#[derive(Debug, Clone, Default)]
pub struct RouteBook {
    routes: BTreeMap<VehicleId, PlannedRoutes>,
}

impl RouteBook {
    /// Route every trip under static lengths and under `cooperative`.
    ///
    /// Unreachable destinations are recorded as `None` and logged; they are
    /// not an error.  Unknown edges and duplicate vehicles are.
    pub fn precompute<W: EdgeWeights + ?Sized>(
        graph:       &RoadGraph,
        trips:       &[Trip],
        cooperative: &W,
    ) -> SearchResult<Self> {
        for trip in trips {
            for edge in [trip.origin, trip.destination] {
                if edge.index() >= graph.edge_count() {
                    return Err(SpatialError::EdgeNotFound(edge).into());
                }
            }
        }

        let origins: Vec<NodeId> = trips.iter().map(|t| graph.edge_to(t.origin)).collect();
        let individual = Router::new(graph, &StaticLengths)?.shortest_paths(&origins)?;
        let shared     = Router::new(graph, cooperative)?.shortest_paths(&origins)?;

        let mut routes = BTreeMap::new();
        let mut unreachable = 0usize;
        for trip in trips {
            let planned = PlannedRoutes {
                individual:  plan(graph, &individual, trip)?,
                cooperative: plan(graph, &shared, trip)?,
            };
            if planned.individual.is_none() {
                unreachable += 1;
                warn!(
                    "{}: no route from {} to {}",
                    trip.vehicle,
                    graph.edge_name(trip.origin),
                    graph.edge_name(trip.destination)
                );
            }
            if routes.insert(trip.vehicle, planned).is_some() {
                return Err(SearchError::DuplicateVehicle(trip.vehicle));
            }
        }

        info!(
            "precomputed routes for {} trips from {} origins ({} unreachable)",
            trips.len(),
            individual.len(),
            unreachable
        );
        Ok(Self { routes })
    }

    pub fn get(&self, vehicle: VehicleId) -> Option<&PlannedRoutes> {
        self.routes.get(&vehicle)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

fn plan(graph: &RoadGraph, forest: &ShortestPathForest, trip: &Trip) -> SearchResult<Option<Vec<EdgeId>>> {
    if trip.origin == trip.destination {
        return Ok(Some(vec![trip.origin]));
    }
    let nodes = match forest.path(graph.edge_to(trip.origin), graph.edge_from(trip.destination)) {
        Ok(nodes) => nodes,
        Err(SpatialError::Unreachable { .. }) => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let mut route = Vec::with_capacity(nodes.len() + 1);
    route.push(trip.origin);
    route.extend(graph.node_path_to_edges(&nodes)?);
    route.push(trip.destination);
    Ok(Some(route))
}
