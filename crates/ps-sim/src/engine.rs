//! The traffic engine seam and a constant-speed stand-in.
//!
//! The search core never moves vehicles itself.  A [`TrafficEngine`] owns
//! time and kinematics; every step it reports who departed, who left the
//! network, who ran out of route, and where everybody is.

use std::collections::BTreeMap;

use ps_core::{EdgeId, Step, VehicleId};
use ps_search::{EdgePosition, Trip};
use ps_spatial::RoadGraph;

use crate::{SimError, SimResult};

/// Everything the engine reports for one step.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EngineStep {
    pub step:      Step,
    /// Vehicles that entered the network this step.
    pub departed:  Vec<VehicleId>,
    /// Vehicles that left the network this step.
    pub arrived:   Vec<VehicleId>,
    /// Vehicles standing at the end of the last edge of their route.
    pub exhausted: Vec<VehicleId>,
    /// Position of every vehicle on the network after the step.
    pub positions: Vec<(VehicleId, EdgePosition)>,
}

/// External traffic simulation driven by the [`Runner`][crate::Runner].
pub trait TrafficEngine {
    /// Advance one step and report what happened.
    fn advance(&mut self) -> EngineStep;

    /// Vehicles still to depart plus vehicles on the network.  The run ends
    /// when this reaches zero.
    fn expected_vehicles(&self) -> usize;

    /// Replace `vehicle`'s route.  The route starts with its current edge.
    fn set_route(&mut self, vehicle: VehicleId, route: &[EdgeId]);

    /// Append one edge to `vehicle`'s route.
    fn extend_route(&mut self, vehicle: VehicleId, edge: EdgeId);

    /// Stop `vehicle` in its parking space; it leaves the traffic.
    fn park(&mut self, vehicle: VehicleId);

    /// Take `vehicle` off the network.
    fn remove(&mut self, vehicle: VehicleId);
}

// ── ConstantSpeedEngine ───────────────────────────────────────────────────────

#[derive(Debug, Clone)]
struct Moving {
    route:  Vec<EdgeId>,
    index:  usize,
    offset: f64,
    /// Reached the end of the route; leaves next step unless extended.
    at_end: bool,
}

impl Moving {
    fn edge(&self) -> EdgeId {
        self.route[self.index]
    }
}

/// Every vehicle moves `speed` metres per step along its route.
///
/// A departing vehicle appears at offset 0 of its origin edge.  Distance
/// left over at the end of an edge carries onto the next one.  A vehicle
/// that reaches the end of its route waits there for one step, reported as
/// exhausted; if the route was not extended by then it arrives.
#[derive(Debug, Clone)]
pub struct ConstantSpeedEngine {
    lengths: Vec<f64>,
    speed:   f64,
    step:    Step,
    pending: BTreeMap<Step, Vec<(VehicleId, EdgeId)>>,
    moving:  BTreeMap<VehicleId, Moving>,
}

impl ConstantSpeedEngine {
    pub fn new<'a>(
        graph: &RoadGraph,
        speed: f64,
        trips: impl IntoIterator<Item = &'a Trip>,
    ) -> SimResult<Self> {
        if !speed.is_finite() || speed <= 0.0 {
            return Err(SimError::Config(format!("engine speed must be positive, got {speed}")));
        }
        let mut pending: BTreeMap<Step, Vec<(VehicleId, EdgeId)>> = BTreeMap::new();
        for trip in trips {
            pending.entry(trip.depart).or_default().push((trip.vehicle, trip.origin));
        }
        Ok(Self {
            lengths: graph.edge_lengths().to_vec(),
            speed,
            step: Step::ZERO,
            pending,
            moving: BTreeMap::new(),
        })
    }

    pub fn current_step(&self) -> Step {
        self.step
    }

    /// Position of `vehicle` if it is on the network.
    pub fn position(&self, vehicle: VehicleId) -> Option<EdgePosition> {
        self.moving.get(&vehicle).map(|m| EdgePosition::new(m.edge(), m.offset))
    }
}

impl TrafficEngine for ConstantSpeedEngine {
    fn advance(&mut self) -> EngineStep {
        self.step = self.step.next();
        let mut out = EngineStep { step: self.step, ..EngineStep::default() };

        // ── Move ──────────────────────────────────────────────────────────
        let lengths = &self.lengths;
        let length = |e: EdgeId| lengths.get(e.index()).copied().unwrap_or(0.0);
        for (&id, m) in self.moving.iter_mut() {
            if m.at_end {
                if m.index + 1 < m.route.len() {
                    m.index += 1;
                    m.offset = 0.0;
                    m.at_end = false;
                } else {
                    out.arrived.push(id);
                }
                continue;
            }
            m.offset += self.speed;
            loop {
                let len = length(m.edge());
                if m.offset < len {
                    break;
                }
                if m.index + 1 < m.route.len() {
                    m.offset -= len;
                    m.index += 1;
                } else {
                    m.offset = len;
                    m.at_end = true;
                    out.exhausted.push(id);
                    break;
                }
            }
        }
        for id in &out.arrived {
            self.moving.remove(id);
        }

        // ── Depart ────────────────────────────────────────────────────────
        let later = self.pending.split_off(&self.step.next());
        let due = std::mem::replace(&mut self.pending, later);
        for (id, origin) in due.into_values().flatten() {
            self.moving.insert(id, Moving { route: vec![origin], index: 0, offset: 0.0, at_end: false });
            out.departed.push(id);
        }

        out.positions = self
            .moving
            .iter()
            .map(|(&id, m)| (id, EdgePosition::new(m.edge(), m.offset)))
            .collect();
        out
    }

    fn expected_vehicles(&self) -> usize {
        self.pending.values().map(Vec::len).sum::<usize>() + self.moving.len()
    }

    fn set_route(&mut self, vehicle: VehicleId, route: &[EdgeId]) {
        let Some(m) = self.moving.get_mut(&vehicle) else {
            return;
        };
        let current = m.edge();
        let mut new_route = Vec::with_capacity(route.len() + 1);
        if route.first() != Some(&current) {
            new_route.push(current);
        }
        new_route.extend_from_slice(route);
        m.route = new_route;
        m.index = 0;
    }

    fn extend_route(&mut self, vehicle: VehicleId, edge: EdgeId) {
        if let Some(m) = self.moving.get_mut(&vehicle) {
            m.route.push(edge);
        }
    }

    fn park(&mut self, vehicle: VehicleId) {
        self.moving.remove(&vehicle);
    }

    fn remove(&mut self, vehicle: VehicleId) {
        self.moving.remove(&vehicle);
    }
}
