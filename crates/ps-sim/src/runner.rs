//! The `Runner` and its step loop.

use std::collections::HashMap;

use log::{debug, info};
use ps_core::VehicleId;
use ps_search::{EdgePosition, SearchError, SearchFailure, SearchState};

use crate::{EngineStep, RunSummary, SearchObserver, SearchSession, SimError, SimResult, TrafficEngine};

/// Drives one [`SearchSession`] with a [`TrafficEngine`].
///
/// Each step has five phases:
///
/// 1. **Advance**: the engine moves every vehicle.
/// 2. **Departures**: a search vehicle is created and its route handed to
///    the engine.  Vehicles without a route are taken off the network.
/// 3. **Arrivals**: vehicles the engine let go leave the fleet.
/// 4. **Evaluation** (creation order): each searching vehicle checks the
///    spaces it passed.  Parked vehicles are stopped in the engine.
/// 5. **Continuation**: vehicles at the end of their route get the next
///    edge.  A dead end removes the vehicle from the network.
pub struct Runner<'g, E: TrafficEngine> {
    session: SearchSession<'g>,
    engine:  E,
    steps:   u64,
}

impl<'g, E: TrafficEngine> Runner<'g, E> {
    pub fn new(session: SearchSession<'g>, engine: E) -> Self {
        Self { session, engine, steps: 0 }
    }

    pub fn session(&self) -> &SearchSession<'g> {
        &self.session
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Steps run so far.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    // ── Public API ────────────────────────────────────────────────────────

    /// Step until the engine expects no more vehicles or `max_steps` is
    /// reached, then report the summary.
    pub fn run<O: SearchObserver>(&mut self, observer: &mut O) -> SimResult<RunSummary> {
        let max_steps = self.session.config().max_steps;
        while self.engine.expected_vehicles() > 0 {
            if self.steps >= max_steps {
                info!("step limit {max_steps} reached with {} vehicles searching", self.session.searching_count());
                break;
            }
            self.step(observer)?;
        }
        let summary = self.session.snapshot();
        info!(
            "run finished after {} steps: {} departed, {} parked, {} removed, {} unreachable, {} dead ends",
            self.steps,
            summary.departed,
            summary.parked,
            summary.removed,
            summary.unreachable,
            summary.dead_ends
        );
        observer.on_run_end(&summary);
        Ok(summary)
    }

    /// Run exactly `n` steps, ignoring `max_steps` and the engine's
    /// remaining vehicles.
    pub fn run_steps<O: SearchObserver>(&mut self, n: u64, observer: &mut O) -> SimResult<()> {
        for _ in 0..n {
            self.step(observer)?;
        }
        Ok(())
    }

    // ── Core step processing ──────────────────────────────────────────────

    fn step<O: SearchObserver>(&mut self, observer: &mut O) -> SimResult<()> {
        let EngineStep { step, departed, arrived, exhausted, positions } = self.engine.advance();
        self.steps += 1;
        observer.on_step_start(step);

        // ── Departures ────────────────────────────────────────────────────
        for vehicle in departed {
            self.session.on_departed(vehicle, step)?;
            match self.session.active_route(vehicle) {
                Some(route) => self.engine.set_route(vehicle, route),
                None => {
                    self.engine.remove(vehicle);
                    observer.on_failure(vehicle, SearchFailure::Unreachable, step);
                }
            }
        }

        // ── Arrivals ──────────────────────────────────────────────────────
        for vehicle in arrived {
            if self.session.on_arrived(vehicle) == Some(SearchState::Removed) {
                observer.on_removed(vehicle, step);
            }
        }

        // ── Evaluation ────────────────────────────────────────────────────
        let positions: HashMap<VehicleId, EdgePosition> = positions.into_iter().collect();
        for vehicle in self.session.searching() {
            let Some(&position) = positions.get(&vehicle) else {
                continue;
            };
            if let Some(outcome) = self.session.evaluate(vehicle, position, step)? {
                self.engine.park(vehicle);
                observer.on_parked(&outcome);
            }
        }

        // ── Continuation ──────────────────────────────────────────────────
        for vehicle in exhausted {
            if !self.session.is_searching(vehicle) {
                continue;
            }
            match self.session.next_edge(vehicle) {
                Ok(edge) => {
                    debug!("{vehicle} continues onto {}", self.session.graph().edge_name(edge));
                    self.engine.extend_route(vehicle, edge);
                }
                Err(SimError::Search(SearchError::DeadEnd { .. })) => {
                    self.engine.remove(vehicle);
                    observer.on_failure(vehicle, SearchFailure::DeadEnd, step);
                }
                Err(e) => return Err(e),
            }
        }

        observer.on_step_end(step, self.session.searching_count());
        Ok(())
    }
}
