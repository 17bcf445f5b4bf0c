//! Integration tests for ps-sim.

use ps_core::{EdgeId, ScanParams, SearchConfig, SpaceId, Step, VehicleId};
use ps_parking::ParkingSpaceRegistry;
use ps_search::{SearchFailure, SearchOutcome, Trip};
use ps_spatial::{RoadGraph, RoadGraphBuilder};

use crate::{ConstantSpeedEngine, RunSummary, Runner, SearchObserver, SessionBuilder};

// ── Helpers ───────────────────────────────────────────────────────────────────

/// A → B → C → D, one-way, 50 m per edge.  Edges "AB", "BC", "CD".
fn line_graph() -> RoadGraph {
    let mut b = RoadGraphBuilder::new();
    let n: Vec<_> = ["A", "B", "C", "D"].iter().map(|s| b.add_node(*s).unwrap()).collect();
    b.add_edge("AB", n[0], n[1], 50.0).unwrap();
    b.add_edge("BC", n[1], n[2], 50.0).unwrap();
    b.add_edge("CD", n[2], n[3], 50.0).unwrap();
    b.build()
}

/// Two-way square a-b-c-d with 100 m sides and a 50 m "entry" edge into a.
/// No dead ends: every node has a way on that is not a U-turn.
fn ring_graph() -> RoadGraph {
    let mut b = RoadGraphBuilder::new();
    let gate = b.add_node("gate").unwrap();
    let n: Vec<_> = ["a", "b", "c", "d"].iter().map(|s| b.add_node(*s).unwrap()).collect();
    b.add_edge("entry", gate, n[0], 50.0).unwrap();
    for (i, j) in [(0, 1), (1, 2), (2, 3), (3, 0)] {
        let (x, y) = (["a", "b", "c", "d"][i], ["a", "b", "c", "d"][j]);
        b.add_two_way(format!("{x}{y}"), format!("{y}{x}"), n[i], n[j], 100.0).unwrap();
    }
    b.build()
}

fn edge(graph: &RoadGraph, name: &str) -> EdgeId {
    graph.edge_by_name(name).unwrap()
}

fn config(seed: u64) -> SearchConfig {
    SearchConfig {
        available_spaces:  5,
        vehicles:          5,
        cooperation_ratio: 0.0,
        seed:              Some(seed),
        runs:              1,
        max_steps:         500,
        ..SearchConfig::default()
    }
}

fn trip(graph: &RoadGraph, vehicle: u32, origin: &str, destination: &str) -> Trip {
    Trip {
        vehicle:     VehicleId(vehicle),
        origin:      edge(graph, origin),
        destination: edge(graph, destination),
        depart:      Step(1),
    }
}

/// First space on "CD" (18 m) of the line graph.
fn first_space_on_cd(graph: &RoadGraph) -> SpaceId {
    let registry = ParkingSpaceRegistry::scan(graph, &ScanParams::default()).unwrap();
    registry.spaces_on(edge(graph, "CD")).next().unwrap().id()
}

/// Edge and offset of `space` in a fresh scan of `graph`.
fn space_position(graph: &RoadGraph, space: SpaceId) -> (EdgeId, f64) {
    let registry = ParkingSpaceRegistry::scan(graph, &ScanParams::default()).unwrap();
    let s = registry.get(space).unwrap();
    (s.edge(), s.offset())
}

#[derive(Default)]
struct Recorder {
    parked:   Vec<SearchOutcome>,
    failures: Vec<(VehicleId, SearchFailure)>,
    removed:  Vec<VehicleId>,
    steps:    u64,
    end:      Option<RunSummary>,
}

impl SearchObserver for Recorder {
    fn on_step_end(&mut self, _step: Step, _searching: usize) {
        self.steps += 1;
    }

    fn on_parked(&mut self, outcome: &SearchOutcome) {
        self.parked.push(*outcome);
    }

    fn on_failure(&mut self, vehicle: VehicleId, failure: SearchFailure, _step: Step) {
        self.failures.push((vehicle, failure));
    }

    fn on_removed(&mut self, vehicle: VehicleId, _step: Step) {
        self.removed.push(vehicle);
    }

    fn on_run_end(&mut self, summary: &RunSummary) {
        self.end = Some(summary.clone());
    }
}

// ── SessionBuilder ────────────────────────────────────────────────────────────

#[cfg(test)]
mod builder_tests {
    use super::*;
    use crate::SimError;

    #[test]
    fn too_many_available_spaces_is_config_error() {
        let g = line_graph();
        // 50 m edges carry four spaces each: 12 in total.
        let cfg = SearchConfig { available_spaces: 13, ..config(1) };
        let result = SessionBuilder::new(&g, cfg).trips(vec![trip(&g, 0, "AB", "CD")]).build();
        assert!(matches!(result, Err(SimError::Config(_))));
    }

    #[test]
    fn every_space_can_be_made_available() {
        let g = line_graph();
        let cfg = SearchConfig { available_spaces: 12, ..config(1) };
        let session = SessionBuilder::new(&g, cfg).trips(vec![]).build().unwrap();
        assert_eq!(session.registry().available_count(), 12);
    }

    #[test]
    fn invalid_config_rejected_before_anything_else() {
        let g = line_graph();
        let cfg = SearchConfig { cooperation_ratio: 1.5, ..config(1) };
        let result = SessionBuilder::new(&g, cfg).trips(vec![]).build();
        assert!(matches!(result, Err(SimError::Core(_))));
    }

    #[test]
    fn demand_is_required() {
        let g = line_graph();
        let result = SessionBuilder::new(&g, config(1)).build();
        assert!(matches!(result, Err(SimError::Config(_))));
    }

    #[test]
    fn builds_registry_and_routes() {
        let g = line_graph();
        let session = SessionBuilder::new(&g, config(1))
            .trips(vec![trip(&g, 0, "AB", "CD"), trip(&g, 1, "BC", "CD")])
            .build()
            .unwrap();
        assert_eq!(session.registry().len(), 12);
        assert_eq!(session.registry().available_count(), 5);
        assert_eq!(session.routes().len(), 2);
        assert_eq!(session.trips().count(), 2);
        assert_eq!(session.run_seed(), 1);
    }

    #[test]
    fn run_index_offsets_the_seed() {
        let g = line_graph();
        let session = SessionBuilder::new(&g, config(10))
            .trips(vec![])
            .run(3)
            .build()
            .unwrap();
        assert_eq!(session.run_seed(), 13);
    }

    #[test]
    fn same_seed_same_available_spaces() {
        let g = ring_graph();
        let available = |seed| {
            let session = SessionBuilder::new(&g, config(seed)).trips(vec![]).build().unwrap();
            session
                .registry()
                .iter()
                .filter(|s| s.is_available())
                .map(|s| s.id())
                .collect::<Vec<_>>()
        };
        assert_eq!(available(4), available(4));
        assert_eq!(available(4).len(), 5);
    }
}

// ── SearchSession ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod session_tests {
    use super::*;
    use crate::SimError;
    use ps_search::{EdgePosition, SearchState};

    #[test]
    fn departure_of_unknown_trip_fails() {
        let g = line_graph();
        let mut session = SessionBuilder::new(&g, config(1)).trips(vec![]).build().unwrap();
        assert!(matches!(
            session.on_departed(VehicleId(9), Step(1)),
            Err(SimError::UnknownTrip(VehicleId(9)))
        ));
    }

    #[test]
    fn arrival_while_searching_counts_as_removed() {
        let g = line_graph();
        let mut session = SessionBuilder::new(&g, config(1))
            .trips(vec![trip(&g, 0, "AB", "CD")])
            .build()
            .unwrap();
        assert_eq!(session.on_departed(VehicleId(0), Step(1)).unwrap(), SearchState::Created);
        assert!(session.is_searching(VehicleId(0)));
        assert_eq!(session.on_arrived(VehicleId(0)), Some(SearchState::Removed));
        assert_eq!(session.on_arrived(VehicleId(0)), None);
        assert_eq!(session.summary().removed, 1);
        assert!(!session.is_searching(VehicleId(0)));
    }

    #[test]
    fn repeated_departure_is_rejected_and_not_counted() {
        let g = line_graph();
        let mut session = SessionBuilder::new(&g, config(1))
            .trips(vec![trip(&g, 0, "AB", "CD")])
            .build()
            .unwrap();
        session.on_departed(VehicleId(0), Step(1)).unwrap();
        assert!(matches!(
            session.on_departed(VehicleId(0), Step(2)),
            Err(SimError::Search(ps_search::SearchError::DuplicateVehicle(VehicleId(0))))
        ));
        assert_eq!(session.summary().departed, 1);
        assert_eq!(session.searching_count(), 1);
    }

    #[test]
    fn parked_vehicle_leaves_the_fleet() {
        let g = line_graph();
        let mut session = SessionBuilder::new(&g, config(1))
            .trips(vec![trip(&g, 0, "AB", "CD")])
            .available_spaces(vec![first_space_on_cd(&g)])
            .build()
            .unwrap();
        session.on_departed(VehicleId(0), Step(1)).unwrap();
        session.evaluate(VehicleId(0), EdgePosition::new(edge(&g, "AB"), 0.0), Step(1)).unwrap();
        let outcome = session
            .evaluate(VehicleId(0), EdgePosition::new(edge(&g, "CD"), 25.0), Step(4))
            .unwrap()
            .unwrap();
        assert_eq!(outcome.space, first_space_on_cd(&g));
        assert_eq!(outcome.elapsed, 3);
        assert!(session.searching().is_empty());
        assert_eq!(session.snapshot().parked, 1);
        assert!(matches!(
            session.evaluate(VehicleId(0), EdgePosition::new(edge(&g, "CD"), 30.0), Step(5)),
            Err(SimError::Search(_))
        ));
    }

    #[test]
    fn last_segment_and_dead_end() {
        let g = line_graph();
        let mut session = SessionBuilder::new(&g, config(1))
            .trips(vec![trip(&g, 0, "BC", "CD")])
            .build()
            .unwrap();
        session.on_departed(VehicleId(0), Step(1)).unwrap();
        assert_eq!(session.active_route(VehicleId(0)), Some(&[edge(&g, "BC"), edge(&g, "CD")][..]));

        session.evaluate(VehicleId(0), EdgePosition::new(edge(&g, "BC"), 0.0), Step(1)).unwrap();
        assert!(!session.is_on_last_route_segment(VehicleId(0)));
        assert_eq!(session.next_edge(VehicleId(0)).unwrap(), edge(&g, "CD"));

        session.evaluate(VehicleId(0), EdgePosition::new(edge(&g, "CD"), 0.0), Step(6)).unwrap();
        assert!(session.is_on_last_route_segment(VehicleId(0)));
        assert!(matches!(session.next_edge(VehicleId(0)), Err(SimError::Search(_))));
        assert_eq!(session.summary().dead_ends, 1);
        assert_eq!(session.searching_count(), 0);
    }
}

// ── ConstantSpeedEngine ───────────────────────────────────────────────────────

#[cfg(test)]
mod engine_tests {
    use super::*;
    use crate::TrafficEngine;
    use ps_search::EdgePosition;

    #[test]
    fn rejects_non_positive_speed() {
        let g = line_graph();
        let none: [Trip; 0] = [];
        assert!(ConstantSpeedEngine::new(&g, 0.0, &none).is_err());
        assert!(ConstantSpeedEngine::new(&g, f64::NAN, &none).is_err());
    }

    #[test]
    fn moves_along_route_and_arrives_when_not_extended() {
        let g = line_graph();
        let trips = [Trip { depart: Step(2), ..trip(&g, 0, "BC", "CD") }];
        let mut engine = ConstantSpeedEngine::new(&g, 30.0, &trips).unwrap();
        assert_eq!(engine.expected_vehicles(), 1);

        let s1 = engine.advance();
        assert_eq!(s1.step, Step(1));
        assert!(s1.departed.is_empty() && s1.positions.is_empty());

        let s2 = engine.advance();
        assert_eq!(s2.departed, vec![VehicleId(0)]);
        assert_eq!(s2.positions, vec![(VehicleId(0), EdgePosition::new(edge(&g, "BC"), 0.0))]);
        engine.set_route(VehicleId(0), &[edge(&g, "BC"), edge(&g, "CD")]);

        engine.advance(); // BC 30
        let s4 = engine.advance(); // 60 → CD 10
        assert_eq!(s4.positions[0].1, EdgePosition::new(edge(&g, "CD"), 10.0));

        engine.advance(); // CD 40
        let s6 = engine.advance(); // end of CD
        assert_eq!(s6.exhausted, vec![VehicleId(0)]);
        assert_eq!(s6.positions[0].1, EdgePosition::new(edge(&g, "CD"), 50.0));

        let s7 = engine.advance();
        assert_eq!(s7.arrived, vec![VehicleId(0)]);
        assert_eq!(engine.expected_vehicles(), 0);
    }

    #[test]
    fn extension_and_parking() {
        let g = ring_graph();
        let trips = [trip(&g, 0, "entry", "ab"), trip(&g, 1, "entry", "ad")];
        let mut engine = ConstantSpeedEngine::new(&g, 50.0, &trips).unwrap();
        engine.advance();
        engine.set_route(VehicleId(0), &[edge(&g, "entry")]);

        let s2 = engine.advance();
        assert!(s2.exhausted.contains(&VehicleId(0)));
        engine.extend_route(VehicleId(0), edge(&g, "ab"));
        engine.park(VehicleId(1));

        let s3 = engine.advance();
        assert!(s3.arrived.is_empty());
        assert_eq!(s3.positions, vec![(VehicleId(0), EdgePosition::new(edge(&g, "ab"), 0.0))]);
        assert_eq!(engine.position(VehicleId(1)), None);
    }
}

// ── Runner ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod runner_tests {
    use super::*;
    use crate::NoopObserver;

    #[test]
    fn line_scenario_parks_after_118_metres() {
        let g = line_graph();
        let session = SessionBuilder::new(&g, config(7))
            .trips(vec![trip(&g, 0, "AB", "CD")])
            .available_spaces(vec![first_space_on_cd(&g)])
            .build()
            .unwrap();
        let engine = ConstantSpeedEngine::new(&g, 10.0, session.trips()).unwrap();
        let mut recorder = Recorder::default();
        let summary = Runner::new(session, engine).run(&mut recorder).unwrap();

        assert_eq!(summary.departed, 1);
        assert_eq!(summary.parked, 1);
        assert_eq!(summary.search_steps, vec![12]);
        assert!((summary.search_distances[0] - 118.0).abs() < 1e-9);
        assert_eq!(summary.success_rate(), 1.0);

        let outcome = recorder.parked[0];
        assert_eq!(outcome.step, Step(13));
        assert_eq!(outcome.space, first_space_on_cd(&g));
        let space = space_position(&g, outcome.space);
        assert_eq!(space, (edge(&g, "CD"), 18.0));
        assert_eq!(recorder.steps, 13);
        assert_eq!(recorder.end, Some(summary));
    }

    #[test]
    fn run_steps_ignores_remaining_vehicles() {
        let g = line_graph();
        let session = SessionBuilder::new(&g, config(7))
            .trips(vec![trip(&g, 0, "AB", "CD")])
            .available_spaces(vec![first_space_on_cd(&g)])
            .build()
            .unwrap();
        let engine = ConstantSpeedEngine::new(&g, 10.0, session.trips()).unwrap();
        let mut runner = Runner::new(session, engine);
        runner.run_steps(3, &mut NoopObserver).unwrap();

        assert_eq!(runner.steps(), 3);
        assert_eq!(runner.engine().current_step(), Step(3));
        assert_eq!(runner.session().searching_count(), 1);

        // The line scenario picks up where it stopped.
        let summary = runner.run(&mut NoopObserver).unwrap();
        assert_eq!(summary.search_steps, vec![12]);
        assert_eq!(runner.engine().current_step(), Step(13));
    }

    #[test]
    fn unreachable_trip_is_counted_not_fatal() {
        let g = line_graph();
        let session = SessionBuilder::new(&g, config(7))
            .trips(vec![trip(&g, 0, "CD", "AB"), trip(&g, 1, "AB", "CD")])
            .available_spaces(vec![first_space_on_cd(&g)])
            .build()
            .unwrap();
        let engine = ConstantSpeedEngine::new(&g, 10.0, session.trips()).unwrap();
        let mut recorder = Recorder::default();
        let summary = Runner::new(session, engine).run(&mut recorder).unwrap();

        assert_eq!(summary.departed, 2);
        assert_eq!(summary.unreachable, 1);
        assert_eq!(summary.parked, 1);
        assert_eq!(recorder.failures, vec![(VehicleId(0), SearchFailure::Unreachable)]);
        assert!(recorder.removed.is_empty());
    }

    #[test]
    fn dead_end_removes_the_vehicle() {
        let g = line_graph();
        let session = SessionBuilder::new(&g, config(7))
            .trips(vec![trip(&g, 0, "AB", "CD")])
            .available_spaces(vec![])
            .build()
            .unwrap();
        let engine = ConstantSpeedEngine::new(&g, 10.0, session.trips()).unwrap();
        let mut recorder = Recorder::default();
        let mut runner = Runner::new(session, engine);
        let summary = runner.run(&mut recorder).unwrap();

        assert_eq!(summary.dead_ends, 1);
        assert_eq!(summary.parked, 0);
        assert_eq!(summary.still_searching, 0);
        assert_eq!(recorder.failures, vec![(VehicleId(0), SearchFailure::DeadEnd)]);
        // The end of CD is reached at step 16; the engine is then empty.
        assert_eq!(runner.steps(), 16);
    }

    #[test]
    fn step_limit_leaves_vehicles_searching() {
        let g = ring_graph();
        let cfg = SearchConfig { max_steps: 3, ..config(5) };
        let session = SessionBuilder::new(&g, cfg)
            .demand(crate::TripGenerator::entries(&g).unwrap())
            .available_spaces(vec![])
            .build()
            .unwrap();
        let engine = ConstantSpeedEngine::new(&g, 10.0, session.trips()).unwrap();
        let summary = Runner::new(session, engine).run(&mut NoopObserver).unwrap();
        assert_eq!(summary.departed, 5);
        assert_eq!(summary.still_searching, 5);
        assert_eq!(summary.success_rate(), 0.0);
    }

    #[test]
    fn cooperative_ratio_one_makes_everyone_cooperative() {
        let g = ring_graph();
        let cfg = SearchConfig { cooperation_ratio: 1.0, ..config(3) };
        let session = SessionBuilder::new(&g, cfg)
            .demand(crate::TripGenerator::entries(&g).unwrap())
            .cooperative_weights(|g: &RoadGraph, e: EdgeId| g.edge_length(e) + 1.0)
            .build()
            .unwrap();
        let engine = ConstantSpeedEngine::new(&g, 10.0, session.trips()).unwrap();
        let summary = Runner::new(session, engine).run(&mut NoopObserver).unwrap();
        assert_eq!(summary.cooperative_departed, summary.departed);
        assert_eq!(summary.cooperative_parked, summary.parked);
    }

    #[test]
    fn fixed_seed_runs_are_identical() {
        let g = ring_graph();
        let run = |run_index: u32| {
            let cfg = SearchConfig { cooperation_ratio: 0.5, vehicles: 8, ..config(42) };
            let session = SessionBuilder::new(&g, cfg)
                .demand(crate::TripGenerator::entries(&g).unwrap().departures(Step(1), 20))
                .run(run_index)
                .build()
                .unwrap();
            let engine = ConstantSpeedEngine::new(&g, 10.0, session.trips()).unwrap();
            let mut recorder = Recorder::default();
            let summary = Runner::new(session, engine).run(&mut recorder).unwrap();
            (summary, recorder.parked)
        };
        let (a, parked_a) = run(0);
        let (b, parked_b) = run(0);
        assert_eq!(a, b);
        assert_eq!(parked_a, parked_b);
        assert_eq!(a.departed, 8);
        assert_eq!(
            a.parked + a.removed + a.unreachable + a.dead_ends + a.still_searching,
            a.departed
        );
    }
}

// ── TripGenerator ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod demand_tests {
    use super::*;
    use crate::{SimError, TripGenerator};
    use ps_core::SimRng;

    #[test]
    fn entry_edges_are_origins_only() {
        let g = ring_graph();
        let generator = TripGenerator::entries(&g).unwrap();
        assert_eq!(generator.origins(), &[edge(&g, "entry")]);
        assert_eq!(generator.destinations().len(), 8);

        let trips = generator.generate(20, &mut SimRng::new(1));
        assert_eq!(trips.len(), 20);
        for (i, t) in trips.iter().enumerate() {
            assert_eq!(t.vehicle, VehicleId(i as u32));
            assert_eq!(t.origin, edge(&g, "entry"));
            assert_ne!(t.destination, edge(&g, "entry"));
            assert_eq!(t.depart, Step(1));
        }
    }

    #[test]
    fn departures_stay_in_window() {
        let g = ring_graph();
        let generator = TripGenerator::entries(&g).unwrap().departures(Step(5), 10);
        let trips = generator.generate(50, &mut SimRng::new(2));
        assert!(trips.iter().all(|t| (5..15).contains(&t.depart.0)));
    }

    #[test]
    fn seeded_generation_repeats() {
        let g = ring_graph();
        let generator = TripGenerator::entries(&g).unwrap();
        assert_eq!(
            generator.generate(10, &mut SimRng::new(9)),
            generator.generate(10, &mut SimRng::new(9))
        );
    }

    #[test]
    fn empty_pools_rejected() {
        let g = line_graph();
        assert!(matches!(TripGenerator::entries(&g), Err(SimError::Config(_))));
        assert!(matches!(TripGenerator::new(&g, |_| true), Err(SimError::Config(_))));
    }
}

// ── RunSummary ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod summary_tests {
    use super::*;

    #[test]
    fn rates_and_means() {
        let mut s = RunSummary { departed: 6, parked: 3, removed: 1, unreachable: 1, dead_ends: 1, ..Default::default() };
        s.search_steps = vec![10, 20, 30];
        s.search_distances = vec![100.0, 200.0, 300.0];
        assert_eq!(s.finished(), 4);
        assert!((s.success_rate() - 0.75).abs() < 1e-12);
        assert_eq!(s.mean_search_steps(), Some(20.0));
        assert_eq!(s.mean_search_distance(), Some(200.0));

        let empty = RunSummary::default();
        assert_eq!(empty.success_rate(), 0.0);
        assert_eq!(empty.mean_search_steps(), None);
    }

    #[test]
    fn absorb_accumulates() {
        let mut total = RunSummary::default();
        let run = RunSummary { departed: 2, parked: 1, search_steps: vec![5], search_distances: vec![50.0], ..Default::default() };
        total.absorb(&run);
        total.absorb(&run);
        assert_eq!(total.departed, 4);
        assert_eq!(total.parked, 2);
        assert_eq!(total.search_steps, vec![5, 5]);
    }
}
