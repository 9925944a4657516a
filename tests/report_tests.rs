//! Topology and state snapshots, and the text they print as

use grid_traffic_sim::simulation::{
    EventKind, EventQueue, GridLayout, IntersectionId, RoadId, SignalState, SimWorld,
    SnapshotReporter, VehicleId, GRID_ROAD_ID_BASE,
};

fn corridor_world() -> SimWorld {
    let mut world = SimWorld::new_with_seed(17);
    world.add_intersection(0, 50.0, 50.0).unwrap();
    world.add_intersection(1, 250.0, 50.0).unwrap();
    world.add_road(1000, 0, 1, 200.0, 15.0).unwrap();
    world.add_road(1001, 1, 0, 200.0, 15.0).unwrap();
    world
}

#[test]
fn test_topology_lists_nodes_and_edges() {
    let world = corridor_world();
    let topology = world.topology();

    assert_eq!(topology.nodes.len(), 2);
    assert_eq!(
        topology.edges,
        vec![
            (RoadId(1000), IntersectionId(0), IntersectionId(1)),
            (RoadId(1001), IntersectionId(1), IntersectionId(0)),
        ]
    );
    assert_eq!(
        topology.to_string(),
        "NODES\n0 50 50\n1 250 50\nEDGES\n1000 0 1\n1001 1 0\nEND_GRAPH"
    );
}

#[test]
fn test_snapshot_before_first_tick_has_dark_signals() {
    let world = corridor_world();
    let snapshot = world.snapshot();

    assert!(snapshot.vehicles.is_empty());
    assert_eq!(
        snapshot.signals,
        vec![
            SignalState {
                intersection: IntersectionId(0),
                green_road: None
            },
            SignalState {
                intersection: IntersectionId(1),
                green_road: None
            },
        ]
    );
    assert_eq!(snapshot.to_string(), "STATE 0.0\nL 0 -1\nL 1 -1\nEND_STATE");
}

#[test]
fn test_snapshot_reports_moving_vehicles_only() {
    let mut world = corridor_world();
    world.spawn_vehicle(1, 0, 1, false, 0.0).unwrap();
    world.spawn_vehicle(2, 1, 0, false, 60.0).unwrap();
    world.advance_one_tick();

    let snapshot = world.snapshot();
    assert_eq!(snapshot.vehicles.len(), 1);
    assert_eq!(snapshot.vehicles[0].id, VehicleId(1));
    assert_eq!(snapshot.vehicles[0].road, RoadId(1000));

    let text = snapshot.to_string();
    assert!(text.starts_with("STATE 0.1\n"));
    assert!(text.contains("V 1 1000 1.00\n"));
    assert!(text.contains("L 1 1000\n"));
    assert!(text.contains("L 0 1001\n"));
    assert!(text.ends_with("END_STATE"));
}

#[test]
fn test_reporter_keeps_its_own_cadence() {
    let mut world = corridor_world();
    let mut reporter = SnapshotReporter::new(0.5);

    let mut reported_at = Vec::new();
    for _ in 0..12 {
        world.advance_one_tick();
        if let Some(snapshot) = reporter.poll(&world) {
            reported_at.push(snapshot.time);
        }
    }

    assert_eq!(reported_at.len(), 3);
    assert!((reported_at[0] - 0.1).abs() < 1e-9);
    assert!((reported_at[1] - 0.6).abs() < 1e-9);
    assert!((reported_at[2] - 1.1).abs() < 1e-9);
}

#[test]
fn test_grid_layout_numbering() {
    let mut world = SimWorld::new_with_seed(0);
    let layout = GridLayout::default();
    layout.build(&mut world).unwrap();

    assert_eq!(world.intersections.len(), 16);
    // 2 directions x (4 rows x 3 + 3 rows x 4) links
    assert_eq!(world.road_network.road_count(), 48);

    let first = world.road(RoadId(GRID_ROAD_ID_BASE)).unwrap();
    assert_eq!(first.start_intersection, IntersectionId(0));
    assert_eq!(first.end_intersection, IntersectionId(1));
    let south = world.road(RoadId(GRID_ROAD_ID_BASE + 2)).unwrap();
    assert_eq!(south.end_intersection, IntersectionId(4));

    let corner = world.intersection(IntersectionId(15)).unwrap();
    assert_eq!(corner.position.x, 650.0);
    assert_eq!(corner.incoming.len(), 2);
    assert_eq!(corner.outgoing.len(), 2);
}

#[test]
fn test_event_queue_orders_by_time_then_insertion() {
    let mut queue = EventQueue::new();
    queue.schedule(5.0, EventKind::SignalReevaluation, IntersectionId(1));
    queue.schedule(0.0, EventKind::SignalReevaluation, IntersectionId(2));
    queue.schedule(5.0, EventKind::SignalReevaluation, IntersectionId(3));
    queue.schedule(0.0, EventKind::SignalReevaluation, IntersectionId(4));

    let due_now: Vec<u32> = std::iter::from_fn(|| queue.pop_due(0.0))
        .map(|event| event.intersection.0)
        .collect();
    assert_eq!(due_now, vec![2, 4]);
    assert_eq!(queue.next_time(), Some(5.0));
    assert!(queue.pop_due(4.9).is_none());

    let later: Vec<u32> = std::iter::from_fn(|| queue.pop_due(5.0))
        .map(|event| event.intersection.0)
        .collect();
    assert_eq!(later, vec![1, 3]);
    assert!(queue.is_empty());
}
