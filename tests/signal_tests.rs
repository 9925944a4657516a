//! Signal policies, both in isolation and driven by the world

use grid_traffic_sim::simulation::{
    Approach, IntersectionId, LongestQueue, PriorityRoundRobin, RoadId, SignalDecision,
    SignalPolicy, SignalPolicyKind, SimConfig, SimWorld,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn approaches(queues: &[usize]) -> Vec<Approach> {
    queues
        .iter()
        .enumerate()
        .map(|(index, &queue_length)| Approach {
            road: RoadId(index as u32 + 1),
            queue_length,
            has_emergency: false,
        })
        .collect()
}

#[test]
fn test_round_robin_picks_first_non_empty_after_current() {
    let decision = PriorityRoundRobin.decide(&approaches(&[0, 0, 5]), Some(0));
    assert_eq!(
        decision,
        Some(SignalDecision {
            index: 2,
            preempted: false
        })
    );
}

#[test]
fn test_round_robin_wraps_around() {
    let decision = PriorityRoundRobin.decide(&approaches(&[3, 0, 4]), Some(2));
    assert_eq!(decision.map(|d| d.index), Some(0));
}

#[test]
fn test_round_robin_cycles_through_empty_roads() {
    let roads = approaches(&[0, 0, 0]);
    assert_eq!(PriorityRoundRobin.decide(&roads, None).map(|d| d.index), Some(0));
    assert_eq!(PriorityRoundRobin.decide(&roads, Some(0)).map(|d| d.index), Some(1));
    assert_eq!(PriorityRoundRobin.decide(&roads, Some(2)).map(|d| d.index), Some(0));
}

#[test]
fn test_emergency_preempts_rotation_and_queue_lengths() {
    let mut roads = approaches(&[9, 0, 2, 7]);
    roads[2].has_emergency = true;

    let decision = PriorityRoundRobin.decide(&roads, Some(2));
    assert_eq!(
        decision,
        Some(SignalDecision {
            index: 2,
            preempted: true
        })
    );

    // The first emergency road in incoming order wins
    roads[3].has_emergency = true;
    assert_eq!(PriorityRoundRobin.decide(&roads, Some(0)).map(|d| d.index), Some(2));
}

#[test]
fn test_policies_report_no_road_without_incoming_roads() {
    assert_eq!(PriorityRoundRobin.decide(&[], None), None);
    assert_eq!(PriorityRoundRobin.decide(&[], Some(0)), None);
    assert_eq!(LongestQueue.decide(&[], None), None);
}

#[test]
fn test_longest_queue_prefers_strictly_longest_first_on_ties() {
    assert_eq!(LongestQueue.decide(&approaches(&[3, 7, 7]), None).map(|d| d.index), Some(1));
    assert_eq!(LongestQueue.decide(&approaches(&[2, 1, 0]), Some(2)).map(|d| d.index), Some(0));
}

#[test]
fn test_longest_queue_holds_green_when_all_empty() {
    let roads = approaches(&[0, 0, 0]);
    assert_eq!(LongestQueue.decide(&roads, Some(2)).map(|d| d.index), Some(2));
    assert_eq!(LongestQueue.decide(&roads, None).map(|d| d.index), Some(0));
}

#[test]
fn test_policy_kind_parses_cli_names() {
    assert_eq!("round-robin".parse::<SignalPolicyKind>(), Ok(SignalPolicyKind::RoundRobin));
    assert_eq!("longest-queue".parse::<SignalPolicyKind>(), Ok(SignalPolicyKind::LongestQueue));
    assert!("fixed-time".parse::<SignalPolicyKind>().is_err());
    assert_eq!(SignalPolicyKind::default().to_string(), "round-robin");
}

/// Two approaches into intersection 2: road 1 from intersection 0, road 2
/// from intersection 1.
fn merge_world(config: SimConfig) -> SimWorld {
    let mut world = SimWorld::with_config(config, StdRng::seed_from_u64(3)).unwrap();
    world.add_intersection(0, 0.0, 0.0).unwrap();
    world.add_intersection(1, 0.0, 100.0).unwrap();
    world.add_intersection(2, 100.0, 50.0).unwrap();
    world.add_road(1, 0, 2, 100.0, 10.0).unwrap();
    world.add_road(2, 1, 2, 100.0, 10.0).unwrap();
    world
}

#[test]
fn test_world_emergency_vehicle_takes_green() {
    let mut world = merge_world(SimConfig::default());
    world.spawn_vehicle(1, 0, 2, false, 0.0).unwrap();
    world.spawn_vehicle(2, 0, 2, false, 0.0).unwrap();
    world.spawn_vehicle(3, 1, 2, true, 0.0).unwrap();

    world.advance_one_tick();
    let junction = world.intersection(IntersectionId(2)).unwrap();
    assert_eq!(junction.green_road(), Some(RoadId(1)));

    let green = world.reevaluate_signal(IntersectionId(2));
    assert_eq!(green, Some(RoadId(2)));
    assert_eq!(world.stats.emergency_preemptions, 1);
    assert_eq!(
        world.intersection(IntersectionId(2)).unwrap().last_change_time,
        world.time()
    );
}

#[test]
fn test_world_signal_without_incoming_roads_stays_dark() {
    let mut world = merge_world(SimConfig::default());
    world.run(12.0);

    for id in [0, 1] {
        let intersection = world.intersection(IntersectionId(id)).unwrap();
        assert_eq!(intersection.green, None);
        assert_eq!(intersection.green_road(), None);
    }
    // Still rescheduled every interval
    assert_eq!(world.pending_events(), 3);
}

#[test]
fn test_world_longest_queue_policy_is_selectable() {
    let config = SimConfig {
        signal_policy: SignalPolicyKind::LongestQueue,
        ..SimConfig::default()
    };
    let mut world = merge_world(config);
    assert_eq!(world.policy_name(), "longest-queue");

    world.spawn_vehicle(1, 1, 2, false, 0.0).unwrap();
    world.advance_one_tick();
    // Decided at t=0 with both roads empty
    assert_eq!(world.intersection(IntersectionId(2)).unwrap().green_road(), Some(RoadId(1)));

    assert_eq!(world.reevaluate_signal(IntersectionId(2)), Some(RoadId(2)));
}
