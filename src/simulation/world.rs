//! Main simulation world that ties everything together
//!
//! Time advances in fixed ticks. Every tick runs four phases in order:
//! due signal events, vehicle admission, motion along road queues (including
//! hand-over between roads), and recycling of vehicles that arrived.

use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

use super::config::SimConfig;
use super::error::{SimError, SimResult};
use super::event_queue::{EventKind, EventQueue};
use super::intersection::SimIntersection;
use super::report::{NetworkSnapshot, StaticTopology};
use super::road::SimRoad;
use super::road_network::SimRoadNetwork;
use super::signal::{Approach, SignalPolicy};
use super::stats::SimulationStats;
use super::types::{IntersectionId, Position, RoadId, VehicleId};
use super::vehicle::SimVehicle;

/// The main simulation world
pub struct SimWorld {
    /// Topology, road segments and the router
    pub road_network: SimRoadNetwork,

    /// All intersections with their signal state
    pub intersections: BTreeMap<IntersectionId, SimIntersection>,

    /// All vehicles, parked or moving
    pub vehicles: BTreeMap<VehicleId, SimVehicle>,

    pub stats: SimulationStats,

    events: EventQueue,
    policy: Box<dyn SignalPolicy>,
    config: SimConfig,
    rng: StdRng,

    /// Completed ticks; the clock is derived from it so it never drifts
    ticks: u64,
    time: f64,
}

impl Default for SimWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl SimWorld {
    fn new_internal(config: SimConfig, rng: StdRng) -> Self {
        let policy = config.signal_policy.build();
        Self {
            road_network: SimRoadNetwork::new(),
            intersections: BTreeMap::new(),
            vehicles: BTreeMap::new(),
            stats: SimulationStats::default(),
            events: EventQueue::new(),
            policy,
            config,
            rng,
            ticks: 0,
            time: 0.0,
        }
    }

    /// Default parameters with an OS-seeded RNG
    pub fn new() -> Self {
        Self::new_internal(SimConfig::default(), StdRng::from_os_rng())
    }

    /// Default parameters with a seeded RNG for reproducible simulations
    pub fn new_with_seed(seed: u64) -> Self {
        Self::new_internal(SimConfig::default(), StdRng::seed_from_u64(seed))
    }

    pub fn with_config(config: SimConfig, rng: StdRng) -> SimResult<Self> {
        config.validate()?;
        Ok(Self::new_internal(config, rng))
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn policy_name(&self) -> &'static str {
        self.policy.name()
    }

    /// Current simulation clock in seconds
    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn pending_events(&self) -> usize {
        self.events.len()
    }

    pub fn vehicle(&self, vehicle_id: VehicleId) -> Option<&SimVehicle> {
        self.vehicles.get(&vehicle_id)
    }

    pub fn road(&self, road_id: RoadId) -> Option<&SimRoad> {
        self.road_network.get_road(road_id)
    }

    pub fn intersection(&self, intersection_id: IntersectionId) -> Option<&SimIntersection> {
        self.intersections.get(&intersection_id)
    }

    pub fn topology(&self) -> StaticTopology {
        StaticTopology::capture(self)
    }

    pub fn snapshot(&self) -> NetworkSnapshot {
        NetworkSnapshot::capture(self)
    }

    /// Add an intersection and schedule its first signal reevaluation
    pub fn add_intersection(&mut self, id: u32, x: f64, y: f64) -> SimResult<IntersectionId> {
        let id = IntersectionId(id);
        if self.intersections.contains_key(&id) {
            return Err(SimError::DuplicateId {
                kind: "intersection",
                id: id.0,
            });
        }

        let position = Position::new(x, y);
        self.intersections
            .insert(id, SimIntersection::new(id, position));
        self.road_network.add_intersection(id, position);
        self.events
            .schedule(self.time, EventKind::SignalReevaluation, id);
        Ok(id)
    }

    /// Add a one-way road with the configured default capacity
    pub fn add_road(
        &mut self,
        id: u32,
        source: u32,
        destination: u32,
        length: f64,
        speed_limit: f64,
    ) -> SimResult<RoadId> {
        let capacity = self.config.default_capacity;
        self.add_road_with_capacity(id, source, destination, length, speed_limit, capacity)
    }

    pub fn add_road_with_capacity(
        &mut self,
        id: u32,
        source: u32,
        destination: u32,
        length: f64,
        speed_limit: f64,
        capacity: u32,
    ) -> SimResult<RoadId> {
        let road_id = RoadId(id);
        let start = IntersectionId(source);
        let end = IntersectionId(destination);

        let road = SimRoad::new(road_id, start, end, length, speed_limit, capacity)?;
        self.road_network.add_road(road)?;

        if let Some(intersection) = self.intersections.get_mut(&start) {
            intersection.outgoing.push(road_id);
        }
        if let Some(intersection) = self.intersections.get_mut(&end) {
            intersection.incoming.push(road_id);
        }
        Ok(road_id)
    }

    /// Register a vehicle that enters the network at `spawn_time`.
    ///
    /// The route is computed immediately. An unreachable destination is not
    /// an error: the vehicle is kept unrouted and never admitted.
    pub fn spawn_vehicle(
        &mut self,
        id: u32,
        start_node: u32,
        dest_node: u32,
        is_emergency: bool,
        spawn_time: f64,
    ) -> SimResult<VehicleId> {
        let vehicle_id = VehicleId(id);
        if self.vehicles.contains_key(&vehicle_id) {
            return Err(SimError::DuplicateId { kind: "vehicle", id });
        }

        let origin = IntersectionId(start_node);
        let destination = IntersectionId(dest_node);
        let route = match self.road_network.find_path(origin, destination) {
            Ok(route) => route.nodes,
            Err(err @ SimError::Unreachable { .. }) => {
                warn!("Vehicle {} left unrouted: {}", vehicle_id, err);
                self.stats.unroutable_trips += 1;
                Vec::new()
            }
            Err(err) => return Err(err),
        };

        let vehicle = SimVehicle::new(
            vehicle_id,
            origin,
            destination,
            is_emergency,
            spawn_time,
            route,
            self.config.vehicle_length,
            self.config.min_gap,
        );
        self.vehicles.insert(vehicle_id, vehicle);
        Ok(vehicle_id)
    }

    /// Run ticks until the clock reaches `duration`. Returns the ticks executed.
    pub fn run(&mut self, duration: f64) -> u64 {
        let stop = AtomicBool::new(false);
        self.run_until(duration, &stop, |_| {})
    }

    /// Like [`SimWorld::run`], checking `stop` between ticks and calling
    /// `on_tick` after each one.
    pub fn run_until<F>(&mut self, duration: f64, stop: &AtomicBool, mut on_tick: F) -> u64
    where
        F: FnMut(&SimWorld),
    {
        info!(
            "Running simulation for {:.1}s ({} intersections, {} roads, {} vehicles, {} signals)",
            duration,
            self.intersections.len(),
            self.road_network.road_count(),
            self.vehicles.len(),
            self.policy.name()
        );

        let mut executed = 0;
        while self.time < duration {
            if stop.load(Ordering::Relaxed) {
                info!("Simulation stopped early at {:.2}s", self.time);
                break;
            }
            self.advance_one_tick();
            executed += 1;
            on_tick(self);
        }
        executed
    }

    /// Execute one full tick at the current clock time, then advance the clock
    pub fn advance_one_tick(&mut self) {
        let now = self.time;

        self.process_due_events(now);
        self.admit_vehicles(now);
        self.update_motion(now);

        self.ticks += 1;
        self.time = self.ticks as f64 * self.config.time_step;
    }

    pub fn log_summary(&self) {
        self.stats.log_summary(self.time, self.vehicles.len());
    }

    fn process_due_events(&mut self, now: f64) {
        while let Some(event) = self.events.pop_due(now) {
            match event.kind {
                EventKind::SignalReevaluation => {
                    if !self.intersections.contains_key(&event.intersection) {
                        warn!(
                            "Dropping signal event for missing intersection {}",
                            event.intersection
                        );
                        continue;
                    }
                    self.decide_signal(event.intersection, now);
                    self.events.schedule(
                        now + self.config.signal_interval,
                        EventKind::SignalReevaluation,
                        event.intersection,
                    );
                }
            }
        }
    }

    /// Ask the signal policy for a new green road at `intersection_id` now.
    /// Returns the road that is green afterwards.
    pub fn reevaluate_signal(&mut self, intersection_id: IntersectionId) -> Option<RoadId> {
        self.decide_signal(intersection_id, self.time)
    }

    fn decide_signal(&mut self, intersection_id: IntersectionId, now: f64) -> Option<RoadId> {
        let approaches = self.approaches(intersection_id)?;
        let intersection = self.intersections.get_mut(&intersection_id)?;

        let Some(decision) = self.policy.decide(&approaches, intersection.green) else {
            return intersection.green_road();
        };

        if intersection.apply(decision, now) {
            self.stats.signal_changes += 1;
            if decision.preempted {
                self.stats.emergency_preemptions += 1;
                debug!(
                    "[t={:.1}] Emergency override at intersection {} for road {}",
                    now, intersection_id, approaches[decision.index].road
                );
            } else {
                debug!(
                    "[t={:.1}] Intersection {} turns road {} green",
                    now, intersection_id, approaches[decision.index].road
                );
            }
        }
        intersection.green_road()
    }

    fn approaches(&self, intersection_id: IntersectionId) -> Option<Vec<Approach>> {
        let intersection = self.intersections.get(&intersection_id)?;
        let approaches = intersection
            .incoming
            .iter()
            .map(|&road_id| match self.road_network.get_road(road_id) {
                Some(road) => Approach {
                    road: road_id,
                    queue_length: road.queue_length(),
                    has_emergency: road.queue().iter().any(|vehicle_id| {
                        self.vehicles
                            .get(vehicle_id)
                            .is_some_and(|vehicle| vehicle.is_emergency)
                    }),
                },
                None => {
                    warn!(
                        "Intersection {} lists missing road {}",
                        intersection_id, road_id
                    );
                    Approach {
                        road: road_id,
                        queue_length: 0,
                        has_emergency: false,
                    }
                }
            })
            .collect();
        Some(approaches)
    }

    fn admit_vehicles(&mut self, now: f64) {
        let waiting: Vec<VehicleId> = self
            .vehicles
            .values()
            .filter(|v| !v.is_moving && v.spawn_time <= now && v.is_routed())
            .map(|v| v.id)
            .collect();

        for vehicle_id in waiting {
            self.try_admit(vehicle_id);
        }
    }

    /// Put a parked vehicle on the first road of its route if the road has room
    fn try_admit(&mut self, vehicle_id: VehicleId) -> bool {
        let Some(vehicle) = self.vehicles.get(&vehicle_id) else {
            return false;
        };
        let Some((from, to)) = vehicle.current_leg() else {
            return false;
        };
        let clearance = vehicle.entry_clearance();

        let Some(road_id) = self.road_network.find_road_between(from, to) else {
            warn!(
                "Vehicle {} has no road from {} to {}",
                vehicle_id, from, to
            );
            return false;
        };
        if !self.has_room(road_id, clearance) {
            return false;
        }

        let (Some(road), Some(vehicle)) = (
            self.road_network.get_road_mut(road_id),
            self.vehicles.get_mut(&vehicle_id),
        ) else {
            return false;
        };
        road.push_back(vehicle_id);
        vehicle.is_moving = true;
        vehicle.position = 0.0;
        vehicle.current_road = Some(road_id);
        self.stats.vehicles_admitted += 1;
        true
    }

    /// Whether the road's tail vehicle is far enough in to fit `clearance` behind it
    fn has_room(&self, road_id: RoadId, clearance: f64) -> bool {
        let Some(road) = self.road_network.get_road(road_id) else {
            return false;
        };
        match road.tail() {
            Some(tail_id) => self
                .vehicles
                .get(&tail_id)
                .is_none_or(|tail| tail.position >= clearance),
            None => true,
        }
    }

    fn is_road_green(&self, road_id: RoadId) -> bool {
        self.road_network
            .get_road(road_id)
            .and_then(|road| self.intersections.get(&road.end_intersection))
            .is_some_and(|intersection| intersection.is_green(road_id))
    }

    fn update_motion(&mut self, now: f64) {
        let step = self.config.vehicle_speed * self.config.time_step;
        for road_id in self.road_network.road_ids() {
            self.advance_queue(road_id, step);
            self.release_front(road_id, now);
        }
    }

    /// Car-following: the front vehicle is held at the stop line unless green,
    /// every other vehicle stays a gap behind its leader.
    fn advance_queue(&mut self, road_id: RoadId, step: f64) {
        let green = self.is_road_green(road_id);
        let overrun = self.config.green_overrun;
        let Some(road) = self.road_network.get_road(road_id) else {
            return;
        };
        let front_limit = if green {
            road.length + overrun
        } else {
            road.length
        };

        let mut leader: Option<(f64, f64)> = None;
        for vehicle_id in road.queue() {
            let Some(vehicle) = self.vehicles.get_mut(vehicle_id) else {
                warn!("Road {} queues missing vehicle {}", road_id, vehicle_id);
                continue;
            };
            let limit = match leader {
                Some((position, length)) => position - length - vehicle.min_gap,
                None => front_limit,
            };
            vehicle.position = (vehicle.position + step).min(limit);
            leader = Some((vehicle.position, vehicle.length));
        }
    }

    /// Hand the front vehicle to its next road, or finish its trip, once it
    /// has reached the end of a green road.
    fn release_front(&mut self, road_id: RoadId, now: f64) {
        let Some(road) = self.road_network.get_road(road_id) else {
            return;
        };
        let road_length = road.length;
        let Some(front_id) = road.front() else {
            return;
        };
        if !self.is_road_green(road_id) {
            return;
        }
        let Some(front) = self.vehicles.get(&front_id) else {
            return;
        };
        if front.position < road_length {
            return;
        }

        match front.next_leg() {
            Some((from, to)) => {
                let clearance = front.entry_clearance();
                match self.road_network.find_road_between(from, to) {
                    Some(next_road) if self.has_room(next_road, clearance) => {
                        self.transfer(front_id, road_id, next_road);
                    }
                    Some(_) => self.hold_at_stop_line(road_id, front_id, road_length),
                    None => {
                        warn!(
                            "Vehicle {} has no road from {} to {}",
                            front_id, from, to
                        );
                        self.hold_at_stop_line(road_id, front_id, road_length);
                    }
                }
            }
            None => {
                if let Some(road) = self.road_network.get_road_mut(road_id) {
                    road.pop_front();
                }
                self.complete_trip(front_id, now);
            }
        }
    }

    /// Pull a front vehicle that rolled past the line back onto it. Followers
    /// were spaced against the rolled position, so their gaps are re-applied.
    fn hold_at_stop_line(&mut self, road_id: RoadId, vehicle_id: VehicleId, road_length: f64) {
        if let Some(vehicle) = self.vehicles.get_mut(&vehicle_id) {
            vehicle.position = road_length;
        }

        let Some(road) = self.road_network.get_road(road_id) else {
            return;
        };
        let mut leader: Option<(f64, f64)> = None;
        for vehicle_id in road.queue() {
            let Some(vehicle) = self.vehicles.get_mut(vehicle_id) else {
                continue;
            };
            if let Some((position, length)) = leader {
                vehicle.position = vehicle.position.min(position - length - vehicle.min_gap);
            }
            leader = Some((vehicle.position, vehicle.length));
        }
    }

    fn transfer(&mut self, vehicle_id: VehicleId, from_road: RoadId, to_road: RoadId) {
        if let Some(road) = self.road_network.get_road_mut(from_road) {
            road.pop_front();
        }
        if let Some(road) = self.road_network.get_road_mut(to_road) {
            road.push_back(vehicle_id);
        }
        if let Some(vehicle) = self.vehicles.get_mut(&vehicle_id) {
            vehicle.progress += 1;
            vehicle.position = 0.0;
            vehicle.current_road = Some(to_road);
        }
        self.stats.road_transfers += 1;
    }

    fn complete_trip(&mut self, vehicle_id: VehicleId, now: f64) {
        let Some(vehicle) = self.vehicles.get_mut(&vehicle_id) else {
            return;
        };
        vehicle.arrival_time = Some(now);
        vehicle.trips_completed += 1;
        self.stats
            .record_trip(now - vehicle.spawn_time, vehicle.is_emergency);
        debug!(
            "[t={:.1}] Vehicle {} arrived at {} after {:.1}s",
            now,
            vehicle_id,
            vehicle.destination,
            now - vehicle.spawn_time
        );

        self.recycle(vehicle_id, now);
    }

    /// Give an arrived vehicle a new random trip, ready to enter at `now`
    fn recycle(&mut self, vehicle_id: VehicleId, now: f64) {
        let candidates: Vec<IntersectionId> = self.intersections.keys().copied().collect();
        let mut trip = None;
        let mut last_draw = None;

        if candidates.len() >= 2 {
            for _ in 0..self.config.max_trip_attempts {
                let origin = candidates[self.rng.random_range(0..candidates.len())];
                let mut destination = origin;
                while destination == origin {
                    destination = candidates[self.rng.random_range(0..candidates.len())];
                }
                last_draw = Some((origin, destination));

                match self.road_network.find_path(origin, destination) {
                    Ok(route) => {
                        trip = Some((origin, destination, route.nodes));
                        break;
                    }
                    Err(err) => debug!("Redrawing trip for vehicle {}: {}", vehicle_id, err),
                }
            }
        }

        let Some(vehicle) = self.vehicles.get_mut(&vehicle_id) else {
            return;
        };
        match trip {
            Some((origin, destination, route)) => {
                vehicle.assign_trip(origin, destination, route, now);
            }
            None => {
                let (origin, destination) =
                    last_draw.unwrap_or((vehicle.destination, vehicle.destination));
                warn!(
                    "Vehicle {} could not be given a reachable trip, parking it",
                    vehicle_id
                );
                vehicle.assign_trip(origin, destination, Vec::new(), now);
                self.stats.unroutable_trips += 1;
            }
        }
    }
}
