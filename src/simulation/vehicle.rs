//! Vehicle agents and their route bookkeeping.

use super::types::{IntersectionId, RoadId, VehicleId};

/// A vehicle in the traffic simulation
#[derive(Debug, Clone)]
pub struct SimVehicle {
    pub id: VehicleId,
    /// Emergency vehicles preempt the signal at every intersection they approach
    pub is_emergency: bool,
    pub origin: IntersectionId,
    pub destination: IntersectionId,
    /// Intersections from origin to destination, inclusive
    pub route: Vec<IntersectionId>,
    /// Index into `route` of the start of the road currently occupied
    pub progress: usize,
    /// The road the vehicle is queued on while moving
    pub current_road: Option<RoadId>,
    /// Distance travelled along the current road
    pub position: f64,
    pub is_moving: bool,
    pub length: f64,
    pub min_gap: f64,
    pub spawn_time: f64,
    pub arrival_time: Option<f64>,
    pub trips_completed: u32,
}

impl SimVehicle {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: VehicleId,
        origin: IntersectionId,
        destination: IntersectionId,
        is_emergency: bool,
        spawn_time: f64,
        route: Vec<IntersectionId>,
        length: f64,
        min_gap: f64,
    ) -> Self {
        Self {
            id,
            is_emergency,
            origin,
            destination,
            route,
            progress: 0,
            current_road: None,
            position: 0.0,
            is_moving: false,
            length,
            min_gap,
            spawn_time,
            arrival_time: None,
            trips_completed: 0,
        }
    }

    /// A route with fewer than two intersections has no road to drive on.
    pub fn is_routed(&self) -> bool {
        self.route.len() >= 2
    }

    /// Endpoints of the road the vehicle occupies (or will enter first)
    pub fn current_leg(&self) -> Option<(IntersectionId, IntersectionId)> {
        let from = *self.route.get(self.progress)?;
        let to = *self.route.get(self.progress + 1)?;
        Some((from, to))
    }

    /// Endpoints of the road after the current one, `None` at the last leg
    pub fn next_leg(&self) -> Option<(IntersectionId, IntersectionId)> {
        let from = *self.route.get(self.progress + 1)?;
        let to = *self.route.get(self.progress + 2)?;
        Some((from, to))
    }

    /// Space the vehicle needs behind the tail of a road before it may enter
    pub fn entry_clearance(&self) -> f64 {
        self.length + self.min_gap
    }

    /// Install a fresh trip, ready to be admitted at `spawn_time`
    pub fn assign_trip(
        &mut self,
        origin: IntersectionId,
        destination: IntersectionId,
        route: Vec<IntersectionId>,
        spawn_time: f64,
    ) {
        self.origin = origin;
        self.destination = destination;
        self.route = route;
        self.progress = 0;
        self.current_road = None;
        self.position = 0.0;
        self.is_moving = false;
        self.spawn_time = spawn_time;
        self.arrival_time = None;
    }
}
