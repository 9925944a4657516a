//! Directed road segments and their congestion-dependent cost.

use std::collections::VecDeque;

use super::error::{SimError, SimResult};
use super::types::{IntersectionId, RoadId, VehicleId, MAX_CONGESTION_FACTOR};

/// A one-way road between two intersections
#[derive(Debug, Clone)]
pub struct SimRoad {
    pub id: RoadId,
    pub start_intersection: IntersectionId,
    pub end_intersection: IntersectionId,
    pub length: f64,
    pub speed_limit: f64,
    pub capacity: u32,
    /// Vehicles in physical order, front is closest to `end_intersection`
    queue: VecDeque<VehicleId>,
}

impl SimRoad {
    /// Build a road, rejecting geometry that would make its weight undefined.
    pub fn new(
        id: RoadId,
        start_intersection: IntersectionId,
        end_intersection: IntersectionId,
        length: f64,
        speed_limit: f64,
        capacity: u32,
    ) -> SimResult<Self> {
        if !(speed_limit.is_finite() && speed_limit > 0.0) {
            return Err(SimError::Config(format!(
                "road {id}: speed limit must be positive, got {speed_limit}"
            )));
        }
        if !(length.is_finite() && length > 0.0) {
            return Err(SimError::Config(format!(
                "road {id}: length must be positive, got {length}"
            )));
        }
        if capacity == 0 {
            return Err(SimError::Config(format!(
                "road {id}: capacity must be at least 1"
            )));
        }

        Ok(Self {
            id,
            start_intersection,
            end_intersection,
            length,
            speed_limit,
            capacity,
            queue: VecDeque::new(),
        })
    }

    pub fn queue_length(&self) -> usize {
        self.queue.len()
    }

    /// Occupancy over capacity, clamped to `[0, MAX_CONGESTION_FACTOR]`
    pub fn congestion_factor(&self) -> f64 {
        if self.capacity == 0 {
            return 0.0;
        }
        let factor = self.queue.len() as f64 / self.capacity as f64;
        factor.clamp(0.0, MAX_CONGESTION_FACTOR)
    }

    /// Traversal cost used as the router's edge weight
    pub fn dynamic_weight(&self) -> f64 {
        self.length / (self.speed_limit * (1.0 - self.congestion_factor()))
    }

    pub fn queue(&self) -> &VecDeque<VehicleId> {
        &self.queue
    }

    pub fn front(&self) -> Option<VehicleId> {
        self.queue.front().copied()
    }

    /// The last vehicle to have entered the road
    pub fn tail(&self) -> Option<VehicleId> {
        self.queue.back().copied()
    }

    pub fn push_back(&mut self, vehicle_id: VehicleId) {
        self.queue.push_back(vehicle_id);
    }

    pub fn pop_front(&mut self) -> Option<VehicleId> {
        self.queue.pop_front()
    }
}
