//! Read-only views of the world for printing and visualisation.
//!
//! The `Display` impls produce the line format consumed by the visualizer:
//!
//! ```text
//! NODES            STATE <time>
//! <id> <x> <y>     V <vehicle> <road> <position>
//! EDGES            L <intersection> <green road or -1>
//! <id> <src> <dst> END_STATE
//! END_GRAPH
//! ```

use std::fmt;

use super::types::{IntersectionId, Position, RoadId, VehicleId};
use super::world::SimWorld;

/// Static layout: every intersection and road endpoint pair
#[derive(Debug, Clone, PartialEq)]
pub struct StaticTopology {
    pub nodes: Vec<(IntersectionId, Position)>,
    pub edges: Vec<(RoadId, IntersectionId, IntersectionId)>,
}

impl StaticTopology {
    pub fn capture(world: &SimWorld) -> Self {
        let nodes = world
            .road_network
            .intersection_positions()
            .iter()
            .map(|(id, position)| (*id, *position))
            .collect();
        let edges = world
            .road_network
            .roads()
            .values()
            .map(|road| (road.id, road.start_intersection, road.end_intersection))
            .collect();
        Self { nodes, edges }
    }
}

impl fmt::Display for StaticTopology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "NODES")?;
        for (id, position) in &self.nodes {
            writeln!(f, "{} {} {}", id, position.x, position.y)?;
        }
        writeln!(f, "EDGES")?;
        for (id, start, end) in &self.edges {
            writeln!(f, "{} {} {}", id, start, end)?;
        }
        write!(f, "END_GRAPH")
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VehicleState {
    pub id: VehicleId,
    pub road: RoadId,
    pub position: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignalState {
    pub intersection: IntersectionId,
    pub green_road: Option<RoadId>,
}

/// Moving vehicles and signal states at one instant
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkSnapshot {
    pub time: f64,
    pub vehicles: Vec<VehicleState>,
    pub signals: Vec<SignalState>,
}

impl NetworkSnapshot {
    pub fn capture(world: &SimWorld) -> Self {
        let vehicles = world
            .vehicles
            .values()
            .filter(|vehicle| vehicle.is_moving)
            .filter_map(|vehicle| {
                Some(VehicleState {
                    id: vehicle.id,
                    road: vehicle.current_road?,
                    position: vehicle.position,
                })
            })
            .collect();
        let signals = world
            .intersections
            .values()
            .map(|intersection| SignalState {
                intersection: intersection.id,
                green_road: intersection.green_road(),
            })
            .collect();

        Self {
            time: world.time(),
            vehicles,
            signals,
        }
    }
}

impl fmt::Display for NetworkSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "STATE {:.1}", self.time)?;
        for vehicle in &self.vehicles {
            writeln!(f, "V {} {} {:.2}", vehicle.id, vehicle.road, vehicle.position)?;
        }
        for signal in &self.signals {
            match signal.green_road {
                Some(road) => writeln!(f, "L {} {}", signal.intersection, road)?,
                None => writeln!(f, "L {} -1", signal.intersection)?,
            }
        }
        write!(f, "END_STATE")
    }
}

/// Decides when the next periodic snapshot is due
#[derive(Debug, Clone)]
pub struct SnapshotReporter {
    pub interval: f64,
    last_report: Option<f64>,
}

impl SnapshotReporter {
    pub fn new(interval: f64) -> Self {
        Self {
            interval,
            last_report: None,
        }
    }

    /// Returns a snapshot if at least `interval` seconds passed since the last one
    pub fn poll(&mut self, world: &SimWorld) -> Option<NetworkSnapshot> {
        let now = world.time();
        if let Some(last) = self.last_report {
            // Small tolerance so 0.1 s steps land on a 0.5 s cadence.
            if now - last + 1e-9 < self.interval {
                return None;
            }
        }
        self.last_report = Some(now);
        Some(NetworkSnapshot::capture(world))
    }
}
