//! Standalone traffic simulation module
//!
//! Roads, vehicles and signalised intersections advanced by a hybrid
//! event/fixed-tick engine. Everything here is single-threaded and
//! deterministic for a given RNG seed.

mod config;
mod error;
mod event_queue;
mod grid;
mod intersection;
mod report;
mod road;
mod road_network;
mod signal;
mod stats;
mod types;
mod vehicle;
mod world;

pub use config::SimConfig;
pub use error::{SimError, SimResult};
pub use event_queue::{Event, EventKind, EventQueue};
pub use grid::{spawn_random_fleet, GridLayout, GRID_ROAD_ID_BASE};
pub use intersection::SimIntersection;
pub use report::{NetworkSnapshot, SignalState, SnapshotReporter, StaticTopology, VehicleState};
pub use road::SimRoad;
pub use road_network::{Route, SimRoadNetwork};
pub use signal::{
    Approach, LongestQueue, PriorityRoundRobin, SignalDecision, SignalPolicy, SignalPolicyKind,
};
pub use stats::SimulationStats;
pub use types::{
    IntersectionId, Position, RoadId, VehicleId, DEFAULT_ROAD_CAPACITY, MAX_CONGESTION_FACTOR,
};
pub use vehicle::SimVehicle;
pub use world::SimWorld;
