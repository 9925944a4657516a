//! Error type for the simulation engine.
//!
//! Only construction can fail. Everything that goes wrong while ticking is
//! logged and absorbed so the simulation stays continuable.

use thiserror::Error;

use super::types::{IntersectionId, RoadId, VehicleId};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    /// Rejected road or engine parameters.
    #[error("configuration error: {0}")]
    Config(String),

    #[error("no route from intersection {from} to intersection {to}")]
    Unreachable {
        from: IntersectionId,
        to: IntersectionId,
    },

    #[error("intersection {0} not found")]
    MissingIntersection(IntersectionId),

    #[error("road {0} not found")]
    MissingRoad(RoadId),

    #[error("vehicle {0} not found")]
    MissingVehicle(VehicleId),

    #[error("{kind} {id} already exists")]
    DuplicateId { kind: &'static str, id: u32 },
}

pub type SimResult<T> = Result<T, SimError>;
