//! Intersection logic for the traffic simulation

use super::signal::SignalDecision;
use super::types::{IntersectionId, Position, RoadId};

/// An intersection with a single-green traffic signal
#[derive(Debug, Clone)]
pub struct SimIntersection {
    pub id: IntersectionId,
    pub position: Position,
    /// Roads ending here, in the order they were added
    pub incoming: Vec<RoadId>,
    /// Roads starting here, in the order they were added
    pub outgoing: Vec<RoadId>,
    /// Index into `incoming` of the road that has right-of-way
    pub green: Option<usize>,
    pub last_change_time: f64,
}

impl SimIntersection {
    pub fn new(id: IntersectionId, position: Position) -> Self {
        Self {
            id,
            position,
            incoming: Vec::new(),
            outgoing: Vec::new(),
            green: None,
            last_change_time: 0.0,
        }
    }

    pub fn green_road(&self) -> Option<RoadId> {
        self.green.and_then(|index| self.incoming.get(index).copied())
    }

    pub fn is_green(&self, road_id: RoadId) -> bool {
        self.green_road() == Some(road_id)
    }

    /// Record a policy decision. Returns `true` if the green road changed.
    pub fn apply(&mut self, decision: SignalDecision, now: f64) -> bool {
        let changed = self.green != Some(decision.index);
        self.green = Some(decision.index);
        self.last_change_time = now;
        changed
    }
}
