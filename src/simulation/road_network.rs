//! Road network graph for pathfinding
//!
//! Owns the static topology (a petgraph directed graph keyed by intersection
//! id) together with the road segments themselves, so route searches can read
//! each road's live congestion while walking the graph.

use petgraph::algo::astar;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use std::collections::{BTreeMap, HashMap};

use super::error::{SimError, SimResult};
use super::road::SimRoad;
use super::types::{IntersectionId, Position, RoadId};

/// A shortest path through the network
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    /// Intersections from origin to destination, inclusive
    pub nodes: Vec<IntersectionId>,
    /// Sum of the dynamic weights of the roads taken
    pub cost: f64,
}

#[derive(Debug, Default)]
pub struct SimRoadNetwork {
    /// The underlying petgraph directed graph (one-way roads)
    graph: DiGraph<IntersectionId, RoadId>,

    /// Maps intersection IDs to their node indices in the graph
    intersection_to_node: HashMap<IntersectionId, NodeIndex>,

    /// Storage for road data, ordered by id so iteration is reproducible
    roads: BTreeMap<RoadId, SimRoad>,

    /// Storage for intersection positions
    intersection_positions: BTreeMap<IntersectionId, Position>,
}

impl SimRoadNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an intersection to the network graph
    pub fn add_intersection(&mut self, intersection_id: IntersectionId, position: Position) {
        if self.intersection_to_node.contains_key(&intersection_id) {
            return;
        }

        let node_index = self.graph.add_node(intersection_id);
        self.intersection_to_node.insert(intersection_id, node_index);
        self.intersection_positions.insert(intersection_id, position);
    }

    pub fn contains_intersection(&self, intersection_id: IntersectionId) -> bool {
        self.intersection_to_node.contains_key(&intersection_id)
    }

    /// Gets the position of an intersection
    pub fn get_intersection_position(&self, intersection_id: IntersectionId) -> Option<&Position> {
        self.intersection_positions.get(&intersection_id)
    }

    /// Adds a road whose endpoints are already in the network
    pub fn add_road(&mut self, road: SimRoad) -> SimResult<()> {
        if self.roads.contains_key(&road.id) {
            return Err(SimError::DuplicateId {
                kind: "road",
                id: road.id.0,
            });
        }

        let start_node = *self
            .intersection_to_node
            .get(&road.start_intersection)
            .ok_or(SimError::MissingIntersection(road.start_intersection))?;
        let end_node = *self
            .intersection_to_node
            .get(&road.end_intersection)
            .ok_or(SimError::MissingIntersection(road.end_intersection))?;

        self.graph.add_edge(start_node, end_node, road.id);
        self.roads.insert(road.id, road);
        Ok(())
    }

    pub fn get_road(&self, road_id: RoadId) -> Option<&SimRoad> {
        self.roads.get(&road_id)
    }

    pub fn get_road_mut(&mut self, road_id: RoadId) -> Option<&mut SimRoad> {
        self.roads.get_mut(&road_id)
    }

    /// Finds the road connecting two intersections
    pub fn find_road_between(
        &self,
        from_intersection: IntersectionId,
        to_intersection: IntersectionId,
    ) -> Option<RoadId> {
        let from_node = self.intersection_to_node.get(&from_intersection)?;
        let to_node = self.intersection_to_node.get(&to_intersection)?;

        self.graph
            .edges(*from_node)
            .find(|edge| edge.target() == *to_node)
            .map(|edge| *edge.weight())
    }

    /// Shortest path by current dynamic road weights.
    ///
    /// Runs A* with a zero heuristic (plain Dijkstra), stopping as soon as the
    /// destination is settled. Weights are read from the roads as they are at
    /// call time; nothing is cached between calls.
    pub fn find_path(&self, start: IntersectionId, end: IntersectionId) -> SimResult<Route> {
        let start_node = *self
            .intersection_to_node
            .get(&start)
            .ok_or(SimError::MissingIntersection(start))?;
        let end_node = *self
            .intersection_to_node
            .get(&end)
            .ok_or(SimError::MissingIntersection(end))?;

        if start == end {
            return Ok(Route {
                nodes: vec![start],
                cost: 0.0,
            });
        }

        let (cost, node_path) = astar(
            &self.graph,
            start_node,
            |node| node == end_node,
            |edge| {
                self.roads
                    .get(edge.weight())
                    .map_or(f64::INFINITY, SimRoad::dynamic_weight)
            },
            |_| 0.0,
        )
        .ok_or(SimError::Unreachable {
            from: start,
            to: end,
        })?;

        if !cost.is_finite() {
            return Err(SimError::Unreachable {
                from: start,
                to: end,
            });
        }

        let nodes = node_path
            .iter()
            .map(|node_idx| self.graph[*node_idx])
            .collect();

        Ok(Route { nodes, cost })
    }

    pub fn road_count(&self) -> usize {
        self.roads.len()
    }

    pub fn intersection_count(&self) -> usize {
        self.intersection_to_node.len()
    }

    pub fn roads(&self) -> &BTreeMap<RoadId, SimRoad> {
        &self.roads
    }

    pub fn road_ids(&self) -> Vec<RoadId> {
        self.roads.keys().copied().collect()
    }

    pub fn intersection_positions(&self) -> &BTreeMap<IntersectionId, Position> {
        &self.intersection_positions
    }
}
