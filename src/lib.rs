//! Traffic Simulation Library
//!
//! A microscopic traffic simulator: congestion-aware routing, signalised
//! intersections and car-following on a road graph, runnable headless.

pub mod simulation;
