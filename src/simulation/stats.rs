//! Counters the engine keeps for end-of-run reporting.

use log::info;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimulationStats {
    /// Vehicles that entered their first road
    pub vehicles_admitted: u64,
    /// Vehicles handed from one road to the next
    pub road_transfers: u64,
    pub trips_completed: u64,
    pub emergency_trips_completed: u64,
    /// Sum of (arrival - spawn) over completed trips
    pub total_travel_time: f64,
    /// Decisions where an emergency vehicle moved the green to another road
    pub emergency_preemptions: u64,
    pub signal_changes: u64,
    /// Trips that could not be routed and were left parked
    pub unroutable_trips: u64,
}

impl SimulationStats {
    pub fn record_trip(&mut self, travel_time: f64, is_emergency: bool) {
        self.trips_completed += 1;
        self.total_travel_time += travel_time;
        if is_emergency {
            self.emergency_trips_completed += 1;
        }
    }

    pub fn average_travel_time(&self) -> Option<f64> {
        if self.trips_completed == 0 {
            return None;
        }
        Some(self.total_travel_time / self.trips_completed as f64)
    }

    pub fn log_summary(&self, elapsed: f64, vehicle_count: usize) {
        info!("=== SIMULATION COMPLETE ===");
        info!("Elapsed time: {:.2}s", elapsed);
        info!("Vehicles: {}", vehicle_count);
        info!("Vehicles admitted: {}", self.vehicles_admitted);
        info!("Road transfers: {}", self.road_transfers);
        info!("Trips completed: {}", self.trips_completed);
        info!(
            "Emergency trips completed: {}",
            self.emergency_trips_completed
        );
        match self.average_travel_time() {
            Some(average) => info!("Average travel time: {:.2}s", average),
            None => info!("Average travel time: n/a"),
        }
        info!("Emergency preemptions: {}", self.emergency_preemptions);
        info!("Signal changes: {}", self.signal_changes);
        info!("Unroutable trips: {}", self.unroutable_trips);
    }
}
