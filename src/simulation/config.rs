//! Engine parameters.

use super::error::{SimError, SimResult};
use super::signal::SignalPolicyKind;
use super::types::DEFAULT_ROAD_CAPACITY;

#[derive(Debug, Clone, PartialEq)]
pub struct SimConfig {
    /// Simulated seconds per tick
    pub time_step: f64,
    /// Seconds between two signal reevaluations at the same intersection
    pub signal_interval: f64,
    /// Cruising speed of every vehicle, in metres per second
    pub vehicle_speed: f64,
    /// How far past the stop line a front vehicle may roll while green
    pub green_overrun: f64,
    pub vehicle_length: f64,
    pub min_gap: f64,
    pub default_capacity: u32,
    pub signal_policy: SignalPolicyKind,
    /// Origin/destination draws tried when recycling before giving up
    pub max_trip_attempts: u32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            time_step: 0.1,
            signal_interval: 5.0,
            vehicle_speed: 10.0,
            green_overrun: 100.0,
            vehicle_length: 4.0,
            min_gap: 2.0,
            default_capacity: DEFAULT_ROAD_CAPACITY,
            signal_policy: SignalPolicyKind::default(),
            max_trip_attempts: 8,
        }
    }
}

impl SimConfig {
    pub fn validate(&self) -> SimResult<()> {
        let positive = [
            ("time_step", self.time_step),
            ("signal_interval", self.signal_interval),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(SimError::Config(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }

        let non_negative = [
            ("vehicle_speed", self.vehicle_speed),
            ("green_overrun", self.green_overrun),
            ("vehicle_length", self.vehicle_length),
            ("min_gap", self.min_gap),
        ];
        for (name, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(SimError::Config(format!(
                    "{name} must not be negative, got {value}"
                )));
            }
        }

        if self.default_capacity == 0 {
            return Err(SimError::Config(
                "default_capacity must be at least 1".to_string(),
            ));
        }
        if self.max_trip_attempts == 0 {
            return Err(SimError::Config(
                "max_trip_attempts must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
