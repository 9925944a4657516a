//! Traffic signal decision policies.
//!
//! A policy only sees a summary of each incoming road ([`Approach`]) and the
//! index of the road that is green right now. Which policy runs is chosen
//! once per world through [`SignalPolicyKind`].

use std::fmt;
use std::str::FromStr;

use super::types::RoadId;

/// What a policy knows about one incoming road
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Approach {
    pub road: RoadId,
    pub queue_length: usize,
    /// Any vehicle queued on the road carries the emergency flag
    pub has_emergency: bool,
}

/// The incoming road a policy grants green to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignalDecision {
    /// Index into the intersection's incoming roads
    pub index: usize,
    /// The grant was forced by an emergency vehicle
    pub preempted: bool,
}

pub trait SignalPolicy: fmt::Debug {
    fn name(&self) -> &'static str;

    /// Choose the next green road. Returns `None` when there is no incoming
    /// road, in which case the signal stays as it is.
    fn decide(&self, approaches: &[Approach], current: Option<usize>) -> Option<SignalDecision>;
}

/// Round-robin over non-empty roads, overridden by any emergency vehicle.
///
/// The scan starts one past the current green road. When every road is
/// empty the next road in rotation gets green anyway, so an idle
/// intersection keeps cycling.
#[derive(Debug, Default, Clone, Copy)]
pub struct PriorityRoundRobin;

impl SignalPolicy for PriorityRoundRobin {
    fn name(&self) -> &'static str {
        "round-robin"
    }

    fn decide(&self, approaches: &[Approach], current: Option<usize>) -> Option<SignalDecision> {
        if let Some(index) = approaches.iter().position(|a| a.has_emergency) {
            return Some(SignalDecision {
                index,
                preempted: true,
            });
        }

        let count = approaches.len();
        if count == 0 {
            return None;
        }

        let start = current.map_or(0, |index| (index + 1) % count);
        let index = (0..count)
            .map(|offset| (start + offset) % count)
            .find(|&index| approaches[index].queue_length > 0)
            .unwrap_or(start);

        Some(SignalDecision {
            index,
            preempted: false,
        })
    }
}

/// Green goes to the strictly longest queue; ties keep the earliest road.
///
/// With every road empty an existing green is held, otherwise the first
/// road is picked.
#[derive(Debug, Default, Clone, Copy)]
pub struct LongestQueue;

impl SignalPolicy for LongestQueue {
    fn name(&self) -> &'static str {
        "longest-queue"
    }

    fn decide(&self, approaches: &[Approach], current: Option<usize>) -> Option<SignalDecision> {
        let first = approaches.first()?;

        let mut best = 0;
        let mut best_length = first.queue_length;
        for (index, approach) in approaches.iter().enumerate().skip(1) {
            if approach.queue_length > best_length {
                best = index;
                best_length = approach.queue_length;
            }
        }

        let index = match current {
            Some(green) if best_length == 0 && green < approaches.len() => green,
            _ => best,
        };

        Some(SignalDecision {
            index,
            preempted: false,
        })
    }
}

/// Selects the policy a world is built with
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum SignalPolicyKind {
    #[default]
    RoundRobin,
    LongestQueue,
}

impl SignalPolicyKind {
    pub fn build(self) -> Box<dyn SignalPolicy> {
        match self {
            SignalPolicyKind::RoundRobin => Box::new(PriorityRoundRobin),
            SignalPolicyKind::LongestQueue => Box::new(LongestQueue),
        }
    }
}

impl FromStr for SignalPolicyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "round-robin" => Ok(SignalPolicyKind::RoundRobin),
            "longest-queue" => Ok(SignalPolicyKind::LongestQueue),
            other => Err(format!(
                "unknown signal policy '{other}', expected 'round-robin' or 'longest-queue'"
            )),
        }
    }
}

impl fmt::Display for SignalPolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.build().name())
    }
}
