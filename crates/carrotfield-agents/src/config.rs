//! Tunable think-times and radii for the behaviour loops.
//!
//! The controller derives a [`BehaviorConfig`] from the simulation
//! configuration at `start()` and shares it with every task it launches.
//! Values are fixed for the lifetime of a run.

use std::time::Duration;

/// Timing and range parameters read by the actor loops.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BehaviorConfig {
    /// How long a producer spends repairing a damaged cell (default: 3s).
    pub repair_duration: Duration,

    /// How long a producer spends planting an empty cell (default: 2s).
    pub plant_duration: Duration,

    /// Pause at the end of each producer iteration (default: 1s).
    pub patrol_interval: Duration,

    /// Chebyshev radius a producer scans for consumers to report to its
    /// protector (default: 3).
    pub alert_radius: u32,

    /// How long a consumer spends eating a ready cell (default: 500ms).
    pub eating_duration: Duration,

    /// Pause at the end of each consumer iteration (default: 1s).
    pub consumer_move_interval: Duration,

    /// Chebyshev radius a protector scans when it has no target (default: 5).
    pub detection_range: u32,

    /// Pause at the end of each protector iteration (default: 800ms).
    pub protector_interval: Duration,
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            repair_duration: Duration::from_millis(3000),
            plant_duration: Duration::from_millis(2000),
            patrol_interval: Duration::from_millis(1000),
            alert_radius: 3,
            eating_duration: Duration::from_millis(500),
            consumer_move_interval: Duration::from_millis(1000),
            detection_range: 5,
            protector_interval: Duration::from_millis(800),
        }
    }
}
