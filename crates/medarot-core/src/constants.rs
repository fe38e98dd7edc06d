//! Simulation constants.

/// Simulation tick rate (Hz).
pub const TICK_RATE: u32 = 60;

/// Maximum combatants per team.
pub const TEAM_SIZE: usize = 3;

/// Gauge value when a charge or cooldown completes.
pub const GAUGE_FULL: f64 = 100.0;

/// Lower bound on the gauge speed divisor so slow legs never stall a gauge.
pub const MIN_GAUGE_SPEED_FACTOR: f64 = 0.1;

/// Stat value at which legs neither speed up nor slow down a gauge.
pub const NEUTRAL_GAUGE_STAT: f64 = 50.0;

// --- Attack axis (normalized battlefield x, 0.0 = left edge, 1.0 = right edge) ---

/// Home line of team one.
pub const TEAM_ONE_HOME_X: f64 = 0.1;

/// Execution line of team one.
pub const TEAM_ONE_EXECUTION_X: f64 = 0.4;

/// Home line of team two.
pub const TEAM_TWO_HOME_X: f64 = 0.9;

/// Execution line of team two.
pub const TEAM_TWO_EXECUTION_X: f64 = 0.6;

// --- Event bus ---

/// Capacity of the simulation-to-presentation queue.
pub const OUTBOUND_EVENT_CAPACITY: usize = 512;

/// Capacity of the presentation-to-simulation queue.
pub const INBOUND_EVENT_CAPACITY: usize = 64;

/// Name of the personality used when a medal's id is unknown.
pub const FALLBACK_PERSONALITY: &str = "Leader";
