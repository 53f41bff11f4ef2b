use tracing::Level;

// No slow start threshold goes below this many segments.
pub const MIN_SSTHRESH_SEGMENTS: usize = 2;

// Westwood+ Tustin low-pass filter gain.
pub const TUSTIN_FILTER_GAIN: f64 = 0.9;

pub const CONGESTION_TRACING_LOG_LEVEL: Level = Level::DEBUG;
pub const BANDWIDTH_TRACING_LOG_LEVEL: Level = Level::TRACE;

// Per-ACK events are logged at most this often (per callsite).
pub const ACK_TRACING_INTERVAL_MS: u64 = 500;
