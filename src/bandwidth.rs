use std::time::{Duration, Instant};

use crate::constants::{BANDWIDTH_TRACING_LOG_LEVEL, TUSTIN_FILTER_GAIN};

/// Delivery rate in bits per second.
#[derive(Clone, Copy, Default, PartialEq, PartialOrd)]
pub struct Bandwidth(f64);

impl Bandwidth {
    pub const ZERO: Bandwidth = Bandwidth(0.);

    pub fn from_bits_per_sec(bps: f64) -> Self {
        Self(bps.max(0.))
    }

    /// The rate at which `bytes` are delivered over `interval`.
    pub fn from_bytes_over(bytes: u64, interval: Duration) -> Self {
        if interval.is_zero() {
            return Self::ZERO;
        }
        Self(bytes as f64 * 8. / interval.as_secs_f64())
    }

    pub fn bits_per_sec(&self) -> f64 {
        self.0
    }

    /// How many whole bytes get delivered over `interval` at this rate.
    pub fn bytes_in(&self, interval: Duration) -> usize {
        (self.0 * interval.as_secs_f64() / 8.) as usize
    }
}

impl std::fmt::Debug for Bandwidth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.0}bps", self.0)
    }
}

impl std::fmt::Display for Bandwidth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(self, f)
    }
}

/// Low-pass filter applied to raw bandwidth samples.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum FilterType {
    /// Every sample replaces the estimate.
    None,
    /// Bilinear (Tustin) discretization of a first order low-pass filter.
    #[default]
    Tustin,
}

/// How [`WestwoodEstimator`] groups acknowledged bytes into rate samples.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Sampling {
    /// Every update is a sample of its own: the bytes it acknowledged over its RTT.
    PerAck,
    /// Bytes are counted over one RTT worth of time, and each such epoch is one sample.
    #[default]
    Epoch,
}

/// Turns acknowledged bytes and RTT samples into a delivery rate.
///
/// The estimator never reads a clock: the host passes the current time along
/// with every sample.
pub trait BandwidthEstimator: Clone + Send + Sync + core::fmt::Debug {
    fn update(&mut self, now: Instant, rtt: Duration, acked_bytes: u64);

    fn current_estimate(&self) -> Bandwidth;
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Epoch {
    start: Instant,
    rtt: Duration,
}

/// Westwood+ estimator. By default acknowledged bytes are counted over one RTT
/// worth of time, and each such epoch produces one rate sample. See [`Sampling`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WestwoodEstimator {
    filter: FilterType,
    sampling: Sampling,
    epoch: Option<Epoch>,
    acked_bytes: u64,

    estimate: f64,
    last_sample: f64,
}

impl Default for WestwoodEstimator {
    fn default() -> Self {
        Self::new(FilterType::default())
    }
}

impl WestwoodEstimator {
    pub fn new(filter: FilterType) -> Self {
        Self {
            filter,
            sampling: Sampling::default(),
            epoch: None,
            acked_bytes: 0,
            estimate: 0.,
            last_sample: 0.,
        }
    }

    pub fn with_sampling(mut self, sampling: Sampling) -> Self {
        self.sampling = sampling;
        self
    }

    pub fn filter(&self) -> FilterType {
        self.filter
    }

    pub fn sampling(&self) -> Sampling {
        self.sampling
    }

    fn take_sample(&mut self, interval: Duration) {
        let sample = Bandwidth::from_bytes_over(self.acked_bytes, interval).bits_per_sec();
        self.acked_bytes = 0;

        self.estimate = match self.filter {
            FilterType::None => sample,
            FilterType::Tustin => {
                TUSTIN_FILTER_GAIN * self.estimate
                    + (1. - TUSTIN_FILTER_GAIN) * (sample + self.last_sample) / 2.
            }
        };
        self.last_sample = sample;

        tracing::event!(
            BANDWIDTH_TRACING_LOG_LEVEL,
            sample,
            estimate = self.estimate,
            ?interval,
            "westwood: bandwidth sample"
        );
    }
}

impl BandwidthEstimator for WestwoodEstimator {
    fn update(&mut self, now: Instant, rtt: Duration, acked_bytes: u64) {
        if rtt.is_zero() {
            return;
        }

        if self.sampling == Sampling::PerAck {
            self.acked_bytes = self.acked_bytes.saturating_add(acked_bytes);
            self.take_sample(rtt);
            return;
        }

        if let Some(epoch) = self.epoch {
            if now.saturating_duration_since(epoch.start) >= epoch.rtt {
                self.take_sample(epoch.rtt);
                self.epoch = None;
            }
        }

        self.acked_bytes = self.acked_bytes.saturating_add(acked_bytes);
        if self.epoch.is_none() {
            self.epoch = Some(Epoch { start: now, rtt });
        }
    }

    fn current_estimate(&self) -> Bandwidth {
        Bandwidth::from_bits_per_sec(self.estimate)
    }
}
