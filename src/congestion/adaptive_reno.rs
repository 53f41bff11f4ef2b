//! TCP Adaptive Reno.
//!
//! The congestion window is split into two parts. The base window grows like
//! NewReno. The probe window grows by an amount shaped by how congested the
//! path looks: close to the Westwood+ bandwidth estimate when the RTT sits at
//! its minimum, close to nothing when the RTT is back at the level it had at
//! recent congestion events. The same congestion level scales the back-off on
//! congestion events, from none at all to halving.

use std::{sync::Arc, time::Duration};

use crate::{
    bandwidth::{Bandwidth, BandwidthEstimator, FilterType, Sampling, WestwoodEstimator},
    config::CongestionConfig,
    observer::{CongestionEvent, CongestionObserver, EventSink},
};

use super::{CongestionController, SenderState};

pub const NAME: &str = "adaptive-reno";

// Weight of history when smoothing the RTT seen at congestion events.
const RTT_CONG_SMOOTHING: f64 = 0.85;
// Steepness of the probe increment curve.
const ALPHA: f64 = 10.;
// w_inc_max = bandwidth (bit/s) / BANDWIDTH_SCALE * smss^2
const BANDWIDTH_SCALE: f64 = 1000.;

#[derive(Clone)]
pub struct AdaptiveReno<B = WestwoodEstimator> {
    rtt_min: Option<Duration>,
    rtt_current: Duration,
    rtt_at_congestion: Duration,
    rtt_congestion_smoothed: Duration,
    rtt_congestion_smoothed_prev: Duration,

    window_increment: i64,
    window_base: usize,
    // Never negative.
    window_probe: i64,

    acked_segments_total: u64,

    estimator: B,
    events: EventSink,
}

impl Default for AdaptiveReno {
    fn default() -> Self {
        Self::new(estimator(FilterType::default()))
    }
}

impl AdaptiveReno {
    pub fn from_config(config: &CongestionConfig) -> Self {
        let mut ar = Self::new(estimator(config.bandwidth_filter));
        ar.events = EventSink::new(config.observer());
        ar
    }
}

// Every ACK is a bandwidth sample. BANDWIDTH_SCALE is tuned to rates sampled this way.
fn estimator(filter: FilterType) -> WestwoodEstimator {
    WestwoodEstimator::new(filter).with_sampling(Sampling::PerAck)
}

impl<B> core::fmt::Debug for AdaptiveReno<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "window={},base={},probe={},inc={},rtt_min={:?},rtt={:?},rtt_cong={:?}",
            self.congestion_window(),
            self.window_base,
            self.window_probe,
            self.window_increment,
            self.rtt_min,
            self.rtt_current,
            self.rtt_congestion_smoothed,
        )
    }
}

// Compares algorithm state. The observer is not state.
impl<B: PartialEq> PartialEq for AdaptiveReno<B> {
    fn eq(&self, other: &Self) -> bool {
        self.rtt_min == other.rtt_min
            && self.rtt_current == other.rtt_current
            && self.rtt_at_congestion == other.rtt_at_congestion
            && self.rtt_congestion_smoothed == other.rtt_congestion_smoothed
            && self.rtt_congestion_smoothed_prev == other.rtt_congestion_smoothed_prev
            && self.window_increment == other.window_increment
            && self.window_base == other.window_base
            && self.window_probe == other.window_probe
            && self.acked_segments_total == other.acked_segments_total
            && self.estimator == other.estimator
    }
}

impl<B> AdaptiveReno<B> {
    pub fn congestion_window(&self) -> usize {
        self.window_base
            .saturating_add(self.window_probe.max(0) as usize)
    }

    pub fn rtt_min(&self) -> Option<Duration> {
        self.rtt_min
    }

    pub fn rtt_current(&self) -> Duration {
        self.rtt_current
    }

    pub fn rtt_congestion_smoothed(&self) -> Duration {
        self.rtt_congestion_smoothed
    }

    pub fn window_base(&self) -> usize {
        self.window_base
    }

    pub fn window_probe(&self) -> i64 {
        self.window_probe
    }

    pub fn window_increment(&self) -> i64 {
        self.window_increment
    }

    pub fn acked_segments_total(&self) -> u64 {
        self.acked_segments_total
    }
}

impl<B: BandwidthEstimator> AdaptiveReno<B> {
    pub fn new(estimator: B) -> Self {
        Self {
            rtt_min: None,
            rtt_current: Duration::ZERO,
            rtt_at_congestion: Duration::ZERO,
            rtt_congestion_smoothed: Duration::ZERO,
            rtt_congestion_smoothed_prev: Duration::ZERO,
            window_increment: 0,
            window_base: 0,
            window_probe: 0,
            acked_segments_total: 0,
            estimator,
            events: EventSink::default(),
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn CongestionObserver>) -> Self {
        self.events = EventSink::new(Some(observer));
        self
    }

    pub fn bandwidth(&self) -> Bandwidth {
        self.estimator.current_estimate()
    }

    /// How congested the path looks, in [0, 1]: 0 when the RTT is at its
    /// minimum, 1 when it reaches the smoothed RTT of past congestion events.
    ///
    /// Refreshes the smoothed congestion RTT as a side effect.
    pub fn estimate_congestion_level(&mut self) -> f64 {
        let rtt_min = self.rtt_min.unwrap_or_default();

        // The previous value is below rtt_min only until the first congestion
        // event was recorded. Seed the series with the sample then.
        let a = if self.rtt_congestion_smoothed_prev < rtt_min {
            0.
        } else {
            RTT_CONG_SMOOTHING
        };
        self.rtt_congestion_smoothed = self.rtt_congestion_smoothed_prev.mul_f64(a)
            + self.rtt_at_congestion.mul_f64(1. - a);

        congestion_level(rtt_min, self.rtt_current, self.rtt_congestion_smoothed)
    }

    fn estimate_increment(&mut self, segment_size: usize) -> f64 {
        let level = self.estimate_congestion_level();
        self.window_increment = probe_increment(self.bandwidth(), segment_size, level);
        level
    }
}

fn congestion_level(rtt_min: Duration, rtt_current: Duration, rtt_congestion: Duration) -> f64 {
    let excursion = rtt_current.saturating_sub(rtt_min);
    match rtt_congestion.checked_sub(rtt_min) {
        Some(span) if !span.is_zero() => {
            (excursion.as_secs_f64() / span.as_secs_f64()).clamp(0., 1.)
        }
        // No congestion RTT above the baseline to compare against.
        _ if excursion.is_zero() => 0.,
        _ => 1.,
    }
}

// Bounded exponential decay from ~0.8*w_inc_max at level 0 to exactly 1 at
// level 1. Dips below zero in between.
fn probe_increment(bandwidth: Bandwidth, segment_size: usize, level: f64) -> i64 {
    let smss = segment_size as f64;
    let w_inc_max = bandwidth.bits_per_sec() / BANDWIDTH_SCALE * smss * smss;

    let e_alpha = ALPHA.exp();
    let beta = 2. * w_inc_max * ((1. / ALPHA) - ((1. / ALPHA + 1.) / e_alpha));
    let gamma = 1. - (2. * w_inc_max * ((1. / ALPHA) - ((1. / ALPHA + 0.5) / e_alpha)));

    (w_inc_max / (ALPHA * level).exp() + beta * level + gamma).round() as i64
}

impl<B: BandwidthEstimator + 'static> CongestionController for AdaptiveReno<B> {
    fn name(&self) -> &'static str {
        NAME
    }

    fn on_ack(&mut self, state: &SenderState, packets_acked: u32, rtt: Duration) {
        if rtt.is_zero() {
            self.events
                .emit(NAME, || CongestionEvent::InvalidRttSample { packets_acked });
            return;
        }

        self.acked_segments_total += u64::from(packets_acked);
        if self.rtt_min.is_none_or(|rtt_min| rtt < rtt_min) {
            self.rtt_min = Some(rtt);
        }
        self.rtt_current = rtt;

        let acked_bytes = u64::from(packets_acked).saturating_mul(state.segment_size as u64);
        self.estimator.update(state.now, rtt, acked_bytes);

        self.events.emit(NAME, || CongestionEvent::Acked {
            packets_acked,
            rtt,
            rtt_min: self.rtt_min.unwrap_or_default(),
            bandwidth: self.bandwidth(),
        });
    }

    fn on_congestion_avoidance(&mut self, state: &SenderState, segments_acked: u32) -> usize {
        if segments_acked == 0 {
            return self.congestion_window();
        }

        let level = self.estimate_increment(state.segment_size);

        self.window_base = self.window_base.saturating_add(state.reno_increment());

        let probe = self.window_probe as f64 + self.window_increment as f64 / state.cwnd_f64();
        self.window_probe = probe.max(0.) as i64;

        let cwnd = self.congestion_window();
        self.events.emit(NAME, || CongestionEvent::WindowGrown {
            congestion_level: level,
            window_increment: self.window_increment,
            window_base: self.window_base,
            window_probe: self.window_probe,
            cwnd,
        });
        cwnd
    }

    fn on_congestion_event(&mut self, state: &SenderState) -> usize {
        self.rtt_at_congestion = self.rtt_current;
        self.rtt_congestion_smoothed_prev = self.rtt_congestion_smoothed;

        let level = self.estimate_congestion_level();

        let backed_off = (state.cwnd as f64 / (1. + level)) as usize;
        self.window_base = backed_off.max(state.min_ssthresh());
        self.window_probe = 0;

        self.events.emit(NAME, || CongestionEvent::ThresholdReset {
            congestion_level: level,
            cwnd: state.cwnd,
            ssthresh: self.window_base,
        });
        self.window_base
    }

    fn fork(&self) -> Box<dyn CongestionController> {
        Box::new(self.clone())
    }
}
