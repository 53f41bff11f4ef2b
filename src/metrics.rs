use lazy_static::lazy_static;
use metrics::{Counter, Histogram, counter, histogram};

use crate::observer::{CongestionEvent, CongestionObserver};

pub struct Metrics {
    pub acked_segments: Counter,
    pub invalid_rtt_samples: Counter,
    pub avoidance_updates: Counter,
    pub congestion_events: Counter,
    pub congestion_level: Histogram,
    pub rtt: Histogram,
    pub ssthresh: Histogram,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            acked_segments: counter!("cc_acked_segments"),
            invalid_rtt_samples: counter!("cc_invalid_rtt_samples"),
            avoidance_updates: counter!("cc_avoidance_updates"),
            congestion_events: counter!("cc_congestion_events"),
            congestion_level: histogram!("cc_congestion_level"),
            rtt: histogram!("cc_rtt"),
            ssthresh: histogram!("cc_ssthresh"),
        }
    }
}

lazy_static! {
    pub static ref METRICS: Metrics = Metrics::new();
}

/// Exports events to the global [`METRICS`].
#[derive(Debug, Default, Clone, Copy)]
pub struct MetricsObserver;

impl CongestionObserver for MetricsObserver {
    fn on_event(&self, _controller: &'static str, event: &CongestionEvent) {
        match *event {
            CongestionEvent::InvalidRttSample { .. } => METRICS.invalid_rtt_samples.increment(1),
            CongestionEvent::Acked {
                packets_acked, rtt, ..
            } => {
                METRICS.acked_segments.increment(u64::from(packets_acked));
                METRICS.rtt.record(rtt.as_secs_f64());
            }
            CongestionEvent::WindowGrown {
                congestion_level, ..
            } => {
                METRICS.avoidance_updates.increment(1);
                METRICS.congestion_level.record(congestion_level);
            }
            CongestionEvent::ThresholdReset {
                congestion_level,
                ssthresh,
                ..
            } => {
                METRICS.congestion_events.increment(1);
                METRICS.congestion_level.record(congestion_level);
                METRICS.ssthresh.record(ssthresh as f64);
            }
        }
    }
}
