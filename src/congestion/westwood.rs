use std::time::Duration;

use crate::{
    bandwidth::{BandwidthEstimator, WestwoodEstimator},
    config::CongestionConfig,
    observer::{CongestionEvent, EventSink},
};

use super::{CongestionController, SenderState};

pub const NAME: &str = "westwood-plus";

/// TCP Westwood+: NewReno growth, but on congestion the threshold is set to
/// the estimated bandwidth-delay product instead of half the window.
#[derive(Debug, Clone, Default)]
pub struct WestwoodPlus {
    rtt_min: Option<Duration>,
    estimator: WestwoodEstimator,
    events: EventSink,
}

impl WestwoodPlus {
    pub fn new(estimator: WestwoodEstimator) -> Self {
        Self {
            rtt_min: None,
            estimator,
            events: EventSink::default(),
        }
    }

    pub fn from_config(config: &CongestionConfig) -> Self {
        Self {
            events: EventSink::new(config.observer()),
            ..Self::new(WestwoodEstimator::new(config.bandwidth_filter))
        }
    }

    pub fn rtt_min(&self) -> Option<Duration> {
        self.rtt_min
    }

    /// Estimated bandwidth-delay product, bytes.
    pub fn bdp(&self) -> usize {
        self.estimator
            .current_estimate()
            .bytes_in(self.rtt_min.unwrap_or_default())
    }
}

impl CongestionController for WestwoodPlus {
    fn name(&self) -> &'static str {
        NAME
    }

    fn on_ack(&mut self, state: &SenderState, packets_acked: u32, rtt: Duration) {
        if rtt.is_zero() {
            self.events
                .emit(NAME, || CongestionEvent::InvalidRttSample { packets_acked });
            return;
        }

        if self.rtt_min.is_none_or(|rtt_min| rtt < rtt_min) {
            self.rtt_min = Some(rtt);
        }

        let acked_bytes = u64::from(packets_acked).saturating_mul(state.segment_size as u64);
        self.estimator.update(state.now, rtt, acked_bytes);

        self.events.emit(NAME, || CongestionEvent::Acked {
            packets_acked,
            rtt,
            rtt_min: self.rtt_min.unwrap_or_default(),
            bandwidth: self.estimator.current_estimate(),
        });
    }

    fn on_congestion_avoidance(&mut self, state: &SenderState, segments_acked: u32) -> usize {
        if segments_acked == 0 {
            return state.cwnd;
        }

        let increment = state.reno_increment();
        let cwnd = state.cwnd.saturating_add(increment);
        self.events.emit(NAME, || CongestionEvent::WindowGrown {
            congestion_level: 0.,
            window_increment: increment as i64,
            window_base: cwnd,
            window_probe: 0,
            cwnd,
        });
        cwnd
    }

    fn on_congestion_event(&mut self, state: &SenderState) -> usize {
        let ssthresh = self.bdp().max(state.min_ssthresh());
        self.events.emit(NAME, || CongestionEvent::ThresholdReset {
            congestion_level: 0.,
            cwnd: state.cwnd,
            ssthresh,
        });
        ssthresh
    }

    fn fork(&self) -> Box<dyn CongestionController> {
        Box::new(self.clone())
    }
}
