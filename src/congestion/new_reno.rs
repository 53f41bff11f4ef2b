use std::time::Duration;

use crate::{
    config::CongestionConfig,
    observer::{CongestionEvent, EventSink},
};

use super::{CongestionController, SenderState};

pub const NAME: &str = "new-reno";

/// Classic NewReno: one segment of growth per window of ACKs, half of the
/// flight size on congestion. Keeps no state of its own.
#[derive(Debug, Clone, Default)]
pub struct NewReno {
    events: EventSink,
}

impl NewReno {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &CongestionConfig) -> Self {
        Self {
            events: EventSink::new(config.observer()),
        }
    }
}

impl CongestionController for NewReno {
    fn name(&self) -> &'static str {
        NAME
    }

    fn on_ack(&mut self, _state: &SenderState, packets_acked: u32, rtt: Duration) {
        if rtt.is_zero() {
            self.events
                .emit(NAME, || CongestionEvent::InvalidRttSample { packets_acked });
        }
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
        let ssthresh = (state.bytes_in_flight / 2).max(state.min_ssthresh());
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
