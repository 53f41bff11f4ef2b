use std::{sync::Arc, time::Duration};

use tracing::warn;

use crate::{
    bandwidth::Bandwidth,
    constants::{ACK_TRACING_INTERVAL_MS, CONGESTION_TRACING_LOG_LEVEL},
};

/// Things a congestion controller reports while it runs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CongestionEvent {
    /// A zero RTT sample was dropped without touching any state.
    InvalidRttSample { packets_acked: u32 },

    Acked {
        packets_acked: u32,
        rtt: Duration,
        rtt_min: Duration,
        bandwidth: Bandwidth,
    },

    /// Congestion avoidance grew the window.
    WindowGrown {
        congestion_level: f64,
        window_increment: i64,
        window_base: usize,
        window_probe: i64,
        cwnd: usize,
    },

    /// A congestion event reset the slow start threshold.
    ThresholdReset {
        congestion_level: f64,
        cwnd: usize,
        ssthresh: usize,
    },
}

/// A sink for [`CongestionEvent`]s. Controllers work the same with or without one.
pub trait CongestionObserver: Send + Sync + core::fmt::Debug {
    fn on_event(&self, controller: &'static str, event: &CongestionEvent);
}

/// Writes events to `tracing`. Per-ACK events are rate limited.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl CongestionObserver for TracingObserver {
    fn on_event(&self, controller: &'static str, event: &CongestionEvent) {
        match *event {
            CongestionEvent::InvalidRttSample { packets_acked } => {
                warn!(controller, packets_acked, "RTT measured is zero, ignoring sample");
            }
            CongestionEvent::Acked {
                packets_acked,
                rtt,
                rtt_min,
                bandwidth,
            } => {
                log_every_ms!(
                    ACK_TRACING_INTERVAL_MS,
                    CONGESTION_TRACING_LOG_LEVEL,
                    controller,
                    packets_acked,
                    ?rtt,
                    ?rtt_min,
                    %bandwidth,
                    "acked"
                );
            }
            CongestionEvent::WindowGrown {
                congestion_level,
                window_increment,
                window_base,
                window_probe,
                cwnd,
            } => {
                log_every_ms!(
                    ACK_TRACING_INTERVAL_MS,
                    CONGESTION_TRACING_LOG_LEVEL,
                    controller,
                    congestion_level,
                    window_increment,
                    window_base,
                    window_probe,
                    cwnd,
                    "congestion avoidance"
                );
            }
            CongestionEvent::ThresholdReset {
                congestion_level,
                cwnd,
                ssthresh,
            } => {
                tracing::event!(
                    CONGESTION_TRACING_LOG_LEVEL,
                    controller,
                    congestion_level,
                    cwnd,
                    ssthresh,
                    "congestion event"
                );
            }
        }
    }
}

/// Forwards every event to each of the inner observers, in order.
#[derive(Debug, Default, Clone)]
pub struct FanoutObserver(Vec<Arc<dyn CongestionObserver>>);

impl FanoutObserver {
    pub fn new(observers: Vec<Arc<dyn CongestionObserver>>) -> Self {
        Self(observers)
    }
}

impl CongestionObserver for FanoutObserver {
    fn on_event(&self, controller: &'static str, event: &CongestionEvent) {
        for o in self.0.iter() {
            o.on_event(controller, event);
        }
    }
}

// The observer handle a controller carries around. Cloning shares the sink.
#[derive(Debug, Clone, Default)]
pub(crate) struct EventSink(Option<Arc<dyn CongestionObserver>>);

impl EventSink {
    pub fn new(observer: Option<Arc<dyn CongestionObserver>>) -> Self {
        Self(observer)
    }

    #[inline]
    pub fn emit(&self, controller: &'static str, event: impl FnOnce() -> CongestionEvent) {
        if let Some(observer) = self.0.as_ref() {
            observer.on_event(controller, &event());
        }
    }
}
