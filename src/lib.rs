//! TCP Adaptive Reno congestion control, as a policy object a transport plugs
//! into its congestion control slot.
//!
//! The transport keeps owning cwnd and ssthresh. It feeds RTT samples through
//! [`CongestionController::on_ack`], asks for the next window during
//! congestion avoidance, and asks for a new threshold when it detects loss.
//!
//! Controllers are picked by [`CongestionConfig`] or by name through a [`Registry`].

#[macro_use]
mod macros;

mod bandwidth;
mod config;
mod congestion;
mod constants;
#[cfg(test)]
mod e2e_tests;
mod error;
#[cfg(feature = "export-metrics")]
mod metrics;
mod observer;
#[cfg(test)]
mod test_util;

pub use bandwidth::{Bandwidth, BandwidthEstimator, FilterType, Sampling, WestwoodEstimator};
pub use config::{CongestionConfig, CongestionControllerKind};
pub use congestion::{
    CongestionController, SenderState,
    adaptive_reno::AdaptiveReno,
    new_reno::NewReno,
    registry::{Constructor, Registry},
    westwood::WestwoodPlus,
};
pub use error::{Error, Result};
#[cfg(feature = "export-metrics")]
pub use metrics::{METRICS, Metrics, MetricsObserver};
pub use observer::{CongestionEvent, CongestionObserver, FanoutObserver, TracingObserver};
