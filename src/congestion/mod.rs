pub mod adaptive_reno;
pub mod new_reno;
pub mod registry;
pub mod westwood;

use std::time::{Duration, Instant};

use crate::constants::MIN_SSTHRESH_SEGMENTS;

/// A view into the sender state of the transport that owns the controller.
///
/// Controllers only see it for the duration of a single call and never keep it.
#[derive(Debug, Clone, Copy)]
pub struct SenderState {
    pub now: Instant,
    /// Sender maximum segment size, bytes.
    pub segment_size: usize,
    /// Current congestion window, bytes.
    pub cwnd: usize,
    pub bytes_in_flight: usize,
}

impl SenderState {
    pub fn new(now: Instant, segment_size: usize, cwnd: usize) -> Self {
        Self {
            now,
            segment_size,
            cwnd,
            bytes_in_flight: 0,
        }
    }

    pub fn with_bytes_in_flight(self, bytes_in_flight: usize) -> Self {
        Self {
            bytes_in_flight,
            ..self
        }
    }

    // Floor for any slow start threshold.
    pub(crate) fn min_ssthresh(&self) -> usize {
        self.segment_size.saturating_mul(MIN_SSTHRESH_SEGMENTS)
    }

    // cwnd as a divisor. Never zero.
    pub(crate) fn cwnd_f64(&self) -> f64 {
        self.cwnd.max(1) as f64
    }

    // Classic Reno avoidance growth for one ACK batch: one segment per window, at least one byte.
    pub(crate) fn reno_increment(&self) -> usize {
        let smss = self.segment_size as f64;
        (smss * smss / self.cwnd_f64()).max(1.) as usize
    }
}

/// A congestion control policy plugged into a transport connection.
///
/// The transport owns cwnd and ssthresh, decides when it is in slow start and
/// when loss happened, and writes back the values returned from here.
pub trait CongestionController: Send + Sync + core::fmt::Debug {
    /// The name the controller is registered under.
    fn name(&self) -> &'static str;

    /// Called for every ACK (or batch of ACKs) carrying an RTT sample. A zero
    /// `rtt` means the sample is invalid and is ignored.
    fn on_ack(&mut self, state: &SenderState, packets_acked: u32, rtt: Duration);

    /// Called once per batch of newly acknowledged segments during congestion
    /// avoidance. Returns the new congestion window, bytes.
    fn on_congestion_avoidance(&mut self, state: &SenderState, segments_acked: u32) -> usize;

    /// Called when the transport detected congestion. Returns the new slow
    /// start threshold, bytes.
    fn on_congestion_event(&mut self, state: &SenderState) -> usize;

    /// An independent copy for a duplicated connection.
    fn fork(&self) -> Box<dyn CongestionController>;
}
