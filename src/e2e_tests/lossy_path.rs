use std::time::Duration;

use rand::{Rng, SeedableRng, rngs::StdRng};

/// What one round trip over a [`LossyPath`] looked like.
#[derive(Debug, Clone, Copy)]
pub struct RoundTrip {
    pub rtt: Duration,
    pub lost: bool,
}

/// A path with a base RTT, a queue that fills up as the window grows past the
/// path's BDP, and random loss on top.
pub struct LossyPath {
    rng: StdRng,
    base_rtt: Duration,
    bdp_bytes: usize,
    queue_bytes: usize,
    loss_probability: f64,
}

impl LossyPath {
    pub fn new(seed: u64, base_rtt: Duration, bdp_bytes: usize, queue_bytes: usize) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            base_rtt,
            bdp_bytes,
            queue_bytes,
            loss_probability: 0.,
        }
    }

    pub fn with_random_loss(mut self, probability: f64) -> Self {
        self.loss_probability = probability;
        self
    }

    /// Sends `cwnd` bytes. Whatever exceeds the BDP sits in the queue and adds
    /// delay; whatever exceeds BDP + queue is dropped.
    pub fn send_window(&mut self, cwnd: usize) -> RoundTrip {
        let queued = cwnd.saturating_sub(self.bdp_bytes);
        let overflow = queued > self.queue_bytes;

        let queue_fill = queued.min(self.queue_bytes) as f64 / self.bdp_bytes.max(1) as f64;
        let rtt = self.base_rtt.mul_f64(1. + queue_fill);

        let lost = overflow || self.rng.random_bool(self.loss_probability);
        RoundTrip { rtt, lost }
    }
}
