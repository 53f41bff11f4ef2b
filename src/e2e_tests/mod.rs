mod lossy_path;

use std::{sync::Arc, time::Duration};

use lossy_path::LossyPath;
use tracing::info;

use crate::{
    CongestionConfig, CongestionControllerKind, Registry,
    observer::CongestionEvent,
    test_util::{RecordingObserver, host::MockHost, setup_test_logging},
};

const SMSS: usize = 1448;
const BASE_RTT: Duration = Duration::from_millis(100);

fn make_host(kind: CongestionControllerKind) -> MockHost {
    let config = CongestionConfig {
        kind,
        tracing: true,
        ..Default::default()
    };
    MockHost::new(config.create(), SMSS)
}

fn make_path(seed: u64) -> LossyPath {
    LossyPath::new(seed, BASE_RTT, 100 * SMSS, 50 * SMSS).with_random_loss(0.01)
}

// Returns how many losses there were.
fn run(host: &mut MockHost, path: &mut LossyPath, rounds: usize) -> usize {
    let mut losses = 0;
    for _ in 0..rounds {
        let rt = path.send_window(host.cwnd);
        host.round_trip(rt.rtt);
        if rt.lost {
            losses += 1;
            host.loss();
        }
        assert!(host.cwnd >= 2 * SMSS || host.in_slow_start(), "{host:?}");
    }
    losses
}

#[test]
fn test_every_registered_controller_over_lossy_path() -> anyhow::Result<()> {
    setup_test_logging();
    let registry = Registry::default();
    let config = CongestionConfig {
        tracing: true,
        ..Default::default()
    };

    for name in registry.names() {
        let mut host = MockHost::new(registry.create(name, &config)?, SMSS);
        let mut path = make_path(42);

        let losses = run(&mut host, &mut path, 500);
        info!(name, losses, cwnd = host.cwnd, ssthresh = host.ssthresh, "done");

        assert!(losses > 0, "{name}: the queue never overflowed");
        assert!(host.ssthresh >= 2 * SMSS);
    }
    Ok(())
}

#[test]
fn test_adaptive_reno_matches_new_reno_when_fully_congested() {
    setup_test_logging();
    let mut adaptive = make_host(CongestionControllerKind::AdaptiveReno);
    let mut reno = make_host(CongestionControllerKind::NewReno);

    for host in [&mut adaptive, &mut reno] {
        for _ in 0..4 {
            host.round_trip(BASE_RTT);
        }
        // Queue builds up right before the loss, and stays that way.
        host.round_trip(BASE_RTT * 2);
        host.loss();
    }
    assert_eq!(adaptive.ssthresh, reno.ssthresh);

    for round in 0..50 {
        adaptive.round_trip(BASE_RTT * 2);
        reno.round_trip(BASE_RTT * 2);
        assert_eq!(adaptive.cwnd, reno.cwnd, "diverged at round {round}");
    }
}

#[test]
fn test_adaptive_reno_probes_when_rtt_is_flat() {
    setup_test_logging();
    let mut adaptive = make_host(CongestionControllerKind::AdaptiveReno);
    let mut reno = make_host(CongestionControllerKind::NewReno);

    for host in [&mut adaptive, &mut reno] {
        for _ in 0..4 {
            host.round_trip(BASE_RTT);
        }
        host.loss();
    }
    // The loss came without any queueing delay, so there's nothing to back off from.
    assert_eq!(adaptive.ssthresh, 160 * SMSS);
    assert_eq!(reno.ssthresh, 80 * SMSS);

    for _ in 0..10 {
        adaptive.round_trip(BASE_RTT);
        reno.round_trip(BASE_RTT);
    }
    let reno_growth = reno.cwnd - reno.ssthresh;
    let adaptive_growth = adaptive.cwnd - adaptive.ssthresh;
    info!(reno_growth, adaptive_growth);
    assert!(
        adaptive_growth > reno_growth,
        "adaptive_growth={adaptive_growth} reno_growth={reno_growth}"
    );
}

#[test]
fn test_per_ack_growth_tracks_batched_growth() {
    setup_test_logging();
    let mut batched = make_host(CongestionControllerKind::AdaptiveReno);
    let mut per_ack = make_host(CongestionControllerKind::AdaptiveReno);

    for _ in 0..4 {
        batched.round_trip(BASE_RTT);
        per_ack.round_trip_per_ack(BASE_RTT);
    }
    assert_eq!(batched.cwnd, per_ack.cwnd);
    assert_eq!(batched.loss(), per_ack.loss());

    // Flat RTT, so the probe window grows as fast as it ever does.
    for round in 0..10 {
        let (batched_before, per_ack_before) = (batched.cwnd, per_ack.cwnd);
        batched.round_trip(BASE_RTT);
        per_ack.round_trip_per_ack(BASE_RTT);

        let batched_growth = batched.cwnd as i64 - batched_before as i64;
        let per_ack_growth = per_ack.cwnd as i64 - per_ack_before as i64;
        info!(round, batched_growth, per_ack_growth);

        let window = batched_before.max(per_ack_before) as u64;
        assert!(
            batched_growth.abs_diff(per_ack_growth) <= window,
            "round {round}: batched_growth={batched_growth} per_ack_growth={per_ack_growth} window={window}"
        );
    }
}

#[test]
fn test_forked_connection_is_independent() {
    setup_test_logging();
    let mut parent = make_host(CongestionControllerKind::AdaptiveReno);
    let mut path = make_path(1);
    run(&mut parent, &mut path, 30);

    let mut child = parent.fork();
    let mut reference = parent.fork();

    // Parent goes through a rough patch.
    for _ in 0..20 {
        parent.round_trip(BASE_RTT * 3);
        parent.loss();
    }

    let mut child_path = make_path(2);
    let mut reference_path = make_path(2);
    for round in 0..100 {
        let rt = child_path.send_window(child.cwnd);
        child.round_trip(rt.rtt);
        let rt_ref = reference_path.send_window(reference.cwnd);
        reference.round_trip(rt_ref.rtt);
        if rt.lost {
            child.loss();
            reference.loss();
        }
        assert_eq!(child.cwnd, reference.cwnd, "diverged at round {round}");
    }
}

#[test]
fn test_observer_sees_every_congestion_event() {
    setup_test_logging();
    let recorder = Arc::new(RecordingObserver::default());
    let config = CongestionConfig {
        kind: CongestionControllerKind::AdaptiveReno,
        tracing: true,
        observer: Some(recorder.clone()),
        ..Default::default()
    };
    let mut host = MockHost::new(config.create(), SMSS);
    let mut path = make_path(3);

    let losses = run(&mut host, &mut path, 300);
    let events = recorder.take();

    let resets = events
        .iter()
        .filter(|(_, e)| matches!(e, CongestionEvent::ThresholdReset { .. }))
        .count();
    assert_eq!(resets, losses);
    assert!(
        events
            .iter()
            .all(|(name, e)| *name == "adaptive-reno"
                && !matches!(e, CongestionEvent::InvalidRttSample { .. }))
    );
    assert!(
        events
            .iter()
            .any(|(_, e)| matches!(e, CongestionEvent::WindowGrown { .. }))
    );
}
