//! Integration tests for request_angle → channel → servo-bus worker → pulse output.
//!
//! Real worker threads and real settle delays; only the MCPWM chain is mocked.

use std::time::Duration;

use cabin::config::{ServoOptions, ServoTiming};
use cabin::drivers::delay::TaskDelay;
use cabin::drivers::servo::{ServoMotor, ServoState, SERVO_QUEUE_DEPTH};
use cabin::error::RequestError;

use crate::mock_hw::{NoDelay, RecordingOutput};

fn options(settle_delay_ms: u32, request_timeout_ms: u32) -> ServoOptions {
    ServoOptions {
        gpio: 16,
        timing: ServoTiming {
            settle_delay_ms,
            ..ServoTiming::default()
        },
        request_timeout_ms,
    }
}

// ── Setup ─────────────────────────────────────────────────────

#[test]
fn setup_preloads_centre_pulse_on_configured_gpio() {
    let out = RecordingOutput::new();
    let mut servo = ServoMotor::new(options(50, 2_000), out.clone(), NoDelay);
    servo.setup().unwrap();

    assert_eq!(servo.state(), ServoState::Ready);
    assert_eq!(out.log.lock().unwrap().acquired, vec![(16, 1_500)]);
    assert!(out.pulses().is_empty(), "setup must not write beyond the preload");
}

// ── End-to-end ordering, dedup and settle spacing ────────────

#[test]
fn duplicate_angles_are_suppressed_and_writes_are_spaced() {
    let out = RecordingOutput::new();
    let mut servo = ServoMotor::new(options(50, 2_000), out.clone(), TaskDelay);
    servo.setup().unwrap();

    for angle in [90, 90, 45, -10, -10, 90] {
        servo.request_angle(angle).unwrap();
    }

    let pulses = out.wait_for_writes(4, Duration::from_secs(3));
    assert_eq!(pulses, vec![2_500, 2_000, 1_388, 2_500]);

    // Nothing else trickles in once the queue is drained.
    std::thread::sleep(Duration::from_millis(150));
    let log = out.log.lock().unwrap();
    assert_eq!(log.writes.len(), 4);
    for pair in log.writes.windows(2) {
        let gap = pair[1].1.duration_since(pair[0].1);
        assert!(gap >= Duration::from_millis(50), "writes only {:?} apart", gap);
    }
}

#[test]
fn request_to_centre_after_setup_is_a_noop() {
    let out = RecordingOutput::new();
    let mut servo = ServoMotor::new(options(0, 2_000), out.clone(), NoDelay);
    servo.setup().unwrap();

    servo.request_angle(0).unwrap();
    servo.request_angle(10).unwrap();

    assert_eq!(out.wait_for_writes(1, Duration::from_secs(2)), vec![1_611]);
}

#[test]
fn failed_write_does_not_stall_the_worker() {
    let out = RecordingOutput::new();
    out.log.lock().unwrap().fail_writes = 1;
    let mut servo = ServoMotor::new(options(0, 2_000), out.clone(), NoDelay);
    servo.setup().unwrap();

    servo.request_angle(45).unwrap(); // fails, still cached
    servo.request_angle(45).unwrap(); // suppressed
    servo.request_angle(-90).unwrap();

    assert_eq!(out.wait_for_writes(1, Duration::from_secs(2)), vec![500]);
}

// ── Backpressure ──────────────────────────────────────────────

#[test]
fn full_queue_times_out_without_enqueuing() {
    let out = RecordingOutput::new();
    let mut servo = ServoMotor::new(options(300, 20), out.clone(), TaskDelay);
    servo.setup().unwrap();

    // One in the worker's settle delay, SERVO_QUEUE_DEPTH queued, the rest bounce.
    let attempts = SERVO_QUEUE_DEPTH as i32 + 3;
    let results: Vec<_> = (1..=attempts).map(|a| servo.request_angle(a)).collect();

    let accepted: Vec<i32> = (1..=attempts).zip(&results).filter(|(_, r)| r.is_ok()).map(|(a, _)| a).collect();
    assert!(accepted.len() <= SERVO_QUEUE_DEPTH + 1);
    assert!(accepted.len() >= SERVO_QUEUE_DEPTH);
    assert!(results.iter().all(|r| r.is_ok() || *r == Err(RequestError::Timeout)));

    // Only the accepted angles ever reach the hardware, in order.
    let timing = ServoTiming::default();
    let expected: Vec<u32> = accepted.iter().map(|&a| timing.pulse_width_us(a)).collect();
    let mut written = out.pulses();
    let until = std::time::Instant::now() + Duration::from_secs(6);
    while written.len() < expected.len() && std::time::Instant::now() < until {
        std::thread::sleep(Duration::from_millis(20));
        written = out.pulses();
    }
    assert_eq!(written, expected);
}

#[test]
fn pending_requests_reports_queue_depth() {
    let out = RecordingOutput::new();
    let mut servo = ServoMotor::new(options(200, 2_000), out.clone(), TaskDelay);
    servo.setup().unwrap();

    servo.request_angle(10).unwrap();
    out.wait_for_writes(1, Duration::from_secs(1));
    servo.request_angle(20).unwrap();
    servo.request_angle(30).unwrap();
    assert!(servo.pending_requests() >= 1);
}
