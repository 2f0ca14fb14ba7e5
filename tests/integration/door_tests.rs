//! Integration tests for the door choreography.

use std::time::Duration;

use cabin::app::DoorCycle;
use cabin::config::{DoorCycleConfig, ServoOptions, ServoTiming};
use cabin::drivers::servo::ServoMotor;

use crate::mock_hw::{AudioCall, FixedEntropy, MockDoor, MockPlayer, NoDelay, RecordingDelay, RecordingOutput};

fn door_with(door: &MockDoor, rand: u32) -> DoorCycle<&MockDoor, MockPlayer, FixedEntropy, RecordingDelay> {
    DoorCycle::new(
        door,
        MockPlayer::default(),
        FixedEntropy(rand),
        RecordingDelay::default(),
        DoorCycleConfig::default(),
    )
}

#[test]
fn start_closes_the_door() {
    let door = MockDoor::default();
    let mut cycle = door_with(&door, 0);
    cycle.start();
    assert_eq!(*door.requests.borrow(), vec![90]);
}

#[test]
fn one_cycle_opens_slowly_and_closes_fast() {
    let door = MockDoor::default();
    let mut cycle = door_with(&door, 0);
    cycle.run_cycle();

    let requests = door.requests.borrow();
    assert_eq!(requests.len(), 101 + 26);
    // Opening: 90, 89, ..., -10.
    assert!(requests[..101].iter().copied().eq((-10..=90).rev()));
    // Closing: -10, -6, ..., 90.
    assert!(requests[101..].iter().copied().eq((-10..=90).step_by(4)));
    assert_eq!(requests.last(), Some(&90));
    assert_eq!(cycle.rejected(), 0);
}

#[test]
fn tracks_and_pauses_follow_the_sweeps() {
    let door = MockDoor::default();
    let mut player = MockPlayer::default();
    let mut delay = RecordingDelay::default();
    {
        let mut cycle = DoorCycle::new(&door, &mut player, FixedEntropy(u32::MAX), &mut delay, DoorCycleConfig::default());
        cycle.run_cycle();
    }

    assert_eq!(player.calls, vec![AudioCall::Play(3), AudioCall::Play(1)]);

    // 101 steps, pause, 26 steps, pause.
    assert_eq!(delay.ms.len(), 101 + 1 + 26 + 1);
    assert!(delay.ms[..101].iter().all(|&ms| ms == 50));
    assert_eq!(delay.ms[101], 5_000 + 9_999);
    assert_eq!(delay.ms[delay.ms.len() - 1], 5_000 + 9_999);
}

#[test]
fn minimum_pause_with_zero_entropy() {
    let door = MockDoor::default();
    let mut delay = RecordingDelay::default();
    {
        let mut cycle = DoorCycle::new(&door, MockPlayer::default(), FixedEntropy(0), &mut delay, DoorCycleConfig::default());
        cycle.run_cycle();
    }
    assert_eq!(delay.ms[101], 5_000);
}

#[test]
fn rejected_request_is_skipped_and_sweep_continues() {
    let door = MockDoor {
        reject: vec![45],
        ..MockDoor::default()
    };
    let mut cycle = door_with(&door, 0);
    cycle.run_cycle();

    assert_eq!(cycle.rejected(), 1);
    assert_eq!(door.requests.borrow().len(), 127);
}

#[test]
fn door_cycle_through_real_servo_worker() {
    let out = RecordingOutput::new();
    let options = ServoOptions {
        timing: ServoTiming {
            settle_delay_ms: 0,
            ..ServoTiming::default()
        },
        ..ServoOptions::new(16)
    };
    let mut servo = ServoMotor::new(options, out.clone(), NoDelay);
    servo.setup().unwrap();

    let mut cycle = DoorCycle::new(&servo, MockPlayer::default(), FixedEntropy(0), RecordingDelay::default(), DoorCycleConfig::default());
    cycle.start();
    cycle.run_cycle();

    // start(90) moves off centre; the first sweep step repeats 90 and the
    // closing sweep starts where opening ended, so both are suppressed.
    let pulses = out.wait_for_writes(1 + 100 + 25, Duration::from_secs(5));
    assert_eq!(pulses.len(), 126);
    assert_eq!(pulses[0], 2_500);
    assert_eq!(pulses[1], options.timing.pulse_width_us(89));
    assert_eq!(pulses[100], 1_388);
    assert_eq!(pulses[125], 2_500);
    assert_eq!(cycle.rejected(), 0);
}
