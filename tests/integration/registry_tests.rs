//! Integration tests for bringing the servo service up through the registry.

use cabin::config::ServoOptions;
use cabin::drivers::servo::{ServoMotor, ServoParts, ServoState};
use cabin::error::{PwmError, RegistryError, ServiceError};
use cabin::service::{Registry, Service};

use crate::mock_hw::{NoDelay, RecordingOutput};

type TestServo = ServoMotor<RecordingOutput, NoDelay>;

fn parts(output: RecordingOutput) -> ServoParts<RecordingOutput, NoDelay> {
    ServoParts {
        options: ServoOptions::new(16),
        output,
        delay: NoDelay,
    }
}

#[test]
fn created_servo_is_ready_and_retrievable() {
    let registry = Registry::new();
    let out = RecordingOutput::new();

    let servo = registry.create::<TestServo>(parts(out.clone())).unwrap();
    assert_eq!(servo.state(), ServoState::Ready);
    assert!(core::ptr::eq(servo, registry.get::<TestServo>().unwrap()));
    assert_eq!(out.acquire_count(), 1);
}

#[test]
fn second_create_never_touches_hardware() {
    let registry = Registry::new();
    let first = RecordingOutput::new();
    let second = RecordingOutput::new();

    registry.create::<TestServo>(parts(first.clone())).unwrap();
    let err = registry.create::<TestServo>(parts(second.clone())).err();

    assert_eq!(err, Some(RegistryError::AlreadyCreated(TestServo::NAME)));
    assert_eq!(first.acquire_count(), 1);
    assert_eq!(second.acquire_count(), 0);
    assert_eq!(registry.len(), 1);
}

#[test]
fn pwm_failure_is_fatal_and_leaves_nothing_registered() {
    let registry = Registry::new();

    let err = registry
        .create::<TestServo>(parts(RecordingOutput::failing_acquire()))
        .err();

    assert_eq!(
        err,
        Some(RegistryError::Setup {
            service: "ServoMotor",
            cause: ServiceError::Pwm(PwmError::TimerAlloc(-1)),
        })
    );
    assert!(!registry.contains::<TestServo>());
    assert!(registry.is_empty());
}

#[test]
fn servo_instances_differ_per_type() {
    // Distinct parameterisations are distinct service types.
    let registry = Registry::new();
    registry.create::<TestServo>(parts(RecordingOutput::new())).unwrap();
    assert_eq!(
        registry.get::<ServoMotor>().err(),
        Some(RegistryError::NotCreated("ServoMotor"))
    );
}
