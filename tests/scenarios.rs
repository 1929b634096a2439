//! End-to-end scenarios for the knife/pendulum system.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use knife_pendulum::config::KnifeConfig;
use knife_pendulum::prelude::*;

fn assert_bits_eq(a: f64, b: f64) {
    assert_eq!(a.to_bits(), b.to_bits(), "{a} != {b}");
}

// Frozen pendulum: 5 advances without rotation leave 6 identical samples.
#[test]
fn scenario_1_frozen_pendulum() {
    let mut p = Pendulum::new(DEFAULT_INITIAL_ANGLE, 0.0);
    for _ in 0..5 {
        p.advance(false);
    }
    assert_eq!(p.angles().len(), 6);
    assert_eq!(p.angular_velocities().len(), 6);
    for (angle, omega) in p.angles().iter().zip(p.angular_velocities()) {
        assert_bits_eq(angle, DEFAULT_INITIAL_ANGLE);
        assert_bits_eq(omega, 0.0);
    }
}

// Start position equals the threshold, so the latch fires on the first call.
#[test]
fn scenario_2_rotation_starts_immediately() {
    let mut p = Pendulum::new(DEFAULT_INITIAL_ANGLE, 0.0);
    let mut k = Knife::new(3.0, &mut p, 4.0).unwrap();
    assert!(!k.rotation_started());
    k.advance();
    assert!(k.rotation_started());
    assert_eq!(k.phase(), Phase::Rotating);
    // The pendulum moved on this very step.
    assert!(k.pendulum().latest_angle() > DEFAULT_INITIAL_ANGLE);
}

// Outward push beyond the arm clamps to the arm end with zero velocity.
#[test]
fn scenario_3_upper_clamp() {
    let mut p = Pendulum::new(DEFAULT_INITIAL_ANGLE, 0.0);
    let mut k = Knife::new(3.0, &mut p, 4.0).unwrap();
    while k.events().is_empty() && k.steps() < 600 {
        k.advance();
    }
    let event = k.events()[0];
    assert_eq!(event.kind, BoundaryKind::ArmEnd);
    assert!(event.radial_position > 4.0);
    assert_bits_eq(k.radial_positions().latest(), 4.0);
    assert_bits_eq(k.radial_velocities().latest(), 0.0);
}

// Inward fall past the pivot clamps to zero position and velocity.
#[test]
fn scenario_4_lower_clamp() {
    let mut p = Pendulum::new(DEFAULT_INITIAL_ANGLE, 0.0);
    let mut k = Knife::new(0.05, &mut p, 4.0).unwrap();
    while k.events().is_empty() && k.steps() < 600 {
        k.advance();
    }
    let event = k.events()[0];
    assert_eq!(event.kind, BoundaryKind::Pivot);
    assert!(event.radial_position < 0.0);
    assert_bits_eq(k.radial_positions().latest(), 0.0);
    assert_bits_eq(k.radial_velocities().latest(), 0.0);
}

// Default configuration: 600 steps, four 601-long histories, no failure.
#[test]
fn scenario_5_default_run() {
    let mut p = Pendulum::new(DEFAULT_INITIAL_ANGLE, 0.0);
    let mut k = Knife::new(3.0, &mut p, 4.0).unwrap();
    for _ in 0..600 {
        k.advance();
    }
    assert_eq!(k.steps(), 600);
    assert_eq!(k.radial_positions().len(), 601);
    assert_eq!(k.radial_velocities().len(), 601);
    assert_eq!(k.pendulum().angles().len(), 601);
    assert_eq!(k.pendulum().angular_velocities().len(), 601);

    let (xs, ys) = k.positions();
    assert_eq!(xs.len(), 601);
    assert_eq!(ys.len(), 601);
}

#[test]
fn default_run_through_runner_matches_direct_stepping() {
    let report = run(&SimConfig::default()).unwrap();

    let mut p = Pendulum::new(DEFAULT_INITIAL_ANGLE, 0.0);
    let mut k = Knife::new(3.0, &mut p, 4.0).unwrap();
    for _ in 0..600 {
        k.advance();
    }

    assert_eq!(report.trajectory.len(), 601);
    for (frame, (l, v)) in report
        .trajectory
        .frames
        .iter()
        .zip(k.radial_positions().iter().zip(k.radial_velocities()))
    {
        assert_bits_eq(frame.radial_position, l);
        assert_bits_eq(frame.radial_velocity, v);
    }
    assert_eq!(report.events.len(), k.events().len());
}

#[test]
fn knife_released_from_arm_end_slides_before_rotating() {
    let config = SimConfig {
        knife: KnifeConfig::released_from_arm_end(4.0, 3.0),
        ..SimConfig::default()
    };
    let report = run(&config).unwrap();

    let fired = report.rotation_started_at.unwrap();
    assert!(fired > 1);

    // Frozen until the latch fires.
    let frames = &report.trajectory.frames;
    for frame in &frames[..fired] {
        assert_bits_eq(frame.angle, DEFAULT_INITIAL_ANGLE);
        assert_bits_eq(frame.angular_velocity, 0.0);
    }
    assert!(frames[fired].angular_velocity > 0.0);

    // The released knife eventually falls into the pivot.
    let pivot = report.pivot_reached_at().unwrap();
    assert!(pivot > fired);
}

// Reference trajectory of the knife released from the arm end, recorded
// with the same update order in double precision.
#[test]
fn released_knife_matches_reference_trajectory() {
    let mut p = Pendulum::new(std::f64::consts::PI / 3.0, 0.0);
    let mut k = Knife::with_threshold(4.0, 3.0, &mut p, 4.0).unwrap();
    for _ in 0..600 {
        k.advance();
    }

    assert_eq!(k.rotation_started_at(), Some(46));

    let l = k.radial_positions();
    assert_bits_eq(l.get(100).unwrap(), 0.0);
    assert_bits_eq(l.get(300).unwrap(), 4.0);
    assert_bits_eq(l.get(600).unwrap(), 3.845_745_228_820_543);
    assert_bits_eq(
        k.radial_velocities().get(600).unwrap(),
        -1.633_522_334_739_011_5,
    );

    let pendulum = k.pendulum();
    assert_bits_eq(pendulum.angles().get(600).unwrap(), 1.056_365_845_758_272_3);
    assert_bits_eq(
        pendulum.angular_velocities().get(600).unwrap(),
        0.354_810_367_551_397_2,
    );

    let first = |kind: BoundaryKind| {
        k.events()
            .iter()
            .find(|e| e.kind == kind)
            .map(|e| e.step)
    };
    assert_eq!(first(BoundaryKind::Pivot), Some(99));
    assert_eq!(first(BoundaryKind::ArmEnd), Some(194));
}

#[test]
fn default_pendulum_config_reproduces_reference_trajectory() {
    let config = SimConfig {
        knife: KnifeConfig::released_from_arm_end(4.0, 3.0),
        ..SimConfig::default()
    };
    let report = run(&config).unwrap();
    let last = report.trajectory.last().unwrap();
    assert_bits_eq(last.radial_position, 3.845_745_228_820_543);
    assert_bits_eq(last.angle, 1.056_365_845_758_272_3);
    assert_eq!(report.rotation_started_at, Some(46));
    assert_eq!(report.pivot_reached_at(), Some(99));
}

#[test]
fn stop_at_pivot_ends_run_on_the_event_step() {
    let config = SimConfig {
        knife: KnifeConfig::released_from_arm_end(4.0, 3.0),
        ..SimConfig::builder().stop_at_pivot(true).build()
    };
    let report = run(&config).unwrap();
    let pivot = report.pivot_reached_at().unwrap();
    assert_eq!(report.steps, pivot);
    assert_eq!(report.trajectory.len(), pivot + 1);
}

#[test]
fn invalid_start_position_is_rejected() {
    let mut p = Pendulum::new(DEFAULT_INITIAL_ANGLE, 0.0);
    let err = Knife::new(4.5, &mut p, 4.0).unwrap_err();
    assert!(matches!(err, SimError::InvalidConfiguration { .. }));

    let config = SimConfig::builder().start_position(-0.5).build();
    assert!(run(&config).is_err());
}

#[test]
fn repeated_runs_are_bit_identical() {
    let summary = verify_reproducibility(&SimConfig::default(), 3).unwrap();
    assert!(summary.identical);
    assert!(summary.ensure_identical().is_ok());
}
