use approx::{assert_abs_diff_eq, assert_relative_eq};
use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use nalgebra::Vector3;

use nbody_sim::ephemeris::{EphemerisTrack, SUN};
use nbody_sim::io::{self, Snapshot};
use nbody_sim::scenario::Scenario;
use nbody_sim::{EphemerisSource, Frame, KeplerEphemeris, NBodySim, Observer, SimConfig, SimError};

fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap()
}

fn unit_g() -> SimConfig {
    SimConfig::default().with_gravitational_constant(1.0)
}

/// Five bodies in a lopsided, non-planar arrangement
fn cluster() -> NBodySim {
    let mut sim = NBodySim::with_config(start(), unit_g()).unwrap();
    let bodies = [
        (3.0, [0.0, 0.0, 0.0], [0.0, 0.1, 0.0]),
        (1.0, [1.0, 0.2, -0.3], [0.0, 0.9, 0.1]),
        (0.5, [-2.0, 1.0, 0.5], [0.3, -0.4, 0.0]),
        (2.0, [0.5, -3.0, 1.0], [-0.2, 0.0, 0.05]),
        (0.01, [4.0, 4.0, -4.0], [0.0, 0.0, 0.0]),
    ];
    for (i, (m, r, v)) in bodies.into_iter().enumerate() {
        sim.add_body(m, Vector3::from(r), Vector3::from(v), i % 2 == 0).unwrap();
    }
    sim
}

// ==================================================================================
// Force law
// ==================================================================================

#[test]
fn net_force_vanishes_for_any_configuration() {
    let mut sim = cluster();
    for _ in 0..5 {
        let forces = sim.net_forces().unwrap();
        let total: Vector3<f64> = forces.iter().sum();
        let scale = forces.iter().map(|f| f.norm()).fold(0.0_f64, f64::max);
        assert!(total.norm() <= 1e-13 * scale, "sum m a = {total:?}");
        sim.step(0.01, 7).unwrap();
    }
}

#[test]
fn momentum_is_conserved_by_stepping() {
    let mut sim = cluster();
    let p0 = sim.total_momentum();
    sim.step(0.001, 2_000).unwrap();
    assert_abs_diff_eq!(sim.total_momentum(), p0, epsilon = 1e-10);
}

#[test]
fn two_body_force_matches_inverse_square() {
    let (m1, m2, d) = (5.0e24, 7.0e22, 3.84e8);
    let mut sim = NBodySim::new(start());
    sim.add_body(m1, Vector3::zeros(), Vector3::zeros(), true).unwrap();
    sim.add_body(m2, Vector3::new(0.0, 0.0, d), Vector3::zeros(), true).unwrap();

    let f = sim.net_forces().unwrap();
    let expected = nbody_sim::physics::G_SI * m1 * m2 / (d * d);
    assert_relative_eq!(f[0].norm(), expected, max_relative = 1e-12);
    assert_relative_eq!(f[0].normalize(), Vector3::z(), epsilon = 1e-15);
    assert_relative_eq!(f[1].normalize(), -Vector3::z(), epsilon = 1e-15);
}

// ==================================================================================
// Stepping
// ==================================================================================

#[test]
fn zero_and_one_body_move_linearly() {
    let mut empty = NBodySim::new(start());
    empty.step(10.0, 3).unwrap();
    assert!(empty.positions().is_empty());
    assert_eq!(empty.elapsed(), 30.0);

    let mut lone = NBodySim::new(start());
    lone.add_body(7.0, Vector3::new(1.0, 1.0, 1.0), Vector3::new(2.0, 0.0, -1.0), true)
        .unwrap();
    lone.step(0.5, 8).unwrap();
    assert_relative_eq!(lone.positions()[0], Vector3::new(9.0, 1.0, -3.0), epsilon = 1e-12);
    assert_eq!(lone.velocities()[0], Vector3::new(2.0, 0.0, -1.0));
}

#[test]
fn concrete_pair_scenario() {
    let mut sim = NBodySim::with_config(start(), unit_g()).unwrap();
    sim.add_body(1.0, Vector3::new(1.0, 0.0, 0.0), Vector3::zeros(), true).unwrap();
    sim.add_body(1.0, Vector3::new(-1.0, 0.0, 0.0), Vector3::zeros(), true).unwrap();
    sim.step(0.01, 1).unwrap();

    // |a| = G m / d^2 = 1/4 at d = 2; displacement = a dt^2 / 2
    let shift = 0.5 * 0.25 * 0.01_f64.powi(2);
    let pos = sim.positions();
    assert_relative_eq!(1.0 - pos[0].x, shift, max_relative = 1e-9);
    assert_relative_eq!(pos[1].x + 1.0, shift, max_relative = 1e-9);
    assert_eq!(pos[0].x, -pos[1].x);
    assert_eq!((pos[0].y, pos[0].z), (0.0, 0.0));
}

#[test]
fn batch_step_matches_repeated_single_steps() {
    let mut batched = cluster();
    let mut single = cluster();
    batched.step(0.002, 250).unwrap();
    for _ in 0..250 {
        single.step(0.002, 1).unwrap();
    }

    assert_abs_diff_eq!(batched.elapsed(), 0.5, epsilon = 1e-12);
    assert_abs_diff_eq!(single.elapsed(), batched.elapsed(), epsilon = 1e-12);
    let diff = (batched.time() - single.time()).num_microseconds().unwrap_or(i64::MAX);
    assert!(diff.abs() <= 1);
    for (a, b) in batched.positions().iter().zip(single.positions()) {
        assert_eq!(*a, b);
    }
}

#[test]
fn clock_advances_by_dt_times_n() {
    let mut sim = NBodySim::new(start());
    sim.add_body(1.0, Vector3::zeros(), Vector3::zeros(), true).unwrap();
    sim.add_body(1.0, Vector3::new(1.0e3, 0.0, 0.0), Vector3::zeros(), true).unwrap();
    sim.step(60.0, 90).unwrap();
    assert_eq!(sim.time(), start() + TimeDelta::seconds(5_400));
}

#[test]
fn circular_orbit_closes_after_one_period() {
    // Light satellite on a circular orbit around a heavy primary (G = 1)
    let (big, r) = (1.0, 1.0);
    let mut sim = NBodySim::with_config(start(), unit_g()).unwrap();
    sim.add_body(big, Vector3::zeros(), Vector3::zeros(), false).unwrap();
    sim.add_body(1e-9, Vector3::new(r, 0.0, 0.0), Vector3::new(0.0, 1.0, 0.0), true).unwrap();

    let period = std::f64::consts::TAU;
    let n = 20_000;
    let e0 = sim.total_energy().unwrap();
    sim.step(period / n as f64, n).unwrap();
    let pos = sim.positions()[0];
    assert!((pos - Vector3::new(r, 0.0, 0.0)).norm() < 2e-2, "ended at {pos:?}");
    assert_relative_eq!(sim.total_energy().unwrap(), e0, max_relative = 5e-3);
}

// ==================================================================================
// Accessors
// ==================================================================================

#[test]
fn display_filter_returns_only_shown_bodies() {
    let sim = cluster();
    assert_eq!(sim.body_count(), 5);
    assert_eq!(sim.masses(), vec![3.0, 1.0, 0.5, 2.0, 0.01]);
    assert_eq!(sim.displayed_indices(), vec![0, 2, 4]);

    let pos = sim.positions();
    assert_eq!(pos.len(), 3);
    assert_eq!(pos[1], Vector3::new(-2.0, 1.0, 0.5));
    assert!(!pos.contains(&Vector3::new(1.0, 0.2, -0.3)));
    assert_eq!(sim.velocities()[2], Vector3::zeros());
}

#[test]
fn returned_sequences_are_copies() {
    let sim = cluster();
    let mut pos = sim.positions();
    let mut masses = sim.masses();
    pos[0] = Vector3::repeat(f64::NAN);
    masses[0] = -1.0;
    assert_eq!(sim.positions()[0], Vector3::zeros());
    assert_eq!(sim.masses()[0], 3.0);
}

// ==================================================================================
// Failure modes
// ==================================================================================

#[test]
fn coincident_bodies_raise_degenerate_state() {
    let mut sim = cluster();
    sim.add_body(1.0, Vector3::new(1.0, 0.2, -0.3), Vector3::zeros(), true).unwrap();
    let before = sim.positions();
    match sim.step(0.01, 5) {
        Err(SimError::DegenerateState { first, second, distance }) => {
            assert_eq!((first, second), (1, 5));
            assert_eq!(distance, 0.0);
        }
        other => panic!("expected degenerate state, got {other:?}"),
    }
    assert_eq!(sim.positions(), before);
    assert_eq!(sim.elapsed(), 0.0);
    assert!(sim.positions().iter().all(|p| p.iter().all(|c| c.is_finite())));
}

#[test]
fn non_positive_mass_fails_fast() {
    let mut sim = NBodySim::new(start());
    let err = sim.add_body(0.0, Vector3::zeros(), Vector3::zeros(), true).unwrap_err();
    assert!(matches!(err, SimError::InvalidBody { index: 0, .. }));
    assert_eq!(sim.body_count(), 0);
}

#[test]
fn overflowing_pair_force_never_reaches_the_state() {
    let mut sim = NBodySim::new(start());
    sim.add_body(1.0e10, Vector3::zeros(), Vector3::zeros(), true).unwrap();
    sim.add_body(1.0e10, Vector3::new(1.0e-105, 0.0, 0.0), Vector3::zeros(), true).unwrap();
    let before = sim.positions();

    let err = sim.step(1.0, 1).unwrap_err();
    assert!(matches!(err, SimError::DegenerateState { first: 0, second: 1, .. }), "{err:?}");
    assert_eq!(sim.positions(), before);
    assert!(sim.velocities().iter().all(|v| v.iter().all(|c| c.is_finite())));
    assert_eq!(sim.elapsed(), 0.0);
}

#[test]
fn unusable_gravitational_constant_is_refused() {
    for g in [f64::NAN, 0.0, -6.674e-11] {
        let cfg = SimConfig::default().with_gravitational_constant(g);
        let err = NBodySim::with_config(start(), cfg).unwrap_err();
        assert!(matches!(err, SimError::InvalidArgument(_)), "G={g}: {err:?}");
    }
}

#[test]
fn default_origin_is_the_sun() {
    let eph = KeplerEphemeris::solar_system();
    let mut sim = NBodySim::new(start());
    let sun = sim.add_from_source(&eph, SUN, true).unwrap();
    assert_eq!(sim.position_of(sun), Some(Vector3::zeros()));
    assert_eq!(sim.velocity_of(sun), Some(Vector3::zeros()));
}

// ==================================================================================
// Ephemeris bridge
// ==================================================================================

#[test]
fn source_is_queried_at_current_simulated_time() {
    let eph = KeplerEphemeris::solar_system();
    let mut sim = NBodySim::new(start());
    let first = sim.add_from_source(&eph, 3, false).unwrap();
    // Let a lone Earth coast for ten days before adding another copy
    sim.step(86_400.0, 10).unwrap();
    let second = sim.add_from_source(&eph, 3, false).unwrap();

    let later = start() + TimeDelta::days(10);
    let cfg = sim.config();
    let expected = eph.position(3, later, cfg.frame, cfg.observer).unwrap();
    assert_eq!(sim.position_of(second), Some(expected));
    assert_ne!(sim.position_of(first), sim.position_of(second));
    assert_eq!(sim.masses()[0], sim.masses()[1]);
}

#[test]
fn ephemeris_failures_are_wrapped() {
    let eph = KeplerEphemeris::solar_system();
    let mut sim = NBodySim::new(start());
    let err = sim.add_from_source(&eph, 999, true).unwrap_err();
    assert!(matches!(
        err,
        SimError::Ephemeris(nbody_sim::EphemerisError::UnknownBody(999))
    ));
    assert_eq!(sim.body_count(), 0);
}

#[test]
fn explicit_frame_and_observer_override_config() {
    let eph = KeplerEphemeris::solar_system();
    let mut sim = NBodySim::new(start());
    let i = sim
        .add_from_source_with(&eph, SUN, true, Frame::EquatorialJ2000, Observer::Body(SUN))
        .unwrap();
    assert_eq!(sim.position_of(i), Some(Vector3::zeros()));
}

#[test]
fn integrated_earth_stays_close_to_ephemeris_for_a_month() {
    let eph = KeplerEphemeris::solar_system();
    let mut sim = NBodySim::new(start());
    let mut track = EphemerisTrack::new(&eph, start(), sim.config().frame, sim.config().observer);
    for id in [SUN, 3, 5] {
        sim.add_from_source(&eph, id, true).unwrap();
        track.add(id);
    }

    for _ in 0..30 {
        sim.step(600.0, 144).unwrap();
        track.step(86_400.0).unwrap();
    }
    let earth_sim = sim.positions()[1];
    let earth_ref = track.positions().unwrap()[1];
    // Mean-element ephemeris and 3-body dynamics agree to ~1e-3 AU
    assert!((earth_sim - earth_ref).norm() < 1.0e8, "{:e}", (earth_sim - earth_ref).norm());
}

// ==================================================================================
// Scenario files and outputs
// ==================================================================================

#[test]
fn scenario_file_runs_and_writes_outputs() {
    let dir = tempfile::tempdir().unwrap();
    let scenario_path = dir.path().join("pair.yaml");
    std::fs::write(
        &scenario_path,
        r#"
name: sun-earth
start: 2000-01-01T00:00:00Z
dt: 3600.0
substeps: 24
frames: 5
observer: 10
bodies:
  - source: 10
    name: Sun
  - source: 3
    name: Earth
"#,
    )
    .unwrap();

    let scenario = Scenario::from_path(&scenario_path).unwrap();
    let eph = KeplerEphemeris::solar_system();
    let mut run = scenario.build(&eph).unwrap();
    let e0 = run.sim.total_energy().unwrap();

    let mut snaps = vec![Snapshot::capture(&run.sim, &run.labels)];
    for _ in 0..scenario.frames {
        run.sim.step(scenario.dt, scenario.substeps).unwrap();
        snaps.push(Snapshot::capture(&run.sim, &run.labels));
    }

    let csv_path = dir.path().join("traj.csv");
    io::write_trajectory_file(&csv_path, &snaps).unwrap();
    let csv = std::fs::read_to_string(&csv_path).unwrap();
    assert_eq!(csv.lines().count(), 1 + 6 * 2);
    assert!(csv.lines().last().unwrap().contains(",Earth,"));

    let summary = io::RunSummary::from_sim(
        scenario.name.clone(),
        &run.sim,
        scenario.frames,
        scenario.substeps,
        e0,
        None,
    )
    .unwrap();
    let json_path = dir.path().join("summary.json");
    io::write_summary_file(&json_path, &summary).unwrap();
    let value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
    assert_eq!(value["bodies"], 2);
    assert_eq!(value["end"], "2000-01-06T00:00:00Z");
    assert!(value["relative_energy_drift"].as_f64().unwrap() < 1e-3);
}
