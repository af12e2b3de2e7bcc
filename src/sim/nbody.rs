use chrono::{DateTime, Utc};
use log::{debug, warn};
use nalgebra::Vector3;

use super::config::SimConfig;
use super::integrator::kick_drift_step;
use crate::bodies::BodyStore;
use crate::ephemeris::{EphemerisSource, Frame, Observer};
use crate::error::{Result, SimError};
use crate::physics::gravity::{self, ForceMatrix};
use crate::time::SimClock;

// ---------------------------------------------------------------------------
// Direct-summation N-body simulation
// ---------------------------------------------------------------------------

/// Gravitational N-body integrator.
///
/// Owns its bodies and its clock. Bodies may be added at any time, including
/// between steps; they join the force computation from the next sub-step on.
///
/// Non-positive masses and non-finite states are rejected at
/// [`add_body`](Self::add_body) rather than left to surface later as NaN.
#[derive(Debug, Clone)]
pub struct NBodySim {
    store: BodyStore,
    clock: SimClock,
    config: SimConfig,
}

impl NBodySim {
    /// Empty simulation starting at `start` with SI constants.
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            store: BodyStore::new(),
            clock: SimClock::new(start),
            config: SimConfig::default(),
        }
    }

    /// Empty simulation with its own constants. G must be positive and finite.
    pub fn with_config(start: DateTime<Utc>, config: SimConfig) -> Result<Self> {
        let g = config.gravitational_constant;
        if !g.is_finite() || g <= 0.0 {
            return Err(SimError::InvalidArgument(format!(
                "gravitational constant must be positive and finite, got {g}"
            )));
        }
        Ok(Self { config, ..Self::new(start) })
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    // -----------------------------------------------------------------------
    // Adding bodies
    // -----------------------------------------------------------------------

    /// Add a body with explicit initial conditions; returns its index.
    pub fn add_body(
        &mut self,
        mass: f64,
        position: Vector3<f64>,
        velocity: Vector3<f64>,
        display: bool,
    ) -> Result<usize> {
        let index = self.store.count();
        let invalid = |reason: String| SimError::InvalidBody { index, reason };

        if !mass.is_finite() || mass <= 0.0 {
            return Err(invalid(format!("mass must be positive and finite, got {mass}")));
        }
        if !position.iter().all(|c| c.is_finite()) {
            return Err(invalid(format!("non-finite position {position:?}")));
        }
        if !velocity.iter().all(|c| c.is_finite()) {
            return Err(invalid(format!("non-finite velocity {velocity:?}")));
        }

        let index = self.store.append(mass, position, velocity, display);
        debug!("body #{index}: m={mass:e} kg, display={display}, t={}", self.clock);
        Ok(index)
    }

    /// Add a body seeded from `source` at the current simulated time, using
    /// the configured frame and observer.
    pub fn add_from_source<S: EphemerisSource + ?Sized>(
        &mut self,
        source: &S,
        id: i32,
        display: bool,
    ) -> Result<usize> {
        let (frame, observer) = (self.config.frame, self.config.observer);
        self.add_from_source_with(source, id, display, frame, observer)
    }

    /// [`add_from_source`](Self::add_from_source) with an explicit frame and observer.
    pub fn add_from_source_with<S: EphemerisSource + ?Sized>(
        &mut self,
        source: &S,
        id: i32,
        display: bool,
        frame: Frame,
        observer: Observer,
    ) -> Result<usize> {
        let now = self.clock.now();
        let st = source.query(id, now, frame, observer, self.config.gravitational_constant)?;
        debug!("ephemeris body {id} at {now} ({frame}, observer {})", observer.naif_id());
        self.add_body(st.mass, st.position, st.velocity, display)
    }

    // -----------------------------------------------------------------------
    // Stepping
    // -----------------------------------------------------------------------

    /// Advance `n` sub-steps of `dt` seconds, then move the clock by `dt * n`.
    ///
    /// The call is all-or-nothing: if any sub-step meets a degenerate pair or
    /// leaves the finite range, positions, velocities and accelerations are
    /// restored to their values on entry and the clock does not move.
    pub fn step(&mut self, dt: f64, n: usize) -> Result<()> {
        if !dt.is_finite() || dt <= 0.0 {
            return Err(SimError::InvalidArgument(format!(
                "dt must be positive and finite, got {dt}"
            )));
        }
        if n == 0 {
            return Err(SimError::InvalidArgument("n must be at least 1".into()));
        }

        let g = self.config.gravitational_constant;
        let snapshot = self.store.snapshot();

        for k in 0..n {
            if let Err(err) = kick_drift_step(&mut self.store, g, dt) {
                warn!("step rejected at sub-step {k}/{n} (t={}): {err}", self.clock);
                self.store.restore(snapshot);
                return Err(err);
            }
        }

        self.clock.advance(dt * n as f64)
    }

    /// Single sub-step of `dt` seconds.
    pub fn step_once(&mut self, dt: f64) -> Result<()> {
        self.step(dt, 1)
    }

    // -----------------------------------------------------------------------
    // Accessors (all return copies)
    // -----------------------------------------------------------------------

    /// Current simulated calendar time.
    pub fn time(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn clock(&self) -> &SimClock {
        &self.clock
    }

    /// Seconds simulated since the start epoch.
    pub fn elapsed(&self) -> f64 {
        self.clock.elapsed()
    }

    pub fn body_count(&self) -> usize {
        self.store.count()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Every body's mass in insertion order, hidden bodies included.
    pub fn masses(&self) -> Vec<f64> {
        self.store.masses().to_vec()
    }

    /// Positions of displayed bodies, in insertion order.
    pub fn positions(&self) -> Vec<Vector3<f64>> {
        self.store.displayed_positions()
    }

    /// Velocities of displayed bodies, in insertion order.
    pub fn velocities(&self) -> Vec<Vector3<f64>> {
        self.store.displayed_velocities()
    }

    /// Indices of displayed bodies, aligned with [`positions`](Self::positions).
    pub fn displayed_indices(&self) -> Vec<usize> {
        self.store.displayed_indices()
    }

    /// Position of one body regardless of its display flag.
    pub fn position_of(&self, index: usize) -> Option<Vector3<f64>> {
        self.store.positions().get(index).copied()
    }

    /// Velocity of one body regardless of its display flag.
    pub fn velocity_of(&self, index: usize) -> Option<Vector3<f64>> {
        self.store.velocities().get(index).copied()
    }

    // -----------------------------------------------------------------------
    // Diagnostics
    // -----------------------------------------------------------------------

    /// Net gravitational force on every body for the current positions.
    pub fn net_forces(&self) -> Result<Vec<Vector3<f64>>> {
        let f = ForceMatrix::compute(
            self.store.masses(),
            self.store.positions(),
            self.config.gravitational_constant,
        )?;
        Ok(f.net_forces())
    }

    /// Total linear momentum, kg m/s.
    pub fn total_momentum(&self) -> Vector3<f64> {
        self.store
            .masses()
            .iter()
            .zip(self.store.velocities())
            .map(|(m, v)| v * *m)
            .sum()
    }

    /// Kinetic plus pairwise potential energy, J.
    pub fn total_energy(&self) -> Result<f64> {
        let kinetic: f64 = self
            .store
            .masses()
            .iter()
            .zip(self.store.velocities())
            .map(|(m, v)| 0.5 * m * v.norm_squared())
            .sum();
        let potential = gravity::potential_energy(
            self.store.masses(),
            self.store.positions(),
            self.config.gravitational_constant,
        )?;
        Ok(kinetic + potential)
    }

    /// Mass-weighted mean position; `None` with no bodies.
    pub fn center_of_mass(&self) -> Option<Vector3<f64>> {
        let total: f64 = self.store.masses().iter().sum();
        if self.store.is_empty() || total <= 0.0 {
            return None;
        }
        let weighted: Vector3<f64> = self
            .store
            .masses()
            .iter()
            .zip(self.store.positions())
            .map(|(m, r)| r * *m)
            .sum();
        Some(weighted / total)
    }
}
