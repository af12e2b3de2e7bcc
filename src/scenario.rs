//! YAML scenario files.
//!
//! ```yaml
//! name: outer planets
//! start: 2000-01-01T00:00:00Z
//! dt: 1000.0              # s per sub-step
//! substeps: 50            # sub-steps per recorded frame
//! frames: 200
//! gravitational_constant: 6.674e-11   # optional
//! frame: ECLIPJ2000                   # optional
//! observer: 0                         # optional NAIF id (default 10, the Sun)
//! bodies:
//!   - source: 10
//!     name: Sun
//!   - name: spacecraft
//!     mass: 1000.0
//!     position: [1.5e11, 0.0, 0.0]
//!     velocity: [0.0, 29780.0, 0.0]
//!     display: false
//! ```

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use log::info;
use nalgebra::Vector3;
use serde::Deserialize;
use thiserror::Error;

use crate::ephemeris::{EphemerisSource, EphemerisTrack};
use crate::error::SimError;
use crate::sim::{NBodySim, SimConfig};

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("cannot read scenario {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed scenario")]
    Parse(#[from] serde_yaml::Error),

    #[error("invalid scenario: {0}")]
    Invalid(String),

    #[error(transparent)]
    Sim(#[from] SimError),
}

fn shown() -> bool {
    true
}

fn one() -> usize {
    1
}

/// One body entry: either looked up in an ephemeris or given explicitly.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum BodySpec {
    Source {
        source: i32,
        #[serde(default)]
        name: Option<String>,
        #[serde(default = "shown")]
        display: bool,
    },
    Explicit {
        name: String,
        mass: f64,
        position: [f64; 3],
        velocity: [f64; 3],
        #[serde(default = "shown")]
        display: bool,
    },
}

impl BodySpec {
    fn label(&self) -> String {
        match self {
            BodySpec::Source { name: Some(n), .. } | BodySpec::Explicit { name: n, .. } => n.clone(),
            BodySpec::Source { source, .. } => format!("naif-{source}"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub name: Option<String>,
    pub start: DateTime<Utc>,
    pub dt: f64,
    #[serde(default = "one")]
    pub substeps: usize,
    pub frames: usize,
    #[serde(flatten)]
    pub sim: SimConfig,
    pub bodies: Vec<BodySpec>,
}

impl Scenario {
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ScenarioError> {
        let scenario: Scenario = serde_yaml::from_reader(reader)?;
        scenario.validate()?;
        Ok(scenario)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ScenarioError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| ScenarioError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(BufReader::new(file))
    }

    fn validate(&self) -> Result<(), ScenarioError> {
        if !self.dt.is_finite() || self.dt <= 0.0 {
            return Err(ScenarioError::Invalid(format!("dt must be positive, got {}", self.dt)));
        }
        if self.substeps == 0 {
            return Err(ScenarioError::Invalid("substeps must be at least 1".into()));
        }
        let g = self.sim.gravitational_constant;
        if !g.is_finite() || g <= 0.0 {
            return Err(ScenarioError::Invalid(format!(
                "gravitational_constant must be positive, got {g}"
            )));
        }
        Ok(())
    }

    /// Seconds covered by one recorded frame.
    pub fn frame_seconds(&self) -> f64 {
        self.dt * self.substeps as f64
    }

    /// Create the simulation and add every body in file order.
    pub fn build<S: EphemerisSource + ?Sized>(&self, source: &S) -> Result<Run, ScenarioError> {
        let mut sim = NBodySim::with_config(self.start, self.sim)?;
        let mut labels = Vec::with_capacity(self.bodies.len());
        let mut bindings = Vec::new();

        for spec in &self.bodies {
            let index = match *spec {
                BodySpec::Source { source: id, display, .. } => {
                    let index = sim.add_from_source(source, id, display)?;
                    bindings.push((index, id));
                    index
                }
                BodySpec::Explicit { mass, position, velocity, display, .. } => sim.add_body(
                    mass,
                    Vector3::from(position),
                    Vector3::from(velocity),
                    display,
                )?,
            };
            debug_assert_eq!(index, labels.len());
            labels.push(spec.label());
        }

        info!(
            "scenario '{}': {} bodies ({} from ephemeris), start {}",
            self.name.as_deref().unwrap_or("unnamed"),
            sim.body_count(),
            bindings.len(),
            self.start,
        );
        Ok(Run { sim, labels, bindings })
    }
}

// ---------------------------------------------------------------------------
// Built scenario
// ---------------------------------------------------------------------------

/// A ready-to-step simulation plus the bookkeeping needed to report on it.
#[derive(Debug, Clone)]
pub struct Run {
    pub sim: NBodySim,
    /// One label per body, in insertion order.
    pub labels: Vec<String>,
    /// `(body index, NAIF id)` for every ephemeris-seeded body.
    pub bindings: Vec<(usize, i32)>,
}

impl Run {
    /// Labels of displayed bodies, aligned with `sim.positions()`.
    pub fn displayed_labels(&self) -> Vec<String> {
        self.sim
            .displayed_indices()
            .into_iter()
            .map(|i| self.labels[i].clone())
            .collect()
    }

    /// Ephemeris track following every seeded body from the start epoch.
    pub fn ephemeris_track<'a, S: EphemerisSource + ?Sized>(
        &self,
        source: &'a S,
    ) -> EphemerisTrack<'a, S> {
        let cfg = self.sim.config();
        let mut track = EphemerisTrack::new(source, self.sim.clock().epoch(), cfg.frame, cfg.observer);
        for &(_, id) in &self.bindings {
            track.add(id);
        }
        track
    }

    /// Largest distance between an integrated body and its ephemeris
    /// position. `track` must have been built by [`ephemeris_track`](Self::ephemeris_track)
    /// and stepped in lockstep with the simulation.
    pub fn max_deviation<S: EphemerisSource + ?Sized>(
        &self,
        track: &EphemerisTrack<'_, S>,
    ) -> Result<f64, SimError> {
        let reference = track.positions()?;
        Ok(self
            .bindings
            .iter()
            .zip(&reference)
            .filter_map(|(&(index, _), r)| self.sim.position_of(index).map(|p| (p - r).norm()))
            .fold(0.0_f64, f64::max))
    }
}
