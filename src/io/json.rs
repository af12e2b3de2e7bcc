use std::io::{self, Write};
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::SimError;
use crate::sim::NBodySim;

/// Summary statistics for one simulation run.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub name: Option<String>,
    pub bodies: usize,
    pub displayed: usize,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub elapsed_s: f64,
    pub frames: usize,
    pub substeps: usize,
    pub initial_energy_j: f64,
    pub final_energy_j: f64,
    pub relative_energy_drift: f64,
    pub momentum: [f64; 3], // kg m/s
    pub max_ephemeris_deviation_m: Option<f64>,
}

impl RunSummary {
    /// Summarise `sim` after a run that started with `initial_energy`.
    pub fn from_sim(
        name: Option<String>,
        sim: &NBodySim,
        frames: usize,
        substeps: usize,
        initial_energy: f64,
        max_deviation: Option<f64>,
    ) -> Result<Self, SimError> {
        let final_energy = sim.total_energy()?;
        let drift = if initial_energy != 0.0 {
            ((final_energy - initial_energy) / initial_energy).abs()
        } else {
            final_energy.abs()
        };
        let p = sim.total_momentum();

        Ok(RunSummary {
            name,
            bodies: sim.body_count(),
            displayed: sim.displayed_indices().len(),
            start: sim.clock().epoch(),
            end: sim.time(),
            elapsed_s: sim.elapsed(),
            frames,
            substeps,
            initial_energy_j: initial_energy,
            final_energy_j: final_energy,
            relative_energy_drift: drift,
            momentum: [p.x, p.y, p.z],
            max_ephemeris_deviation_m: max_deviation,
        })
    }
}

/// Write a run summary as pretty-printed JSON.
pub fn write_summary<W: Write>(writer: &mut W, summary: &RunSummary) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *writer, summary)?;
    writeln!(writer)
}

/// Write a run summary JSON file.
pub fn write_summary_file(path: impl AsRef<Path>, summary: &RunSummary) -> io::Result<()> {
    let mut file = std::fs::File::create(path)?;
    write_summary(&mut file, summary)
}
