use std::io::{self, Write};
use std::path::Path;

use chrono::{DateTime, Utc};
use nalgebra::Vector3;

use crate::sim::NBodySim;

/// Displayed-body state at one recorded instant.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub elapsed: f64, // s since start
    pub epoch: DateTime<Utc>,
    pub labels: Vec<String>,
    pub positions: Vec<Vector3<f64>>,
    pub velocities: Vec<Vector3<f64>>,
}

impl Snapshot {
    /// Capture the displayed bodies of `sim`. `labels` is indexed by body
    /// index; missing entries fall back to `body-<index>`.
    pub fn capture(sim: &NBodySim, labels: &[String]) -> Self {
        let labels = sim
            .displayed_indices()
            .into_iter()
            .map(|i| labels.get(i).cloned().unwrap_or_else(|| format!("body-{i}")))
            .collect();
        Snapshot {
            elapsed: sim.elapsed(),
            epoch: sim.time(),
            labels,
            positions: sim.positions(),
            velocities: sim.velocities(),
        }
    }
}

/// Write snapshots as CSV, one row per (snapshot, displayed body).
///
/// Columns: time_s, epoch, body, pos_x, pos_y, pos_z, vel_x, vel_y, vel_z
pub fn write_trajectory<W: Write>(writer: &mut W, snapshots: &[Snapshot]) -> io::Result<()> {
    writeln!(writer, "time_s,epoch,body,pos_x,pos_y,pos_z,vel_x,vel_y,vel_z")?;

    for s in snapshots {
        let epoch = s.epoch.format("%Y-%m-%dT%H:%M:%S%.3f");
        for ((label, r), v) in s.labels.iter().zip(&s.positions).zip(&s.velocities) {
            writeln!(
                writer,
                "{:.3},{},{},{:.9e},{:.9e},{:.9e},{:.9e},{:.9e},{:.9e}",
                s.elapsed, epoch, label,
                r.x, r.y, r.z,
                v.x, v.y, v.z,
            )?;
        }
    }

    Ok(())
}

/// Write snapshots to a CSV file at the given path.
pub fn write_trajectory_file(path: impl AsRef<Path>, snapshots: &[Snapshot]) -> io::Result<()> {
    let mut file = io::BufWriter::new(std::fs::File::create(path)?);
    write_trajectory(&mut file, snapshots)?;
    file.flush()
}
