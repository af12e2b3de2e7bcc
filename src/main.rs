use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use nbody_sim::io::{self, RunSummary, Snapshot};
use nbody_sim::scenario::Scenario;
use nbody_sim::ephemeris::AU;
use nbody_sim::KeplerEphemeris;

/// Integrate a scenario file and report how it evolved.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Scenario YAML file
    scenario: PathBuf,

    /// Write the displayed-body trajectory as CSV
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Write a JSON run summary
    #[arg(long)]
    summary: Option<PathBuf>,

    /// Track ephemeris-seeded bodies against the analytic ephemeris
    #[arg(long)]
    compare: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let scenario = Scenario::from_path(&args.scenario)
        .with_context(|| format!("loading {}", args.scenario.display()))?;
    let ephemeris = KeplerEphemeris::solar_system();
    let mut run = scenario.build(&ephemeris).context("building simulation")?;
    let mut track = args.compare.then(|| run.ephemeris_track(&ephemeris));

    let initial_energy = run.sim.total_energy().context("initial energy")?;
    let mut snapshots = Vec::with_capacity(scenario.frames + 1);
    snapshots.push(Snapshot::capture(&run.sim, &run.labels));
    let mut max_dev: Option<f64> = None;

    for frame in 0..scenario.frames {
        run.sim
            .step(scenario.dt, scenario.substeps)
            .with_context(|| format!("frame {frame} at {}", run.sim.clock()))?;
        if let Some(track) = track.as_mut() {
            track.step(scenario.frame_seconds())?;
            let dev = run.max_deviation(track)?;
            max_dev = Some(max_dev.map_or(dev, |m| m.max(dev)));
        }
        snapshots.push(Snapshot::capture(&run.sim, &run.labels));
    }

    let summary = RunSummary::from_sim(
        scenario.name.clone(),
        &run.sim,
        scenario.frames,
        scenario.substeps,
        initial_energy,
        max_dev,
    )?;

    // -----------------------------------------------------------------------
    // Report
    // -----------------------------------------------------------------------
    println!();
    println!("====================================================================");
    println!("  N-BODY RUN — {}", summary.name.as_deref().unwrap_or("unnamed"));
    println!("====================================================================");
    println!(
        "  Bodies:        {:>8}       Displayed:    {:>8}",
        summary.bodies, summary.displayed
    );
    println!("  Start:         {}", summary.start.format("%Y-%m-%d %H:%M:%S"));
    println!("  End:           {}", summary.end.format("%Y-%m-%d %H:%M:%S"));
    println!(
        "  Steps:         {:>8} x {} x {} s",
        scenario.frames, scenario.substeps, scenario.dt
    );
    println!("  Energy drift:  {:>12.3e}", summary.relative_energy_drift);
    if let Some(dev) = summary.max_ephemeris_deviation_m {
        println!("  Max deviation: {:>12.3e} m  ({:.4} AU)", dev, dev / AU);
    }
    println!();

    if let Some(last) = snapshots.last() {
        println!("  {:<12} {:>14} {:>14} {:>14}", "body", "x (AU)", "y (AU)", "z (AU)");
        println!("  {}", "─".repeat(58));
        for (label, r) in last.labels.iter().zip(&last.positions) {
            let au = r / AU;
            println!("  {:<12} {:>14.6} {:>14.6} {:>14.6}", label, au.x, au.y, au.z);
        }
        println!();
    }

    if let Some(path) = &args.csv {
        io::write_trajectory_file(path, &snapshots)
            .with_context(|| format!("writing {}", path.display()))?;
        info!("trajectory written to {}", path.display());
    }
    if let Some(path) = &args.summary {
        io::write_summary_file(path, &summary)
            .with_context(|| format!("writing {}", path.display()))?;
        info!("summary written to {}", path.display());
    }

    Ok(())
}
