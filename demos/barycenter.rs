use anyhow::Result;
use chrono::{TimeZone, Utc};

use nbody_sim::ephemeris::SUN;
use nbody_sim::{EphemerisSource, KeplerEphemeris, NBodySim, Observer, SimConfig};

fn main() -> Result<()> {
    env_logger::init();

    let dt = 1.0e3; // s
    let n = 5_000; // sub-steps per frame
    let frames = 120;

    let eph = KeplerEphemeris::solar_system();
    let config = SimConfig {
        observer: Observer::SolarSystemBarycenter,
        ..SimConfig::default()
    };
    let mut sim = NBodySim::with_config(Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap(), config)?;
    for id in [SUN, 5, 6] {
        sim.add_from_source(&eph, id, true)?;
    }
    let sun_radius = eph.radius(SUN)?;

    let mut track = nbody_sim::ephemeris::EphemerisTrack::new(
        &eph,
        sim.clock().epoch(),
        sim.config().frame,
        sim.config().observer,
    );
    track.add(SUN);

    println!("  Sun offset from the solar-system barycenter (Sun + Jupiter + Saturn)");
    println!("  {:>10}  {:>14}  {:>16}", "date", "simulated (R☉)", "ephemeris (R☉)");
    for frame in 0..frames {
        sim.step(dt, n)?;
        track.step(dt * n as f64)?;
        if frame % 6 == 0 {
            let simulated = sim.positions()[0].norm() / sun_radius;
            let reference = track.positions()?[0].norm() / sun_radius;
            println!(
                "  {:>10}  {:>14.3}  {:>16.3}",
                sim.time().format("%Y-%m-%d"),
                simulated,
                reference
            );
        }
    }
    Ok(())
}
