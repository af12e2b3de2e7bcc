use anyhow::Result;
use chrono::{TimeZone, Utc};
use nalgebra::Vector3;

use nbody_sim::ephemeris::AU;
use nbody_sim::NBodySim;

fn main() -> Result<()> {
    env_logger::init();

    // Sun - Earth, Earth released at perihelion
    let m_star = 1.9885e30; // kg
    let m_planet = 5.9722e24; // kg
    let r_perihelion = 1.47095e11; // m
    let v_perihelion = 3.029e4; // m/s

    let dt = 5.0e4; // s
    let steps_per_frame = 20;

    let mut sim = NBodySim::new(Utc.with_ymd_and_hms(2000, 1, 3, 0, 0, 0).unwrap());
    sim.add_body(m_star, Vector3::zeros(), Vector3::zeros(), false)?;
    sim.add_body(
        m_planet,
        Vector3::new(r_perihelion, 0.0, 0.0),
        Vector3::new(0.0, v_perihelion, 0.0),
        true,
    )?;
    let e0 = sim.total_energy()?;

    println!("  {:>10}  {:>10}  {:>10}  {:>10}", "date", "x (AU)", "y (AU)", "r (AU)");
    while sim.elapsed() < 365.25 * 86_400.0 {
        sim.step(dt, steps_per_frame)?;
        let r = sim.positions()[0];
        println!(
            "  {:>10}  {:>10.5}  {:>10.5}  {:>10.5}",
            sim.time().format("%Y-%m-%d"),
            r.x / AU,
            r.y / AU,
            r.norm() / AU,
        );
    }

    let drift = (sim.total_energy()? - e0) / e0;
    println!();
    println!("  Relative energy drift after one year: {drift:.3e}");
    Ok(())
}
