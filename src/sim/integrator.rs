use log::trace;
use nalgebra::Vector3;

use crate::bodies::BodyStore;
use crate::error::{Result, SimError};
use crate::physics::gravity::{self, is_finite};

// ---------------------------------------------------------------------------
// Semi-implicit Euler ("kick-drift") sub-step
// ---------------------------------------------------------------------------

/// Advance every body in `store` by one sub-step of length `dt`.
///
/// Accelerations are evaluated once from the current positions, then applied
/// to all bodies:
///
/// ```text
/// r += v dt + a dt^2 / 2
/// v += a dt
/// ```
///
/// On a degenerate configuration, or when any body would end up with a
/// non-finite acceleration, position or velocity, the error is returned
/// before any position or velocity is touched.
pub fn kick_drift_step(store: &mut BodyStore, g: f64, dt: f64) -> Result<()> {
    let (mass, pos, vel, acc) = store.kinematics_mut();
    gravity::accelerations(mass, pos, g, acc)?;

    let half_dt2 = 0.5 * dt * dt;
    let advance = |r: &Vector3<f64>, v: &Vector3<f64>, a: &Vector3<f64>| {
        (r + (v * dt + a * half_dt2), v + a * dt)
    };

    for (index, ((r, v), a)) in pos.iter().zip(vel.iter()).zip(acc.iter()).enumerate() {
        let (r1, v1) = advance(r, v, a);
        if !(is_finite(a) && is_finite(&r1) && is_finite(&v1)) {
            return Err(SimError::NonFiniteState { index });
        }
    }
    for ((r, v), a) in pos.iter_mut().zip(vel.iter_mut()).zip(acc.iter()) {
        (*r, *v) = advance(&*r, &*v, a);
    }

    trace!("kick-drift sub-step dt={dt} over {} bodies", mass.len());
    Ok(())
}
