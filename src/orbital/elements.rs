use std::f64::consts::{PI, TAU};

use nalgebra::Vector3;

/// Classical Keplerian orbital elements.
#[derive(Debug, Clone, Copy)]
pub struct KeplerianElements {
    pub sma: f64,       // semi-major axis, m
    pub ecc: f64,       // eccentricity (0 = circular)
    pub inc: f64,       // inclination, rad
    pub raan: f64,      // longitude of ascending node, rad
    pub argp: f64,      // argument of periapsis, rad
    pub true_anom: f64, // true anomaly, rad
}

impl KeplerianElements {
    /// Convert to a state vector (position, velocity) about a central body
    /// with gravitational parameter `mu` (m^3/s^2).
    pub fn to_state_vector(&self, mu: f64) -> (Vector3<f64>, Vector3<f64>) {
        let p = self.sma * (1.0 - self.ecc * self.ecc); // semi-latus rectum
        let r_pqw = p / (1.0 + self.ecc * self.true_anom.cos());

        // Perifocal frame (PQW)
        let r_pqw_vec = Vector3::new(
            r_pqw * self.true_anom.cos(),
            r_pqw * self.true_anom.sin(),
            0.0,
        );
        let sqrt_mu_p = (mu / p).sqrt();
        let v_pqw_vec = Vector3::new(
            -sqrt_mu_p * self.true_anom.sin(),
            sqrt_mu_p * (self.ecc + self.true_anom.cos()),
            0.0,
        );

        // PQW -> reference plane
        let (sin_raan, cos_raan) = self.raan.sin_cos();
        let (sin_argp, cos_argp) = self.argp.sin_cos();
        let (sin_inc, cos_inc) = self.inc.sin_cos();

        let rot = |v: &Vector3<f64>| -> Vector3<f64> {
            Vector3::new(
                (cos_raan * cos_argp - sin_raan * sin_argp * cos_inc) * v.x
                    + (-cos_raan * sin_argp - sin_raan * cos_argp * cos_inc) * v.y,
                (sin_raan * cos_argp + cos_raan * sin_argp * cos_inc) * v.x
                    + (-sin_raan * sin_argp + cos_raan * cos_argp * cos_inc) * v.y,
                (sin_argp * sin_inc) * v.x + (cos_argp * sin_inc) * v.y,
            )
        };

        (rot(&r_pqw_vec), rot(&v_pqw_vec))
    }
}

// ---------------------------------------------------------------------------
// Kepler's equation
// ---------------------------------------------------------------------------

const KEPLER_TOL: f64 = 1e-12;
const KEPLER_MAX_ITER: usize = 50;

/// Solve `E - e sin E = M` for the eccentric anomaly (elliptic orbits).
///
/// Returns `None` if Newton iteration fails to converge.
pub fn eccentric_anomaly(mean_anom: f64, ecc: f64) -> Option<f64> {
    let m = wrap_pi(mean_anom);
    let mut e_anom = if ecc < 0.8 { m } else { PI.copysign(m) };

    for _ in 0..KEPLER_MAX_ITER {
        let f = e_anom - ecc * e_anom.sin() - m;
        let step = f / (1.0 - ecc * e_anom.cos());
        e_anom -= step;
        if step.abs() < KEPLER_TOL {
            return Some(e_anom);
        }
    }
    None
}

/// True anomaly from eccentric anomaly.
pub fn true_anomaly(ecc_anom: f64, ecc: f64) -> f64 {
    let (s, c) = (0.5 * ecc_anom).sin_cos();
    2.0 * ((1.0 + ecc).sqrt() * s).atan2((1.0 - ecc).sqrt() * c)
}

/// Wrap an angle into (-pi, pi].
pub fn wrap_pi(angle: f64) -> f64 {
    let a = angle.rem_euclid(TAU);
    if a > PI { a - TAU } else { a }
}
