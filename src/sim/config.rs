use serde::{Deserialize, Serialize};

use crate::ephemeris::{Frame, Observer, SUN};
use crate::physics::G_SI;

// ---------------------------------------------------------------------------
// Simulation configuration
// ---------------------------------------------------------------------------

/// Per-simulation constants. Each `NBodySim` owns its own copy, so runs with
/// different constants can coexist.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub gravitational_constant: f64, // m^3 / (kg s^2)
    pub frame: Frame,                // default frame for ephemeris lookups
    pub observer: Observer,          // default origin for ephemeris lookups
}

/// SI G, ecliptic J2000 axes, heliocentric origin.
impl Default for SimConfig {
    fn default() -> Self {
        Self {
            gravitational_constant: G_SI,
            frame: Frame::EclipticJ2000,
            observer: Observer::Body(SUN),
        }
    }
}

impl SimConfig {
    /// Same frame and observer, different gravitational constant.
    pub fn with_gravitational_constant(self, g: f64) -> Self {
        Self { gravitational_constant: g, ..self }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_heliocentric_ecliptic() {
        let cfg = SimConfig::default();
        assert_eq!(cfg.gravitational_constant, G_SI);
        assert_eq!(cfg.frame, Frame::EclipticJ2000);
        assert_eq!(cfg.observer.naif_id(), SUN);
    }

    #[test]
    fn missing_yaml_fields_fall_back_to_defaults() {
        let cfg: SimConfig = serde_yaml::from_str("observer: 0").unwrap();
        assert_eq!(cfg.observer, Observer::SolarSystemBarycenter);
        assert_eq!(cfg.gravitational_constant, G_SI);
        assert_eq!(cfg.with_gravitational_constant(2.0).observer, cfg.observer);
    }
}
