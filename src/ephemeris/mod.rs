//! Ephemeris sources: initial conditions for named bodies at a given epoch.
//!
//! Bodies are addressed by NAIF integer ids (10 = Sun, 1..=9 = planet
//! barycenters, `n99` = planet `n`, 0 = solar-system barycenter).

pub mod kepler;
pub mod track;

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::error::EphemerisError;

pub use kepler::{CatalogEntry, KeplerEphemeris, MeanElements, AU};
pub use track::EphemerisTrack;

pub const SOLAR_SYSTEM_BARYCENTER: i32 = 0;
pub const SUN: i32 = 10;

/// Id under which physical constants (GM, radii) are filed.
///
/// Planet barycenters `1..=9` carry their constants under the planet id
/// `id * 100 + 99`; every other id files under itself.
pub fn constants_id(id: i32) -> i32 {
    if (1..=9).contains(&id) {
        id * 100 + 99
    } else {
        id
    }
}

// ---------------------------------------------------------------------------
// Reference frame
// ---------------------------------------------------------------------------

/// J2000 obliquity of the ecliptic, rad (84381.448 arcsec).
pub const OBLIQUITY_J2000: f64 = 84_381.448 / 3600.0 * std::f64::consts::PI / 180.0;

/// Inertial reference frame states are expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Frame {
    /// Mean ecliptic and equinox of J2000.
    #[default]
    #[serde(rename = "ECLIPJ2000")]
    EclipticJ2000,
    /// Earth mean equator and equinox of J2000.
    #[serde(rename = "J2000")]
    EquatorialJ2000,
}

impl Frame {
    pub fn name(&self) -> &'static str {
        match self {
            Frame::EclipticJ2000 => "ECLIPJ2000",
            Frame::EquatorialJ2000 => "J2000",
        }
    }

    /// Rotate a vector given in ecliptic J2000 coordinates into this frame.
    pub fn from_ecliptic(&self, v: Vector3<f64>) -> Vector3<f64> {
        match self {
            Frame::EclipticJ2000 => v,
            Frame::EquatorialJ2000 => {
                let (s, c) = OBLIQUITY_J2000.sin_cos();
                Vector3::new(v.x, c * v.y - s * v.z, s * v.y + c * v.z)
            }
        }
    }
}

impl FromStr for Frame {
    type Err = EphemerisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ECLIPJ2000" => Ok(Frame::EclipticJ2000),
            "J2000" => Ok(Frame::EquatorialJ2000),
            _ => Err(EphemerisError::UnknownFrame(s.to_string())),
        }
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Observer
// ---------------------------------------------------------------------------

/// Origin that states are measured from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "i32", into = "i32")]
pub enum Observer {
    SolarSystemBarycenter,
    Body(i32),
}

impl Observer {
    pub fn naif_id(&self) -> i32 {
        match *self {
            Observer::SolarSystemBarycenter => SOLAR_SYSTEM_BARYCENTER,
            Observer::Body(id) => id,
        }
    }
}

impl From<i32> for Observer {
    fn from(id: i32) -> Self {
        if id == SOLAR_SYSTEM_BARYCENTER {
            Observer::SolarSystemBarycenter
        } else {
            Observer::Body(id)
        }
    }
}

impl From<Observer> for i32 {
    fn from(o: Observer) -> Self {
        o.naif_id()
    }
}

// ---------------------------------------------------------------------------
// Source contract
// ---------------------------------------------------------------------------

/// Mass and kinematic state of one body at one epoch (SI units).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EphemerisState {
    pub mass: f64,              // kg
    pub position: Vector3<f64>, // m
    pub velocity: Vector3<f64>, // m/s
}

/// Supplier of real-world initial conditions.
///
/// Implementations report positions in metres and velocities in m/s,
/// relative to `observer`, expressed in `frame`.
pub trait EphemerisSource {
    /// Gravitational parameter GM, m^3/s^2.
    fn gm(&self, id: i32) -> Result<f64, EphemerisError>;

    /// Position and velocity of `id` at `epoch`.
    fn state(
        &self,
        id: i32,
        epoch: DateTime<Utc>,
        frame: Frame,
        observer: Observer,
    ) -> Result<(Vector3<f64>, Vector3<f64>), EphemerisError>;

    /// Equatorial radius, m.
    fn radius(&self, id: i32) -> Result<f64, EphemerisError> {
        Err(EphemerisError::MissingConstant { id: constants_id(id), item: "RADII" })
    }

    /// Mass implied by GM under the caller's gravitational constant `g`.
    fn mass(&self, id: i32, g: f64) -> Result<f64, EphemerisError> {
        Ok(self.gm(id)? / g)
    }

    fn position(
        &self,
        id: i32,
        epoch: DateTime<Utc>,
        frame: Frame,
        observer: Observer,
    ) -> Result<Vector3<f64>, EphemerisError> {
        Ok(self.state(id, epoch, frame, observer)?.0)
    }

    fn velocity(
        &self,
        id: i32,
        epoch: DateTime<Utc>,
        frame: Frame,
        observer: Observer,
    ) -> Result<Vector3<f64>, EphemerisError> {
        Ok(self.state(id, epoch, frame, observer)?.1)
    }

    /// Everything needed to seed a simulated body.
    fn query(
        &self,
        id: i32,
        epoch: DateTime<Utc>,
        frame: Frame,
        observer: Observer,
        g: f64,
    ) -> Result<EphemerisState, EphemerisError> {
        let mass = self.mass(id, g)?;
        let (position, velocity) = self.state(id, epoch, frame, observer)?;
        Ok(EphemerisState { mass, position, velocity })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn barycenter_ids_map_to_planet_constants() {
        assert_eq!(constants_id(5), 599);
        assert_eq!(constants_id(3), 399);
        assert_eq!(constants_id(10), 10);
        assert_eq!(constants_id(0), 0);
        assert_eq!(constants_id(399), 399);
    }

    #[test]
    fn frame_names_parse() {
        assert_eq!("eclipj2000".parse::<Frame>().unwrap(), Frame::EclipticJ2000);
        assert_eq!("J2000".parse::<Frame>().unwrap(), Frame::EquatorialJ2000);
        assert_eq!(
            "GALACTIC".parse::<Frame>(),
            Err(EphemerisError::UnknownFrame("GALACTIC".into()))
        );
        assert_eq!(Frame::EquatorialJ2000.to_string(), "J2000");
    }

    #[test]
    fn equatorial_rotation_preserves_length() {
        let v = Vector3::new(1.0, 2.0, 3.0);
        let eq = Frame::EquatorialJ2000.from_ecliptic(v);
        assert!((eq.norm() - v.norm()).abs() < 1e-12);
        assert_eq!(eq.x, v.x);
        // Ecliptic pole tilts toward -y in equatorial coordinates
        let pole = Frame::EquatorialJ2000.from_ecliptic(Vector3::z());
        assert!(pole.y < 0.0 && (pole.z - OBLIQUITY_J2000.cos()).abs() < 1e-15);
    }

    #[test]
    fn observer_roundtrips_through_naif_id() {
        assert_eq!(Observer::from(0), Observer::SolarSystemBarycenter);
        assert_eq!(Observer::from(10), Observer::Body(SUN));
        assert_eq!(i32::from(Observer::Body(399)), 399);
    }
}
