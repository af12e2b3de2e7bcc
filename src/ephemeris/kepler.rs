use chrono::{DateTime, Utc};
use log::debug;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use super::{constants_id, EphemerisSource, Frame, Observer, SUN};
use crate::error::EphemerisError;
use crate::orbital::{eccentric_anomaly, true_anomaly, wrap_pi, KeplerianElements};
use crate::time::seconds_since_j2000;

/// Astronomical unit, m.
pub const AU: f64 = 1.495_978_707e11;

const SECONDS_PER_CENTURY: f64 = 36_525.0 * 86_400.0;

// ---------------------------------------------------------------------------
// Mean orbital elements
// ---------------------------------------------------------------------------

/// Heliocentric mean elements at J2000 with linear rates per Julian century,
/// referred to the mean ecliptic and equinox of J2000.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeanElements {
    pub sma_au: [f64; 2],        // a, da/dT           (AU, AU/cy)
    pub ecc: [f64; 2],           // e, de/dT
    pub inc_deg: [f64; 2],       // I, dI/dT           (deg, deg/cy)
    pub mean_lon_deg: [f64; 2],  // L, dL/dT
    pub peri_lon_deg: [f64; 2],  // longitude of perihelion
    pub node_lon_deg: [f64; 2],  // longitude of ascending node
}

impl MeanElements {
    /// Osculating elements `centuries` Julian centuries after J2000.
    /// `None` if Kepler's equation fails to converge.
    pub fn at(&self, centuries: f64) -> Option<KeplerianElements> {
        let lin = |p: [f64; 2]| p[0] + p[1] * centuries;

        let ecc = lin(self.ecc);
        let mean_lon = lin(self.mean_lon_deg).to_radians();
        let peri_lon = lin(self.peri_lon_deg).to_radians();
        let node = lin(self.node_lon_deg).to_radians();

        let mean_anom = wrap_pi(mean_lon - peri_lon);
        let ecc_anom = eccentric_anomaly(mean_anom, ecc)?;

        Some(KeplerianElements {
            sma: lin(self.sma_au) * AU,
            ecc,
            inc: lin(self.inc_deg).to_radians(),
            raan: node,
            argp: peri_lon - node,
            true_anom: true_anomaly(ecc_anom, ecc),
        })
    }
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// One body known to a [`KeplerEphemeris`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: i32,
    pub name: String,
    pub gm: f64,             // m^3/s^2
    pub radius: Option<f64>, // m, equatorial
    /// `None` pins the body at the heliocentric origin (the Sun).
    pub elements: Option<MeanElements>,
}

impl CatalogEntry {
    fn matches(&self, id: i32) -> bool {
        self.id == id || constants_id(self.id) == constants_id(id)
    }
}

/// Analytic ephemeris from mean Keplerian elements.
///
/// Each body follows a two-body heliocentric ellipse whose elements drift
/// linearly in time. Planet ids (`n99`) resolve to their barycenter entry.
/// Accuracy is that of the elements table: arc-minutes over 1800-2050 for
/// the preset solar system.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KeplerEphemeris {
    entries: Vec<CatalogEntry>,
}

impl KeplerEphemeris {
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    /// Find a body by NAIF id.
    pub fn entry(&self, id: i32) -> Result<&CatalogEntry, EphemerisError> {
        self.entries
            .iter()
            .find(|e| e.matches(id))
            .ok_or(EphemerisError::UnknownBody(id))
    }

    /// Find a body by case-insensitive name.
    pub fn lookup_name(&self, name: &str) -> Option<i32> {
        self.entries
            .iter()
            .find(|e| e.name.eq_ignore_ascii_case(name))
            .map(|e| e.id)
    }

    fn central_gm(&self) -> f64 {
        self.entries
            .iter()
            .find(|e| e.elements.is_none())
            .map_or(0.0, |e| e.gm)
    }

    /// Heliocentric ecliptic state of one entry.
    fn heliocentric(
        &self,
        entry: &CatalogEntry,
        centuries: f64,
    ) -> Result<(Vector3<f64>, Vector3<f64>), EphemerisError> {
        let Some(mean) = entry.elements else {
            return Ok((Vector3::zeros(), Vector3::zeros()));
        };
        let osculating = mean
            .at(centuries)
            .ok_or(EphemerisError::Convergence { id: entry.id })?;
        Ok(osculating.to_state_vector(self.central_gm() + entry.gm))
    }

    /// GM-weighted mean of every catalog body (heliocentric, ecliptic).
    fn barycenter(&self, centuries: f64) -> Result<(Vector3<f64>, Vector3<f64>), EphemerisError> {
        let mut total = 0.0;
        let mut r = Vector3::zeros();
        let mut v = Vector3::zeros();
        for entry in &self.entries {
            let (ri, vi) = self.heliocentric(entry, centuries)?;
            r += ri * entry.gm;
            v += vi * entry.gm;
            total += entry.gm;
        }
        if total > 0.0 {
            r /= total;
            v /= total;
        }
        Ok((r, v))
    }

    /// Sun plus the eight planet-system barycenters.
    ///
    /// Elements: JPL approximate planetary positions (1800-2050).
    /// GM values: DE440.
    pub fn solar_system() -> Self {
        let planet = |id, name: &str, gm_km3: f64, radius_km: f64, el: [[f64; 2]; 6]| {
            CatalogEntry {
                id,
                name: name.to_string(),
                gm: gm_km3 * 1e9,
                radius: Some(radius_km * 1e3),
                elements: Some(MeanElements {
                    sma_au: el[0],
                    ecc: el[1],
                    inc_deg: el[2],
                    mean_lon_deg: el[3],
                    peri_lon_deg: el[4],
                    node_lon_deg: el[5],
                }),
            }
        };

        Self::new(vec![
            CatalogEntry {
                id: SUN,
                name: "Sun".into(),
                gm: 132_712_440_041.279_42e9,
                radius: Some(695_700.0e3),
                elements: None,
            },
            planet(1, "Mercury", 22_031.868_551, 2_440.53, [
                [0.387_099_27, 0.000_000_37],
                [0.205_635_93, 0.000_019_06],
                [7.004_979_02, -0.005_947_49],
                [252.250_323_50, 149_472.674_111_75],
                [77.457_796_28, 0.160_476_89],
                [48.330_765_93, -0.125_340_81],
            ]),
            planet(2, "Venus", 324_858.592, 6_051.8, [
                [0.723_335_66, 0.000_003_90],
                [0.006_776_72, -0.000_041_07],
                [3.394_676_05, -0.000_788_90],
                [181.979_099_50, 58_517.815_387_29],
                [131.602_467_18, 0.002_683_29],
                [76.679_842_55, -0.277_694_18],
            ]),
            planet(3, "Earth", 403_503.235_502, 6_378.1366, [
                [1.000_002_61, 0.000_005_62],
                [0.016_711_23, -0.000_043_92],
                [-0.000_015_31, -0.012_946_68],
                [100.464_571_66, 35_999.372_449_81],
                [102.937_681_93, 0.323_273_64],
                [0.0, 0.0],
            ]),
            planet(4, "Mars", 42_828.375_816, 3_396.19, [
                [1.523_710_34, 0.000_018_47],
                [0.093_394_10, 0.000_078_82],
                [1.849_691_42, -0.008_131_31],
                [-4.553_432_05, 19_140.302_684_99],
                [-23.943_629_59, 0.444_410_88],
                [49.559_538_91, -0.292_573_43],
            ]),
            planet(5, "Jupiter", 126_712_764.1, 71_492.0, [
                [5.202_887_00, -0.000_116_07],
                [0.048_386_24, -0.000_132_53],
                [1.304_396_95, -0.001_837_14],
                [34.396_440_51, 3_034.746_127_75],
                [14.728_479_83, 0.212_526_68],
                [100.473_909_09, 0.204_691_06],
            ]),
            planet(6, "Saturn", 37_940_584.841_8, 60_268.0, [
                [9.536_675_94, -0.001_250_60],
                [0.053_861_79, -0.000_509_91],
                [2.485_991_87, 0.001_936_09],
                [49.954_244_23, 1_222.493_622_01],
                [92.598_878_31, -0.418_972_16],
                [113.662_424_48, -0.288_677_94],
            ]),
            planet(7, "Uranus", 5_794_556.4, 25_559.0, [
                [19.189_164_64, -0.001_961_76],
                [0.047_257_44, -0.000_043_97],
                [0.772_637_83, -0.002_429_39],
                [313.238_104_51, 428.482_027_85],
                [170.954_276_30, 0.408_052_81],
                [74.016_925_03, 0.042_405_89],
            ]),
            planet(8, "Neptune", 6_836_527.100_58, 24_764.0, [
                [30.069_922_76, 0.000_262_91],
                [0.008_590_48, 0.000_051_05],
                [1.770_043_47, 0.000_353_72],
                [-55.120_029_69, 218.459_453_25],
                [44.964_762_27, -0.322_414_64],
                [131.784_225_74, -0.005_086_64],
            ]),
        ])
    }
}

impl EphemerisSource for KeplerEphemeris {
    fn gm(&self, id: i32) -> Result<f64, EphemerisError> {
        Ok(self.entry(id)?.gm)
    }

    fn radius(&self, id: i32) -> Result<f64, EphemerisError> {
        self.entry(id)?
            .radius
            .ok_or(EphemerisError::MissingConstant { id: constants_id(id), item: "RADII" })
    }

    fn state(
        &self,
        id: i32,
        epoch: DateTime<Utc>,
        frame: Frame,
        observer: Observer,
    ) -> Result<(Vector3<f64>, Vector3<f64>), EphemerisError> {
        let centuries = seconds_since_j2000(epoch) / SECONDS_PER_CENTURY;
        let (r, v) = self.heliocentric(self.entry(id)?, centuries)?;

        let (r_obs, v_obs) = match observer {
            Observer::SolarSystemBarycenter => self.barycenter(centuries)?,
            Observer::Body(obs) => {
                let entry = self
                    .entry(obs)
                    .map_err(|_| EphemerisError::UnsupportedObserver(obs))?;
                self.heliocentric(entry, centuries)?
            }
        };

        debug!("kepler state: body {id} at {epoch} ({frame}, observer {})", observer.naif_id());
        Ok((frame.from_ecliptic(r - r_obs), frame.from_ecliptic(v - v_obs)))
    }
}
