use nalgebra::Vector3;

use crate::error::{Result, SimError};

/// Newtonian gravitational constant, m^3 / (kg s^2).
pub const G_SI: f64 = 6.674e-11;

// ---------------------------------------------------------------------------
// Pairwise force matrix
// ---------------------------------------------------------------------------

/// Antisymmetric matrix of pairwise gravitational forces.
///
/// Only the strict lower triangle is stored: entry `(i, j)` with `j < i` is
/// the force pulling body `i` toward body `j`. The upper triangle is the
/// negated lower entry, so `F(i, j) == -F(j, i)` holds bit for bit.
#[derive(Debug, Clone)]
pub struct ForceMatrix {
    n: usize,
    lower: Vec<Vector3<f64>>, // N
}

impl ForceMatrix {
    /// Evaluate every unordered pair exactly once.
    ///
    /// Fails with [`SimError::DegenerateState`] when a separation is too small
    /// to evaluate: zero, a cube that underflows, or a force that overflows.
    pub fn compute(masses: &[f64], positions: &[Vector3<f64>], g: f64) -> Result<Self> {
        debug_assert_eq!(masses.len(), positions.len());
        let n = masses.len();
        let mut lower = Vec::with_capacity(n * n.saturating_sub(1) / 2);

        for i in 1..n {
            for j in 0..i {
                let dr = positions[j] - positions[i];
                let d = dr.norm();
                let force = separation_cubed(d)
                    .map(|d3| dr * (g * masses[i] * masses[j] / d3))
                    .filter(is_finite);
                let Some(force) = force else {
                    return Err(SimError::DegenerateState {
                        first: j,
                        second: i,
                        distance: d,
                    });
                };
                lower.push(force);
            }
        }

        Ok(Self { n, lower })
    }

    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// Force on body `i` exerted by body `j` (zero on the diagonal).
    pub fn get(&self, i: usize, j: usize) -> Vector3<f64> {
        match i.cmp(&j) {
            std::cmp::Ordering::Greater => self.lower[tri(i, j)],
            std::cmp::Ordering::Less => -self.lower[tri(j, i)],
            std::cmp::Ordering::Equal => Vector3::zeros(),
        }
    }

    /// Net force on every body.
    ///
    /// For body `i`: the sum of the row (pulls toward lower-indexed bodies)
    /// minus the sum of the column (the reaction to pulls exerted on
    /// higher-indexed bodies), each summed in increasing index order.
    pub fn net_forces(&self) -> Vec<Vector3<f64>> {
        let mut row = vec![Vector3::zeros(); self.n];
        let mut col = vec![Vector3::zeros(); self.n];
        for i in 1..self.n {
            for j in 0..i {
                let f = self.lower[tri(i, j)];
                row[i] += f;
                col[j] += f;
            }
        }
        row.iter().zip(&col).map(|(r, c)| r - c).collect()
    }
}

#[inline]
fn tri(i: usize, j: usize) -> usize {
    i * (i - 1) / 2 + j
}

/// `d^3` when it is a positive finite number, `None` for a degenerate pair.
#[inline]
fn separation_cubed(d: f64) -> Option<f64> {
    let d3 = d * d * d;
    (d3 > 0.0 && d3.is_finite()).then_some(d3)
}

pub(crate) fn is_finite(v: &Vector3<f64>) -> bool {
    v.iter().all(|c| c.is_finite())
}

// ---------------------------------------------------------------------------
// Derived quantities
// ---------------------------------------------------------------------------

/// Overwrite `out` with the gravitational acceleration of every body.
pub fn accelerations(
    masses: &[f64],
    positions: &[Vector3<f64>],
    g: f64,
    out: &mut [Vector3<f64>],
) -> Result<()> {
    let forces = ForceMatrix::compute(masses, positions, g)?.net_forces();
    for ((a, f), m) in out.iter_mut().zip(&forces).zip(masses) {
        *a = f / *m;
    }
    Ok(())
}

/// Total pairwise gravitational potential energy, J.
pub fn potential_energy(masses: &[f64], positions: &[Vector3<f64>], g: f64) -> Result<f64> {
    let mut u = 0.0;
    for i in 1..masses.len() {
        for j in 0..i {
            let d = (positions[j] - positions[i]).norm();
            let term = separation_cubed(d)
                .map(|_| g * masses[i] * masses[j] / d)
                .filter(|t| t.is_finite());
            let Some(term) = term else {
                return Err(SimError::DegenerateState { first: j, second: i, distance: d });
            };
            u -= term;
        }
    }
    Ok(u)
}
