use nalgebra::Vector3;

// ---------------------------------------------------------------------------
// Struct-of-arrays body storage
// ---------------------------------------------------------------------------

/// Append-only, parallel-array storage for point masses.
///
/// Row `i` across `mass`, `pos`, `vel`, `acc` and `display` describes body `i`.
/// The arrays always have equal length; bodies are never removed.
///
/// Mass and state validation is the caller's responsibility: the store keeps
/// whatever it is given. `NBodySim::add_body` rejects non-positive masses
/// before they reach this type.
#[derive(Debug, Clone, Default)]
pub struct BodyStore {
    mass: Vec<f64>,             // kg
    pos: Vec<Vector3<f64>>,     // m
    vel: Vec<Vector3<f64>>,     // m/s
    acc: Vec<Vector3<f64>>,     // m/s^2, overwritten every sub-step
    display: Vec<bool>,
}

/// Saved kinematic state of every body.
#[derive(Debug, Clone)]
pub(crate) struct Kinematics {
    pos: Vec<Vector3<f64>>,
    vel: Vec<Vector3<f64>>,
    acc: Vec<Vector3<f64>>,
}

impl BodyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one body to every array and return its index.
    pub fn append(
        &mut self,
        mass: f64,
        position: Vector3<f64>,
        velocity: Vector3<f64>,
        display: bool,
    ) -> usize {
        let index = self.mass.len();
        self.mass.push(mass);
        self.pos.push(position);
        self.vel.push(velocity);
        self.acc.push(Vector3::zeros());
        self.display.push(display);
        index
    }

    pub fn count(&self) -> usize {
        self.mass.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mass.is_empty()
    }

    pub fn masses(&self) -> &[f64] {
        &self.mass
    }

    pub fn positions(&self) -> &[Vector3<f64>] {
        &self.pos
    }

    pub fn velocities(&self) -> &[Vector3<f64>] {
        &self.vel
    }

    pub fn accelerations(&self) -> &[Vector3<f64>] {
        &self.acc
    }

    pub fn display_mask(&self) -> &[bool] {
        &self.display
    }

    /// Split borrow for the integrator: masses stay read-only, the kinematic
    /// arrays (positions, velocities, accelerations) are handed out mutably.
    #[allow(clippy::type_complexity)]
    pub(crate) fn kinematics_mut(
        &mut self,
    ) -> (&[f64], &mut [Vector3<f64>], &mut [Vector3<f64>], &mut [Vector3<f64>]) {
        (&self.mass, &mut self.pos, &mut self.vel, &mut self.acc)
    }

    /// Copy of the kinematic arrays, for rolling back a failed step.
    pub(crate) fn snapshot(&self) -> Kinematics {
        Kinematics {
            pos: self.pos.clone(),
            vel: self.vel.clone(),
            acc: self.acc.clone(),
        }
    }

    /// Overwrite positions, velocities and accelerations from a snapshot.
    pub(crate) fn restore(&mut self, snapshot: Kinematics) {
        debug_assert_eq!(snapshot.pos.len(), self.count());
        debug_assert_eq!(snapshot.vel.len(), self.count());
        debug_assert_eq!(snapshot.acc.len(), self.count());
        self.pos = snapshot.pos;
        self.vel = snapshot.vel;
        self.acc = snapshot.acc;
    }

    /// Copy out the positions of displayed bodies, in insertion order.
    pub fn displayed_positions(&self) -> Vec<Vector3<f64>> {
        self.select(&self.pos)
    }

    /// Copy out the velocities of displayed bodies, in insertion order.
    pub fn displayed_velocities(&self) -> Vec<Vector3<f64>> {
        self.select(&self.vel)
    }

    /// Indices of displayed bodies, in insertion order.
    pub fn displayed_indices(&self) -> Vec<usize> {
        self.display
            .iter()
            .enumerate()
            .filter_map(|(i, &shown)| shown.then_some(i))
            .collect()
    }

    fn select(&self, column: &[Vector3<f64>]) -> Vec<Vector3<f64>> {
        column
            .iter()
            .zip(&self.display)
            .filter_map(|(v, &shown)| shown.then_some(*v))
            .collect()
    }
}
