pub mod gravity;

pub use gravity::{accelerations, potential_energy, ForceMatrix, G_SI};
