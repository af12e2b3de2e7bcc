pub mod config;
pub mod integrator;
pub mod nbody;

pub use config::SimConfig;
pub use integrator::kick_drift_step;
pub use nbody::NBodySim;
