pub mod elements;

pub use elements::{eccentric_anomaly, true_anomaly, wrap_pi, KeplerianElements};
