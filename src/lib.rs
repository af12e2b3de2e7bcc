pub mod error;
pub mod time;
pub mod bodies;
pub mod physics;
pub mod orbital;
pub mod ephemeris;
pub mod sim;
pub mod scenario;
pub mod io;

pub use error::{EphemerisError, Result, SimError};
pub use ephemeris::{EphemerisSource, Frame, KeplerEphemeris, Observer};
pub use sim::{NBodySim, SimConfig};
pub use time::SimClock;
