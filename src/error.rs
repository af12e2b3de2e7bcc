use thiserror::Error;

// ---------------------------------------------------------------------------
// Simulation errors
// ---------------------------------------------------------------------------

/// Failures raised by the body store and the integrator.
#[derive(Debug, Error)]
pub enum SimError {
    /// Two bodies are close enough that the pair force cannot be evaluated:
    /// zero distance, a cube that underflows, or a force that overflows.
    #[error("bodies {first} and {second} are degenerate (separation {distance:e} m)")]
    DegenerateState {
        first: usize,
        second: usize,
        distance: f64,
    },

    /// A sub-step would push body `index` to a non-finite acceleration,
    /// position or velocity.
    #[error("body #{index} left the finite range during a step")]
    NonFiniteState { index: usize },

    /// Rejected at `add_body`: the body would poison later steps.
    #[error("invalid body #{index}: {reason}")]
    InvalidBody { index: usize, reason: String },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("ephemeris lookup failed")]
    Ephemeris(#[from] EphemerisError),
}

// ---------------------------------------------------------------------------
// Ephemeris errors
// ---------------------------------------------------------------------------

/// Failures raised by an ephemeris source.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EphemerisError {
    #[error("no ephemeris data for body {0}")]
    UnknownBody(i32),

    #[error("observer {0} is not supported by this source")]
    UnsupportedObserver(i32),

    #[error("unknown reference frame '{0}'")]
    UnknownFrame(String),

    #[error("body {id} has no '{item}' constant")]
    MissingConstant { id: i32, item: &'static str },

    #[error("Kepler equation did not converge for body {id}")]
    Convergence { id: i32 },
}

pub type Result<T, E = SimError> = std::result::Result<T, E>;
