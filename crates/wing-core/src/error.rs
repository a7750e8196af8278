use thiserror::Error;

#[derive(Debug, Error)]
pub enum WingError {
    #[error("Out of domain: {position} not in [{min}, {max}]")]
    OutOfDomain { position: f64, min: f64, max: f64 },

    #[error("Incompatible profile: {0}")]
    IncompatibleProfile(String),

    #[error("Cycle detected: {0}")]
    CycleDetected(String),

    #[error("Multiple roots: {0}")]
    MultipleRoots(String),

    #[error("No convergence after {iterations} iterations (residual {residual})")]
    Convergence { iterations: usize, residual: f64 },

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

pub type Result<T> = std::result::Result<T, WingError>;
