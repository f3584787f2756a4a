use pcf_poly::PolyError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PcfError {
    #[error("Invalid PCF: {0}")]
    InvalidPcf(String),

    #[error("Initial conditions must be exactly four integers, got {0}")]
    InvalidInitialConditions(usize),

    #[error("Depth {depth} is below the minimum of {minimum}")]
    InvalidDepth { depth: u64, minimum: u64 },

    #[error("Fold factor must be a positive integer, got {0}")]
    InvalidFactor(i64),

    #[error("Degenerate recursion: zero denominator at depth {depth}")]
    DegenerateRecursion { depth: u64 },

    #[error("Degenerate inflation: {0}")]
    DegenerateInflation(String),

    #[error("Singular transform: {0}")]
    SingularTransform(String),

    #[error("Fit failed: {0}")]
    FitFailed(String),

    #[error("Polynomial error: {0}")]
    Poly(#[from] PolyError),

    #[error("Config error: {0}")]
    Config(String),
}

impl PcfError {
    pub(crate) fn check_depth(depth: u64, minimum: u64) -> Result<(), PcfError> {
        if depth < minimum {
            Err(PcfError::InvalidDepth { depth, minimum })
        } else {
            Ok(())
        }
    }
}
