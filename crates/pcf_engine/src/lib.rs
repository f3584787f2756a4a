//! Polynomial continued fraction (PCF) engine.
//!
//! Exact evaluation of `a(0) + b(1)/(a(1) + b(2)/(a(2) + ...))` for
//! rational-function coefficients, its asymptotic invariants, and the
//! transforms relating equivalent or folded PCFs.

#![allow(clippy::needless_range_loop)] // Normal equations index rows and columns together

pub mod config;
pub mod dynamics;
pub mod error;
pub mod fit;
pub mod limit;
pub mod matrix;
pub mod pcf;
pub mod recurrence;
pub mod transform;

pub use config::{DynamicsSettings, EngineConfig, EvaluationSettings};
pub use dynamics::{DynamicsReport, DynamicsSummary, PcfDynamics, CONVERGENT_INDEX_SHIFT};
pub use error::PcfError;
pub use fit::{FitMode, FitModel, GrowthCoefficients};
pub use limit::Limit;
pub use matrix::{Matrix2, QMatrix, RationalMatrix, StepMatrix};
pub use pcf::Pcf;
pub use recurrence::{precision, precision_in_base, Checkpoint, Convergent, StepMatrixView};
pub use transform::{
    as_pcf, as_pcf_coboundary, as_pcf_eta, as_pcf_polys, fold_matrix, fold_pcf,
    folded_limit_transport, inflate_to_polynomial, integer_zeros, normalize_pcf, shift_amount,
    shift_to_viable, NormalizedPcf, ViabilityZeros,
};
