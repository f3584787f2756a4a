//! Error types for the polynomial toolkit.

use num_rational::BigRational;
use thiserror::Error;

/// Errors raised by polynomial and rational-function operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PolyError {
    /// Division by the zero polynomial (or a zero denominator)
    #[error("division by zero polynomial")]
    DivisionByZero,

    /// A divisor that was required to divide exactly left a remainder
    #[error("inexact polynomial division: {divisor} does not divide {dividend}")]
    InexactDivision { dividend: String, divisor: String },

    /// Evaluation hit a root of the denominator
    #[error("rational function has a pole at n = {at}")]
    Pole { at: BigRational },

    /// Parse failure reported by the nom combinators
    #[error("parse error: {0}")]
    Parse(String),

    /// Input left over after a complete expression
    #[error("unconsumed input: {0}")]
    UnconsumedInput(String),

    /// Identifier other than the index variable
    #[error("unknown variable '{found}' (expected '{expected}')")]
    UnknownVariable { found: String, expected: String },

    /// Exponent that is not an integer constant
    #[error("exponent must be an integer constant, got {0}")]
    BadExponent(String),
}
