//! Exact univariate polynomial and rational-function toolkit over ℚ[n],
//! with the integer-ring helpers and decimal bridges used by the PCF engine.

pub mod error;
pub mod numeric;
pub mod parser;
pub mod poly;
pub mod rational;
pub mod ring;
pub mod roots;

pub use error::PolyError;
pub use parser::{parse_rational, parse_rational_function};
pub use poly::{IntPolynomial, Polynomial};
pub use rational::RationalFunction;
pub use ring::{deflation_content, gcd_integer, lcm_all, lcm_integer};
pub use roots::integer_roots;
