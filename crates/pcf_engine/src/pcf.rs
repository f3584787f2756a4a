//! Polynomial continued fraction representation.
//!
//! A PCF is the continued fraction `a(0) + b(1)/(a(1) + b(2)/(a(2) + ...))`
//! with `a`, `b` rational functions of the index `n`. Values are immutable:
//! every transform returns a new `Pcf`.

use crate::error::PcfError;
use crate::matrix::{QMatrix, RationalMatrix, StepMatrix};
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Zero};
use pcf_poly::{
    deflation_content, integer_roots, lcm_integer, parse_rational_function, IntPolynomial,
    Polynomial, RationalFunction,
};
use std::fmt;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pcf {
    a: RationalFunction,
    b: RationalFunction,
    /// Cumulative factor relative to the reference PCF
    inflated_by: RationalFunction,
    /// LCM of the denominators of `a` and `b`
    denominator_lcm: Polynomial,
    a_compute: IntPolynomial,
    b_compute: IntPolynomial,
}

impl Pcf {
    pub fn new(a: RationalFunction, b: RationalFunction) -> Result<Self, PcfError> {
        Self::with_inflation(a, b, RationalFunction::one())
    }

    /// Build a PCF whose inflation bookkeeping starts from `seed`.
    ///
    /// The stored factor is `seed · L` where `L` clears the denominators of `a`
    /// and `b`: the evaluator runs on `a·L` and `b·L·L(n−1)`.
    pub fn with_inflation(
        a: RationalFunction,
        b: RationalFunction,
        seed: RationalFunction,
    ) -> Result<Self, PcfError> {
        let lcm = lcm_integer(a.denom(), b.denom())?;
        let lcm_rf = RationalFunction::from_polynomial(lcm.clone());
        let lcm_prev = lcm_rf.shift(-1);

        let a_compute = cleared(&(&a * &lcm_rf), "a")?;
        let b_compute = cleared(&(&(&b * &lcm_rf) * &lcm_prev), "b")?;
        let inflated_by = &seed * &lcm_rf;

        Ok(Pcf {
            a,
            b,
            inflated_by,
            denominator_lcm: lcm,
            a_compute,
            b_compute,
        })
    }

    /// Parse both coefficient functions, mapping `variable` onto `n`.
    pub fn parse(a: &str, b: &str, variable: &str) -> Result<Self, PcfError> {
        let a = parse_rational_function(a, variable)?;
        let b = parse_rational_function(b, variable)?;
        Self::new(a, b)
    }

    /// Construct and reject PCFs whose recurrence is undefined or degenerate.
    pub fn new_checked(a: RationalFunction, b: RationalFunction) -> Result<Self, PcfError> {
        let pcf = Self::new(a, b)?;
        pcf.validate()?;
        Ok(pcf)
    }

    /// Poles of `a` at `n ≥ 0`, poles of `b` at `n ≥ 1` and zeros of `b` at
    /// `n ≥ 1` make the continued fraction undefined or truncated.
    pub fn validate(&self) -> Result<(), PcfError> {
        if self.b.is_zero() {
            return Err(PcfError::InvalidPcf("b vanishes identically".to_string()));
        }
        let checks = [
            (self.a.denom(), 0, "a has a pole"),
            (self.b.denom(), 1, "b has a pole"),
            (self.b.numer(), 1, "b vanishes"),
        ];
        for (poly, from, what) in checks {
            if let Some(root) = integer_roots(poly)
                .into_iter()
                .find(|r| *r >= BigInt::from(from))
            {
                return Err(PcfError::InvalidPcf(format!("{} at n = {}", what, root)));
            }
        }
        Ok(())
    }

    pub fn a(&self) -> &RationalFunction {
        &self.a
    }

    pub fn b(&self) -> &RationalFunction {
        &self.b
    }

    pub fn inflated_by(&self) -> &RationalFunction {
        &self.inflated_by
    }

    pub fn denominator_lcm(&self) -> &Polynomial {
        &self.denominator_lcm
    }

    /// Integer-coefficient `a·L` driving the recurrence.
    pub fn a_compute(&self) -> &IntPolynomial {
        &self.a_compute
    }

    /// Integer-coefficient `b·L·L(n−1)` driving the recurrence.
    pub fn b_compute(&self) -> &IntPolynomial {
        &self.b_compute
    }

    pub fn is_polynomial(&self) -> bool {
        self.a.is_polynomial() && self.b.is_polynomial()
    }

    /// `n → scale·n + shift`; the inflation bookkeeping starts over.
    pub fn substitute(&self, scale: &BigRational, shift: &BigRational) -> Result<Self, PcfError> {
        Self::new(
            self.a.compose_linear(scale, shift)?,
            self.b.compose_linear(scale, shift)?,
        )
    }

    /// `n → n + k`.
    pub fn shift(&self, k: i64) -> Result<Self, PcfError> {
        Self::new(self.a.shift(k), self.b.shift(k))
    }

    /// `[[0, b(n)], [1, a(n)]]`.
    pub fn recurrence_matrix(&self) -> RationalMatrix {
        RationalMatrix::recurrence(&self.a, &self.b)
    }

    /// `[[1, a(0)], [0, 1]]`.
    pub fn initial_matrix(&self) -> Result<QMatrix, PcfError> {
        let a0 = self.a.eval_integer(0)?;
        Ok(QMatrix::new(
            BigRational::one(),
            a0,
            BigRational::zero(),
            BigRational::one(),
        ))
    }

    /// `[[1, a_compute(0)], [0, 1]]`, the evaluator's default start.
    pub fn default_initial(&self) -> StepMatrix {
        StepMatrix::new(
            BigInt::one(),
            self.a_compute.eval(&BigInt::zero()),
            BigInt::zero(),
            BigInt::one(),
        )
    }

    /// `PCF(a·c, b·c·c(n−1))` with the inflation factor composed with `c`.
    pub fn inflate(&self, c: &RationalFunction) -> Result<Self, PcfError> {
        if c.is_zero() {
            return Err(PcfError::DegenerateInflation(
                "cannot inflate by zero".to_string(),
            ));
        }
        let c_prev = c.shift(-1);
        let a = &self.a * c;
        let b = &(&self.b * c) * &c_prev;
        // the constructor multiplies its own denominator LCM back in
        let base = self
            .inflated_by
            .div(&RationalFunction::from_polynomial(self.denominator_lcm.clone()))?;
        let seed = &base * c;
        debug!(factor = %c, "inflating PCF");
        Self::with_inflation(a, b, seed)
    }

    /// Remove the largest factor `c(n)` with `c | a` and `c(n)·c(n−1) | b`.
    pub fn deflate_all(&self) -> Result<Self, PcfError> {
        let content = deflation_content(self.a.numer(), self.b.numer())?;
        if content.is_one() {
            return Ok(self.clone());
        }
        let factor = RationalFunction::from_polynomial(content).recip()?;
        self.inflate(&factor)
    }

    /// Polynomial, deflated form of the same continued fraction.
    pub fn canonical(&self, keep_inflation: bool) -> Result<Self, PcfError> {
        let polynomial = Self::with_inflation(
            RationalFunction::from_polynomial(int_to_poly(&self.a_compute)),
            RationalFunction::from_polynomial(int_to_poly(&self.b_compute)),
            self.inflated_by.clone(),
        )?
        .deflate_all()?;
        if keep_inflation {
            Ok(polynomial)
        } else {
            Ok(polynomial.without_inflation())
        }
    }

    /// Same coefficients with the inflation bookkeeping of a freshly built PCF.
    pub fn without_inflation(&self) -> Self {
        Pcf {
            inflated_by: RationalFunction::from_polynomial(self.denominator_lcm.clone()),
            ..self.clone()
        }
    }
}

fn int_to_poly(p: &IntPolynomial) -> Polynomial {
    Polynomial::from_bigints(p.coeffs().to_vec())
}

fn cleared(f: &RationalFunction, name: &str) -> Result<IntPolynomial, PcfError> {
    f.as_polynomial()
        .as_ref()
        .and_then(IntPolynomial::from_polynomial)
        .ok_or_else(|| {
            PcfError::InvalidPcf(format!("{} does not clear to an integer polynomial: {}", name, f))
        })
}

impl fmt::Display for Pcf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PCF({}, {})", self.a, self.b)
    }
}
