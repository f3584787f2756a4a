use crate::error::PolyError;
use crate::numeric::rational_gcd;
use num_bigint::BigInt;
use num_integer::Integer;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};
use std::cmp::max;
use std::fmt;

/// Dense univariate polynomial over ℚ in the index variable `n`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Polynomial {
    // Coefficients ordered by power: coeffs[i] is the coefficient of n^i
    coeffs: Vec<BigRational>,
}

impl Polynomial {
    pub fn new(coeffs: Vec<BigRational>) -> Self {
        let mut poly = Polynomial { coeffs };
        poly.trim();
        poly
    }

    /// Build from small integer coefficients, lowest power first.
    pub fn from_integers(coeffs: &[i64]) -> Self {
        Polynomial::new(
            coeffs
                .iter()
                .map(|&c| BigRational::from_integer(BigInt::from(c)))
                .collect(),
        )
    }

    pub fn from_bigints(coeffs: Vec<BigInt>) -> Self {
        Polynomial::new(coeffs.into_iter().map(BigRational::from_integer).collect())
    }

    pub fn zero() -> Self {
        Polynomial { coeffs: vec![] }
    }

    pub fn one() -> Self {
        Polynomial {
            coeffs: vec![BigRational::one()],
        }
    }

    pub fn constant(c: BigRational) -> Self {
        Polynomial::new(vec![c])
    }

    /// The index variable `n`.
    pub fn var() -> Self {
        Polynomial::from_integers(&[0, 1])
    }

    fn trim(&mut self) {
        while let Some(c) = self.coeffs.last() {
            if c.is_zero() {
                self.coeffs.pop();
            } else {
                break;
            }
        }
    }

    pub fn coeffs(&self) -> &[BigRational] {
        &self.coeffs
    }

    pub fn is_zero(&self) -> bool {
        self.coeffs.is_empty()
    }

    pub fn is_one(&self) -> bool {
        self.coeffs.len() == 1 && self.coeffs[0].is_one()
    }

    /// True for the zero polynomial and for non-zero constants.
    pub fn is_constant(&self) -> bool {
        self.coeffs.len() <= 1
    }

    pub fn constant_value(&self) -> Option<BigRational> {
        match self.coeffs.len() {
            0 => Some(BigRational::zero()),
            1 => Some(self.coeffs[0].clone()),
            _ => None,
        }
    }

    pub fn degree(&self) -> usize {
        if self.is_zero() {
            0 // the zero polynomial reports degree 0; callers check is_zero first
        } else {
            self.coeffs.len() - 1
        }
    }

    pub fn leading_coeff(&self) -> BigRational {
        self.coeffs.last().cloned().unwrap_or_else(BigRational::zero)
    }

    pub fn add(&self, other: &Self) -> Self {
        let len = max(self.coeffs.len(), other.coeffs.len());
        let mut new_coeffs = vec![BigRational::zero(); len];

        for (i, slot) in new_coeffs.iter_mut().enumerate() {
            if let Some(c) = self.coeffs.get(i) {
                *slot += c;
            }
            if let Some(c) = other.coeffs.get(i) {
                *slot += c;
            }
        }

        Polynomial::new(new_coeffs)
    }

    pub fn sub(&self, other: &Self) -> Self {
        self.add(&other.neg())
    }

    pub fn mul(&self, other: &Self) -> Self {
        if self.is_zero() || other.is_zero() {
            return Polynomial::zero();
        }
        let new_len = self.coeffs.len() + other.coeffs.len() - 1;
        let mut new_coeffs = vec![BigRational::zero(); new_len];

        for (i, c1) in self.coeffs.iter().enumerate() {
            for (j, c2) in other.coeffs.iter().enumerate() {
                new_coeffs[i + j] += c1 * c2;
            }
        }

        Polynomial::new(new_coeffs)
    }

    pub fn neg(&self) -> Self {
        Polynomial {
            coeffs: self.coeffs.iter().map(|c| -c).collect(),
        }
    }

    pub fn scale(&self, c: &BigRational) -> Self {
        Polynomial::new(self.coeffs.iter().map(|x| x * c).collect())
    }

    pub fn pow(&self, exp: u32) -> Self {
        let mut result = Polynomial::one();
        let mut base = self.clone();
        let mut e = exp;
        while e > 0 {
            if e & 1 == 1 {
                result = result.mul(&base);
            }
            e >>= 1;
            if e > 0 {
                base = base.mul(&base);
            }
        }
        result
    }

    /// Returns (quotient, remainder).
    pub fn div_rem(&self, divisor: &Self) -> Result<(Self, Self), PolyError> {
        if divisor.is_zero() {
            return Err(PolyError::DivisionByZero);
        }
        Ok(self.long_division(divisor))
    }

    /// Quotient of a division that must leave no remainder.
    pub fn exact_div(&self, divisor: &Self) -> Result<Self, PolyError> {
        let (q, r) = self.div_rem(divisor)?;
        if !r.is_zero() {
            return Err(PolyError::InexactDivision {
                dividend: self.to_string(),
                divisor: divisor.to_string(),
            });
        }
        Ok(q)
    }

    // divisor must be non-zero
    fn long_division(&self, divisor: &Self) -> (Self, Self) {
        if self.is_zero() || self.degree() < divisor.degree() {
            return (Polynomial::zero(), self.clone());
        }

        let divisor_deg = divisor.degree();
        let divisor_lc = divisor.leading_coeff();
        let mut quotient = vec![BigRational::zero(); self.degree() - divisor_deg + 1];
        let mut remainder = self.coeffs.clone();

        for k in (0..quotient.len()).rev() {
            let coeff = &remainder[k + divisor_deg] / &divisor_lc;
            if !coeff.is_zero() {
                for (j, d) in divisor.coeffs.iter().enumerate() {
                    remainder[k + j] -= &coeff * d;
                }
            }
            quotient[k] = coeff;
        }

        remainder.truncate(divisor_deg);
        (Polynomial::new(quotient), Polynomial::new(remainder))
    }

    /// Monic greatest common divisor over ℚ[n]; zero only when both inputs are zero.
    pub fn gcd(&self, other: &Self) -> Self {
        let mut a = self.clone();
        let mut b = other.clone();

        while !b.is_zero() {
            let (_, r) = a.long_division(&b);
            a = b;
            b = r;
        }

        if !a.is_zero() {
            let inv_lc = BigRational::one() / a.leading_coeff();
            a = a.scale(&inv_lc);
        }

        a
    }

    /// Horner evaluation at a rational point.
    pub fn eval(&self, x: &BigRational) -> BigRational {
        let mut result = BigRational::zero();
        for c in self.coeffs.iter().rev() {
            result = result * x + c;
        }
        result
    }

    pub fn eval_integer(&self, x: i64) -> BigRational {
        self.eval(&BigRational::from_integer(BigInt::from(x)))
    }

    /// `p(scale·n + shift)`.
    pub fn compose_linear(&self, scale: &BigRational, shift: &BigRational) -> Self {
        let inner = Polynomial::new(vec![shift.clone(), scale.clone()]);
        let mut result = Polynomial::zero();
        for c in self.coeffs.iter().rev() {
            result = result.mul(&inner).add(&Polynomial::constant(c.clone()));
        }
        result
    }

    /// `p(n + k)`.
    pub fn shift(&self, k: i64) -> Self {
        self.compose_linear(&BigRational::one(), &BigRational::from_integer(BigInt::from(k)))
    }

    /// Positive rational `c` with `self / c` a primitive integer polynomial; zero for zero.
    pub fn content(&self) -> BigRational {
        self.coeffs
            .iter()
            .fold(BigRational::zero(), |acc, c| rational_gcd(&acc, c))
    }

    /// `self / content()`, sign preserved.
    pub fn primitive_part(&self) -> Self {
        let c = self.content();
        if c.is_zero() {
            return Polynomial::zero();
        }
        self.scale(&c.recip())
    }

    /// Same polynomial with a positive leading coefficient.
    pub fn with_positive_leading(&self) -> Self {
        if self.leading_coeff().is_negative() {
            self.neg()
        } else {
            self.clone()
        }
    }

    pub fn has_integer_coeffs(&self) -> bool {
        self.coeffs.iter().all(|c| c.is_integer())
    }

    pub fn to_integer_coeffs(&self) -> Option<Vec<BigInt>> {
        self.coeffs
            .iter()
            .map(|c| if c.is_integer() { Some(c.to_integer()) } else { None })
            .collect()
    }

    /// LCM of every coefficient denominator.
    pub fn denominator_lcm(&self) -> BigInt {
        self.coeffs
            .iter()
            .fold(BigInt::one(), |acc, c| acc.lcm(c.denom()))
    }
}

impl fmt::Display for Polynomial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_zero() {
            return write!(f, "0");
        }

        let mut first = true;
        for (i, coeff) in self.coeffs.iter().enumerate().rev() {
            if coeff.is_zero() {
                continue;
            }
            let magnitude = coeff.abs();
            if first {
                if coeff.is_negative() {
                    write!(f, "-")?;
                }
            } else if coeff.is_negative() {
                write!(f, " - ")?;
            } else {
                write!(f, " + ")?;
            }
            first = false;

            let show_coeff = i == 0 || !magnitude.is_one();
            if show_coeff {
                write!(f, "{}", magnitude)?;
                if i > 0 {
                    write!(f, "*")?;
                }
            }
            match i {
                0 => {}
                1 => write!(f, "n")?,
                _ => write!(f, "n^{}", i)?,
            }
        }
        Ok(())
    }
}

/// Polynomial with integer coefficients, used on the hot path of the recurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntPolynomial {
    coeffs: Vec<BigInt>,
}

impl IntPolynomial {
    /// `None` when some coefficient is not an integer.
    pub fn from_polynomial(poly: &Polynomial) -> Option<Self> {
        poly.to_integer_coeffs().map(|coeffs| IntPolynomial { coeffs })
    }

    pub fn coeffs(&self) -> &[BigInt] {
        &self.coeffs
    }

    pub fn eval(&self, x: &BigInt) -> BigInt {
        let mut result = BigInt::zero();
        for c in self.coeffs.iter().rev() {
            result = result * x + c;
        }
        result
    }
}
