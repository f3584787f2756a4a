use crate::error::PolyError;
use crate::numeric::rational_gcd;
use crate::poly::Polynomial;
use num_bigint::BigInt;
use num_integer::Integer;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};
use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

/// Quotient of two polynomials in `n`, kept in canonical form:
/// coprime, integer coefficients with joint content 1, positive leading
/// denominator coefficient. Zero is `0/1`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RationalFunction {
    num: Polynomial,
    den: Polynomial,
}

impl RationalFunction {
    pub fn new(num: Polynomial, den: Polynomial) -> Result<Self, PolyError> {
        if den.is_zero() {
            return Err(PolyError::DivisionByZero);
        }
        Ok(Self::reduce(num, den))
    }

    // den must be non-zero
    fn reduce(num: Polynomial, den: Polynomial) -> Self {
        if num.is_zero() {
            return Self::zero();
        }

        let g = num.gcd(&den);
        let (num, den) = match (num.div_rem(&g), den.div_rem(&g)) {
            (Ok((n, _)), Ok((d, _))) => (n, d),
            _ => (num, den),
        };

        let lcm = num.denominator_lcm().lcm(&den.denominator_lcm());
        let lcm = BigRational::from_integer(lcm);
        let (num, den) = (num.scale(&lcm), den.scale(&lcm));

        let content = rational_gcd(&num.content(), &den.content());
        let mut factor = content.recip();
        if den.leading_coeff().is_negative() {
            factor = -factor;
        }

        RationalFunction {
            num: num.scale(&factor),
            den: den.scale(&factor),
        }
    }

    pub fn from_polynomial(p: Polynomial) -> Self {
        Self::reduce(p, Polynomial::one())
    }

    pub fn constant(c: BigRational) -> Self {
        Self::from_polynomial(Polynomial::constant(c))
    }

    pub fn from_integer(c: i64) -> Self {
        Self::constant(BigRational::from_integer(BigInt::from(c)))
    }

    pub fn var() -> Self {
        Self::from_polynomial(Polynomial::var())
    }

    pub fn zero() -> Self {
        RationalFunction {
            num: Polynomial::zero(),
            den: Polynomial::one(),
        }
    }

    pub fn one() -> Self {
        RationalFunction {
            num: Polynomial::one(),
            den: Polynomial::one(),
        }
    }

    pub fn numer(&self) -> &Polynomial {
        &self.num
    }

    pub fn denom(&self) -> &Polynomial {
        &self.den
    }

    pub fn is_zero(&self) -> bool {
        self.num.is_zero()
    }

    pub fn is_one(&self) -> bool {
        self.num == self.den
    }

    /// True when the denominator is a constant (`n/2` is a polynomial).
    pub fn is_polynomial(&self) -> bool {
        self.den.is_constant()
    }

    pub fn as_polynomial(&self) -> Option<Polynomial> {
        let d = self.den.constant_value()?;
        Some(self.num.scale(&d.recip()))
    }

    pub fn div(&self, other: &Self) -> Result<Self, PolyError> {
        if other.is_zero() {
            return Err(PolyError::DivisionByZero);
        }
        Ok(Self::reduce(
            self.num.mul(&other.den),
            self.den.mul(&other.num),
        ))
    }

    pub fn recip(&self) -> Result<Self, PolyError> {
        Self::one().div(self)
    }

    /// Integer power; negative exponents take the reciprocal.
    pub fn pow(&self, exp: i32) -> Result<Self, PolyError> {
        let magnitude = exp.unsigned_abs();
        let raised = Self::reduce(self.num.pow(magnitude), self.den.pow(magnitude));
        if exp < 0 {
            raised.recip()
        } else {
            Ok(raised)
        }
    }

    pub fn eval(&self, x: &BigRational) -> Result<BigRational, PolyError> {
        let d = self.den.eval(x);
        if d.is_zero() {
            return Err(PolyError::Pole { at: x.clone() });
        }
        Ok(self.num.eval(x) / d)
    }

    pub fn eval_integer(&self, x: i64) -> Result<BigRational, PolyError> {
        self.eval(&BigRational::from_integer(BigInt::from(x)))
    }

    /// `f(scale·n + shift)`; fails when the substitution makes the denominator vanish.
    pub fn compose_linear(
        &self,
        scale: &BigRational,
        shift: &BigRational,
    ) -> Result<Self, PolyError> {
        Self::new(
            self.num.compose_linear(scale, shift),
            self.den.compose_linear(scale, shift),
        )
    }

    /// `f(n + k)`.
    pub fn shift(&self, k: i64) -> Self {
        Self::reduce(self.num.shift(k), self.den.shift(k))
    }
}

impl From<Polynomial> for RationalFunction {
    fn from(p: Polynomial) -> Self {
        RationalFunction::from_polynomial(p)
    }
}

impl From<i64> for RationalFunction {
    fn from(c: i64) -> Self {
        RationalFunction::from_integer(c)
    }
}

impl Add for &RationalFunction {
    type Output = RationalFunction;

    fn add(self, rhs: &RationalFunction) -> RationalFunction {
        RationalFunction::reduce(
            self.num.mul(&rhs.den).add(&rhs.num.mul(&self.den)),
            self.den.mul(&rhs.den),
        )
    }
}

impl Sub for &RationalFunction {
    type Output = RationalFunction;

    fn sub(self, rhs: &RationalFunction) -> RationalFunction {
        RationalFunction::reduce(
            self.num.mul(&rhs.den).sub(&rhs.num.mul(&self.den)),
            self.den.mul(&rhs.den),
        )
    }
}

impl Mul for &RationalFunction {
    type Output = RationalFunction;

    fn mul(self, rhs: &RationalFunction) -> RationalFunction {
        RationalFunction::reduce(self.num.mul(&rhs.num), self.den.mul(&rhs.den))
    }
}

impl Neg for &RationalFunction {
    type Output = RationalFunction;

    fn neg(self) -> RationalFunction {
        RationalFunction {
            num: self.num.neg(),
            den: self.den.clone(),
        }
    }
}

impl Add for RationalFunction {
    type Output = RationalFunction;

    fn add(self, rhs: RationalFunction) -> RationalFunction {
        &self + &rhs
    }
}

impl Sub for RationalFunction {
    type Output = RationalFunction;

    fn sub(self, rhs: RationalFunction) -> RationalFunction {
        &self - &rhs
    }
}

impl Mul for RationalFunction {
    type Output = RationalFunction;

    fn mul(self, rhs: RationalFunction) -> RationalFunction {
        &self * &rhs
    }
}

impl Neg for RationalFunction {
    type Output = RationalFunction;

    fn neg(self) -> RationalFunction {
        -&self
    }
}

fn needs_parens(p: &Polynomial) -> bool {
    p.coeffs().iter().filter(|c| !c.is_zero()).count() > 1
}

impl fmt::Display for RationalFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.den.is_one() {
            return write!(f, "{}", self.num);
        }
        if needs_parens(&self.num) {
            write!(f, "({})", self.num)?;
        } else {
            write!(f, "{}", self.num)?;
        }
        if needs_parens(&self.den) || (!self.den.is_constant() && !self.den.leading_coeff().is_one())
        {
            write!(f, "/({})", self.den)
        } else {
            write!(f, "/{}", self.den)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(coeffs: &[i64]) -> Polynomial {
        Polynomial::from_integers(coeffs)
    }

    fn q(n: i64, d: i64) -> BigRational {
        BigRational::new(BigInt::from(n), BigInt::from(d))
    }

    fn rf(num: &[i64], den: &[i64]) -> RationalFunction {
        RationalFunction::new(p(num), p(den)).unwrap()
    }

    #[test]
    fn test_canonical_form_cancels() {
        // (n^2 - 1) / (2n + 2) = (n - 1) / 2
        let f = rf(&[-1, 0, 1], &[2, 2]);
        assert_eq!(f.numer(), &p(&[-1, 1]));
        assert_eq!(f.denom(), &p(&[2]));
        assert!(f.is_polynomial());
        assert_eq!(f.as_polynomial().unwrap(), Polynomial::new(vec![q(-1, 2), q(1, 2)]));
    }

    #[test]
    fn test_canonical_sign_and_content() {
        // (-2n) / (-4n - 6) = n / (2n + 3)
        let f = rf(&[0, -2], &[-6, -4]);
        assert_eq!(f.numer(), &p(&[0, 1]));
        assert_eq!(f.denom(), &p(&[3, 2]));

        // rational coefficients are cleared jointly
        let g = RationalFunction::new(
            Polynomial::new(vec![q(1, 2), q(1, 3)]),
            Polynomial::new(vec![q(1, 1)]),
        )
        .unwrap();
        assert_eq!(g.numer(), &p(&[3, 2]));
        assert_eq!(g.denom(), &p(&[6]));
    }

    #[test]
    fn test_zero_denominator_rejected() {
        assert_eq!(
            RationalFunction::new(p(&[1]), Polynomial::zero()),
            Err(PolyError::DivisionByZero)
        );
        assert!(RationalFunction::zero().recip().is_err());
    }

    #[test]
    fn test_arithmetic() {
        let a = rf(&[1], &[0, 1]); // 1/n
        let b = rf(&[1], &[1, 1]); // 1/(n+1)
        // 1/n - 1/(n+1) = 1/(n^2 + n)
        assert_eq!(&a - &b, rf(&[1], &[0, 1, 1]));
        assert_eq!(&a * &b, rf(&[1], &[0, 1, 1]));
        assert_eq!((&a + &b).numer(), &p(&[1, 2]));
        assert!((&a - &a).is_zero());
        assert!(a.div(&a).unwrap().is_one());
        assert_eq!(a.pow(-2).unwrap(), rf(&[0, 0, 1], &[1]));
    }

    #[test]
    fn test_eval_and_pole() {
        let f = rf(&[1, 2], &[-1, 1]); // (2n+1)/(n-1)
        assert_eq!(f.eval_integer(3).unwrap(), q(7, 2));
        assert_eq!(f.eval_integer(1), Err(PolyError::Pole { at: q(1, 1) }));
    }

    #[test]
    fn test_shift_and_compose() {
        let f = rf(&[0, 1], &[2, 1]); // n/(n+2)
        assert_eq!(f.shift(1), rf(&[1, 1], &[3, 1]));
        let g = f.compose_linear(&q(2, 1), &q(-1, 1)).unwrap();
        assert_eq!(g, rf(&[-1, 2], &[1, 2]));
        assert!(f.compose_linear(&q(0, 1), &q(-2, 1)).is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(rf(&[1, 2], &[1]).to_string(), "2*n + 1");
        assert_eq!(rf(&[1, 2], &[3, 1]).to_string(), "(2*n + 1)/(n + 3)");
        assert_eq!(rf(&[0, 1], &[2]).to_string(), "n/2");
        assert_eq!(rf(&[1], &[0, 2]).to_string(), "1/(2*n)");
    }
}
