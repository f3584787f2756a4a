use crate::error::PcfError;
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Zero};
use pcf_poly::{PolyError, RationalFunction};
use std::fmt;
use std::ops::{Add, Mul, Sub};

/// 2×2 matrix stored row-major: `[[m00, m01], [m10, m11]]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Matrix2<T> {
    pub rows: [[T; 2]; 2],
}

/// Exact integer step matrix of the recurrence.
pub type StepMatrix = Matrix2<BigInt>;
/// Matrix over ℚ, used for initial matrices and Möbius transforms.
pub type QMatrix = Matrix2<BigRational>;
/// Matrix whose entries are rational functions of `n`.
pub type RationalMatrix = Matrix2<RationalFunction>;

impl<T> Matrix2<T> {
    pub fn new(m00: T, m01: T, m10: T, m11: T) -> Self {
        Matrix2 {
            rows: [[m00, m01], [m10, m11]],
        }
    }

    pub fn get(&self, row: usize, col: usize) -> &T {
        &self.rows[row][col]
    }

    pub fn map<U>(&self, mut f: impl FnMut(&T) -> U) -> Matrix2<U> {
        let [[a, b], [c, d]] = &self.rows;
        Matrix2::new(f(a), f(b), f(c), f(d))
    }

    pub fn try_map<U, E>(&self, mut f: impl FnMut(&T) -> Result<U, E>) -> Result<Matrix2<U>, E> {
        let [[a, b], [c, d]] = &self.rows;
        Ok(Matrix2::new(f(a)?, f(b)?, f(c)?, f(d)?))
    }
}

impl<T> Matrix2<T>
where
    for<'a> &'a T: Mul<&'a T, Output = T> + Add<&'a T, Output = T> + Sub<&'a T, Output = T>,
{
    pub fn mul(&self, other: &Self) -> Self {
        let [[a, b], [c, d]] = &self.rows;
        let [[e, f], [g, h]] = &other.rows;
        Matrix2::new(
            &(a * e) + &(b * g),
            &(a * f) + &(b * h),
            &(c * e) + &(d * g),
            &(c * f) + &(d * h),
        )
    }

    pub fn det(&self) -> T {
        let [[a, b], [c, d]] = &self.rows;
        &(a * d) - &(b * c)
    }
}

impl<T: Zero + One> Matrix2<T> {
    pub fn identity() -> Self {
        Matrix2::new(T::one(), T::zero(), T::zero(), T::one())
    }
}

impl StepMatrix {
    /// Build from a flat row-major list, which must hold exactly four integers.
    pub fn from_slice(values: &[BigInt]) -> Result<Self, PcfError> {
        match values {
            [a, b, c, d] => Ok(Matrix2::new(a.clone(), b.clone(), c.clone(), d.clone())),
            _ => Err(PcfError::InvalidInitialConditions(values.len())),
        }
    }

    /// Right-multiply in place by `[[0, b], [1, a]]`.
    pub fn push_step(&mut self, a: &BigInt, b: &BigInt) {
        let [[x, y], [z, w]] = &mut self.rows;
        let new_y = &*x * b + &*y * a;
        let new_w = &*z * b + &*w * a;
        *x = std::mem::replace(y, new_y);
        *z = std::mem::replace(w, new_w);
    }

    pub fn to_rational(&self) -> QMatrix {
        self.map(|x| BigRational::from_integer(x.clone()))
    }
}

impl QMatrix {
    pub fn inverse(&self) -> Option<Self> {
        let det = self.det();
        if det.is_zero() {
            return None;
        }
        let [[a, b], [c, d]] = &self.rows;
        Some(Matrix2::new(d / &det, -b / &det, -c / &det, a / &det))
    }

    /// Apply as a Möbius transform: `(a·z + b) / (c·z + d)`.
    pub fn mobius(&self, z: &BigRational) -> Option<BigRational> {
        let [[a, b], [c, d]] = &self.rows;
        let den = c * z + d;
        if den.is_zero() {
            return None;
        }
        Some((a * z + b) / den)
    }
}

impl RationalMatrix {
    /// `[[0, b], [1, a]]`.
    pub fn recurrence(a: &RationalFunction, b: &RationalFunction) -> Self {
        Matrix2::new(
            RationalFunction::zero(),
            b.clone(),
            RationalFunction::one(),
            a.clone(),
        )
    }

    pub fn eval(&self, x: &BigRational) -> Result<QMatrix, PolyError> {
        self.try_map(|f| f.eval(x))
    }

    pub fn eval_integer(&self, x: i64) -> Result<QMatrix, PolyError> {
        self.eval(&BigRational::from_integer(BigInt::from(x)))
    }

    /// Every entry at `scale·n + shift`.
    pub fn compose_linear(
        &self,
        scale: &BigRational,
        shift: &BigRational,
    ) -> Result<Self, PolyError> {
        self.try_map(|f| f.compose_linear(scale, shift))
    }
}

impl<T: fmt::Display> fmt::Display for Matrix2<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [[a, b], [c, d]] = &self.rows;
        write!(f, "[[{}, {}], [{}, {}]]", a, b, c, d)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn m(values: [i64; 4]) -> StepMatrix {
        Matrix2::new(
            BigInt::from(values[0]),
            BigInt::from(values[1]),
            BigInt::from(values[2]),
            BigInt::from(values[3]),
        )
    }

    fn q(n: i64, d: i64) -> BigRational {
        BigRational::new(BigInt::from(n), BigInt::from(d))
    }

    #[test]
    fn test_mul_and_det() {
        let a = m([1, 2, 3, 4]);
        let b = m([0, 1, 1, 0]);
        assert_eq!(a.mul(&b), m([2, 1, 4, 3]));
        assert_eq!(a.det(), BigInt::from(-2));
        assert_eq!(StepMatrix::identity().mul(&a), a);
    }

    #[test]
    fn test_push_step_matches_mul() {
        let mut a = m([1, 1, 0, 1]);
        let step = m([0, 1, 1, 3]);
        let expected = a.mul(&step);
        a.push_step(&BigInt::from(3), &BigInt::from(1));
        assert_eq!(a, expected);
        assert_eq!(a, m([1, 4, 1, 3]));
    }

    #[test]
    fn test_from_slice_rejects_wrong_length() {
        let three = vec![BigInt::one(); 3];
        assert_eq!(
            StepMatrix::from_slice(&three),
            Err(PcfError::InvalidInitialConditions(3))
        );
        assert!(StepMatrix::from_slice(&vec![BigInt::one(); 4]).is_ok());
    }

    #[test]
    fn test_inverse_and_mobius() {
        let a = m([2, 1, 1, 1]).to_rational();
        let inv = a.inverse().unwrap();
        assert_eq!(a.mul(&inv), QMatrix::identity());
        // (2z + 1) / (z + 1) at z = 1
        assert_eq!(a.mobius(&q(1, 1)), Some(q(3, 2)));
        assert_eq!(a.mobius(&q(-1, 1)), None);
        assert!(m([1, 2, 2, 4]).to_rational().inverse().is_none());
    }

    #[test]
    fn test_recurrence_matrix_eval() {
        let a = RationalFunction::from_integer(3);
        let b = RationalFunction::var();
        let rm = RationalMatrix::recurrence(&a, &b);
        assert_eq!(rm.eval_integer(2).unwrap(), m([0, 2, 1, 3]).to_rational());
        assert_eq!(rm.to_string(), "[[0, n], [1, 3]]");
    }
}
