use crate::error::PcfError;
use crate::matrix::StepMatrix;
use crate::pcf::Pcf;
use crate::recurrence::{precision, Checkpoint};
use num_rational::BigRational;
use num_traits::Zero;
use pcf_poly::numeric::{round_significant, to_decimal_string, to_f64};
use pcf_poly::{Polynomial, RationalFunction};
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

/// Approximation of a PCF's value together with the number of decimal
/// digits the last two convergents agree on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Limit {
    pub value: BigRational,
    pub precision: u32,
}

impl Limit {
    /// Decimal string carrying `precision` significant digits.
    pub fn to_decimal_string(&self) -> String {
        to_decimal_string(&self.value, self.precision)
    }

    pub fn to_f64(&self) -> f64 {
        to_f64(&self.value)
    }
}

impl Serialize for Limit {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Limit", 3)?;
        state.serialize_field("value", &self.value.to_string())?;
        state.serialize_field("decimal", &self.to_decimal_string())?;
        state.serialize_field("precision", &self.precision)?;
        state.end()
    }
}

impl Pcf {
    /// Limit at `depth` rounded to `precision` significant digits (the
    /// matrix-derived precision when `None`). The reported precision is the
    /// one the value was rounded to.
    pub fn limit(
        &self,
        depth: u64,
        initial: Option<&Checkpoint>,
        precision: Option<u32>,
    ) -> Result<Limit, PcfError> {
        let exact = self.limit_exact(depth, initial)?;
        let digits = precision.unwrap_or(exact.precision).max(1);
        Ok(Limit {
            value: round_significant(&exact.value, digits),
            precision: precision.unwrap_or(exact.precision),
        })
    }

    /// Unrounded limit at `depth`.
    pub fn limit_exact(
        &self,
        depth: u64,
        initial: Option<&Checkpoint>,
    ) -> Result<Limit, PcfError> {
        let matrix = self.step(depth, initial)?;
        Ok(Limit {
            value: self.value_of(&matrix, depth)?,
            precision: precision(&matrix),
        })
    }

    /// `p/q` of the last column of `matrix`, divided by the inflation correction.
    pub fn value_of(&self, matrix: &StepMatrix, depth: u64) -> Result<BigRational, PcfError> {
        let p = matrix.get(0, 1);
        let q = matrix.get(1, 1);
        if q.is_zero() {
            return Err(PcfError::DegenerateRecursion { depth });
        }
        let approx = BigRational::new(p.clone(), q.clone());
        Ok(approx / self.inflation_correction()?)
    }

    /// `(inflated_by · (n + 1))` at `n = 0`.
    pub fn inflation_correction(&self) -> Result<BigRational, PcfError> {
        let shifted_index = RationalFunction::from_polynomial(Polynomial::from_integers(&[1, 1]));
        let correction = (self.inflated_by() * &shifted_index)
            .eval(&BigRational::zero())
            .map_err(|e| PcfError::DegenerateInflation(e.to_string()))?;
        if correction.is_zero() {
            return Err(PcfError::DegenerateInflation(format!(
                "inflation factor {} vanishes at n = 0",
                self.inflated_by()
            )));
        }
        Ok(correction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigInt;

    fn poly(coeffs: &[i64]) -> RationalFunction {
        RationalFunction::from_polynomial(Polynomial::from_integers(coeffs))
    }

    fn four_over_pi() -> Pcf {
        Pcf::new(poly(&[1, 2]), poly(&[0, 0, 1])).unwrap()
    }

    #[test]
    fn test_limit_exact_first_convergents() {
        let pcf = four_over_pi();
        let l = pcf.limit_exact(1, None).unwrap();
        assert_eq!(l.value, BigRational::new(BigInt::from(4), BigInt::from(3)));
        assert_eq!(l.precision, 0);
        let l2 = pcf.limit_exact(2, None).unwrap();
        assert_eq!(l2.value, BigRational::new(BigInt::from(24), BigInt::from(19)));
    }

    #[test]
    fn test_limit_converges_to_four_over_pi() {
        let limit = four_over_pi().limit(100, None, None).unwrap();
        assert!(limit.precision >= 70);
        let expected = 4.0 / std::f64::consts::PI;
        assert!((limit.to_f64() - expected).abs() < 1e-14);
        assert!(limit.to_decimal_string().starts_with("1.27323954473516268"));
    }

    #[test]
    fn test_limit_rounding() {
        let limit = four_over_pi().limit(100, None, Some(5)).unwrap();
        assert_eq!(
            limit.value,
            BigRational::new(BigInt::from(12732), BigInt::from(10000))
        );
        assert_eq!(limit.precision, 5);
        assert_eq!(limit.to_decimal_string(), "1.2732");
    }

    #[test]
    fn test_inflated_pcf_keeps_limit() {
        let pcf = four_over_pi();
        let inflated = pcf.inflate(&poly(&[2, 1])).unwrap();
        assert_eq!(
            pcf.limit_exact(30, None).unwrap().value,
            inflated.limit_exact(30, None).unwrap().value
        );
    }

    #[test]
    fn test_degenerate_inflation() {
        // inflating by n + 0 multiplies in a factor vanishing at n = 0
        let inflated = four_over_pi().inflate(&poly(&[0, 1])).unwrap();
        assert!(matches!(
            inflated.limit(5, None, None),
            Err(PcfError::DegenerateInflation(_))
        ));
    }

    #[test]
    fn test_degenerate_recursion() {
        // a = 0, b = 1: step(1) = [[1, 0], [0, 1]]·[[0, 1], [1, 0]] has q = 0
        let pcf = Pcf::new(RationalFunction::zero(), poly(&[1])).unwrap();
        assert_eq!(
            pcf.limit(1, None, None),
            Err(PcfError::DegenerateRecursion { depth: 1 })
        );
    }

    #[test]
    fn test_serialize_limit() {
        let limit = Limit {
            value: BigRational::new(BigInt::from(4), BigInt::from(3)),
            precision: 3,
        };
        let json = serde_json::to_value(&limit).unwrap();
        assert_eq!(json["value"], "4/3");
        assert_eq!(json["decimal"], "1.33");
        assert_eq!(json["precision"], 3);
    }
}
