//! GCD/LCM over ℤ[n] and the deflation content of a coefficient pair.

use crate::error::PolyError;
use crate::numeric::rational_gcd;
use crate::poly::Polynomial;
use num_bigint::BigInt;
use num_integer::Integer;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};

// Trial division bound for integer contents; any cofactor left over is treated as one factor
const TRIAL_DIVISION_LIMIT: u64 = 1_000_000;

/// GCD in ℤ[n]: integer content gcd times the primitive polynomial gcd,
/// with a positive leading coefficient.
pub fn gcd_integer(p: &Polynomial, q: &Polynomial) -> Polynomial {
    if p.is_zero() && q.is_zero() {
        return Polynomial::zero();
    }
    let content = rational_gcd(&p.content(), &q.content());
    p.gcd(q)
        .primitive_part()
        .with_positive_leading()
        .scale(&content)
}

/// LCM in ℤ[n] with a positive leading coefficient. Zero if either input is zero.
pub fn lcm_integer(p: &Polynomial, q: &Polynomial) -> Result<Polynomial, PolyError> {
    if p.is_zero() || q.is_zero() {
        return Ok(Polynomial::zero());
    }
    let g = gcd_integer(p, q);
    Ok(p.mul(q).exact_div(&g)?.with_positive_leading())
}

/// LCM of every polynomial in the iterator; `1` for an empty one.
pub fn lcm_all<'a, I>(polys: I) -> Result<Polynomial, PolyError>
where
    I: IntoIterator<Item = &'a Polynomial>,
{
    polys
        .into_iter()
        .try_fold(Polynomial::one(), |acc, p| lcm_integer(&acc, p))
}

/// Largest integer polynomial `c(n)` with `c(n) | a(n)` and `c(n)·c(n−1) | b(n)`.
///
/// Both inputs must have integer coefficients. The result has a positive
/// leading coefficient; `1` when both inputs are zero.
pub fn deflation_content(a: &Polynomial, b: &Polynomial) -> Result<Polynomial, PolyError> {
    if a.is_zero() && b.is_zero() {
        return Ok(Polynomial::one());
    }
    let integer = integer_deflation_content(a, b);
    let polynomial = polynomial_deflation_content(&a.primitive_part(), &b.primitive_part())?;
    Ok(polynomial.scale(&BigRational::from_integer(integer)))
}

// ============================================================================
// Integer part
// ============================================================================

fn integer_content(p: &Polynomial) -> BigInt {
    p.content().to_integer()
}

/// Valuation of `p` in `x`; `None` stands for infinity (x = 0).
fn valuation(x: &BigInt, p: &BigInt) -> Option<u32> {
    if x.is_zero() {
        return None;
    }
    let mut rest = x.abs();
    let mut count = 0;
    loop {
        let (quot, rem) = rest.div_rem(p);
        if !rem.is_zero() {
            return Some(count);
        }
        rest = quot;
        count += 1;
    }
}

/// Prime powers of `|n|` found by trial division up to `bound` (and at most
/// the crate-wide trial limit), plus the unfactored cofactor.
pub(crate) fn trial_factor(n: &BigInt, bound: &BigInt) -> (Vec<(BigInt, u32)>, BigInt) {
    let mut rest = n.abs();
    let mut factors = Vec::new();
    let limit = std::cmp::min(bound.clone(), BigInt::from(TRIAL_DIVISION_LIMIT));
    let mut d = BigInt::from(2);
    while &d * &d <= rest && d <= limit {
        let mut exp = 0;
        while rest.is_multiple_of(&d) {
            rest /= &d;
            exp += 1;
        }
        if exp > 0 {
            factors.push((d.clone(), exp));
        }
        d += 1;
    }
    (factors, rest)
}

fn factor_bases(n: &BigInt) -> Vec<BigInt> {
    let (factors, rest) = trial_factor(n, &BigInt::from(TRIAL_DIVISION_LIMIT));
    let mut bases: Vec<BigInt> = factors.into_iter().map(|(p, _)| p).collect();
    if rest > BigInt::one() {
        bases.push(rest);
    }
    bases
}

fn integer_deflation_content(a: &Polynomial, b: &Polynomial) -> BigInt {
    let ca = integer_content(a);
    let cb = integer_content(b);
    let base = if a.is_zero() {
        cb.clone()
    } else if b.is_zero() {
        ca.clone()
    } else {
        ca.gcd(&cb)
    };

    let mut result = BigInt::one();
    for p in factor_bases(&base) {
        let exp = match (valuation(&ca, &p), valuation(&cb, &p)) {
            (Some(ea), Some(eb)) => ea.min(eb / 2),
            (Some(ea), None) => ea,
            (None, Some(eb)) => eb / 2,
            (None, None) => 0,
        };
        result *= num_traits::pow(p, exp as usize);
    }
    result
}

// ============================================================================
// Polynomial part
// ============================================================================

fn polynomial_deflation_content(
    a: &Polynomial,
    b: &Polynomial,
) -> Result<Polynomial, PolyError> {
    let mut pa = a.clone();
    let mut pb = b.clone();
    let mut result = Polynomial::one();

    loop {
        let g = gcd_integer(&gcd_integer(&pa, &pb), &pb.shift(1));
        if g.degree() == 0 {
            break;
        }

        // g | b(n+1) gives g(n-1) | b; shrink until h·h(n-1) | b as well
        let mut h = g;
        loop {
            let reduced = if pb.is_zero() {
                h.clone()
            } else {
                gcd_integer(&h, &pb.exact_div(&h.shift(-1))?)
            };
            if reduced.degree() == h.degree() {
                break;
            }
            h = reduced;
        }
        if h.degree() == 0 {
            break;
        }

        pa = pa.exact_div(&h)?;
        pb = pb.exact_div(&h.mul(&h.shift(-1)))?;
        result = result.mul(&h);
    }

    Ok(result.primitive_part().with_positive_leading())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(coeffs: &[i64]) -> Polynomial {
        Polynomial::from_integers(coeffs)
    }

    #[test]
    fn test_gcd_integer_keeps_content() {
        // gcd(4n + 4, 6n + 6) = 2n + 2
        assert_eq!(gcd_integer(&p(&[4, 4]), &p(&[6, 6])), p(&[2, 2]));
        assert_eq!(gcd_integer(&Polynomial::zero(), &p(&[-3, -6])), p(&[3, 6]));
    }

    #[test]
    fn test_lcm_integer() {
        // lcm(2(n+1), 3n) = 6n(n+1)
        assert_eq!(lcm_integer(&p(&[2, 2]), &p(&[0, 3])).unwrap(), p(&[0, 6, 6]));
        assert_eq!(lcm_all([&p(&[2]), &p(&[3]), &p(&[4])]).unwrap(), p(&[12]));
        assert_eq!(lcm_all(std::iter::empty()).unwrap(), Polynomial::one());
    }

    #[test]
    fn test_deflation_content_integer_part() {
        // 8n+4 = 4(2n+1), 4n^2: 2 | a and 2*2 | b, but not 4*4 | b
        assert_eq!(deflation_content(&p(&[4, 8]), &p(&[0, 0, 4])).unwrap(), p(&[2]));
        assert_eq!(deflation_content(&p(&[3, 6]), &p(&[0, 0, 9])).unwrap(), p(&[3]));
        assert_eq!(deflation_content(&p(&[1, 2]), &p(&[0, 0, 1])).unwrap(), p(&[1]));
    }

    #[test]
    fn test_deflation_content_needs_shifted_divisor() {
        // (n+1) | a but (n+1)n does not divide 4(n+1)^2
        let b = p(&[1, 2, 1]).scale(&BigRational::from_integer(BigInt::from(4)));
        assert_eq!(deflation_content(&p(&[2, 2]), &b).unwrap(), p(&[2]));
    }

    #[test]
    fn test_deflation_content_polynomial_part() {
        // a = (2n+1)(n+1), b = n^3(n+1)
        let a = p(&[1, 2]).mul(&p(&[1, 1]));
        let b = p(&[0, 0, 0, 1]).mul(&p(&[1, 1]));
        assert_eq!(deflation_content(&a, &b).unwrap(), p(&[1, 1]));
    }

    #[test]
    fn test_trial_factor() {
        let (factors, rest) = trial_factor(&BigInt::from(-360), &BigInt::from(100));
        let expected: Vec<(BigInt, u32)> = vec![
            (BigInt::from(2), 3),
            (BigInt::from(3), 2),
            (BigInt::from(5), 1),
        ];
        assert_eq!(factors, expected);
        assert_eq!(rest, BigInt::one());

        // stops at the bound and leaves the rest unfactored
        let (factors, rest) = trial_factor(&BigInt::from(2 * 101 * 103), &BigInt::from(50));
        assert_eq!(factors, vec![(BigInt::from(2), 1)]);
        assert_eq!(rest, BigInt::from(101 * 103));
    }

    #[test]
    fn test_deflation_content_zero_coefficients() {
        assert_eq!(deflation_content(&Polynomial::zero(), &p(&[0, 0, 4])).unwrap(), p(&[2]));
        assert_eq!(deflation_content(&p(&[0, 3]), &Polynomial::zero()).unwrap(), p(&[0, 3]));
        assert_eq!(
            deflation_content(&Polynomial::zero(), &Polynomial::zero()).unwrap(),
            Polynomial::one()
        );
    }
}
