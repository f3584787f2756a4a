use crate::poly::{IntPolynomial, Polynomial};
use crate::ring::trial_factor;
use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Signed, Zero};

/// Distinct integer roots of `p`, ascending. Empty for the zero polynomial.
///
/// Candidates are the divisors of the lowest non-zero coefficient of the
/// primitive part that lie inside the Cauchy bound.
pub fn integer_roots(p: &Polynomial) -> Vec<BigInt> {
    if p.is_zero() || p.is_constant() {
        return Vec::new();
    }
    let coeffs = match p.primitive_part().to_integer_coeffs() {
        Some(c) => c,
        None => return Vec::new(),
    };

    let mut roots = Vec::new();
    let low = coeffs.iter().take_while(|c| c.is_zero()).count();
    if low > 0 {
        roots.push(BigInt::zero());
    }
    let trimmed: Vec<BigInt> = coeffs[low..].to_vec();
    if trimmed.len() > 1 {
        let reduced = Polynomial::from_bigints(trimmed.clone());
        if let Some(eval_poly) = IntPolynomial::from_polynomial(&reduced) {
            for d in root_candidates(&trimmed) {
                for cand in [d.clone(), -d] {
                    if eval_poly.eval(&cand).is_zero() {
                        roots.push(cand);
                    }
                }
            }
        }
    }

    roots.sort();
    roots.dedup();
    roots
}

// Positive divisors of the constant term that lie within the Cauchy bound,
// built from its bounded trial factorisation
fn root_candidates(coeffs: &[BigInt]) -> Vec<BigInt> {
    let a0 = coeffs[0].abs();
    let lead = coeffs[coeffs.len() - 1].abs();
    let max_coeff = coeffs[..coeffs.len() - 1]
        .iter()
        .map(|c| c.abs())
        .max()
        .unwrap_or_else(BigInt::zero);
    let bound = BigInt::one() + max_coeff.div_ceil(&lead);

    let (factors, rest) = trial_factor(&a0, &bound);
    let mut divisors = vec![BigInt::one()];
    for (prime, exp) in factors {
        let mut next = Vec::with_capacity(divisors.len() * (exp as usize + 1));
        for d in &divisors {
            let mut multiple = d.clone();
            for _ in 0..=exp {
                if multiple > bound {
                    break;
                }
                next.push(multiple.clone());
                multiple *= &prime;
            }
        }
        divisors = next;
    }
    // prime factors of `rest` all lie beyond the trial range
    if rest > BigInt::one() && rest <= bound {
        let with_rest: Vec<BigInt> = divisors
            .iter()
            .map(|d| d * &rest)
            .filter(|d| d <= &bound)
            .collect();
        divisors.extend(with_rest);
    }
    divisors
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(coeffs: &[i64]) -> Polynomial {
        Polynomial::from_integers(coeffs)
    }

    fn ints(values: &[i64]) -> Vec<BigInt> {
        values.iter().map(|&v| BigInt::from(v)).collect()
    }

    #[test]
    fn test_roots_of_product() {
        // (n - 3)(n + 2)(2n - 1)
        let poly = p(&[-3, 1]).mul(&p(&[2, 1])).mul(&p(&[-1, 2]));
        assert_eq!(integer_roots(&poly), ints(&[-2, 3]));
    }

    #[test]
    fn test_zero_root_and_multiplicity() {
        // n^2 (n - 1)^2
        let poly = p(&[0, 0, 1]).mul(&p(&[-1, 1]).pow(2));
        assert_eq!(integer_roots(&poly), ints(&[0, 1]));
    }

    #[test]
    fn test_no_integer_roots() {
        assert!(integer_roots(&p(&[1, 0, 1])).is_empty());
        assert!(integer_roots(&p(&[5])).is_empty());
        assert!(integer_roots(&Polynomial::zero()).is_empty());
    }

    #[test]
    fn test_large_root_beyond_sqrt() {
        // n - 97: 97 is prime, found as the cofactor of 1
        assert_eq!(integer_roots(&p(&[-97, 1])), ints(&[97]));
        // 3n + 6 with rational coefficients scaled down
        assert_eq!(integer_roots(&p(&[6, 3])), ints(&[-2]));
    }

    #[test]
    fn test_large_constant_term() {
        // (n - 2^40)(n + 3): divisors come from the factorisation, not a scan to 2^20
        let big = 1i64 << 40;
        let poly = p(&[-big, 1]).mul(&p(&[3, 1]));
        assert_eq!(integer_roots(&poly), ints(&[-3, big]));

        // prime root beyond the trial limit
        let prime = 1_000_003i64;
        let poly = p(&[-prime, 1]).mul(&p(&[-2, 1]));
        assert_eq!(integer_roots(&poly), ints(&[2, prime]));
    }
}
