//! Transforms between related PCFs: polynomial inflation, folding,
//! coboundary conversion and viability shifts.
//!
//! A 2×2 matrix `[[a, b], [c, d]]` of rational functions with `c ≠ 0` is
//! conjugate to a PCF: `matrix(n) · U(n+1) ∝ U(n) · [[0, b'], [1, a']]` with
//! `U` the coboundary matrix returned by [`as_pcf_coboundary`].

use crate::error::PcfError;
use crate::limit::Limit;
use crate::matrix::RationalMatrix;
use crate::pcf::Pcf;
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::Zero;
use pcf_poly::{deflation_content, integer_roots, Polynomial, RationalFunction};
use tracing::debug;

/// Inflate by the denominator LCM `L`, then (optionally) deflate by the
/// content. Returns the fresh polynomial PCF and the net factor `L / content`.
pub fn inflate_to_polynomial(
    pcf: &Pcf,
    deflate: bool,
) -> Result<(Pcf, RationalFunction), PcfError> {
    let lcm = RationalFunction::from_polynomial(pcf.denominator_lcm().clone());
    let inflated = pcf.inflate(&lcm)?.without_inflation();
    if !deflate {
        return Ok((inflated, lcm));
    }
    let content = deflation_content(inflated.a().numer(), inflated.b().numer())?;
    let content = RationalFunction::from_polynomial(content);
    let deflated = inflated.inflate(&content.recip()?)?.without_inflation();
    Ok((deflated, lcm.div(&content)?))
}

/// `Π_{i=0}^{factor−1} matrix(factor·n − (factor−1−i))`.
pub fn fold_matrix(matrix: &RationalMatrix, factor: i64) -> Result<RationalMatrix, PcfError> {
    if factor < 1 {
        return Err(PcfError::InvalidFactor(factor));
    }
    let scale = BigRational::from_integer(BigInt::from(factor));
    let mut folded = RationalMatrix::new(
        RationalFunction::one(),
        RationalFunction::zero(),
        RationalFunction::zero(),
        RationalFunction::one(),
    );
    for i in 0..factor {
        let shift = BigRational::from_integer(BigInt::from(-(factor - 1 - i)));
        folded = folded.mul(&matrix.compose_linear(&scale, &shift)?);
    }
    Ok(folded)
}

fn lower_left(matrix: &RationalMatrix) -> Result<&RationalFunction, PcfError> {
    let c = matrix.get(1, 0);
    if c.is_zero() {
        return Err(PcfError::SingularTransform(
            "lower-left entry vanishes, matrix is not conjugate to a PCF".to_string(),
        ));
    }
    Ok(c)
}

/// PCF conjugate to `matrix`, as a fresh polynomial PCF.
pub fn as_pcf(matrix: &RationalMatrix, deflate: bool) -> Result<Pcf, PcfError> {
    lower_left(matrix)?;
    let [[a, b], [c, d]] = &matrix.rows;
    let c_next = c.shift(1);
    let c_prev = c.shift(-1);

    let new_a = &(c * &a.shift(1)) + &(d * &c_next);
    let new_b = &(&(&(b * c) - &(a * d)) * &c_prev) * &c_next;
    let pcf = Pcf::new(new_a, new_b)?;

    let (pcf, _) = inflate_to_polynomial(&pcf, deflate)?;
    let pcf = if deflate { pcf.deflate_all()? } else { pcf };
    Ok(pcf.without_inflation())
}

/// Content removed when deflating the conjugate PCF; 1 when not deflating.
pub fn as_pcf_eta(matrix: &RationalMatrix, deflate: bool) -> Result<Polynomial, PcfError> {
    if !deflate {
        return Ok(Polynomial::one());
    }
    let undeflated = as_pcf(matrix, false)?;
    Ok(deflation_content(
        undeflated.a().numer(),
        undeflated.b().numer(),
    )?)
}

/// `U(n) = [[1, a], [0, c]] · diag(η(n−1), 1) · diag(1, c(n−1))`.
pub fn as_pcf_coboundary(
    matrix: &RationalMatrix,
    deflate: bool,
) -> Result<RationalMatrix, PcfError> {
    let a = matrix.get(0, 0);
    let c = lower_left(matrix)?;
    let eta = RationalFunction::from_polynomial(as_pcf_eta(matrix, deflate)?.shift(-1));

    let zero = RationalFunction::zero;
    let one = RationalFunction::one;
    let upper = RationalMatrix::new(one(), a.clone(), zero(), c.clone());
    let eta_diag = RationalMatrix::new(eta, zero(), zero(), one());
    let c_diag = RationalMatrix::new(one(), zero(), zero(), c.shift(-1));
    Ok(upper.mul(&eta_diag).mul(&c_diag))
}

/// `(c(n−1), η)` completing `g1(n)·M(n)·U(n+1) = g2(n)·U(n)·PCF.M(n)`.
pub fn as_pcf_polys(
    matrix: &RationalMatrix,
    deflate: bool,
) -> Result<(RationalFunction, Polynomial), PcfError> {
    let c = lower_left(matrix)?;
    Ok((c.shift(-1), as_pcf_eta(matrix, deflate)?))
}

/// The PCF whose convergents are every `factor`-th convergent of `pcf`
/// (up to the coboundary).
pub fn fold_pcf(pcf: &Pcf, factor: i64) -> Result<Pcf, PcfError> {
    let folded = fold_matrix(&pcf.recurrence_matrix(), factor)?;
    debug!(%pcf, factor, "folding PCF");
    as_pcf(&folded, true)
}

/// Map a limit of `pcf` to the limit of `fold_pcf(pcf, factor)`.
///
/// Applies the Möbius transform of `folded.A · U(1)⁻¹ · pcf.A⁻¹`. The
/// transported limit keeps the precision of `limit`.
pub fn folded_limit_transport(pcf: &Pcf, factor: i64, limit: &Limit) -> Result<Limit, PcfError> {
    let folded_matrix = fold_matrix(&pcf.recurrence_matrix(), factor)?;
    let folded = as_pcf(&folded_matrix, true)?;
    let coboundary = as_pcf_coboundary(&folded_matrix, true)?;

    let u1 = coboundary.eval_integer(1).map_err(|e| {
        PcfError::SingularTransform(format!("coboundary matrix undefined at n = 1: {}", e))
    })?;
    let u1_inv = u1.inverse().ok_or_else(|| {
        PcfError::SingularTransform("coboundary matrix is singular at n = 1".to_string())
    })?;
    let a_inv = pcf.initial_matrix()?.inverse().ok_or_else(|| {
        PcfError::SingularTransform("initial matrix is singular".to_string())
    })?;
    let transform = folded.initial_matrix()?.mul(&u1_inv).mul(&a_inv);

    let value = transform.mobius(&limit.value).ok_or_else(|| {
        PcfError::SingularTransform("limit is mapped to infinity".to_string())
    })?;
    Ok(Limit {
        value,
        precision: limit.precision,
    })
}

/// Integer zeros that truncate or break the recurrence.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ViabilityZeros {
    pub b_num: Vec<BigInt>,
    pub b_den: Vec<BigInt>,
    pub a_den: Vec<BigInt>,
}

pub fn integer_zeros(pcf: &Pcf) -> ViabilityZeros {
    ViabilityZeros {
        b_num: integer_roots(pcf.b().numer()),
        b_den: integer_roots(pcf.b().denom()),
        a_den: integer_roots(pcf.a().denom()),
    }
}

/// Smallest `k ≥ 0` such that `n → n + k` clears every zero in `zeros`.
///
/// `a` is needed from index 0, so its poles need one extra step; `b` starts
/// at index 1.
pub fn shift_amount(zeros: &ViabilityZeros) -> Result<u64, PcfError> {
    let a_shift = zeros.a_den.iter().max().map(|z| z + 1u32);
    let shift = [
        a_shift,
        zeros.b_den.iter().max().cloned(),
        zeros.b_num.iter().max().cloned(),
    ]
    .into_iter()
    .flatten()
    .fold(BigInt::zero(), |acc, z| acc.max(z));
    u64::try_from(&shift)
        .map_err(|_| PcfError::InvalidPcf(format!("viability shift {} is out of range", shift)))
}

/// `pcf` at `n → n + shift` with the smallest viable shift.
pub fn shift_to_viable(pcf: &Pcf) -> Result<(Pcf, u64), PcfError> {
    let shift = shift_amount(&integer_zeros(pcf))?;
    if shift == 0 {
        return Ok((pcf.clone(), 0));
    }
    let k = i64::try_from(shift)
        .map_err(|_| PcfError::InvalidPcf(format!("viability shift {} is out of range", shift)))?;
    debug!(%pcf, shift, "shifting PCF to viable range");
    Ok((pcf.shift(k)?, shift))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedPcf {
    pub pcf: Pcf,
    pub inflation: RationalFunction,
    pub shift: u64,
}

/// Polynomial, deflated and viable form of `pcf`.
pub fn normalize_pcf(pcf: &Pcf) -> Result<NormalizedPcf, PcfError> {
    let (polynomial, inflation) = inflate_to_polynomial(pcf, true)?;
    let (pcf, shift) = shift_to_viable(&polynomial)?;
    Ok(NormalizedPcf {
        pcf,
        inflation,
        shift,
    })
}
