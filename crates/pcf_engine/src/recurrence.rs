//! Exact evaluation of the PCF recurrence.
//!
//! `step(d) = init · M(1) · … · M(d)` with `M(k) = [[0, b(k)], [1, a(k)]]`,
//! evaluated on the integer `a_compute` / `b_compute` polynomials.

use crate::error::PcfError;
use crate::matrix::StepMatrix;
use crate::pcf::Pcf;
use num_bigint::BigInt;
use num_traits::Zero;
use pcf_poly::numeric::log10_bigint;
use serde::Serialize;
use tracing::trace;

/// Precision reported when the last two convergents coincide.
pub const EXACT_PRECISION: u32 = 100;

/// Saved evaluation state: `matrix` is the step matrix after `depth` steps.
///
/// Depth 0 stands for plain initial conditions, so the next step applied is
/// always `M(depth + 1)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checkpoint {
    pub depth: u64,
    pub matrix: StepMatrix,
}

impl Checkpoint {
    pub fn new(depth: u64, matrix: StepMatrix) -> Self {
        Checkpoint { depth, matrix }
    }

    /// Initial conditions with no steps applied yet.
    pub fn from_matrix(matrix: StepMatrix) -> Self {
        Self::new(0, matrix)
    }
}

/// Matrices of convergent index `index` and `index - 1`.
///
/// Index 0 is the identity, index 1 the initial matrix and index `i ≥ 2`
/// is `init · M(1) · … · M(i−1)`. Index 0 reports the identity as its
/// own predecessor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Convergent {
    pub index: u64,
    pub current: StepMatrix,
    pub previous: StepMatrix,
}

impl Pcf {
    /// Apply `depth` (at least 1) more steps to `initial`, starting from
    /// `[[1, a(0)], [0, 1]]` when none is given.
    ///
    /// With a checkpoint at depth `d0` the result is `step(d0 + depth)`.
    pub fn step(&self, depth: u64, initial: Option<&Checkpoint>) -> Result<StepMatrix, PcfError> {
        PcfError::check_depth(depth, 1)?;
        let (mut matrix, start) = match initial {
            Some(cp) => (cp.matrix.clone(), cp.depth),
            None => (self.default_initial(), 0),
        };
        self.multiply_steps(&mut matrix, start + 1, start + depth);
        Ok(matrix)
    }

    /// `step` from a flat row-major list of four integers.
    pub fn step_from(&self, depth: u64, initial: &[BigInt]) -> Result<StepMatrix, PcfError> {
        let initial = Checkpoint::from_matrix(StepMatrix::from_slice(initial)?);
        self.step(depth, Some(&initial))
    }

    /// Checkpoint after `depth` more steps from `initial`.
    pub fn checkpoint(
        &self,
        depth: u64,
        initial: Option<&Checkpoint>,
    ) -> Result<Checkpoint, PcfError> {
        let start = initial.map_or(0, |cp| cp.depth);
        Ok(Checkpoint::new(start + depth, self.step(depth, initial)?))
    }

    /// Continue a saved evaluation to `target`; equal to evaluating `target` directly.
    pub fn resume(&self, checkpoint: &Checkpoint, target: u64) -> Result<Checkpoint, PcfError> {
        PcfError::check_depth(target, checkpoint.depth + 1)?;
        let matrix = self.step(target - checkpoint.depth, Some(checkpoint))?;
        Ok(Checkpoint::new(target, matrix))
    }

    /// Walk the convergents once, collecting the requested indices in ascending order.
    pub fn convergents(&self, indices: &[u64]) -> Vec<Convergent> {
        let mut wanted: Vec<u64> = indices.to_vec();
        wanted.sort_unstable();
        wanted.dedup();

        let mut out = Vec::with_capacity(wanted.len());
        let mut previous = StepMatrix::identity();
        let mut current = StepMatrix::identity();
        let mut index = 0;
        for target in wanted {
            while index < target {
                let next = if index == 0 {
                    self.default_initial()
                } else {
                    let mut m = current.clone();
                    self.multiply_steps(&mut m, index, index);
                    m
                };
                previous = std::mem::replace(&mut current, next);
                index += 1;
            }
            out.push(Convergent {
                index,
                current: current.clone(),
                previous: previous.clone(),
            });
        }
        out
    }

    fn multiply_steps(&self, matrix: &mut StepMatrix, from: u64, to: u64) {
        let mut k = BigInt::from(from);
        for _ in from..=to {
            let a = self.a_compute().eval(&k);
            let b = self.b_compute().eval(&k);
            matrix.push_step(&a, &b);
            k += 1;
        }
        trace!(from, to, "multiplied recurrence steps");
    }
}

/// Decimal digits to which the last two convergents of `matrix` agree.
pub fn precision(matrix: &StepMatrix) -> u32 {
    precision_in_base(matrix, 10)
}

/// `floor(−log_base |cross / (q1·q2)|)` with `cross = p2·q1 − q2·p1`.
///
/// Zero when a denominator vanishes, [`EXACT_PRECISION`] when the two
/// convergents coincide; negative digit counts saturate at zero.
pub fn precision_in_base(matrix: &StepMatrix, base: u32) -> u32 {
    let [[p1, p2], [q1, q2]] = &matrix.rows;
    let den = q1 * q2;
    if den.is_zero() {
        return 0;
    }
    let cross = p2 * q1 - q2 * p1;
    if cross.is_zero() {
        return EXACT_PRECISION;
    }
    let digits = (log10_bigint(&den) - log10_bigint(&cross)) / f64::from(base.max(2)).log10();
    digits.floor().max(0.0) as u32
}

/// Serializable view of a step matrix; entries as decimal strings.
#[derive(Debug, Clone, Serialize)]
pub struct StepMatrixView {
    pub rows: [[String; 2]; 2],
}

impl From<&StepMatrix> for StepMatrixView {
    fn from(m: &StepMatrix) -> Self {
        let s = m.map(|x| x.to_string());
        StepMatrixView { rows: s.rows }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pcf_poly::{Polynomial, RationalFunction};

    fn pcf(a: &[i64], b: &[i64]) -> Pcf {
        Pcf::new(
            RationalFunction::from_polynomial(Polynomial::from_integers(a)),
            RationalFunction::from_polynomial(Polynomial::from_integers(b)),
        )
        .unwrap()
    }

    fn m(values: [i64; 4]) -> StepMatrix {
        StepMatrix::new(
            BigInt::from(values[0]),
            BigInt::from(values[1]),
            BigInt::from(values[2]),
            BigInt::from(values[3]),
        )
    }

    #[test]
    fn test_first_steps() {
        let p = pcf(&[1, 2], &[0, 0, 1]);
        assert_eq!(p.step(1, None).unwrap(), m([1, 4, 1, 3]));
        assert_eq!(p.step(2, None).unwrap(), m([4, 24, 3, 19]));
        assert_eq!(p.step(3, None).unwrap(), m([24, 204, 19, 160]));
    }

    #[test]
    fn test_depth_zero_rejected() {
        let p = pcf(&[1, 2], &[0, 0, 1]);
        assert_eq!(
            p.step(0, None),
            Err(PcfError::InvalidDepth { depth: 0, minimum: 1 })
        );
    }

    #[test]
    fn test_custom_initial_conditions() {
        let p = pcf(&[1], &[1]);
        let init = [BigInt::from(1), BigInt::from(0), BigInt::from(0), BigInt::from(1)];
        // identity start: M(1) = [[0, 1], [1, 1]]
        assert_eq!(p.step_from(1, &init).unwrap(), m([0, 1, 1, 1]));
        assert_eq!(
            p.step_from(1, &init[..2]),
            Err(PcfError::InvalidInitialConditions(2))
        );
    }

    #[test]
    fn test_resume_requires_progress() {
        let p = pcf(&[1, 2], &[0, 0, 1]);
        let cp = p.checkpoint(5, None).unwrap();
        assert!(p.resume(&cp, 5).is_err());
        assert_eq!(p.resume(&cp, 7).unwrap().matrix, p.step(7, None).unwrap());
    }

    #[test]
    fn test_step_continues_from_checkpoint() {
        let p = pcf(&[1, 2], &[0, 0, 1]);
        let cp = Checkpoint::new(2, m([4, 24, 3, 19]));
        assert_eq!(p.step(1, Some(&cp)).unwrap(), m([24, 204, 19, 160]));

        let chained = p.checkpoint(2, Some(&cp)).unwrap();
        assert_eq!(chained.depth, 4);
        assert_eq!(chained.matrix, p.step(4, None).unwrap());

        // plain initial conditions start at M(1)
        let identity = Checkpoint::from_matrix(StepMatrix::identity());
        assert_eq!(p.step(1, Some(&identity)).unwrap(), m([0, 1, 1, 3]));
    }

    #[test]
    fn test_convergent_indices() {
        let p = pcf(&[1, 2], &[0, 0, 1]);
        let cs = p.convergents(&[3, 0, 1, 5]);
        assert_eq!(cs.len(), 4);
        assert_eq!(cs[0].current, StepMatrix::identity());
        assert_eq!(cs[1].current, p.default_initial());
        assert_eq!(cs[1].previous, StepMatrix::identity());
        // index d + 2 holds step(d) as its previous matrix
        assert_eq!(cs[2].previous, p.step(1, None).unwrap());
        assert_eq!(cs[3].previous, p.step(3, None).unwrap());
        assert_eq!(cs[3].current, p.step(4, None).unwrap());
    }

    #[test]
    fn test_precision_values() {
        let p = pcf(&[1, 2], &[0, 0, 1]);
        let digits: Vec<u32> = [1, 2, 5, 10, 20, 40]
            .iter()
            .map(|&d| precision(&p.step(d, None).unwrap()))
            .collect();
        assert_eq!(digits, vec![0, 1, 3, 7, 14, 30]);
    }

    #[test]
    fn test_precision_edge_cases() {
        assert_eq!(precision(&m([1, 2, 0, 3])), 0);
        assert_eq!(precision(&m([1, 2, 1, 2])), EXACT_PRECISION);
        // convergents 0 and 100 disagree wildly
        assert_eq!(precision(&m([0, 100, 1, 1])), 0);
    }
}
