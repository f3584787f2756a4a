//! Asymptotic invariants of a PCF: convergence rate, irrationality measure δ,
//! eigenvalue ratio and reduced-denominator growth.
//!
//! Depths here count convergents from `init · M(1)`: dynamics depth `d`
//! reads convergent index `d + CONVERGENT_INDEX_SHIFT` through its
//! `previous` matrix, which is exactly `step(d)`.

use crate::config::DynamicsSettings;
use crate::error::PcfError;
use crate::fit::{
    depths_for_fit, fit, FitMode, FitModel, GrowthCoefficients, FACTORIAL_REDUCTION_TOLERANCE,
};
use crate::matrix::StepMatrix;
use crate::pcf::Pcf;
use num_bigint::BigInt;
use num_integer::Integer;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};
use pcf_poly::numeric::{log10_bigint, log10_rational, pow10, round_decimals, to_f64};
use serde::Serialize;
use std::f64::consts::LN_10;
use tracing::{debug, warn};

/// Offset between dynamics depths and convergent indices.
pub const CONVERGENT_INDEX_SHIFT: u64 = 2;

// Added to every error when one of them is exactly zero
const ZERO_ERROR_NUDGE_DIGITS: u32 = 10;

/// Best-effort result of [`PcfDynamics::compute_dynamics`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DynamicsSummary {
    pub delta: f64,
    pub convergence_rate: f64,
}

/// Every metric at one depth.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DynamicsReport {
    pub depth: u64,
    pub convergence: GrowthCoefficients,
    pub q_reduced: GrowthCoefficients,
    pub eigenvalue_ratio: f64,
    pub delta: Option<f64>,
}

pub struct PcfDynamics<'a> {
    pcf: &'a Pcf,
    settings: DynamicsSettings,
}

impl<'a> PcfDynamics<'a> {
    pub fn new(pcf: &'a Pcf) -> Self {
        Self::with_settings(pcf, DynamicsSettings::default())
    }

    pub fn with_settings(pcf: &'a Pcf, settings: DynamicsSettings) -> Self {
        PcfDynamics { pcf, settings }
    }

    pub fn pcf(&self) -> &Pcf {
        self.pcf
    }

    pub fn settings(&self) -> &DynamicsSettings {
        &self.settings
    }

    /// `(depth, step(depth))` for each distinct depth, ascending, in one pass.
    fn matrices(&self, depths: &[u64]) -> Result<Vec<(u64, StepMatrix)>, PcfError> {
        let mut depths = depths.to_vec();
        depths.sort_unstable();
        depths.dedup();
        match depths.first() {
            Some(&first) => PcfError::check_depth(first, 1)?,
            None => return Ok(Vec::new()),
        }
        let indices: Vec<u64> = depths.iter().map(|d| d + CONVERGENT_INDEX_SHIFT).collect();
        Ok(depths
            .into_iter()
            .zip(self.pcf.convergents(&indices))
            .map(|(d, c)| (d, c.previous))
            .collect())
    }

    fn matrix_at(&self, depth: u64) -> Result<StepMatrix, PcfError> {
        self.matrices(&[depth])?
            .pop()
            .map(|(_, m)| m)
            .ok_or(PcfError::InvalidDepth { depth, minimum: 1 })
    }

    /// Limit at twice `depth`, rounded to its own precision.
    pub fn reference_limit(&self, depth: u64) -> Result<BigRational, PcfError> {
        Ok(self.pcf.limit(2 * depth, None, None)?.value)
    }

    /// δ from a single depth; `None` when the reduced denominator is 1,
    /// `+inf` when the approximant equals `limit`.
    pub fn delta_at(&self, depth: u64, limit: &BigRational) -> Result<Option<f64>, PcfError> {
        let matrix = self.matrix_at(depth)?;
        let q_red = reduced_denominator(&matrix, depth)?;
        if q_red.is_one() {
            return Ok(None);
        }
        let approx = self.pcf.value_of(&matrix, depth)?;
        let diff = (limit - approx).abs();
        if diff.is_zero() {
            return Ok(Some(f64::INFINITY));
        }
        Ok(Some(-(1.0 + log10_rational(&diff) / log10_bigint(&q_red))))
    }

    /// `δ = −(1 + log_{q_red} |limit − p/q|)`, retried `shift_step` deeper
    /// while the result is `+inf` and the total shift stays within `max_shift`.
    /// Without an explicit `limit`, each attempt compares against the limit at
    /// twice its own depth.
    pub fn delta(
        &self,
        depth: u64,
        limit: Option<&BigRational>,
        shift_step: u64,
        max_shift: u64,
    ) -> Result<Option<f64>, PcfError> {
        PcfError::check_depth(depth, 1)?;

        let mut shift = 0;
        loop {
            let current = depth + shift;
            let reference = match limit {
                Some(l) => l.clone(),
                None => self.reference_limit(current)?,
            };
            let result = self.delta_at(current, &reference)?;
            if result != Some(f64::INFINITY) {
                return Ok(result);
            }
            shift += shift_step;
            if shift_step == 0 || shift > max_shift {
                debug!(depth, max_shift, "delta stayed infinite");
                return Ok(result);
            }
            debug!(depth = depth + shift, "delta infinite, shifting deeper");
        }
    }

    /// Natural-log ratio (or raw ratio) of the eigenvalue magnitudes of
    /// `[[0, b(depth)], [1, a(depth)]]`. Complex pairs give ratio 1.
    pub fn eigenvalue_ratio(&self, depth: u64, log: bool) -> Result<f64, PcfError> {
        PcfError::check_depth(depth, 1)?;
        let n = BigRational::from_integer(BigInt::from(depth));
        let a = to_f64(&self.pcf.a().eval(&n)?);
        let b = to_f64(&self.pcf.b().eval(&n)?);

        // λ² − aλ − b: the roots sum to a and multiply to −b
        let disc = a * a + 4.0 * b;
        let ratio = if disc < 0.0 {
            1.0
        } else {
            let large = (a.abs() + disc.sqrt()) / 2.0;
            if large == 0.0 {
                1.0
            } else {
                let small = b.abs() / large;
                if small == 0.0 {
                    f64::INFINITY
                } else {
                    large / small
                }
            }
        };
        Ok(if log { ratio.ln() } else { ratio })
    }

    /// Exact errors `|limit − approx(d)|` at each distinct depth, ascending.
    pub fn errors(
        &self,
        depths: &[u64],
        limit: Option<&BigRational>,
    ) -> Result<Vec<BigRational>, PcfError> {
        let matrices = self.matrices(depths)?;
        let deepest = match matrices.last() {
            Some((d, _)) => *d,
            None => return Ok(Vec::new()),
        };
        let limit = match limit {
            Some(l) => l.clone(),
            None => self.reference_limit(deepest)?,
        };
        matrices
            .iter()
            .map(|(d, m)| Ok((&limit - self.pcf.value_of(m, *d)?).abs()))
            .collect()
    }

    /// `log10` of the errors, nudged away from zero when any of them vanishes.
    pub fn log_errors(
        &self,
        depths: &[u64],
        limit: Option<&BigRational>,
    ) -> Result<Vec<f64>, PcfError> {
        let mut errors = self.errors(depths, limit)?;
        if errors.iter().any(|e| e.is_zero()) {
            let nudge = BigRational::new(BigInt::one(), pow10(ZERO_ERROR_NUDGE_DIGITS));
            for e in errors.iter_mut() {
                *e += &nudge;
            }
        }
        Ok(errors.iter().map(log10_rational).collect())
    }

    /// Fit of `log10 err(d) = A·d·ln d + B·d + C·ln d` up to `depth`.
    pub fn convergence_rate(
        &self,
        depth: u64,
        limit: Option<&BigRational>,
        model: FitModel,
    ) -> Result<GrowthCoefficients, PcfError> {
        let depths = depths_for_fit(depth)?;
        let ys = self.log_errors(&depths, limit)?;
        fit(&depths, &ys, model)
    }

    /// Reduced denominators `|q / gcd(p, q)|` at each distinct depth, ascending.
    pub fn q_reds(&self, depths: &[u64]) -> Result<Vec<BigInt>, PcfError> {
        self.matrices(depths)?
            .iter()
            .map(|(d, m)| reduced_denominator(m, *d))
            .collect()
    }

    /// Same fit on `log10 q_red(d)`.
    pub fn q_reduced_growth_rate(
        &self,
        depth: u64,
        mode: FitMode,
    ) -> Result<GrowthCoefficients, PcfError> {
        let depths = depths_for_fit(depth)?;
        let ys: Vec<f64> = self.q_reds(&depths)?.iter().map(log10_bigint).collect();
        match mode {
            FitMode::Full => fit(&depths, &ys, FitModel::Full),
            FitMode::NoLeading => fit(&depths, &ys, FitModel::NoLeading),
            FitMode::Auto => {
                let full = fit(&depths, &ys, FitModel::Full)?;
                if full.a.abs() < FACTORIAL_REDUCTION_TOLERANCE {
                    debug!(a = full.a, "factorial reduction detected, refitting without A");
                    fit(&depths, &ys, FitModel::NoLeading)
                } else {
                    Ok(full)
                }
            }
        }
    }

    /// `|ln |approx(depth) − limit|| / depth`.
    pub fn mean_convergence_rate(
        &self,
        depth: u64,
        limit: Option<&BigRational>,
    ) -> Result<f64, PcfError> {
        PcfError::check_depth(depth, 1)?;
        let limit = match limit {
            Some(l) => l.clone(),
            None => self.reference_limit(depth)?,
        };
        let approx = self.pcf.value_of(&self.matrix_at(depth)?, depth)?;
        let diff = (limit - approx).abs();
        let ln = log10_rational(&diff) * LN_10;
        Ok(ln.abs() / depth as f64)
    }

    /// δ and the mean convergence rate, each retried `depth_shift` deeper up
    /// to `max_iters` times. Never fails: `(+inf, 0)` stand in for metrics that
    /// could not be computed. Results are rounded to 5 decimals.
    pub fn compute_dynamics(&self, depth: u64, max_iters: u32, depth_shift: u64) -> DynamicsSummary {
        let mut delta = f64::INFINITY;
        let mut current = depth;
        for attempt in 0..max_iters {
            match self.delta(
                current,
                None,
                self.settings.shift_step,
                self.settings.max_shift,
            ) {
                Ok(Some(value)) if value.is_finite() => {
                    delta = value;
                    break;
                }
                Ok(other) => {
                    debug!(attempt, depth = current, result = ?other, "delta not usable, retrying")
                }
                Err(e @ PcfError::InvalidDepth { .. }) => {
                    warn!(depth = current, error = %e, "delta rejected");
                    break;
                }
                Err(e) => debug!(attempt, depth = current, error = %e, "delta failed, retrying"),
            }
            current += depth_shift;
        }
        if delta.is_infinite() {
            warn!(depth, max_iters, "delta did not settle");
        }

        let mut rate = 0.0;
        let mut current = depth;
        for attempt in 0..max_iters {
            match self.mean_convergence_rate(current, None) {
                Ok(value) => {
                    rate = value;
                    break;
                }
                Err(e @ PcfError::InvalidDepth { .. }) => {
                    warn!(depth = current, error = %e, "convergence rate rejected");
                    break;
                }
                Err(e) => {
                    debug!(attempt, depth = current, error = %e, "convergence rate failed, retrying")
                }
            }
            current += depth_shift;
        }

        DynamicsSummary {
            delta: round_decimals(delta, 5),
            convergence_rate: round_decimals(rate, 5),
        }
    }

    /// Every metric at `depth`, sharing one reference limit.
    pub fn compute_all(
        &self,
        depth: u64,
        limit: Option<&BigRational>,
    ) -> Result<DynamicsReport, PcfError> {
        let limit = match limit {
            Some(l) => l.clone(),
            None => self.reference_limit(depth)?,
        };
        Ok(DynamicsReport {
            depth,
            convergence: self.convergence_rate(
                depth,
                Some(&limit),
                self.settings.convergence_model,
            )?,
            q_reduced: self.q_reduced_growth_rate(depth, self.settings.q_reduced_mode)?,
            eigenvalue_ratio: self.eigenvalue_ratio(depth, true)?,
            delta: self.delta(
                depth,
                Some(&limit),
                self.settings.shift_step,
                self.settings.max_shift,
            )?,
        })
    }
}

fn reduced_denominator(matrix: &StepMatrix, depth: u64) -> Result<BigInt, PcfError> {
    let p = matrix.get(0, 1);
    let q = matrix.get(1, 1);
    if q.is_zero() {
        return Err(PcfError::DegenerateRecursion { depth });
    }
    Ok((q / p.gcd(q)).abs())
}
