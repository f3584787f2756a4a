//! Least-squares fit of `y(x) = A·x·ln x + B·x + C·ln x`.
//!
//! The model is linear in its parameters, so the fit is an ordinary
//! least-squares solve of the normal equations.

use crate::error::PcfError;
use serde::{Deserialize, Serialize};

/// Below this `|A|` the automatic mode drops the `x·ln x` term.
pub const FACTORIAL_REDUCTION_TOLERANCE: f64 = 5e-2;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GrowthCoefficients {
    pub a: f64,
    pub b: f64,
    pub c: f64,
}

/// Which terms of the growth model are fitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FitModel {
    #[default]
    Full,
    /// `A` fixed at 0
    NoLeading,
}

/// Fit strategy for the reduced-denominator growth rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FitMode {
    #[default]
    Full,
    NoLeading,
    /// Full fit, refitted without `A` when `|A|` is below [`FACTORIAL_REDUCTION_TOLERANCE`]
    Auto,
}

/// Sample depths for a fit up to `depth`: `{6, d/8, d/4, d/2, d}`, sorted and deduplicated.
pub fn depths_for_fit(depth: u64) -> Result<Vec<u64>, PcfError> {
    let mut depths = vec![6, depth / 8, depth / 4, depth / 2, depth];
    depths.sort_unstable();
    depths.dedup();
    PcfError::check_depth(depths[0], 1)?;
    Ok(depths)
}

fn basis(x: f64, model: FitModel) -> Vec<f64> {
    let ln = x.ln();
    match model {
        FitModel::Full => vec![x * ln, x, ln],
        FitModel::NoLeading => vec![x, ln],
    }
}

pub fn fit(xs: &[u64], ys: &[f64], model: FitModel) -> Result<GrowthCoefficients, PcfError> {
    if xs.len() != ys.len() {
        return Err(PcfError::FitFailed(format!(
            "{} sample points but {} values",
            xs.len(),
            ys.len()
        )));
    }
    if ys.iter().any(|y| !y.is_finite()) {
        return Err(PcfError::FitFailed("non-finite sample value".to_string()));
    }

    let rows: Vec<Vec<f64>> = xs.iter().map(|&x| basis(x as f64, model)).collect();
    let k = match model {
        FitModel::Full => 3,
        FitModel::NoLeading => 2,
    };
    if rows.len() < k {
        return Err(PcfError::FitFailed(format!(
            "{} sample points for {} parameters",
            rows.len(),
            k
        )));
    }

    // Column scaling keeps the normal equations well conditioned
    let scales: Vec<f64> = (0..k)
        .map(|j| {
            let m = rows.iter().map(|r| r[j].abs()).fold(0.0, f64::max);
            if m > 0.0 {
                m
            } else {
                1.0
            }
        })
        .collect();

    let mut normal = vec![0.0; k * k];
    let mut rhs = vec![0.0; k];
    for (row, y) in rows.iter().zip(ys) {
        for i in 0..k {
            let ri = row[i] / scales[i];
            rhs[i] += ri * y;
            for j in 0..k {
                normal[i * k + j] += ri * row[j] / scales[j];
            }
        }
    }

    let solution = solve(&normal, &rhs, k)
        .ok_or_else(|| PcfError::FitFailed("singular normal equations".to_string()))?;
    let params: Vec<f64> = solution.iter().zip(&scales).map(|(p, s)| p / s).collect();
    if params.iter().any(|p| !p.is_finite()) {
        return Err(PcfError::FitFailed("non-finite parameters".to_string()));
    }

    Ok(match model {
        FitModel::Full => GrowthCoefficients {
            a: params[0],
            b: params[1],
            c: params[2],
        },
        FitModel::NoLeading => GrowthCoefficients {
            a: 0.0,
            b: params[0],
            c: params[1],
        },
    })
}

/// Gaussian elimination with partial pivoting; `None` when singular.
fn solve(a: &[f64], b: &[f64], n: usize) -> Option<Vec<f64>> {
    let mut lu = a.to_vec();
    let mut x = b.to_vec();
    let mut perm: Vec<usize> = (0..n).collect();

    for col in 0..n {
        let mut max_val = lu[perm[col] * n + col].abs();
        let mut max_row = col;
        for row in (col + 1)..n {
            let val = lu[perm[row] * n + col].abs();
            if val > max_val {
                max_val = val;
                max_row = row;
            }
        }
        if max_val < 1e-12 {
            return None;
        }
        perm.swap(col, max_row);

        for row in (col + 1)..n {
            let factor = lu[perm[row] * n + col] / lu[perm[col] * n + col];
            for j in col..n {
                let val = lu[perm[col] * n + j];
                lu[perm[row] * n + j] -= factor * val;
            }
            let xc = x[perm[col]];
            x[perm[row]] -= factor * xc;
        }
    }

    let mut result = vec![0.0; n];
    for i in (0..n).rev() {
        let mut sum = x[perm[i]];
        for j in (i + 1)..n {
            sum -= lu[perm[i] * n + j] * result[j];
        }
        result[i] = sum / lu[perm[i] * n + i];
    }
    Some(result)
}
