//! JSON output types for the `pcf` subcommands.
//!
//! Every command prints exactly one of these documents on stdout. Exact
//! rationals and polynomials are emitted as strings.

use pcf_engine::{
    DynamicsReport, DynamicsSummary, Limit, NormalizedPcf, Pcf, RationalMatrix, ViabilityZeros,
};
use serde::Serialize;

/// A PCF as text
#[derive(Serialize, Debug)]
pub struct PcfJson {
    pub a: String,
    pub b: String,
    pub display: String,
}

impl From<&Pcf> for PcfJson {
    fn from(pcf: &Pcf) -> Self {
        Self {
            a: pcf.a().to_string(),
            b: pcf.b().to_string(),
            display: pcf.to_string(),
        }
    }
}

#[derive(Serialize, Debug)]
pub struct LimitJsonOutput {
    pub ok: bool,
    pub pcf: PcfJson,
    pub depth: u64,
    pub exact: bool,
    pub limit: Limit,
}

#[derive(Serialize, Debug)]
pub struct DynamicsJsonOutput {
    pub ok: bool,
    pub pcf: PcfJson,
    pub depth: u64,
    /// Best-effort δ and mean convergence rate (`--all` not given)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<DynamicsSummary>,
    /// Every metric (`--all`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<DynamicsReport>,
}

/// Integer zeros blocking evaluation, as decimal strings
#[derive(Serialize, Debug, Default)]
pub struct ZerosJson {
    pub b_num: Vec<String>,
    pub b_den: Vec<String>,
    pub a_den: Vec<String>,
}

impl From<&ViabilityZeros> for ZerosJson {
    fn from(zeros: &ViabilityZeros) -> Self {
        Self {
            b_num: strings(&zeros.b_num),
            b_den: strings(&zeros.b_den),
            a_den: strings(&zeros.a_den),
        }
    }
}

#[derive(Serialize, Debug)]
pub struct NormalizeJsonOutput {
    pub ok: bool,
    pub input: PcfJson,
    pub zeros: ZerosJson,
    pub pcf: PcfJson,
    pub inflation: String,
    pub shift: u64,
}

impl NormalizeJsonOutput {
    pub fn new(input: &Pcf, zeros: &ViabilityZeros, normalized: &NormalizedPcf) -> Self {
        Self {
            ok: true,
            input: input.into(),
            zeros: zeros.into(),
            pcf: (&normalized.pcf).into(),
            inflation: normalized.inflation.to_string(),
            shift: normalized.shift,
        }
    }
}

#[derive(Serialize, Debug)]
pub struct FoldJsonOutput {
    pub ok: bool,
    pub pcf: PcfJson,
    pub factor: i64,
    pub folded: PcfJson,
    pub eta: String,
    pub coboundary: [[String; 2]; 2],
    /// Limit of the input PCF
    pub limit: Limit,
    /// The same limit carried over to the folded PCF
    pub folded_limit: Limit,
}

fn strings<T: ToString>(values: &[T]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

pub fn matrix_strings(m: &RationalMatrix) -> [[String; 2]; 2] {
    m.map(|f| f.to_string()).rows
}

/// An error result
#[derive(Serialize, Debug)]
pub struct ErrorJsonOutput {
    pub ok: bool,
    pub error: String,
}

impl ErrorJsonOutput {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            error: error.into(),
        }
    }
}
