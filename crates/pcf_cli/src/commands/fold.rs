//! fold subcommand: fold a PCF and carry its limit over.

use anyhow::{Context, Result};
use clap::Args;
use pcf_engine::{
    as_pcf_coboundary, as_pcf_eta, fold_matrix, fold_pcf, folded_limit_transport, EngineConfig,
};

use super::PcfArgs;
use crate::json_types::{matrix_strings, FoldJsonOutput};

#[derive(Args, Debug)]
pub struct FoldArgs {
    #[command(flatten)]
    pub pcf: PcfArgs,

    /// Number of steps merged into one
    #[arg(long, allow_negative_numbers = true)]
    pub factor: i64,

    /// Depth for the limit of the input PCF (default: evaluation.depth)
    #[arg(long)]
    pub depth: Option<u64>,
}

pub fn run(args: &FoldArgs, config: &EngineConfig) -> Result<FoldJsonOutput> {
    let pcf = args.pcf.build()?;
    let depth = args.depth.unwrap_or(config.evaluation.depth);

    let folded = fold_pcf(&pcf, args.factor)?;
    let matrix = fold_matrix(&pcf.recurrence_matrix(), args.factor)?;
    let coboundary = as_pcf_coboundary(&matrix, true)?;
    let eta = as_pcf_eta(&matrix, true)?;

    let limit = pcf.limit(depth, None, None)?;
    let folded_limit = folded_limit_transport(&pcf, args.factor, &limit)
        .with_context(|| format!("cannot transport the limit of {}", pcf))?;

    Ok(FoldJsonOutput {
        ok: true,
        pcf: (&pcf).into(),
        factor: args.factor,
        folded: (&folded).into(),
        eta: eta.to_string(),
        coboundary: matrix_strings(&coboundary),
        limit,
        folded_limit,
    })
}
