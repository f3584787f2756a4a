//! limit subcommand: value of a PCF at a given depth.

use anyhow::Result;
use clap::Args;
use pcf_engine::EngineConfig;

use super::PcfArgs;
use crate::json_types::LimitJsonOutput;

#[derive(Args, Debug)]
pub struct LimitArgs {
    #[command(flatten)]
    pub pcf: PcfArgs,

    /// Recurrence depth (default: evaluation.depth from the config)
    #[arg(long)]
    pub depth: Option<u64>,

    /// Significant digits to round to (default: the computed precision)
    #[arg(long, conflicts_with = "exact")]
    pub precision: Option<u32>,

    /// Report the unrounded rational convergent
    #[arg(long, default_value_t = false)]
    pub exact: bool,
}

pub fn run(args: &LimitArgs, config: &EngineConfig) -> Result<LimitJsonOutput> {
    let pcf = args.pcf.build()?;
    let depth = args.depth.unwrap_or(config.evaluation.depth);
    let limit = if args.exact {
        pcf.limit_exact(depth, None)?
    } else {
        pcf.limit(depth, None, args.precision)?
    };
    Ok(LimitJsonOutput {
        ok: true,
        pcf: (&pcf).into(),
        depth,
        exact: args.exact,
        limit,
    })
}
