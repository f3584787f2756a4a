//! dynamics subcommand: δ and convergence metrics.

use anyhow::Result;
use clap::Args;
use pcf_engine::{EngineConfig, PcfDynamics};

use super::PcfArgs;
use crate::json_types::DynamicsJsonOutput;

#[derive(Args, Debug)]
pub struct DynamicsArgs {
    #[command(flatten)]
    pub pcf: PcfArgs,

    /// Analysis depth (default: dynamics.depth from the config)
    #[arg(long)]
    pub depth: Option<u64>,

    /// Compute every metric instead of the best-effort summary
    #[arg(long, default_value_t = false)]
    pub all: bool,
}

pub fn run(args: &DynamicsArgs, config: &EngineConfig) -> Result<DynamicsJsonOutput> {
    let pcf = args.pcf.build()?;
    let settings = config.dynamics.clone();
    let depth = args.depth.unwrap_or(settings.depth);
    let dynamics = PcfDynamics::with_settings(&pcf, settings);

    let (summary, report) = if args.all {
        (None, Some(dynamics.compute_all(depth, None)?))
    } else {
        let s = dynamics.settings();
        let summary = dynamics.compute_dynamics(depth, s.max_iters, s.depth_shift);
        (Some(summary), None)
    };
    Ok(DynamicsJsonOutput {
        ok: true,
        pcf: (&pcf).into(),
        depth,
        summary,
        report,
    })
}
