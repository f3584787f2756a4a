//! normalize subcommand: polynomial, deflated, viable form of a PCF.

use anyhow::Result;
use clap::Args;
use pcf_engine::{integer_zeros, normalize_pcf};

use super::PcfArgs;
use crate::json_types::NormalizeJsonOutput;

#[derive(Args, Debug)]
pub struct NormalizeArgs {
    #[command(flatten)]
    pub pcf: PcfArgs,
}

pub fn run(args: &NormalizeArgs) -> Result<NormalizeJsonOutput> {
    let pcf = args.pcf.build()?;
    let zeros = integer_zeros(&pcf);
    let normalized = normalize_pcf(&pcf)?;
    Ok(NormalizeJsonOutput::new(&pcf, &zeros, &normalized))
}
