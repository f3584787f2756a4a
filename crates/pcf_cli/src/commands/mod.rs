pub mod dynamics;
pub mod fold;
pub mod limit;
pub mod normalize;

use anyhow::{Context, Result};
use clap::Args;
use pcf_engine::Pcf;

/// The PCF every subcommand operates on
#[derive(Args, Debug)]
pub struct PcfArgs {
    /// Partial denominators a(n), e.g. "2n+1" or "(n^2+1)/(n+2)"
    #[arg(long, short = 'a', allow_hyphen_values = true)]
    pub a: String,

    /// Partial numerators b(n), e.g. "n^2" or "-n^4"
    #[arg(long, short = 'b', allow_hyphen_values = true)]
    pub b: String,

    /// Symbol used for the index in `a` and `b`
    #[arg(long, default_value = "n")]
    pub var: String,

    /// Reject PCFs with poles or zeros of b inside the evaluated range
    #[arg(long, default_value_t = false)]
    pub strict: bool,
}

impl PcfArgs {
    pub fn build(&self) -> Result<Pcf> {
        let pcf = Pcf::parse(&self.a, &self.b, &self.var)
            .with_context(|| format!("cannot build PCF({}, {})", self.a, self.b))?;
        if self.strict {
            pcf.validate()?;
        }
        Ok(pcf)
    }
}

pub fn print_pretty_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{}", s),
        Err(e) => {
            eprintln!("JSON serialization error: {}", e);
            println!("{{\"ok\":false,\"error\":\"JSON_SERIALIZATION_FAILED\"}}");
        }
    }
}
