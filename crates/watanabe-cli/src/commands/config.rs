//! `watanabe config`: Resolve configuration and print it redacted.

use clap::Args;
use watanabe_config::EnvSource;

use super::ModeArgs;

/// Arguments for the `config` command.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Configuration mode override.
    #[command(flatten)]
    pub mode: ModeArgs,
}

/// Executes the `config` command.
///
/// # Errors
///
/// Returns an error if configuration cannot be resolved.
pub fn execute(args: &ConfigArgs) -> anyhow::Result<()> {
    let record = args.mode.resolve(&EnvSource::capture())?;
    for line in crate::output::record_lines(&record) {
        println!("{line}");
    }
    Ok(())
}
