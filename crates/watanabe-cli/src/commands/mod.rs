//! CLI command definitions and dispatch.

pub mod config;
pub mod plan;
pub mod synth;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use watanabe_common::constants;
use watanabe_config::{ConfigSource, ConfigurationRecord, Resolver};
use watanabe_stack::{DatabaseMode, StackOptions};

/// Input that overrides the deployment region.
pub const REGION_ENV: &str = "WATANABE_REGION";

/// Watanabe: cloud infrastructure for the Watanabe web application.
#[derive(Parser, Debug)]
#[command(name = constants::BIN_NAME, version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,

    /// Environment file loaded before inputs are read. Ignored if missing.
    #[arg(long, global = true, default_value = ".env")]
    pub env_file: PathBuf,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    pub log_json: bool,
}

/// Available CLI subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Resolve configuration and print it with secrets redacted.
    Config(config::ConfigArgs),
    /// Print declarations in construction order with their dependencies.
    Plan(plan::PlanArgs),
    /// Synthesize a stack template.
    Synth(synth::SynthArgs),
}

/// Database strategy accepted on the command line.
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DatabaseArg {
    /// Password database when a password is configured.
    #[default]
    Auto,
    /// Require a configured password.
    Password,
    /// Generate the password in a managed secret.
    Generated,
    /// Never declare a database.
    Disabled,
}

impl From<DatabaseArg> for DatabaseMode {
    fn from(value: DatabaseArg) -> Self {
        match value {
            DatabaseArg::Auto => Self::Auto,
            DatabaseArg::Password => Self::Password,
            DatabaseArg::Generated => Self::Generated,
            DatabaseArg::Disabled => Self::Disabled,
        }
    }
}

/// Mode override shared by every command that resolves configuration.
#[derive(Args, Debug, Clone, Default)]
pub struct ModeArgs {
    /// Resolve this mode instead of selecting one from the inputs.
    #[arg(long)]
    pub mode: Option<String>,
}

impl ModeArgs {
    /// Resolves the configuration record from `source`.
    ///
    /// # Errors
    ///
    /// Returns an error if resolution fails.
    pub fn resolve<S: ConfigSource + ?Sized>(&self, source: &S) -> anyhow::Result<ConfigurationRecord> {
        let resolver = Resolver::default();
        let record = match self.mode.as_deref() {
            Some(mode) => resolver.resolve_mode(source, mode)?,
            None => resolver.resolve(source)?,
        };
        Ok(record)
    }
}

/// Stack options shared by `plan` and `synth`.
#[derive(Args, Debug, Clone, Default)]
pub struct StackArgs {
    /// Configuration mode override.
    #[command(flatten)]
    pub mode: ModeArgs,

    /// Database credential strategy.
    #[arg(long, value_enum, default_value_t = DatabaseArg::Auto)]
    pub database: DatabaseArg,

    /// Deployment region.
    #[arg(long, env = REGION_ENV)]
    pub region: Option<String>,

    /// Availability zone; repeat for each zone.
    #[arg(long = "az")]
    pub availability_zones: Vec<String>,
}

impl StackArgs {
    /// Builds stack options from the flags.
    ///
    /// The region falls back to [`REGION_ENV`] in `source`, which covers
    /// values loaded from the environment file after flags were parsed.
    pub fn options<S: ConfigSource + ?Sized>(&self, source: &S) -> StackOptions {
        let defaults = StackOptions::default();
        StackOptions {
            region: self
                .region
                .clone()
                .or_else(|| source.get(REGION_ENV))
                .unwrap_or(defaults.region),
            availability_zones: if self.availability_zones.is_empty() {
                defaults.availability_zones
            } else {
                self.availability_zones.clone()
            },
            database: self.database.into(),
            ..StackOptions::default()
        }
    }
}

/// Dispatches the parsed CLI command to its handler.
///
/// # Errors
///
/// Returns an error if the command execution fails.
pub fn execute(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Config(args) => config::execute(&args),
        Command::Plan(args) => plan::execute(&args),
        Command::Synth(args) => synth::execute(&args),
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;
    use watanabe_config::MapSource;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_synth_flags() {
        let cli = Cli::try_parse_from([
            "watanabe",
            "synth",
            "--stack",
            "registry",
            "--format",
            "yaml",
            "--az",
            "ap-northeast-1a",
            "--database",
            "generated",
        ])
        .expect("parse");
        let Command::Synth(args) = cli.command else {
            panic!("expected synth");
        };
        assert_eq!(args.stack, synth::StackArg::Registry);
        assert_eq!(args.format, crate::output::Format::Yaml);
        assert_eq!(args.options.availability_zones, vec!["ap-northeast-1a"]);
        assert_eq!(args.options.database, DatabaseArg::Generated);
    }

    #[test]
    fn region_falls_back_to_source_then_default() {
        let args = StackArgs::default();
        let from_source = args.options(&MapSource::new().with(REGION_ENV, "us-east-1"));
        assert_eq!(from_source.region, "us-east-1");
        assert_eq!(args.options(&MapSource::new()).region, constants::DEFAULT_REGION);

        let flagged = StackArgs {
            region: Some("eu-west-1".into()),
            ..StackArgs::default()
        };
        assert_eq!(
            flagged.options(&MapSource::new().with(REGION_ENV, "us-east-1")).region,
            "eu-west-1"
        );
    }

    #[test]
    fn mode_override_ignores_selector_inputs() {
        let source = MapSource::new()
            .with("NODE_ENV", "something-else")
            .with("APP_KEY", "k")
            .with("APP_ENV", "dev")
            .with("APP_URL", "https://dev.example.com")
            .with("ACM_CERTIFICATE_ARN", "arn:cert");
        assert!(ModeArgs::default().resolve(&source).is_err());
        let record = ModeArgs {
            mode: Some("dev".into()),
        }
        .resolve(&source)
        .expect("record");
        assert_eq!(record.mode().name(), "dev");
    }
}
