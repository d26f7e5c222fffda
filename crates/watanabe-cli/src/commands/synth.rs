//! `watanabe synth`: Write a stack template.

use std::path::PathBuf;

use clap::{Args, ValueEnum};
use watanabe_config::EnvSource;

use super::StackArgs;
use crate::output::Format;

/// Which stack to synthesize.
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StackArg {
    /// The application stack.
    #[default]
    App,
    /// The image registry stack.
    Registry,
}

/// Arguments for the `synth` command.
#[derive(Args, Debug)]
pub struct SynthArgs {
    /// Stack to synthesize.
    #[arg(long, value_enum, default_value_t = StackArg::App)]
    pub stack: StackArg,

    /// Template format.
    #[arg(long, value_enum, default_value_t = Format::Json)]
    pub format: Format,

    /// Write the template to a file instead of stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Stack options.
    #[command(flatten)]
    pub options: StackArgs,
}

/// Executes the `synth` command.
///
/// # Errors
///
/// Returns an error if the stack cannot be built or synthesized, or the
/// output cannot be written.
pub fn execute(args: &SynthArgs) -> anyhow::Result<()> {
    let source = EnvSource::capture();
    let options = args.options.options(&source);
    let stack = match args.stack {
        StackArg::App => {
            let record = args.options.mode.resolve(&source)?;
            watanabe_stack::build_stack_with(&record, &options)?
        }
        StackArg::Registry => watanabe_stack::build_registry_stack(&options)?,
    };

    let template = stack.synthesize()?;
    let rendered = crate::output::render_template(&template, args.format)?;
    match args.output {
        Some(ref path) => {
            crate::output::write_file(path, &rendered)?;
            println!("Synthesized {} -> {}", stack.name(), path.display());
            println!("Resources: {}", template.resources.len());
        }
        None => print!("{rendered}"),
    }
    Ok(())
}
