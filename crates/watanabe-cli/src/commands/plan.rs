//! `watanabe plan`: Display the declarations a stack would contain.

use clap::Args;
use watanabe_config::EnvSource;

use super::StackArgs;

/// Arguments for the `plan` command.
#[derive(Args, Debug)]
pub struct PlanArgs {
    /// Stack options.
    #[command(flatten)]
    pub options: StackArgs,
}

/// Executes the `plan` command.
///
/// Resolves configuration, builds the application stack, and prints every
/// declaration in construction order with the declarations it depends on.
///
/// # Errors
///
/// Returns an error if configuration cannot be resolved or the stack
/// cannot be built.
pub fn execute(args: &PlanArgs) -> anyhow::Result<()> {
    let source = EnvSource::capture();
    let record = args.options.mode.resolve(&source)?;
    let stack = watanabe_stack::build_stack_with(&record, &args.options.options(&source))?;
    for line in crate::output::plan_lines(&stack) {
        println!("{line}");
    }
    Ok(())
}
