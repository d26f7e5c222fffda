//! # watanabe: Watanabe infrastructure CLI
//!
//! Resolves deployment configuration, prints the resource plan, and
//! synthesizes the application and registry templates.

mod commands;
mod output;

use std::path::Path;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::commands::Cli;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let (env_filter, loaded) = load_filter(&cli.env_file, EnvFilter::DEFAULT_ENV)?;
    if cli.log_json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    if loaded {
        tracing::debug!(path = %cli.env_file.display(), "loaded environment file");
    }
    commands::execute(cli)
}

/// Loads the environment file, then reads the log filter from `var`, so a
/// filter set in the file takes effect. Returns whether the file existed.
fn load_filter(env_file: &Path, var: &str) -> anyhow::Result<(EnvFilter, bool)> {
    let loaded = load_env_file(env_file)?;
    Ok((EnvFilter::from_env(var), loaded))
}

/// Loads `path` into the process environment. A missing file is not an error.
fn load_env_file(path: &Path) -> anyhow::Result<bool> {
    match dotenvy::from_path(path) {
        Ok(()) => Ok(true),
        Err(dotenvy::Error::Io(err)) if err.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(err) => Err(err).with_context(|| format!("failed to load {}", path.display())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_set_in_env_file_is_applied() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(".env");
        std::fs::write(&path, "WATANABE_TEST_LOG_FILTER=watanabe_graph=trace\n").expect("write");
        let (filter, loaded) = load_filter(&path, "WATANABE_TEST_LOG_FILTER").expect("filter");
        assert!(loaded);
        assert!(filter.to_string().contains("watanabe_graph=trace"), "{filter}");
    }

    #[test]
    fn missing_env_file_is_not_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let loaded = load_env_file(&dir.path().join(".env")).expect("load");
        assert!(!loaded);
    }
}
