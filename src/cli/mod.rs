//! Command-line interface for gitfacts.
//!
//! This module provides the `gitfacts` CLI with subcommands for:
//! - `emit`: Print the git facts (the default)
//! - `init`: Write a default configuration file
//! - `validate`: Validate configuration
//! - `config`: Show configuration
//! - `completions`: Generate shell completions

mod commands;

use crate::config::{Config, FailurePolicy, OutputFormat, SuffixPolicy};
use crate::core::error::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Report the git push URL and current branch as external facts.
#[derive(Debug, Parser)]
#[command(
    name = "gitfacts",
    author,
    version,
    about = "Report the git push URL and current branch as external facts",
    long_about = r#"
gitfacts prints two key=value facts about a git checkout for a
configuration-management fact collector:

  giturl=<push url of origin>.git
  gitbranch=<current branch>

Git failures never fail the run; the affected fact is emitted empty
(or with git's output, see --on-failure).

Configuration is read from gitfacts.toml, searched upward from --repo.
"#,
    propagate_version = true
)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Repository to inspect.
    #[arg(short, long, global = true, env = "GITFACTS_REPO", default_value = ".")]
    pub repo: PathBuf,

    /// Configuration file to use instead of searching for gitfacts.toml.
    #[arg(short, long, global = true, env = "GITFACTS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-error output.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Use color output.
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,
}

/// Color output choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ColorChoice {
    /// Always use color.
    Always,
    /// Auto-detect color support.
    #[default]
    Auto,
    /// Never use color.
    Never,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Print the git facts.
    #[command(visible_alias = "e")]
    Emit(EmitArgs),

    /// Write a default gitfacts.toml into the repository.
    #[command(visible_alias = "i")]
    Init {
        /// Overwrite existing configuration.
        #[arg(short, long)]
        force: bool,
    },

    /// Validate the configuration file.
    #[command(visible_alias = "v")]
    Validate,

    /// Show configuration file location and contents.
    Config {
        /// Output raw TOML.
        #[arg(long)]
        raw: bool,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Overrides for configuration values when emitting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Args)]
pub struct EmitArgs {
    /// Remote whose push URL is reported.
    #[arg(long)]
    pub remote: Option<String>,

    /// When to append `.git` to the push URL.
    #[arg(long, value_enum)]
    pub suffix: Option<SuffixPolicy>,

    /// What to emit when git fails.
    #[arg(long, value_enum)]
    pub on_failure: Option<FailurePolicy>,

    /// Output format.
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,
}

impl EmitArgs {
    /// Applies the overrides on top of a loaded configuration.
    pub fn apply(&self, config: &mut Config) {
        if let Some(remote) = &self.remote {
            config.git.remote.clone_from(remote);
        }
        if let Some(suffix) = self.suffix {
            config.facts.url_suffix = suffix;
        }
        if let Some(on_failure) = self.on_failure {
            config.facts.on_failure = on_failure;
        }
        if let Some(format) = self.format {
            config.facts.format = format;
        }
    }
}

/// Runs the CLI.
pub fn run() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Set up logging
    setup_logging(cli.verbose, cli.quiet);

    // Set up color
    setup_color(cli.color);

    let ctx = commands::Context {
        repo: cli.repo,
        config: cli.config,
    };

    // If no subcommand, emit with the configured values
    match cli.command {
        Some(Commands::Emit(args)) => commands::emit(&ctx, &args),
        Some(Commands::Init { force }) => commands::init(&ctx, force),
        Some(Commands::Validate) => commands::validate(&ctx),
        Some(Commands::Config { raw }) => commands::config(&ctx, raw),
        Some(Commands::Completions { shell }) => {
            commands::completions(shell);
            Ok(ExitCode::SUCCESS)
        },
        None => commands::emit(&ctx, &EmitArgs::default()),
    }
}

/// Sets up logging based on verbosity flags.
///
/// Logs go to stderr; stdout carries only the facts.
fn setup_logging(verbose: bool, quiet: bool) {
    let filter = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Sets up color output.
fn setup_color(choice: ColorChoice) {
    match choice {
        ColorChoice::Always => {
            console::set_colors_enabled(true);
            console::set_colors_enabled_stderr(true);
        },
        ColorChoice::Never => {
            console::set_colors_enabled(false);
            console::set_colors_enabled_stderr(false);
        },
        ColorChoice::Auto => {
            // Let console crate auto-detect
        },
    }
}
