//! CLI command implementations.

use super::EmitArgs;
use crate::config::{Config, CONFIG_FILE_NAME};
use crate::core::error::{Error, Result};
use crate::core::facts::FactEmitter;
use crate::core::git::{GitRepo, SystemGit};
use console::style;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

/// Global options shared by every command.
#[derive(Debug, Clone)]
pub struct Context {
    /// Repository to inspect.
    pub repo: PathBuf,
    /// Explicit configuration file, if given.
    pub config: Option<PathBuf>,
}

impl Context {
    /// Directory the configuration search starts from.
    fn search_start(&self) -> PathBuf {
        self.repo
            .canonicalize()
            .unwrap_or_else(|_| self.repo.clone())
    }

    /// Returns the configuration file in effect, if any.
    fn config_file(&self) -> Result<Option<PathBuf>> {
        if let Some(path) = &self.config {
            if !path.is_file() {
                return Err(Error::ConfigNotFound { path: path.clone() });
            }
            return Ok(Some(path.clone()));
        }

        match Config::find_config_file(&self.search_start()) {
            Ok(path) => Ok(Some(path)),
            Err(Error::ConfigNotFound { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Loads the configuration in effect, or defaults if there is none.
    ///
    /// Only an explicit `--config` can fail. A discovered file that does
    /// not load is reported and replaced by the defaults.
    fn load_config(&self) -> Result<Config> {
        if let Some(path) = &self.config {
            return Config::load_from(path);
        }

        match Config::load_or_default(&self.search_start()) {
            Ok(config) => Ok(config),
            Err(e) => {
                tracing::warn!("Ignoring discovered configuration, using defaults: {e}");
                Ok(Config::default())
            },
        }
    }
}

/// Print the git facts.
///
/// Git problems degrade into the emitted values; only configuration and
/// output errors fail this command.
pub fn emit(ctx: &Context, args: &EmitArgs) -> Result<ExitCode> {
    let mut config = ctx.load_config()?;
    args.apply(&mut config);
    config.validate()?;

    let git = SystemGit::new(&config.git.binary, &ctx.repo);
    let emitter = FactEmitter::new(git, config.git.remote.as_str());

    let facts = emitter.emit(&config.facts, &mut std::io::stdout().lock())?;
    tracing::debug!(
        url_found = facts.remote_url.is_found(),
        branch_found = facts.current_branch.is_found(),
        "Emitted facts"
    );

    Ok(ExitCode::SUCCESS)
}

/// Initialize configuration.
pub fn init(ctx: &Context, force: bool) -> Result<ExitCode> {
    let binary = match ctx.load_config() {
        Ok(config) => config.git.binary,
        Err(e) => {
            tracing::debug!("{e}, locating the repository with the default git");
            Config::default().git.binary
        },
    };

    let dir = match GitRepo::discover(&SystemGit::new(binary, &ctx.repo)) {
        Ok(repo) => repo.root().to_path_buf(),
        Err(e) => {
            tracing::debug!("{e}, writing configuration into {}", ctx.repo.display());
            ctx.repo.clone()
        },
    };
    let config_path = dir.join(CONFIG_FILE_NAME);

    // Check if config already exists
    if config_path.exists() && !force {
        eprintln!(
            "{} Configuration already exists: {}",
            style("!").yellow(),
            config_path.display()
        );
        eprintln!("  Use --force to overwrite.");
        return Ok(ExitCode::FAILURE);
    }

    std::fs::write(&config_path, Config::default_toml()?)
        .map_err(|e| Error::io("write config", e))?;

    eprintln!("{} Created {}", style("✓").green(), config_path.display());

    Ok(ExitCode::SUCCESS)
}

/// Validate configuration.
pub fn validate(ctx: &Context) -> Result<ExitCode> {
    let path = match ctx.config_file() {
        Ok(Some(path)) => path,
        Ok(None) => {
            eprintln!(
                "{} Configuration not found: {}",
                style("!").yellow(),
                ctx.search_start().join(CONFIG_FILE_NAME).display()
            );
            eprintln!("  Run: gitfacts init");
            return Ok(ExitCode::FAILURE);
        },
        Err(e) => {
            eprintln!("{} Failed to load configuration: {e}", style("✗").red());
            return Ok(ExitCode::FAILURE);
        },
    };

    match Config::load_from(&path) {
        Ok(config) => {
            eprintln!("{} Configuration is valid", style("✓").green());
            report_binary(&config.git.binary);
            Ok(ExitCode::SUCCESS)
        },
        Err(e @ Error::ConfigInvalid { .. }) => {
            eprintln!("{} Configuration validation failed: {e}", style("✗").red());
            Ok(ExitCode::FAILURE)
        },
        Err(e) => {
            eprintln!("{} Failed to load configuration: {e}", style("✗").red());
            Ok(ExitCode::FAILURE)
        },
    }
}

/// Warns when the configured git binary is not on `PATH`.
fn report_binary(binary: &str) {
    match SystemGit::locate(binary) {
        Ok(path) => eprintln!("  git: {}", path.display()),
        Err(e) => eprintln!(
            "{} {e} (facts will be emitted as failures)",
            style("!").yellow()
        ),
    }
}

/// Show configuration.
pub fn config(ctx: &Context, raw: bool) -> Result<ExitCode> {
    match ctx.config_file()? {
        Some(path) => {
            eprintln!("Configuration file: {}", path.display());

            if raw {
                let content =
                    std::fs::read_to_string(&path).map_err(|e| Error::io("read config", e))?;
                eprintln!();
                write_stdout(&content)?;
            }
        },
        None => {
            eprintln!(
                "{} No configuration file found, using defaults",
                style("!").yellow()
            );
            if raw {
                write_stdout(&Config::default_toml()?)?;
            }
        },
    }

    Ok(ExitCode::SUCCESS)
}

fn write_stdout(content: &str) -> Result<()> {
    std::io::stdout()
        .write_all(content.as_bytes())
        .map_err(|e| Error::io("write output", e))
}

/// Generate shell completions.
pub fn completions(shell: clap_complete::Shell) {
    use clap::CommandFactory;
    clap_complete::generate(
        shell,
        &mut super::Cli::command(),
        "gitfacts",
        &mut std::io::stdout(),
    );
}
