//! # gitfacts
//!
//! External facts describing a git checkout.
//!
//! Configuration-management fact collectors run executables and read
//! `key=value` lines from their stdout. `gitfacts` reports two of them:
//!
//! ```text
//! giturl=<push url of origin>.git
//! gitbranch=<current branch>
//! ```
//!
//! Git failures never fail a run. Each lookup yields a [`Lookup`], and a
//! failed one is rendered empty or with git's output depending on
//! [`FailurePolicy`].
//!
//! ## Example
//!
//! ```rust,no_run
//! use gitfacts::{Config, FactEmitter, SystemGit};
//!
//! fn main() -> gitfacts::Result<()> {
//!     let config = Config::load_or_default(std::path::Path::new("."))?;
//!
//!     let git = SystemGit::new(&config.git.binary, "/srv/app");
//!     let emitter = FactEmitter::new(git, config.git.remote.as_str());
//!
//!     emitter.emit(&config.facts, &mut std::io::stdout())?;
//!     Ok(())
//! }
//! ```

#![doc(html_root_url = "https://docs.rs/gitfacts/0.1.0")]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod cli;
pub mod config;
pub mod core;

// Re-export main types for convenience
pub use config::{Config, FailurePolicy, OutputFormat, SuffixPolicy};
pub use core::error::{Error, Result};
pub use core::facts::{FactEmitter, GitFacts, Lookup};
pub use core::git::{GitOutput, GitRunner, SystemGit};
