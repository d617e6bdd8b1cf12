//! Git fact collection and rendering.
//!
//! Two facts are gathered with two git invocations: the push URL of the
//! configured remote and the currently checked-out branch. Neither lookup
//! can fail the run; a failure is carried as [`Lookup::Failed`] and
//! rendered according to the configured [`FailurePolicy`].

use crate::config::{FactsConfig, FailurePolicy, OutputFormat};
use crate::core::error::{Error, Result};
use crate::core::git::{git_args, GitRunner};
use std::io::Write;

/// Marker `git branch` puts in front of the checked-out branch.
pub const CURRENT_BRANCH_MARKER: char = '*';

/// Outcome of one git query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    /// Git produced a value.
    Found(String),
    /// Git failed; holds whatever text it printed.
    Failed(String),
}

impl Lookup {
    /// Returns true if a value was obtained.
    #[must_use]
    pub const fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    /// Returns the text to emit for a failed lookup, or `None` if found.
    #[must_use]
    pub fn failure_value(&self, policy: FailurePolicy) -> Option<&str> {
        match (self, policy) {
            (Self::Found(_), _) => None,
            (Self::Failed(_), FailurePolicy::Empty) => Some(""),
            (Self::Failed(output), FailurePolicy::Passthrough) => Some(output.as_str()),
        }
    }
}

/// Extracts the current branch name from `git branch` output.
///
/// Takes the first line containing the marker, removes the marker and one
/// following space from its start, and trims the rest. Returns `None` when
/// no line is marked.
#[must_use]
pub fn parse_current_branch(listing: &str) -> Option<String> {
    let line = listing
        .lines()
        .find(|line| line.contains(CURRENT_BRANCH_MARKER))?;

    let rest = line.strip_prefix("* ").unwrap_or(line);
    Some(rest.trim().to_string())
}

/// The facts gathered from one checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitFacts {
    /// Push URL of the remote.
    pub remote_url: Lookup,
    /// Name of the checked-out branch.
    pub current_branch: Lookup,
}

impl GitFacts {
    /// Returns the value of the URL fact.
    #[must_use]
    pub fn url_value(&self, config: &FactsConfig) -> String {
        match &self.remote_url {
            Lookup::Found(url) => config.url_suffix.apply(url),
            failed => failed
                .failure_value(config.on_failure)
                .unwrap_or_default()
                .to_string(),
        }
    }

    /// Returns the value of the branch fact.
    #[must_use]
    pub fn branch_value(&self, config: &FactsConfig) -> String {
        match &self.current_branch {
            Lookup::Found(branch) => branch.clone(),
            failed => failed
                .failure_value(config.on_failure)
                .unwrap_or_default()
                .to_string(),
        }
    }

    /// Renders the facts in the configured format, newline-terminated.
    pub fn render(&self, config: &FactsConfig) -> Result<String> {
        let url = self.url_value(config);
        let branch = self.branch_value(config);

        match config.format {
            OutputFormat::Text => Ok(format!(
                "{}={url}\n{}={branch}\n",
                config.url_key, config.branch_key
            )),
            OutputFormat::Json => {
                let mut object = serde_json::Map::new();
                object.insert(config.url_key.clone(), url.into());
                object.insert(config.branch_key.clone(), branch.into());

                let json = serde_json::to_string(&serde_json::Value::Object(object))
                    .map_err(|e| Error::Internal {
                        message: format!("Failed to serialize facts: {e}"),
                    })?;
                Ok(format!("{json}\n"))
            },
        }
    }
}

/// Collects git facts through a [`GitRunner`].
#[derive(Debug)]
pub struct FactEmitter<G> {
    git: G,
    remote: String,
}

impl<G: GitRunner> FactEmitter<G> {
    /// Creates an emitter reporting the push URL of `remote`.
    pub fn new(git: G, remote: impl Into<String>) -> Self {
        Self {
            git,
            remote: remote.into(),
        }
    }

    /// Looks up the push URL of the remote.
    pub fn remote_url(&self) -> Lookup {
        let output = self
            .git
            .run(git_args(["remote", "get-url", "--push", self.remote.as_str()]));

        if output.success() {
            Lookup::Found(output.stdout.trim().to_string())
        } else {
            let text = output.combined_output();
            tracing::warn!(remote = %self.remote, "Push URL lookup failed: {text}");
            Lookup::Failed(text)
        }
    }

    /// Looks up the checked-out branch.
    pub fn current_branch(&self) -> Lookup {
        let output = self.git.run(git_args(["branch", "--no-color"]));

        if !output.success() {
            let text = output.combined_output();
            tracing::warn!("Branch listing failed: {text}");
            return Lookup::Failed(text);
        }

        match parse_current_branch(&output.stdout) {
            Some(branch) => Lookup::Found(branch),
            None => {
                tracing::warn!("No branch is marked as current");
                Lookup::Failed(String::new())
            },
        }
    }

    /// Runs both lookups, URL first.
    pub fn collect(&self) -> GitFacts {
        let remote_url = self.remote_url();
        let current_branch = self.current_branch();

        tracing::debug!(?remote_url, ?current_branch, "Collected git facts");

        GitFacts {
            remote_url,
            current_branch,
        }
    }

    /// Collects the facts and writes them to `out`.
    pub fn emit(&self, config: &FactsConfig, out: &mut impl Write) -> Result<GitFacts> {
        let facts = self.collect();
        let rendered = facts.render(config)?;

        out.write_all(rendered.as_bytes())
            .and_then(|()| out.flush())
            .map_err(|e| Error::io("write facts", e))?;

        Ok(facts)
    }
}
