//! Git command invocation.
//!
//! Everything gitfacts learns about a checkout comes from running the git
//! binary. [`GitRunner`] is the seam between fact collection and the
//! process; [`SystemGit`] is the implementation that actually spawns git.

use crate::core::error::{Error, Result};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Captured result of a single git invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GitOutput {
    /// Exit code, or `None` if the process could not be started or was
    /// killed by a signal.
    pub exit_code: Option<i32>,
    /// Standard output.
    pub stdout: String,
    /// Standard error.
    pub stderr: String,
}

impl GitOutput {
    /// Creates a successful output with the given stdout.
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            exit_code: Some(0),
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// Creates a failed output with the given exit code and stderr.
    pub fn failed(exit_code: i32, stderr: impl Into<String>) -> Self {
        Self {
            exit_code: Some(exit_code),
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    /// Creates an output for a process that never ran.
    pub fn spawn_failed(message: impl Into<String>) -> Self {
        Self {
            exit_code: None,
            stdout: String::new(),
            stderr: message.into(),
        }
    }

    /// Returns true if git exited with status 0.
    #[must_use]
    pub const fn success(&self) -> bool {
        matches!(self.exit_code, Some(0))
    }

    /// Returns stdout and stderr joined the way a shell captures them,
    /// without the trailing newline.
    #[must_use]
    pub fn combined_output(&self) -> String {
        let stdout = self.stdout.trim_end_matches(['\r', '\n']);
        let stderr = self.stderr.trim_end_matches(['\r', '\n']);

        if stderr.is_empty() {
            stdout.to_string()
        } else if stdout.is_empty() {
            stderr.to_string()
        } else {
            format!("{stdout}\n{stderr}")
        }
    }
}

/// Builds an owned argument list for [`GitRunner::run`].
#[must_use]
pub fn git_args<const N: usize>(args: [&str; N]) -> Vec<String> {
    args.map(String::from).into()
}

/// Runs git subcommands against one repository.
pub trait GitRunner {
    /// Runs `git <args>` and captures its output. Never fails: problems
    /// starting the process are reported through [`GitOutput::spawn_failed`].
    fn run(&self, args: Vec<String>) -> GitOutput;
}

impl<T: GitRunner + ?Sized> GitRunner for &T {
    fn run(&self, args: Vec<String>) -> GitOutput {
        (**self).run(args)
    }
}

/// Runs the git binary found on the system.
#[derive(Debug, Clone)]
pub struct SystemGit {
    /// Binary as configured, used in messages.
    binary: String,
    /// Resolved executable path, if it could be found.
    executable: Option<PathBuf>,
    /// Working directory for every invocation.
    repo: PathBuf,
}

impl SystemGit {
    /// Creates a runner for `binary` operating in `repo`.
    ///
    /// A binary that cannot be located is not an error here; each
    /// invocation then reports it as a failed output.
    pub fn new(binary: impl Into<String>, repo: impl Into<PathBuf>) -> Self {
        let binary = binary.into();
        let executable = match Self::locate(&binary) {
            Ok(path) => {
                tracing::debug!(binary = %binary, path = %path.display(), "Resolved git binary");
                Some(path)
            },
            Err(e) => {
                tracing::warn!("{e}");
                None
            },
        };

        Self {
            binary,
            executable,
            repo: repo.into(),
        }
    }

    /// Resolves a binary name or path to an executable.
    pub fn locate(binary: &str) -> Result<PathBuf> {
        which::which(binary).map_err(|_| Error::GitNotFound {
            binary: binary.to_string(),
        })
    }

    /// Returns the repository directory git runs in.
    #[must_use]
    pub fn repo(&self) -> &Path {
        &self.repo
    }

    /// Returns the resolved executable, if any.
    #[must_use]
    pub fn executable(&self) -> Option<&Path> {
        self.executable.as_deref()
    }
}

impl GitRunner for SystemGit {
    fn run(&self, args: Vec<String>) -> GitOutput {
        let Some(executable) = &self.executable else {
            return GitOutput::spawn_failed(format!("{}: command not found", self.binary));
        };

        tracing::debug!(args = ?args, repo = %self.repo.display(), "Running git");

        match Command::new(executable)
            .args(args)
            .current_dir(&self.repo)
            .output()
        {
            Ok(output) => GitOutput {
                exit_code: output.status.code(),
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            },
            Err(e) => GitOutput::spawn_failed(format!("{}: {e}", self.binary)),
        }
    }
}

/// A discovered Git work tree.
#[derive(Debug, Clone)]
pub struct GitRepo {
    /// Top-level directory of the work tree.
    root: PathBuf,
}

impl GitRepo {
    /// Discovers the work tree the runner operates in.
    pub fn discover(git: &impl GitRunner) -> Result<Self> {
        let output = git.run(git_args(["rev-parse", "--show-toplevel"]));

        if !output.success() {
            return Err(Error::NotGitRepo);
        }

        output
            .stdout
            .lines()
            .next()
            .filter(|line| !line.is_empty())
            .map(|line| Self {
                root: PathBuf::from(line),
            })
            .ok_or(Error::NotGitRepo)
    }

    /// Returns the root directory of the work tree.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn create_test_repo() -> TempDir {
        let temp = TempDir::new().expect("create temp dir");

        Command::new("git")
            .args(["init", "--initial-branch=main"])
            .current_dir(temp.path())
            .output()
            .expect("init repo");

        temp
    }

    // =========================================================================
    // GitOutput tests
    // =========================================================================

    #[test]
    fn test_git_args() {
        assert_eq!(
            git_args(["branch", "--no-color"]),
            vec!["branch".to_string(), "--no-color".to_string()]
        );
    }

    #[test]
    fn test_output_success() {
        assert!(GitOutput::ok("x").success());
        assert!(!GitOutput::failed(128, "fatal").success());
        assert!(!GitOutput::spawn_failed("nope").success());
    }

    #[test]
    fn test_combined_output_stdout_only() {
        let output = GitOutput::ok("line\n");
        assert_eq!(output.combined_output(), "line");
    }

    #[test]
    fn test_combined_output_stderr_only() {
        let output = GitOutput::failed(2, "error: No such remote 'origin'\n");
        assert_eq!(output.combined_output(), "error: No such remote 'origin'");
    }

    #[test]
    fn test_combined_output_both() {
        let output = GitOutput {
            exit_code: Some(1),
            stdout: "out\n".to_string(),
            stderr: "err\n".to_string(),
        };
        assert_eq!(output.combined_output(), "out\nerr");
    }

    // =========================================================================
    // SystemGit tests
    // =========================================================================

    #[test]
    fn test_missing_binary_reports_spawn_failure() {
        let temp = TempDir::new().expect("create temp dir");
        let git = SystemGit::new("definitely-not-a-git-binary", temp.path());

        assert!(git.executable().is_none());
        let output = git.run(git_args(["status"]));
        assert_eq!(output.exit_code, None);
        assert_eq!(
            output.combined_output(),
            "definitely-not-a-git-binary: command not found"
        );
    }

    #[test]
    fn test_locate_missing_binary() {
        let result = SystemGit::locate("definitely-not-a-git-binary");
        assert!(matches!(result, Err(Error::GitNotFound { .. })));
    }

    #[test]
    fn test_run_in_repo() {
        let temp = create_test_repo();
        let git = SystemGit::new("git", temp.path());

        let output = git.run(git_args(["rev-parse", "--is-inside-work-tree"]));
        assert!(output.success());
        assert_eq!(output.stdout.trim(), "true");
        assert_eq!(git.repo(), temp.path());
    }

    #[test]
    fn test_run_outside_repo_fails() {
        let temp = TempDir::new().expect("create temp dir");
        let git = SystemGit::new("git", temp.path());

        let output = git.run(git_args(["rev-parse", "--show-toplevel"]));
        assert!(!output.success());
        assert!(!output.combined_output().is_empty());
    }

    // =========================================================================
    // Discovery tests
    // =========================================================================

    #[test]
    fn test_discover_repo() {
        let temp = create_test_repo();
        let repo = GitRepo::discover(&SystemGit::new("git", temp.path())).expect("discover");

        // Canonicalize both paths to handle macOS /var -> /private/var symlinks
        let expected = temp.path().canonicalize().expect("canonicalize temp");
        let actual = repo.root().canonicalize().expect("canonicalize root");
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_discover_from_subdirectory() {
        let temp = create_test_repo();
        let subdir = temp.path().join("src/lib");
        std::fs::create_dir_all(&subdir).expect("create subdir");

        let repo = GitRepo::discover(&SystemGit::new("git", &subdir)).expect("discover");
        let expected = temp.path().canonicalize().expect("canonicalize temp");
        let actual = repo.root().canonicalize().expect("canonicalize root");
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_not_git_repo() {
        let temp = TempDir::new().expect("create temp dir");
        let result = GitRepo::discover(&SystemGit::new("git", temp.path()));
        assert!(matches!(result, Err(Error::NotGitRepo)));
    }
}
