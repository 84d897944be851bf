//! Best-effort lookup of the source revision baked into the bundle.
//!
//! The lookup is an external dependency that is allowed to fail: a missing
//! `git` binary or a checkout without history must never abort a build. The
//! resolver only ever sees `Option<String>` through [`lookup_revision`].

use std::ffi::OsString;
use std::path::PathBuf;
use std::process::Command;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RevisionError {
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: std::process::ExitStatus,
        stderr: String,
    },

    #[error("revision output is not valid UTF-8")]
    InvalidUtf8,

    #[error("revision output is empty")]
    Empty,

    #[error("no revision configured")]
    Unset,
}

/// Something that can name the current source revision.
pub trait RevisionSource {
    fn revision(&self) -> Result<String, RevisionError>;
}

/// Runs `git rev-parse HEAD` (or a substitute command) and trims its stdout.
#[derive(Debug, Clone)]
pub struct GitRevision {
    program: OsString,
    args: Vec<OsString>,
    cwd: Option<PathBuf>,
}

impl Default for GitRevision {
    fn default() -> Self {
        Self {
            program: "git".into(),
            args: vec!["rev-parse".into(), "HEAD".into()],
            cwd: None,
        }
    }
}

impl GitRevision {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the command line, e.g. to query another VCS.
    pub fn with_command<I, S>(program: impl Into<OsString>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            cwd: None,
        }
    }

    /// Run the command from `dir` instead of the process working directory.
    pub fn in_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }
}

impl RevisionSource for GitRevision {
    fn revision(&self) -> Result<String, RevisionError> {
        let program = self.program.to_string_lossy().into_owned();

        let mut command = Command::new(&self.program);
        command.args(&self.args);
        if let Some(dir) = &self.cwd {
            command.current_dir(dir);
        }

        let output = command.output().map_err(|source| RevisionError::Spawn {
            program: program.clone(),
            source,
        })?;

        if !output.status.success() {
            return Err(RevisionError::Failed {
                program,
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let stdout = String::from_utf8(output.stdout).map_err(|_| RevisionError::InvalidUtf8)?;
        let revision = stdout.trim();
        if revision.is_empty() {
            return Err(RevisionError::Empty);
        }

        Ok(revision.to_string())
    }
}

/// A revision known up front (pinned on the command line, or absent).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FixedRevision(Option<String>);

impl FixedRevision {
    pub fn new(revision: impl Into<String>) -> Self {
        Self(Some(revision.into()))
    }

    pub fn absent() -> Self {
        Self(None)
    }
}

impl RevisionSource for FixedRevision {
    fn revision(&self) -> Result<String, RevisionError> {
        self.0.clone().ok_or(RevisionError::Unset)
    }
}

/// Ask `source` for the revision, degrading any failure to `None`.
pub fn lookup_revision(source: &dyn RevisionSource) -> Option<String> {
    match source.revision() {
        Ok(revision) => {
            tracing::debug!(%revision, "resolved source revision");
            Some(revision)
        }
        Err(err) => {
            tracing::debug!(error = %err, "revision unavailable, continuing without it");
            None
        }
    }
}
