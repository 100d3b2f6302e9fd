//! Running external formatters.
//!
//! The formatters are opaque executables. Their exit status and the file
//! content they leave behind are all we rely on. Two calling conventions exist:
//!
//! - [`Invocation::Stdout`]: run against the original file from the workspace
//!   root, capture standard output in a scratch file.
//! - [`Invocation::InPlace`]: copy the original into a scratch file and let the
//!   formatter rewrite that copy.
//!
//! Either way the scratch file is read back and then released.

use std::io;
use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};

use thiserror::Error;
use tokio::process::Command;

use crate::language::Language;
use crate::scratch::ScratchDir;

/// How a formatter expects to be called
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Invocation {
    /// Prints the formatted source to stdout
    Stdout,
    /// Rewrites the file it is given
    InPlace,
}

/// Executable plus leading arguments; the file path is appended last
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatterCommand {
    pub program: PathBuf,
    pub args: Vec<String>,
}

impl FormatterCommand {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    fn name(&self) -> String {
        self.program.display().to_string()
    }
}

#[derive(Debug, Error)]
pub enum FormatError {
    #[error("failed to prepare scratch file under {path}: {source}")]
    Scratch {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to copy {path} to scratch file: {source}")]
    CopySource {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("{program} failed ({status}){}", stderr_suffix(.stderr))]
    Failed {
        program: String,
        status: std::process::ExitStatus,
        stderr: String,
    },

    #[error("failed to read formatter output {path}: {source}")]
    ReadOutput {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{uri} is not a file on disk")]
    NotAFile { uri: String },

    #[error("no formatter for language '{0}'")]
    UnsupportedLanguage(String),
}

fn stderr_suffix(stderr: &str) -> String {
    if stderr.is_empty() {
        String::new()
    } else {
        format!(": {stderr}")
    }
}

/// One formatting run against one source file
#[derive(Debug, Clone)]
pub struct FormatRequest {
    pub language: Language,
    /// File on disk handed to the formatter (or copied for it)
    pub source: PathBuf,
    /// Working directory for stdout-style formatters
    pub root: PathBuf,
    pub command: FormatterCommand,
}

impl FormatRequest {
    /// Run the formatter and return the formatted text.
    ///
    /// The scratch file is released whether or not the run succeeds.
    pub async fn run(&self, scratch: &ScratchDir) -> Result<String, FormatError> {
        let scratch_error = |source| FormatError::Scratch {
            path: scratch.path().to_path_buf(),
            source,
        };

        scratch.ensure().await.map_err(scratch_error)?;
        let extension = self.source.extension().and_then(|ext| ext.to_str());
        let file = scratch.allocate(extension).map_err(scratch_error)?;

        log::debug!(
            "Formatting {} with {} via {}",
            self.source.display(),
            self.command.name(),
            file.path().display()
        );

        let result = match self.language.invocation() {
            Invocation::Stdout => self.run_to_stdout(file.path()).await,
            Invocation::InPlace => self.run_in_place(file.path()).await,
        };
        let result = match result {
            Ok(()) => read_output(file.path()).await,
            Err(e) => Err(e),
        };

        file.release();
        result
    }

    async fn run_to_stdout(&self, output_path: &Path) -> Result<(), FormatError> {
        let output_file = tokio::fs::File::create(output_path)
            .await
            .map_err(|source| FormatError::Scratch {
                path: output_path.to_path_buf(),
                source,
            })?
            .into_std()
            .await;

        let mut command = Command::new(&self.command.program);
        command
            .args(&self.command.args)
            .arg(&self.source)
            .current_dir(&self.root)
            .stdin(Stdio::null())
            .stdout(Stdio::from(output_file))
            .stderr(Stdio::piped());

        self.wait(command).await
    }

    async fn run_in_place(&self, target: &Path) -> Result<(), FormatError> {
        tokio::fs::copy(&self.source, target)
            .await
            .map_err(|source| FormatError::CopySource {
                path: self.source.clone(),
                source,
            })?;

        let mut command = Command::new(&self.command.program);
        command
            .args(&self.command.args)
            .arg(target)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        self.wait(command).await
    }

    async fn wait(&self, mut command: Command) -> Result<(), FormatError> {
        let spawn_error = |source| FormatError::Spawn {
            program: self.command.name(),
            source,
        };

        let child = command.spawn().map_err(spawn_error)?;
        let output = child.wait_with_output().await.map_err(spawn_error)?;
        self.check_status(output)
    }

    fn check_status(&self, output: Output) -> Result<(), FormatError> {
        if output.status.success() {
            return Ok(());
        }
        Err(FormatError::Failed {
            program: self.command.name(),
            status: output.status,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }
}

async fn read_output(path: &Path) -> Result<String, FormatError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|source| FormatError::ReadOutput {
            path: path.to_path_buf(),
            source,
        })
}
