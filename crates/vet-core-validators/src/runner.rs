//! External validator invocation.
//!
//! The validator is run through the platform shell as `<binary> <subcommand> <path>`. Its
//! stdout and stderr are read on background threads; the first chunk seen on either stream
//! settles the run (stdout resolves, stderr rejects). Both streams are still drained to EOF so
//! the child never blocks on a full pipe, and the child is reaped in the background.
//!
//! This module stays runtime-agnostic (no async runtime required): callers that must not block
//! run it on a worker thread, as the orchestrator does.

use crate::config::ValidatorConfig;
use crate::error::ValidationError;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, Command as ProcessCommand, Stdio};
use std::sync::mpsc;
use std::thread;
use uuid::Uuid;

const CHUNK_SIZE: usize = 64 * 1024;

#[derive(Debug)]
enum OutputChunk {
    Stdout(String),
    Stderr(String),
    Eof,
    IoError(io::Error),
}

/// Runs one validator.
#[derive(Debug, Clone)]
pub struct CommandRunner {
    config: ValidatorConfig,
}

impl CommandRunner {
    /// Create a runner for `config`.
    pub fn new(config: ValidatorConfig) -> Self {
        Self { config }
    }

    /// The validator configuration.
    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    /// The shell command line used to validate `path`.
    pub fn command_line(&self, path: &Path) -> String {
        let path = shell_quote(&path.to_string_lossy());
        let binary = self.config.binary.trim();
        let subcommand = self.config.subcommand.trim();
        if subcommand.is_empty() {
            format!("{binary} {path}")
        } else {
            format!("{binary} {subcommand} {path}")
        }
    }

    /// Validate the file at `path` as it exists on disk.
    pub fn run(&self, path: &Path) -> Result<String, ValidationError> {
        let command = self.command_line(path);
        tracing::debug!(%command, "running validator");

        let child = shell_command(&command)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| ValidationError::Launch {
                command: command.clone(),
                source,
            })?;

        settle(command, child)
    }

    /// Write `text` followed by `context` to a fresh file in `dir` and validate that file.
    pub fn run_staged(
        &self,
        dir: &Path,
        text: &str,
        context: &str,
    ) -> Result<String, ValidationError> {
        let staged = stage_document(dir, &self.config.extension, text, context)?;
        tracing::debug!(path = %staged.display(), "staged document");
        self.run(&staged)
    }
}

/// Write `text` plus `context` to a uniquely named file in `dir`.
///
/// Every call creates a new file; nothing is removed until `dir` itself is.
pub fn stage_document(
    dir: &Path,
    extension: &str,
    text: &str,
    context: &str,
) -> Result<PathBuf, ValidationError> {
    let mut name = Uuid::new_v4().to_string();
    if !extension.is_empty() {
        name.push('.');
        name.push_str(extension);
    }
    let path = dir.join(name);

    let mut content = String::with_capacity(text.len() + context.len() + 1);
    content.push_str(text);
    if !text.ends_with('\n') {
        content.push('\n');
    }
    content.push_str(context);

    fs::write(&path, content).map_err(|source| ValidationError::Staging {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}

/// Quote `arg` for a POSIX shell (single quotes, embedded quotes escaped).
pub fn shell_quote(arg: &str) -> String {
    if cfg!(windows) {
        return format!("\"{}\"", arg.replace('"', "\"\""));
    }
    format!("'{}'", arg.replace('\'', r"'\''"))
}

fn shell_command(command: &str) -> ProcessCommand {
    if cfg!(windows) {
        let mut cmd = ProcessCommand::new("cmd");
        cmd.arg("/C").arg(command);
        cmd
    } else {
        let mut cmd = ProcessCommand::new("sh");
        cmd.arg("-c").arg(command);
        cmd
    }
}

fn settle(command: String, mut child: Child) -> Result<String, ValidationError> {
    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| io::Error::other("Failed to open validator stdout"))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| io::Error::other("Failed to open validator stderr"))?;

    let (tx, rx) = mpsc::channel::<OutputChunk>();
    {
        let tx = tx.clone();
        thread::spawn(move || read_first_chunk(stdout, OutputChunk::Stdout, tx));
    }
    thread::spawn(move || read_first_chunk(stderr, OutputChunk::Stderr, tx));

    let mut closed = 0;
    let settled = loop {
        match rx.recv() {
            Ok(OutputChunk::Stdout(text)) => break Some(Ok(text)),
            Ok(OutputChunk::Stderr(text)) => break Some(Err(ValidationError::Reported(text))),
            Ok(OutputChunk::IoError(err)) => break Some(Err(ValidationError::Output(err))),
            Ok(OutputChunk::Eof) => {
                closed += 1;
                if closed == 2 {
                    break None;
                }
            }
            Err(_) => break None,
        }
    };

    match settled {
        Some(result) => {
            thread::spawn(move || {
                let _ = child.wait();
            });
            result
        }
        None => {
            let status = child.wait()?;
            tracing::debug!(%command, ?status, "validator closed both streams without output");
            if status.success() {
                Ok(String::new())
            } else {
                Err(ValidationError::Exited {
                    command,
                    code: status.code(),
                })
            }
        }
    }
}

fn read_first_chunk<R: Read>(
    mut stream: R,
    wrap: fn(String) -> OutputChunk,
    tx: mpsc::Sender<OutputChunk>,
) {
    let mut buf = vec![0u8; CHUNK_SIZE];
    let mut sent = false;
    loop {
        match stream.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => {
                if !sent {
                    let chunk = String::from_utf8_lossy(&buf[..n]).into_owned();
                    let _ = tx.send(wrap(chunk));
                    sent = true;
                }
            }
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => {
                if !sent {
                    let _ = tx.send(OutputChunk::IoError(err));
                }
                return;
            }
        }
    }

    if !sent {
        let _ = tx.send(OutputChunk::Eof);
    }
}
