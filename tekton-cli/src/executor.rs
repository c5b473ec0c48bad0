//! CLI executor - runs command strings either captured or streamed into a terminal view

use serde::Serialize;
use std::process::Stdio;
use tekton_shared::{CliConfig, Result, TektonError};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Structured result of a captured command
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CliResult {
    /// Set when the command could not run or exited unsuccessfully
    pub error: Option<String>,
    pub stdout: String,
    pub stderr: String,
}

impl CliResult {
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            error: None,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            stdout: String::new(),
            stderr: String::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputStream {
    Stdout,
    Stderr,
}

/// One line written to the terminal view by a streaming command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerminalLine {
    pub command: String,
    pub stream: OutputStream,
    pub text: String,
}

/// Handle to a streaming command. Dropping it does not stop the command.
#[derive(Debug)]
pub struct StreamHandle {
    command: String,
    task: Option<JoinHandle<()>>,
}

impl StreamHandle {
    /// A handle for a command that is already over, or was never spawned
    pub fn completed(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            task: None,
        }
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    /// Wait until the command exits and its output has been forwarded
    pub async fn wait(self) {
        if let Some(task) = self.task {
            if let Err(e) = task.await {
                tracing::warn!("Streaming task for '{}' ended abnormally: {}", self.command, e);
            }
        }
    }
}

pub struct CliExecutor {
    tkn_path: String,
    kubectl_path: String,
    terminal: Option<mpsc::UnboundedSender<TerminalLine>>,
}

impl CliExecutor {
    pub fn new(config: &CliConfig) -> Self {
        Self::with_programs(
            resolve_binary(config.tkn_path.as_deref(), "tkn"),
            resolve_binary(config.kubectl_path.as_deref(), "kubectl"),
        )
    }

    pub fn with_programs(tkn_path: impl Into<String>, kubectl_path: impl Into<String>) -> Self {
        Self {
            tkn_path: tkn_path.into(),
            kubectl_path: kubectl_path.into(),
            terminal: None,
        }
    }

    /// Forward streamed output to a terminal view instead of the log
    pub fn with_terminal(mut self, terminal: mpsc::UnboundedSender<TerminalLine>) -> Self {
        self.terminal = Some(terminal);
        self
    }

    /// Split a literal command string and map its program to the configured binary
    fn build_command(&self, command: &str) -> Result<Command> {
        let words = shell_words::split(command)
            .map_err(|e| TektonError::Cli(format!("Malformed command '{}': {}", command, e)))?;

        let (program, args) = words
            .split_first()
            .ok_or_else(|| TektonError::Cli("Empty command".to_string()))?;

        let program = match program.as_str() {
            "tkn" => self.tkn_path.as_str(),
            "kubectl" => self.kubectl_path.as_str(),
            other => other,
        };

        let mut cmd = Command::new(program);
        cmd.args(args).stdin(Stdio::null());
        Ok(cmd)
    }

    /// Run a command to completion and capture its output
    pub async fn run_captured(&self, command: &str) -> CliResult {
        tracing::debug!("Executing CLI: {}", command);

        let mut cmd = match self.build_command(command) {
            Ok(cmd) => cmd,
            Err(e) => return CliResult::failed(e.to_string()),
        };
        cmd.stdout(Stdio::piped()).stderr(Stdio::piped());

        let output = match cmd.output().await {
            Ok(output) => output,
            Err(e) => {
                tracing::error!("Failed to spawn '{}': {}", command, e);
                return CliResult::failed(format!("Failed to run '{}': {}", command, e));
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        if !output.status.success() {
            tracing::error!(
                "CLI command failed with status {}: stderr={}, stdout={}",
                output.status,
                stderr,
                stdout
            );
            return CliResult {
                error: Some(format!(
                    "Command failed with status {}: {}",
                    output.status,
                    stderr.trim()
                )),
                stdout,
                stderr,
            };
        }

        tracing::trace!("CLI output: {}", stdout);
        CliResult {
            error: None,
            stdout,
            stderr,
        }
    }

    /// Start a command whose output streams into the terminal view.
    ///
    /// Failures show up in the terminal view only; nothing is reported back to the caller.
    pub fn run_streaming(&self, command: &str) -> StreamHandle {
        tracing::debug!("Executing CLI in terminal: {}", command);

        let sink = self.terminal.clone();
        let mut cmd = match self.build_command(command) {
            Ok(cmd) => cmd,
            Err(e) => {
                emit(&sink, command, OutputStream::Stderr, e.to_string());
                return StreamHandle::completed(command);
            }
        };
        cmd.stdout(Stdio::piped()).stderr(Stdio::piped());

        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) => {
                tracing::error!("Failed to spawn '{}': {}", command, e);
                emit(
                    &sink,
                    command,
                    OutputStream::Stderr,
                    format!("Failed to run '{}': {}", command, e),
                );
                return StreamHandle::completed(command);
            }
        };

        let owned = command.to_string();
        let task = tokio::spawn(async move {
            let stdout = child.stdout.take();
            let stderr = child.stderr.take();

            tokio::join!(
                forward_lines(stdout, &sink, &owned, OutputStream::Stdout),
                forward_lines(stderr, &sink, &owned, OutputStream::Stderr),
            );

            match child.wait().await {
                Ok(status) if status.success() => {
                    tracing::debug!("Terminal command '{}' finished", owned);
                }
                Ok(status) => {
                    tracing::warn!("Terminal command '{}' exited with {}", owned, status);
                    emit(
                        &sink,
                        &owned,
                        OutputStream::Stderr,
                        format!("Command exited with {}", status),
                    );
                }
                Err(e) => {
                    tracing::error!("Failed to wait for '{}': {}", owned, e);
                }
            }
        });

        StreamHandle {
            command: command.to_string(),
            task: Some(task),
        }
    }
}

async fn forward_lines<R>(
    reader: Option<R>,
    sink: &Option<mpsc::UnboundedSender<TerminalLine>>,
    command: &str,
    stream: OutputStream,
) where
    R: AsyncRead + Unpin,
{
    let Some(reader) = reader else { return };
    let mut lines = BufReader::new(reader).lines();

    loop {
        match lines.next_line().await {
            Ok(Some(line)) => emit(sink, command, stream, line),
            Ok(None) => break,
            Err(e) => {
                tracing::warn!("Failed reading output of '{}': {}", command, e);
                break;
            }
        }
    }
}

fn emit(
    sink: &Option<mpsc::UnboundedSender<TerminalLine>>,
    command: &str,
    stream: OutputStream,
    text: String,
) {
    match sink {
        Some(tx) => {
            let line = TerminalLine {
                command: command.to_string(),
                stream,
                text,
            };
            if tx.send(line).is_err() {
                tracing::debug!("Terminal view closed, dropping output of '{}'", command);
            }
        }
        None => tracing::info!(target: "terminal", "{}", text),
    }
}

/// Explicit path if configured, otherwise PATH lookup, otherwise the bare name
fn resolve_binary(explicit: Option<&str>, name: &str) -> String {
    if let Some(path) = explicit {
        return path.to_string();
    }
    which::which(name)
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|_| name.to_string())
}
