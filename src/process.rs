//! Subprocess execution for the external tools (sox, ffprobe, flac2mp3).

use async_trait::async_trait;
use std::process::Stdio;
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, error};

/// Errors raised while running an external tool.
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("command failed ({status}): {command}\n{stderr}")]
    NonZeroExit {
        command: String,
        status: String,
        stderr: String,
    },
}

/// Captured result of a finished process.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcessOutput {
    pub stdout: String,
    pub stderr: String,
    /// `None` when the process was killed by a signal.
    pub exit_code: Option<i32>,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Runs a program to completion and captures its output.
#[cfg_attr(feature = "mock", mockall::automock)]
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    async fn run(&self, program: &str, args: &[String]) -> Result<ProcessOutput, ProcessError>;
}

/// Run a program and turn a nonzero exit into [`ProcessError::NonZeroExit`].
pub async fn run_checked(
    runner: &dyn ProcessRunner,
    program: &str,
    args: &[String],
) -> Result<ProcessOutput, ProcessError> {
    let output = runner.run(program, args).await?;
    if output.success() {
        return Ok(output);
    }

    let command = command_line(program, args);
    let status = match output.exit_code {
        Some(code) => format!("exit code {}", code),
        None => "killed by signal".to_string(),
    };
    error!("cmd failed: {}", command);
    Err(ProcessError::NonZeroExit {
        command,
        status,
        stderr: output.stderr,
    })
}

/// Render a command as a shell-quoted line, for logs and error messages.
pub fn command_line(program: &str, args: &[String]) -> String {
    let parts = std::iter::once(program).chain(args.iter().map(String::as_str));
    shlex::try_join(parts.clone()).unwrap_or_else(|_| parts.collect::<Vec<_>>().join(" "))
}

/// [`ProcessRunner`] backed by `tokio::process`.
///
/// Processes run without a timeout: a hung encoder blocks the run.
#[derive(Debug, Clone, Default)]
pub struct TokioProcessRunner;

#[async_trait]
impl ProcessRunner for TokioProcessRunner {
    async fn run(&self, program: &str, args: &[String]) -> Result<ProcessOutput, ProcessError> {
        debug!("exec: {}", command_line(program, args));

        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|source| ProcessError::Spawn {
                program: program.to_string(),
                source,
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        for line in stdout.lines().filter(|l| !l.trim().is_empty()) {
            debug!(">> {}", line);
        }
        for line in stderr.lines().filter(|l| !l.trim().is_empty()) {
            debug!("!! {}", line);
        }

        Ok(ProcessOutput {
            stdout,
            stderr,
            exit_code: output.status.code(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedRunner(ProcessOutput);

    #[async_trait]
    impl ProcessRunner for FixedRunner {
        async fn run(&self, _: &str, _: &[String]) -> Result<ProcessOutput, ProcessError> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn test_command_line_quotes_spaces() {
        let args = vec!["-G".to_string(), "My Album/01 Track.flac".to_string()];
        let line = command_line("sox", &args);
        assert_eq!(
            shlex::split(&line).unwrap(),
            vec!["sox", "-G", "My Album/01 Track.flac"]
        );
    }

    #[tokio::test]
    async fn test_run_checked_success() {
        let runner = FixedRunner(ProcessOutput {
            stdout: "ok".to_string(),
            stderr: String::new(),
            exit_code: Some(0),
        });
        let output = run_checked(&runner, "true", &[]).await.unwrap();
        assert_eq!(output.stdout, "ok");
    }

    #[tokio::test]
    async fn test_run_checked_nonzero_exit() {
        let runner = FixedRunner(ProcessOutput {
            stdout: String::new(),
            stderr: "boom".to_string(),
            exit_code: Some(2),
        });
        let err = run_checked(&runner, "sox", &["x".to_string()])
            .await
            .unwrap_err();
        match err {
            ProcessError::NonZeroExit {
                command,
                status,
                stderr,
            } => {
                assert_eq!(command, "sox x");
                assert_eq!(status, "exit code 2");
                assert_eq!(stderr, "boom");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_run_checked_signal() {
        let runner = FixedRunner(ProcessOutput::default());
        let err = run_checked(&runner, "flac2mp3", &[]).await.unwrap_err();
        assert!(err.to_string().contains("killed by signal"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_tokio_runner_captures_output() {
        let output = TokioProcessRunner
            .run("sh", &["-c".to_string(), "echo out; echo err >&2; exit 3".to_string()])
            .await
            .unwrap();
        assert_eq!(output.stdout.trim(), "out");
        assert_eq!(output.stderr.trim(), "err");
        assert_eq!(output.exit_code, Some(3));
    }

    #[derive(Clone, Default)]
    struct LogBuffer(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_tokio_runner_logs_both_streams() {
        let logs = LogBuffer::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        TokioProcessRunner
            .run("sh", &["-c".to_string(), "echo encoded; echo warned >&2".to_string()])
            .await
            .unwrap();

        let text = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        assert!(text.contains(">> encoded"));
        assert!(text.contains("!! warned"));
    }

    #[tokio::test]
    async fn test_tokio_runner_missing_binary() {
        let err = TokioProcessRunner
            .run("definitely-not-a-real-binary-xyz", &[])
            .await
            .unwrap_err();
        assert!(matches!(err, ProcessError::Spawn { .. }));
    }
}
