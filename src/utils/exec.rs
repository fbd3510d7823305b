//! External command execution utilities.
//!
//! Provides a Builder-based API for running external programs with
//! captured output and an optional wall-clock timeout.
//!
//! # Examples
//!
//! ```ignore
//! use crate::utils::exec::Cmd;
//!
//! let output = Cmd::new("prince")
//!     .args(["book.html", "-o", "book.pdf"])
//!     .timeout(Some(Duration::from_secs(120)))
//!     .output()?;
//!
//! if output.exit_code != Some(0) {
//!     eprintln!("{}", output.stderr);
//! }
//! ```

use regex::Regex;
use std::{
    ffi::{OsStr, OsString},
    io::Read,
    process::{Child, Command, Stdio},
    sync::LazyLock,
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};
use thiserror::Error;

/// Poll interval while waiting on a child with a deadline.
const WAIT_POLL: Duration = Duration::from_millis(25);

// ============================================================================
// Output / Errors
// ============================================================================

/// Captured result of a finished process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    /// Exit code, `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Errors from spawning or waiting on a process.
///
/// A non-zero exit is not an error here; callers inspect
/// [`ProcessOutput::exit_code`].
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("failed to start `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed while waiting for `{program}`: {source}")]
    Io {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{program}` did not finish within {}s", timeout.as_secs())]
    Timeout { program: String, timeout: Duration },
}

// ============================================================================
// Builder API
// ============================================================================

/// Command builder for external process execution.
#[derive(Default)]
pub struct Cmd {
    program: OsString,
    args: Vec<OsString>,
    timeout: Option<Duration>,
}

impl Cmd {
    /// Create a new command builder.
    pub fn new<S: AsRef<OsStr>>(program: S) -> Self {
        Self {
            program: program.as_ref().to_owned(),
            ..Default::default()
        }
    }

    /// Add a single argument. Empty strings are skipped.
    pub fn arg<S: AsRef<OsStr>>(mut self, arg: S) -> Self {
        let arg = arg.as_ref();
        if !arg.is_empty() {
            self.args.push(arg.to_owned());
        }
        self
    }

    /// Add multiple arguments verbatim, empty strings included.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|arg| arg.as_ref().to_owned()));
        self
    }

    /// Kill the process if it runs longer than `timeout`.
    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    fn program_name(&self) -> String {
        self.program.to_string_lossy().to_string()
    }

    /// Run to completion and capture stdout/stderr.
    pub fn output(self) -> Result<ProcessOutput, ProcessError> {
        let program = self.program_name();

        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let mut child = cmd.spawn().map_err(|source| ProcessError::Spawn {
            program: program.clone(),
            source,
        })?;

        // Drain pipes on their own threads so a chatty child can't fill them and stall.
        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        let exit_code = wait(&mut child, self.timeout).map_err(|e| match e {
            WaitError::Timeout(timeout) => ProcessError::Timeout {
                program: program.clone(),
                timeout,
            },
            WaitError::Io(source) => ProcessError::Io {
                program: program.clone(),
                source,
            },
        })?;

        Ok(ProcessOutput {
            exit_code,
            stdout: join_reader(stdout),
            stderr: join_reader(stderr),
        })
    }

    /// Spawn detached, ignoring output. Used for fire-and-forget openers.
    pub fn spawn_detached(self) -> Result<(), ProcessError> {
        let program = self.program_name();
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        cmd.spawn()
            .map(|_| ())
            .map_err(|source| ProcessError::Spawn { program, source })
    }
}

enum WaitError {
    Timeout(Duration),
    Io(std::io::Error),
}

fn wait(child: &mut Child, timeout: Option<Duration>) -> Result<Option<i32>, WaitError> {
    let Some(timeout) = timeout else {
        return child.wait().map(|s| s.code()).map_err(WaitError::Io);
    };

    let deadline = Instant::now() + timeout;
    loop {
        if let Some(status) = child.try_wait().map_err(WaitError::Io)? {
            return Ok(status.code());
        }
        if Instant::now() >= deadline {
            let _ = child.kill();
            let _ = child.wait();
            return Err(WaitError::Timeout(timeout));
        }
        thread::sleep(WAIT_POLL);
    }
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Option<JoinHandle<String>> {
    pipe.map(|mut reader| {
        thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = reader.read_to_end(&mut buf);
            String::from_utf8_lossy(&buf).into_owned()
        })
    })
}

fn join_reader(handle: Option<JoinHandle<String>>) -> String {
    handle.and_then(|h| h.join().ok()).unwrap_or_default()
}

// ============================================================================
// Helpers
// ============================================================================

static ANSI_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"\x1b\[[0-9;?]*[A-Za-z]").ok());

/// Strip ANSI escape codes from string.
pub fn strip_ansi(s: &str) -> std::borrow::Cow<'_, str> {
    match ANSI_RE.as_ref() {
        Some(re) => re.replace_all(s, ""),
        None => std::borrow::Cow::Borrowed(s),
    }
}

/// Open a file or URL with the platform's default handler.
pub fn open_with_system(target: &str) -> Result<(), ProcessError> {
    #[cfg(target_os = "macos")]
    let cmd = Cmd::new("open").arg(target);
    #[cfg(target_os = "windows")]
    let cmd = Cmd::new("cmd").args(["/C", "start", "", target]);
    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    let cmd = Cmd::new("xdg-open").arg(target);

    cmd.spawn_detached()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cmd_builder() {
        let cmd = Cmd::new("prince")
            .arg("book.html")
            .args(["-o", "book.pdf"])
            .timeout(Some(Duration::from_secs(5)));

        assert_eq!(cmd.program, OsString::from("prince"));
        assert_eq!(cmd.args.len(), 3);
        assert_eq!(cmd.timeout, Some(Duration::from_secs(5)));
    }

    #[test]
    fn test_empty_single_arg_skipped() {
        let cmd = Cmd::new("echo").arg("").arg("a");
        assert_eq!(cmd.args, [OsString::from("a")]);
    }

    #[test]
    fn test_args_keep_empty_strings() {
        // `cmd /C start "" <target>` needs the empty window title.
        let cmd = Cmd::new("cmd").args(["/C", "start", "", "book.pdf"]);
        assert_eq!(cmd.args.len(), 4);
        assert_eq!(cmd.args[2], OsString::new());
    }

    #[test]
    fn test_strip_ansi() {
        assert_eq!(strip_ansi("\x1b[31mRed\x1b[0m"), "Red");
        assert_eq!(strip_ansi("\x1b[1;33mwarning:\x1b[0m x"), "warning: x");
        assert_eq!(strip_ansi("Plain text"), "Plain text");
    }

    #[cfg(unix)]
    #[test]
    fn test_captures_stdout_and_exit_code() {
        let output = Cmd::new("sh")
            .args(["-c", "echo hello; echo oops 1>&2; exit 3"])
            .output()
            .unwrap();
        assert_eq!(output.exit_code, Some(3));
        assert!(!output.success());
        assert_eq!(output.stdout.trim(), "hello");
        assert_eq!(output.stderr.trim(), "oops");
    }

    #[cfg(unix)]
    #[test]
    fn test_timeout_kills_child() {
        let err = Cmd::new("sleep")
            .arg("5")
            .timeout(Some(Duration::from_millis(100)))
            .output()
            .unwrap_err();
        assert!(matches!(err, ProcessError::Timeout { .. }));
    }

    #[test]
    fn test_spawn_missing_program() {
        let err = Cmd::new("crown-definitely-not-a-real-binary")
            .output()
            .unwrap_err();
        assert!(matches!(err, ProcessError::Spawn { .. }));
    }
}
