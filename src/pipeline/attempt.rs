//! Report of one pipeline execution.

use chrono::{DateTime, Local};
use serde::Serialize;
use std::{path::PathBuf, time::Instant};

use super::BuildError;

/// Outcome of one build, success or failure.
///
/// Immutable once produced. The coordinator hands it to observers and
/// then drops it; nothing keeps a history.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildAttempt {
    pub started_at: DateTime<Local>,
    pub succeeded: bool,
    pub duration_ms: u64,
    pub document_count: usize,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
    pub html_path: PathBuf,
    pub pdf_path: PathBuf,
}

impl BuildAttempt {
    /// Errors joined for single-line transports (live reload, status line).
    pub fn error_text(&self) -> String {
        self.errors.join("\n")
    }

    /// Attempt for a build that never reported back (the pipeline panicked).
    pub fn crashed(message: impl Into<String>) -> Self {
        Self {
            started_at: Local::now(),
            succeeded: false,
            duration_ms: 0,
            document_count: 0,
            warnings: Vec::new(),
            errors: vec![message.into()],
            html_path: PathBuf::new(),
            pdf_path: PathBuf::new(),
        }
    }
}

/// Accumulates state while a build runs.
pub(super) struct AttemptBuilder {
    started_at: DateTime<Local>,
    clock: Instant,
    pub document_count: usize,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
    html_path: PathBuf,
    pdf_path: PathBuf,
}

impl AttemptBuilder {
    pub fn start(html_path: PathBuf, pdf_path: PathBuf) -> Self {
        Self {
            started_at: Local::now(),
            clock: Instant::now(),
            document_count: 0,
            warnings: Vec::new(),
            errors: Vec::new(),
            html_path,
            pdf_path,
        }
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    /// Close the attempt. `result` carries the step that aborted it, if any.
    ///
    /// Diagnostics parsed from renderer output don't decide success; only
    /// a failed step does.
    pub fn finish(mut self, result: Result<(), BuildError>) -> BuildAttempt {
        let succeeded = result.is_ok();
        if let Err(e) = result {
            self.errors.push(e.to_string());
        }
        #[allow(clippy::cast_possible_truncation)]
        let duration_ms = self.clock.elapsed().as_millis() as u64;
        BuildAttempt {
            started_at: self.started_at,
            succeeded,
            duration_ms,
            document_count: self.document_count,
            warnings: self.warnings,
            errors: self.errors,
            html_path: self.html_path,
            pdf_path: self.pdf_path,
        }
    }
}
