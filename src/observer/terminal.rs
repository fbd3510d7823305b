use std::path::{Path, PathBuf};

use super::Observer;
use crate::logger::{status_detach, status_error, status_pending, status_success, status_warning};
use crate::pipeline::BuildAttempt;
use crate::utils::path::to_slash;

/// Reports builds through the shared `WatchStatus` block.
pub struct TerminalObserver {
    root: PathBuf,
}

impl TerminalObserver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn summary(&self, attempt: &BuildAttempt) -> String {
        format!(
            "built {} in {}ms ({} {})",
            to_slash(&attempt.pdf_path, &self.root),
            attempt.duration_ms,
            attempt.document_count,
            if attempt.document_count == 1 { "document" } else { "documents" },
        )
    }
}

impl Observer for TerminalObserver {
    fn on_build_start(&self) {
        status_pending("building...");
    }

    fn on_build_result(&self, attempt: &BuildAttempt) {
        if !attempt.succeeded {
            status_error("build failed", &attempt.error_text());
            return;
        }

        let summary = self.summary(attempt);
        if attempt.warnings.is_empty() && attempt.errors.is_empty() {
            status_success(&summary);
        } else {
            // Renderer diagnostics on a successful build
            let detail = attempt
                .warnings
                .iter()
                .chain(&attempt.errors)
                .cloned()
                .collect::<Vec<_>>()
                .join("\n");
            status_warning(&summary, &detail);
        }
    }

    fn on_restart_required(&self, path: &Path) {
        status_warning(
            &format!("{} changed", to_slash(path, &self.root)),
            "restart crown to apply the new configuration",
        );
        // Keep the notice visible across later builds
        status_detach();
    }
}
