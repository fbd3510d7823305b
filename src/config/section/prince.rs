//! `[prince]` section configuration.
//!
//! Options for the external PDF renderer.
//!
//! # Example
//!
//! ```toml
//! [prince]
//! javascript = true          # Pass --javascript
//! verbose = false            # Pass --verbose
//! options = ["--no-network"] # Appended after the built-in flags
//! executable = "prince"      # Name in PATH or a path (~ expanded)
//! timeout = 120              # Seconds; 0 waits forever
//! ```

use crate::config::{ConfigDiagnostics, FieldPath};
use serde::{Deserialize, Serialize};
use std::{path::Path, time::Duration};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrinceConfig {
    pub javascript: bool,
    pub verbose: bool,
    pub options: Vec<String>,
    pub executable: String,
    /// Seconds before the renderer is killed. `0` disables the limit.
    pub timeout: u64,
}

impl Default for PrinceConfig {
    fn default() -> Self {
        Self {
            javascript: true,
            verbose: false,
            options: Vec::new(),
            executable: "prince".into(),
            timeout: 0,
        }
    }
}

impl PrinceConfig {
    pub const EXECUTABLE: FieldPath = FieldPath::new("prince.executable");

    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout > 0).then(|| Duration::from_secs(self.timeout))
    }

    /// Expand `~` and resolve path-like executables against `root`.
    ///
    /// Bare names (`prince`) are left for PATH lookup.
    pub fn normalize(&mut self, root: &Path) {
        let expanded = shellexpand::tilde(&self.executable).into_owned();
        let is_path = expanded.contains('/') || expanded.contains('\\');
        self.executable = if is_path {
            crate::utils::path::resolve_path(Path::new(&expanded), root)
                .to_string_lossy()
                .into_owned()
        } else {
            expanded
        };
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.executable.trim().is_empty() {
            diag.error(Self::EXECUTABLE, "must not be empty");
        } else if which::which(&self.executable).is_err() {
            diag.warn(
                Self::EXECUTABLE,
                format!(
                    "`{}` not found; builds will fail until it is installed",
                    self.executable
                ),
            );
        }
    }
}
