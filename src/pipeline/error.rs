//! Build error taxonomy.
//!
//! Every variant is fatal to one build attempt only. The pipeline catches
//! them at its boundary and turns them into a failed [`BuildAttempt`].
//!
//! [`BuildAttempt`]: super::BuildAttempt

use std::{path::PathBuf, time::Duration};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("no content files match `{pattern}`")]
    NoContentFound { pattern: String },

    #[error("invalid content pattern `{pattern}`: {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("failed to compile {path}: {message}")]
    Compile { path: String, message: String },

    #[error("Unsupported data file format `.{ext}` for {path} (expected .json, .csv, .yaml or .yml)")]
    UnsupportedDataFormat { path: String, ext: String },

    #[error("failed to load data file {path}: {message}")]
    DataLoad { path: String, message: String },

    #[error("template error: {0}")]
    Render(String),

    #[error("IO error at `{}`: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("PDF renderer failed: {0}")]
    RendererProcess(String),

    #[error("PDF renderer timed out after {}s", timeout.as_secs())]
    RendererTimeout { timeout: Duration },
}

impl BuildError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<minijinja::Error> for BuildError {
    fn from(err: minijinja::Error) -> Self {
        let mut message = err.to_string();
        let mut source = std::error::Error::source(&err);
        while let Some(cause) = source {
            message.push_str(&format!("\n  caused by: {cause}"));
            source = std::error::Error::source(cause);
        }
        Self::Render(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_format_message() {
        let err = BuildError::UnsupportedDataFormat {
            path: "data/people.xml".into(),
            ext: "xml".into(),
        };
        let msg = err.to_string();
        assert!(msg.starts_with("Unsupported data file format"));
        assert!(msg.contains("people.xml"));
    }

    #[test]
    fn test_timeout_message() {
        let err = BuildError::RendererTimeout {
            timeout: Duration::from_secs(30),
        };
        assert_eq!(err.to_string(), "PDF renderer timed out after 30s");
    }

    #[test]
    fn test_minijinja_error_becomes_render() {
        let err = minijinja::Error::new(
            minijinja::ErrorKind::TemplateNotFound,
            "template \"cover.html\" does not exist",
        );
        let build: BuildError = err.into();
        assert!(matches!(build, BuildError::Render(ref m) if m.contains("cover.html")));
    }
}
