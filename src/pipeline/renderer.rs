//! External PDF renderer (Prince) invocation.
//!
//! The process boundary is the [`RunProcess`] capability so builds can be
//! exercised without the real binary.

use std::{path::Path, time::Duration};

use super::BuildError;
use crate::config::{MetadataConfig, PrinceConfig};
use crate::utils::exec::{Cmd, ProcessError, ProcessOutput, strip_ansi};

/// Runs an external program to completion.
pub trait RunProcess: Send + Sync {
    fn run(
        &self,
        program: &str,
        args: &[String],
        timeout: Option<Duration>,
    ) -> Result<ProcessOutput, ProcessError>;
}

/// Real child processes.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemProcess;

impl RunProcess for SystemProcess {
    fn run(
        &self,
        program: &str,
        args: &[String],
        timeout: Option<Duration>,
    ) -> Result<ProcessOutput, ProcessError> {
        Cmd::new(program).args(args).timeout(timeout).output()
    }
}

/// Renderer diagnostics scanned from stderr.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Diagnostics {
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

/// Result of one renderer run that at least started and finished.
#[derive(Debug)]
pub struct RenderOutcome {
    pub output: ProcessOutput,
    pub diagnostics: Diagnostics,
}

/// Argument list, in the renderer's positional order:
///
/// `<html> -o <pdf> [--javascript] [--verbose] [--pdf-title T]
///  [--pdf-author A] [--pdf-subject S] [--pdf-keywords K1, K2] [options...]`
pub fn prince_args(
    html: &Path,
    pdf: &Path,
    prince: &PrinceConfig,
    metadata: &MetadataConfig,
) -> Vec<String> {
    let mut args = vec![
        html.to_string_lossy().into_owned(),
        "-o".to_string(),
        pdf.to_string_lossy().into_owned(),
    ];

    if prince.javascript {
        args.push("--javascript".into());
    }
    if prince.verbose {
        args.push("--verbose".into());
    }

    let mut flag = |name: &str, value: &str| {
        if !value.is_empty() {
            args.push(name.to_string());
            args.push(value.to_string());
        }
    };
    flag("--pdf-title", &metadata.title);
    flag("--pdf-author", &metadata.author);
    flag("--pdf-subject", &metadata.subject);
    flag("--pdf-keywords", &metadata.keywords.join(", "));

    args.extend(prince.options.iter().cloned());
    args
}

/// Split renderer stderr into warnings and errors.
///
/// Lines are trimmed and ANSI-stripped; blank lines are skipped. A line
/// containing `warning:` is a warning, otherwise one containing `error:`
/// is an error. Everything else is ignored.
pub fn parse_diagnostics(stderr: &str) -> Diagnostics {
    let mut diagnostics = Diagnostics::default();
    for line in stderr.lines() {
        let plain = strip_ansi(line);
        let line = plain.trim();
        if line.is_empty() {
            continue;
        }
        if line.contains("warning:") {
            diagnostics.warnings.push(line.to_string());
        } else if line.contains("error:") {
            diagnostics.errors.push(line.to_string());
        }
    }
    diagnostics
}

/// Run the renderer once.
///
/// Spawn failures and timeouts are errors. A non-zero exit is not: the
/// caller decides, after collecting the diagnostics.
pub fn render_pdf(
    process: &dyn RunProcess,
    html: &Path,
    pdf: &Path,
    prince: &PrinceConfig,
    metadata: &MetadataConfig,
) -> Result<RenderOutcome, BuildError> {
    let args = prince_args(html, pdf, prince, metadata);
    crate::debug!("build"; "{} {}", prince.executable, args.join(" "));

    let output = process
        .run(&prince.executable, &args, prince.timeout())
        .map_err(|e| match e {
            ProcessError::Timeout { timeout, .. } => BuildError::RendererTimeout { timeout },
            other => BuildError::RendererProcess(other.to_string()),
        })?;

    let diagnostics = parse_diagnostics(&output.stderr);
    Ok(RenderOutcome {
        output,
        diagnostics,
    })
}

/// Whether `executable` answers `--version`.
pub fn check_available(process: &dyn RunProcess, executable: &str) -> bool {
    process
        .run(executable, &["--version".to_string()], Some(Duration::from_secs(10)))
        .is_ok_and(|out| out.success() || out.stdout.contains("Prince"))
}
