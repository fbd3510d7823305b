//! One-shot `crown build`.

use std::sync::Arc;

use anyhow::{Result, bail};

use crate::config::CrownConfig;
use crate::log;
use crate::pipeline::{BuildAttempt, BuildPipeline, Pipeline, SystemProcess, renderer};

/// Build the book once and report the outcome.
///
/// A failed build is an error, so the process exits with status 1.
pub fn build_book(config: Arc<CrownConfig>) -> Result<BuildAttempt> {
    log!("build"; "building {}", config.root_relative(&config.output.pdf));

    let pipeline = BuildPipeline::new(Arc::clone(&config));
    let attempt = pipeline.execute();
    report(&config, &attempt);

    if !attempt.succeeded {
        if !renderer::check_available(&SystemProcess, &config.prince.executable) {
            log!(
                "hint";
                "`{}` was not found; install Prince (https://www.princexml.com) or set [prince] executable",
                config.prince.executable
            );
        }
        bail!("build failed");
    }
    Ok(attempt)
}

fn report(config: &CrownConfig, attempt: &BuildAttempt) {
    for warning in &attempt.warnings {
        log!("warning"; "{}", warning);
    }
    for error in &attempt.errors {
        log!("error"; "{}", error);
    }

    if attempt.succeeded {
        log!(
            "build";
            "{} → {} in {}ms ({} {})",
            config.root_relative(&attempt.html_path),
            config.root_relative(&attempt.pdf_path),
            attempt.duration_ms,
            attempt.document_count,
            if attempt.document_count == 1 { "document" } else { "documents" }
        );
    }
}
