//! `crown preview html|pdf`: open the last generated output.

use std::path::Path;

use anyhow::{Result, bail};

use super::PreviewTarget;
use crate::config::CrownConfig;
use crate::log;
use crate::utils::exec::open_with_system;

pub fn preview(config: &CrownConfig, target: PreviewTarget) -> Result<()> {
    let path = target_path(config, target);
    ensure_built(path, target)?;

    open_with_system(&path.to_string_lossy())?;
    log!("preview"; "opened {}", config.root_relative(path));
    Ok(())
}

fn target_path(config: &CrownConfig, target: PreviewTarget) -> &Path {
    match target {
        PreviewTarget::Html => &config.output.html,
        PreviewTarget::Pdf => &config.output.pdf,
    }
}

fn ensure_built(path: &Path, target: PreviewTarget) -> Result<()> {
    if !path.is_file() {
        let kind = match target {
            PreviewTarget::Html => "HTML",
            PreviewTarget::Pdf => "PDF",
        };
        bail!("{kind} file not found; run `crown build` first");
    }
    Ok(())
}
