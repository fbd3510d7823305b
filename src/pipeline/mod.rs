//! One complete build attempt: Markdown in, PDF out.
//!
//! # Steps
//!
//! ```text
//! discover ─► compile (rayon) ─► sort ─► load data ─► render template
//!     ─► write HTML ─► copy styles (warning on failure) ─► run renderer
//! ```
//!
//! Any failing step aborts the rest. Nothing escapes [`Pipeline::execute`]:
//! failures become a [`BuildAttempt`] with `succeeded == false`.

mod attempt;
pub mod content;
pub mod data;
mod error;
pub mod markdown;
pub mod renderer;
pub mod template;

pub use attempt::BuildAttempt;
pub use content::{ContentCompiler, Document, MarkdownCompiler};
pub use error::BuildError;
pub use renderer::{RunProcess, SystemProcess};
pub use template::{HelperRegistry, RenderContext, TemplateRenderer};

use std::{fs, sync::Arc};

use crate::config::CrownConfig;
use crate::debug;
use attempt::AttemptBuilder;

/// Something that can run a full build. The coordinator only sees this.
pub trait Pipeline: Send + Sync {
    fn execute(&self) -> BuildAttempt;
}

/// The real pipeline over a resolved config.
///
/// Holds no state between runs; every execution re-reads the project.
pub struct BuildPipeline {
    config: Arc<CrownConfig>,
    compiler: Arc<dyn ContentCompiler>,
    renderer: TemplateRenderer,
    process: Arc<dyn RunProcess>,
}

impl BuildPipeline {
    /// Pipeline with the stock Markdown compiler, built-in helpers and
    /// real child processes.
    pub fn new(config: Arc<CrownConfig>) -> Self {
        Self::with_parts(
            config,
            Arc::new(MarkdownCompiler),
            HelperRegistry::with_builtins(),
            Arc::new(SystemProcess),
        )
    }

    pub fn with_parts(
        config: Arc<CrownConfig>,
        compiler: Arc<dyn ContentCompiler>,
        helpers: HelperRegistry,
        process: Arc<dyn RunProcess>,
    ) -> Self {
        let renderer = TemplateRenderer::new(
            config.input.template.clone(),
            config.helpers.clone(),
            helpers,
        );
        Self {
            config,
            compiler,
            renderer,
            process,
        }
    }

    fn run(&self, attempt: &mut AttemptBuilder) -> Result<(), BuildError> {
        let config = &*self.config;
        let root = config.get_root();

        let files = content::discover(&config.input.content)?;
        debug!("build"; "discovered {} content files", files.len());

        let documents = content::compile_all(&*self.compiler, &files, root)?;
        attempt.document_count = documents.len();

        let data = data::load_data(&config.data, root)?;

        let context = RenderContext::new(&config.metadata, &documents, &data, &config.page);
        let html = self.renderer.render(&context)?;
        debug!("build"; "rendered {} bytes of html", html.len());

        let html_path = &config.output.html;
        if let Some(dir) = html_path.parent() {
            fs::create_dir_all(dir).map_err(|e| BuildError::io(dir, e))?;
        }
        if let Some(dir) = config.output.pdf.parent() {
            fs::create_dir_all(dir).map_err(|e| BuildError::io(dir, e))?;
        }
        fs::write(html_path, &html).map_err(|e| BuildError::io(html_path, e))?;

        let styles_copy = config.output.styles_copy();
        if config.styles_copy_is_source() {
            debug!("build"; "stylesheet already beside the html, not copied");
        } else if let Err(e) = fs::copy(&config.input.styles, &styles_copy) {
            attempt.warn(format!(
                "could not copy {} to {}: {e}",
                config.root_relative(&config.input.styles),
                config.root_relative(&styles_copy),
            ));
        }

        let outcome = renderer::render_pdf(
            &*self.process,
            html_path,
            &config.output.pdf,
            &config.prince,
            &config.metadata,
        )?;
        attempt.warnings.extend(outcome.diagnostics.warnings);
        attempt.errors.extend(outcome.diagnostics.errors);

        if !outcome.output.success() {
            let code = outcome
                .output
                .exit_code
                .map_or_else(|| "a signal".to_string(), |c| format!("code {c}"));
            return Err(BuildError::RendererProcess(format!(
                "`{}` exited with {code}",
                config.prince.executable
            )));
        }
        Ok(())
    }
}

impl Pipeline for BuildPipeline {
    fn execute(&self) -> BuildAttempt {
        let mut attempt = AttemptBuilder::start(
            self.config.output.html.clone(),
            self.config.output.pdf.clone(),
        );
        let result = self.run(&mut attempt);
        if let Err(e) = &result {
            debug!("build"; "aborted: {}", e);
        }
        attempt.finish(result)
    }
}
