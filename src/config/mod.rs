//! Book configuration management for `crown.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # Configuration section definitions
//! │   ├── input      # [input]
//! │   ├── output     # [output]
//! │   ├── metadata   # [metadata]
//! │   ├── page       # [page]
//! │   ├── prince     # [prince]
//! │   ├── serve      # [serve]
//! │   └── watch      # [watch]
//! ├── types/         # Utility types
//! │   ├── error      # ConfigError, ConfigDiagnostics
//! │   └── field      # FieldPath
//! └── mod.rs         # CrownConfig (this file)
//! ```
//!
//! The config is resolved once per process start. Every path in the
//! resolved struct is absolute; relative paths in the file are taken
//! relative to the directory holding `crown.toml` (the project root).

pub mod section;
pub mod types;
mod util;

pub use section::{
    Backpressure, InputConfig, MetadataConfig, OutputConfig, PageConfig, PrinceConfig,
    ServeConfig, WatchConfig,
};
pub use types::{ConfigDiagnostics, ConfigError, FieldPath};

use crate::{
    cli::{BuildArgs, Cli, Commands},
    log,
    utils::path::{normalize_path, resolve_path},
};
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};
use util::find_config_file;

/// File name looked up when no `-C` is given.
pub const CONFIG_FILE_NAME: &str = "crown.toml";

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing crown.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CrownConfig {
    /// Absolute path to the config file (internal use only)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Project root directory - parent of config file (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    /// Template-macro file importable as `helpers`.
    pub helpers: Option<PathBuf>,

    pub input: InputConfig,
    pub output: OutputConfig,
    pub metadata: MetadataConfig,
    pub page: PageConfig,
    pub prince: PrinceConfig,
    pub serve: ServeConfig,
    pub watch: WatchConfig,

    /// Auxiliary data sources, `name = "path"`.
    pub data: BTreeMap<String, PathBuf>,
}

impl CrownConfig {
    pub const HELPERS: FieldPath = FieldPath::new("helpers");
    pub const DATA: FieldPath = FieldPath::new("data");

    /// Load configuration for a command.
    ///
    /// Searches upward from cwd for the config file, applies the command's
    /// CLI overrides, then validates.
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let path =
            find_config_file(&cli.config).ok_or_else(|| ConfigError::NotFound(cli.config.clone()))?;

        let mut config = Self::from_path(&path)?;
        config.apply_command_options(cli);
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and resolve a config file. Does not validate.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (mut config, ignored) = Self::parse_with_ignored(&content)?;
        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        config.resolve(path);
        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    pub(crate) fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    /// Print warning about unknown fields.
    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "unknown fields in {}, ignoring:", display_path);
        for field in fields {
            eprintln!("- {}", field);
        }
    }

    /// Anchor every relative path at the config file's directory.
    pub fn resolve(&mut self, config_path: &Path) {
        self.config_path = normalize_path(config_path);
        let root = self
            .config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        self.input.normalize(&root);
        self.output.normalize(&root);
        self.prince.normalize(&root);
        self.helpers = self.helpers.take().map(|p| resolve_path(&p, &root));
        for path in self.data.values_mut() {
            *path = resolve_path(path, &root);
        }
        self.root = root;
    }

    // ========================================================================
    // cli configuration updates
    // ========================================================================

    /// Apply command-specific configuration options.
    fn apply_command_options(&mut self, cli: &Cli) {
        match &cli.command {
            Commands::Build { build_args } => self.apply_build_args(build_args),
            Commands::Dev { port, host, .. } => {
                Self::update_option(&mut self.serve.port, port.as_ref());
                Self::update_option(&mut self.serve.interface, host.as_ref());
                Self::update_option(&mut self.serve.open, cli.command.open_override().as_ref());
            }
            Commands::Watch | Commands::Create { .. } | Commands::Preview { .. } => {}
        }
    }

    /// Apply build arguments from CLI.
    ///
    /// `-o` is taken relative to the current directory, like any CLI path.
    fn apply_build_args(&mut self, args: &BuildArgs) {
        if let Some(pdf) = &args.output {
            self.output.pdf = normalize_path(pdf);
        }
        if args.verbose {
            self.prince.verbose = true;
        }
    }

    /// Update config option if CLI value is provided.
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    // ========================================================================
    // validation
    // ========================================================================

    /// Validate configuration, reporting every error at once.
    ///
    /// Warnings are printed; errors become [`ConfigError::Validation`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        let diag = self.diagnostics();
        diag.print_warnings();
        diag.into_result().map_err(ConfigError::Validation)
    }

    fn diagnostics(&self) -> ConfigDiagnostics {
        let mut diag = ConfigDiagnostics::new();

        self.input.validate(&mut diag);
        self.output.validate(&mut diag);
        self.prince.validate(&mut diag);

        if let Some(helpers) = &self.helpers
            && !helpers.is_file()
        {
            diag.warn(
                Self::HELPERS,
                format!("`{}` does not exist yet", self.root_relative(helpers)),
            );
        }
        if self.data.keys().any(|k| k.trim().is_empty()) {
            diag.error(Self::DATA, "data source names must not be empty");
        }

        diag
    }

    // ========================================================================
    // paths
    // ========================================================================

    /// Get the root directory path
    pub fn get_root(&self) -> &Path {
        &self.root
    }

    /// Root-relative display path with `/` separators.
    pub fn root_relative(&self, path: impl AsRef<Path>) -> String {
        crate::utils::path::to_slash(path.as_ref(), &self.root)
    }

    /// Whether `path` is this project's config file.
    pub fn is_config_file(&self, path: &Path) -> bool {
        path == self.config_path
            || (path.parent() == Some(self.root.as_path())
                && path.file_name().is_some_and(|n| n == CONFIG_FILE_NAME))
    }

    /// Whether `path` is one of the files a build writes.
    ///
    /// A stylesheet that already sits where the copy would land is a
    /// source, not an output.
    pub fn is_build_output(&self, path: &Path) -> bool {
        path == self.output.html
            || path == self.output.pdf
            || (path == self.output.styles_copy() && !self.styles_copy_is_source())
    }

    /// Whether the stylesheet copy target is the source stylesheet itself.
    pub fn styles_copy_is_source(&self) -> bool {
        normalize_path(&self.input.styles) == normalize_path(&self.output.styles_copy())
    }
}

// ============================================================================
// Test Helpers (available to all modules via `use crate::config::test_*`)
// ============================================================================

/// Minimal valid `crown.toml` body with the required sections.
#[cfg(test)]
pub const TEST_REQUIRED_SECTIONS: &str = "[input]
content = \"chapters/*.md\"
template = \"templates/layout.html\"
styles = \"styles.css\"

[output]
html = \"dist/book.html\"
pdf = \"dist/book.pdf\"
";

/// Parse config with the required sections appended after `extra`.
/// Panics if there are unknown fields (to catch config typos in tests).
#[cfg(test)]
pub fn test_parse_config(extra: &str) -> CrownConfig {
    let config = format!("{extra}\n{TEST_REQUIRED_SECTIONS}");
    let (parsed, ignored) = CrownConfig::parse_with_ignored(&config).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}

// ============================================================================
// tests
// ============================================================================
