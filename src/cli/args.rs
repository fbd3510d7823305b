//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand, ValueEnum};
use std::{net::IpAddr, path::PathBuf};

/// Crown: print-quality PDF books from markdown
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: crown.toml)
    #[arg(short = 'C', long, default_value = "crown.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Print debug output from the pipeline and the watcher
    #[arg(long = "verbose-log", global = true)]
    pub verbose_log: bool,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Scaffold a new book project
    #[command(visible_alias = "new")]
    Create {
        /// Project directory name/path (relative to current directory)
        #[arg(value_hint = clap::ValueHint::DirPath)]
        name: PathBuf,

        /// Built-in project template
        #[arg(short, long, default_value = "default")]
        template: String,
    },

    /// Build the PDF once
    #[command(visible_alias = "b")]
    Build {
        #[command(flatten)]
        build_args: BuildArgs,
    },

    /// Rebuild the PDF whenever sources change
    #[command(visible_alias = "w")]
    Watch,

    /// Watch and serve a live preview
    #[command(visible_alias = "d")]
    Dev {
        /// Port number to listen on
        #[arg(short, long)]
        port: Option<u16>,

        /// Network interface to bind (e.g., 127.0.0.1, 0.0.0.0)
        #[arg(long)]
        host: Option<IpAddr>,

        /// Open the preview in a browser
        #[arg(long, overrides_with = "no_open")]
        open: bool,

        /// Don't open a browser
        #[arg(long, overrides_with = "open")]
        no_open: bool,
    },

    /// Open the last generated output
    #[command(visible_alias = "p")]
    Preview {
        /// Which output to open
        #[arg(value_enum)]
        target: PreviewTarget,
    },
}

/// Build command arguments
#[derive(clap::Args, Debug, Clone, Default)]
pub struct BuildArgs {
    /// Output PDF path (relative to current directory)
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub output: Option<PathBuf>,

    /// Pass --verbose to the PDF renderer
    #[arg(short, long)]
    pub verbose: bool,
}

/// Generated artifact to open with `crown preview`.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewTarget {
    Html,
    Pdf,
}

impl Commands {
    /// Resolve `--open` / `--no-open` into an override.
    pub const fn open_override(&self) -> Option<bool> {
        match self {
            Self::Dev { open: true, .. } => Some(true),
            Self::Dev { no_open: true, .. } => Some(false),
            _ => None,
        }
    }
}

#[allow(unused)]
impl Cli {
    pub const fn is_create(&self) -> bool {
        matches!(self.command, Commands::Create { .. })
    }
    pub const fn is_build(&self) -> bool {
        matches!(self.command, Commands::Build { .. })
    }
    pub const fn is_watch(&self) -> bool {
        matches!(self.command, Commands::Watch)
    }
    pub const fn is_dev(&self) -> bool {
        matches!(self.command, Commands::Dev { .. })
    }
}
