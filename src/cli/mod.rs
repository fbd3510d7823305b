//! Command-line interface module.

mod args;
pub mod build;
pub mod create;
pub mod dev;
pub mod preview;
pub mod watch;

pub use args::{BuildArgs, Cli, Commands, PreviewTarget};
