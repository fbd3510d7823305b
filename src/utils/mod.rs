//! Utility modules shared by the build pipeline and the CLI.

pub mod exec;
pub mod html;
pub mod path;
