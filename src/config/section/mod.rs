//! Configuration section definitions.
//!
//! Each module corresponds to a section in `crown.toml`:
//!
//! | Module     | TOML Section   | Purpose                              |
//! |------------|----------------|--------------------------------------|
//! | `input`    | `[input]`      | Content glob, template, stylesheet   |
//! | `output`   | `[output]`     | Generated HTML and PDF paths         |
//! | `metadata` | `[metadata]`   | Title, author, keywords, language    |
//! | `page`     | `[page]`       | Page size and margins                |
//! | `prince`   | `[prince]`     | External renderer options            |
//! | `serve`    | `[serve]`      | Development server                   |
//! | `watch`    | `[watch]`      | Debounce and backpressure            |

mod input;
mod metadata;
mod output;
mod page;
mod prince;
mod serve;
mod watch;

pub use input::InputConfig;
pub use metadata::MetadataConfig;
pub use output::OutputConfig;
pub use page::PageConfig;
pub use prince::PrinceConfig;
pub use serve::ServeConfig;
pub use watch::{Backpressure, WatchConfig};
