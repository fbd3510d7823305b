//! Embedded static resources for Crown.
//!
//! # Module Structure
//!
//! - `template` - Template types for typed variable injection
//! - `serve` - Dev server preview page
//! - `project` - Project templates for `crown create`
//!
//! # Usage
//!
//! ```ignore
//! use embed::serve::{PREVIEW_HTML, PreviewVars};
//!
//! let html = PREVIEW_HTML.render(&PreviewVars { title: "My Book".into(), ws_port: 35729 });
//! ```

mod template;

pub use template::{Template, TemplateVars};

pub mod serve {
    use super::{Template, TemplateVars};

    /// Variables for preview.html.
    pub struct PreviewVars {
        pub title: String,
        pub ws_port: u16,
    }

    impl TemplateVars for PreviewVars {
        fn apply(&self, content: &str) -> String {
            content
                .replace("__TITLE__", &crate::utils::html::escape(&self.title))
                .replace("__WS_PORT__", &self.ws_port.to_string())
        }
    }

    /// Preview page: PDF in an iframe, reloaded over the live-reload socket.
    pub const PREVIEW_HTML: Template<PreviewVars> = Template::new(include_str!("serve/preview.html"));
}

pub mod project {
    use super::{Template, TemplateVars};

    /// Variables for project template files.
    pub struct ProjectVars {
        pub title: String,
    }

    impl TemplateVars for ProjectVars {
        fn apply(&self, content: &str) -> String {
            // The title lands inside a TOML basic string
            let escaped = self.title.replace('\\', "\\\\").replace('"', "\\\"");
            content.replace("__TITLE__", &escaped)
        }
    }

    /// One file of a project template, at a project-relative path.
    pub struct ProjectFile {
        pub path: &'static str,
        pub content: Template<ProjectVars>,
    }

    macro_rules! project_files {
        ($dir:literal: $($path:literal),+ $(,)?) => {
            &[$(ProjectFile {
                path: $path,
                content: Template::new(include_str!(concat!("project/", $dir, "/", $path))),
            }),+]
        };
    }

    const DEFAULT: &[ProjectFile] = project_files!("default":
        "crown.toml",
        "templates/layout.html",
        "templates/helpers.html",
        "templates/partials/chapter.html",
        "styles.css",
        "chapters/01-introduction.md",
        "chapters/02-getting-started.md",
    );

    /// Names accepted by `crown create --template`.
    pub const NAMES: &[&str] = &["default"];

    /// Look up a built-in project template by name.
    pub fn find(name: &str) -> Option<&'static [ProjectFile]> {
        match name {
            "default" => Some(DEFAULT),
            _ => None,
        }
    }
}
