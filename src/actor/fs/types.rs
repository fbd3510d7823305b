use std::path::PathBuf;

/// What a changed file means for the build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Content,
    Template,
    Style,
    /// `crown.toml`: never rebuilt in place, the session must restart.
    Config,
    /// The configured `helpers` file.
    CustomLogic,
}

impl Category {
    pub fn label(self) -> &'static str {
        match self {
            Self::Content => "content",
            Self::Template => "template",
            Self::Style => "style",
            Self::Config => "config",
            Self::CustomLogic => "helpers",
        }
    }
}

/// What happened to a file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Added,
    Modified,
    Removed,
}

impl ChangeKind {
    /// Map a raw notify event kind. Metadata-only and access events are
    /// noise (mtime/chmod churn can loop rebuilds) and yield `None`.
    pub fn from_notify(kind: &notify::EventKind) -> Option<Self> {
        use notify::EventKind;
        use notify::event::ModifyKind;

        match kind {
            EventKind::Create(_) => Some(Self::Added),
            EventKind::Remove(_) => Some(Self::Removed),
            EventKind::Modify(ModifyKind::Metadata(_)) => None,
            EventKind::Modify(_) => Some(Self::Modified),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Added => "added",
            Self::Modified => "modified",
            Self::Removed => "removed",
        }
    }
}

/// A classified filesystem change, handed to the coordinator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub category: Category,
    pub path: PathBuf,
    pub kind: ChangeKind,
}

impl ChangeEvent {
    pub fn new(category: Category, path: impl Into<PathBuf>, kind: ChangeKind) -> Self {
        Self {
            category,
            path: path.into(),
            kind,
        }
    }
}
