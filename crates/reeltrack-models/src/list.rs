use serde::{Deserialize, Serialize};
use std::fmt;

/// The five mutually-exclusive lists a title can belong to for a user
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ListKind {
    /// Want to watch
    Planned,
    /// Currently watching
    Watching,
    /// Finished watching
    Completed,
    /// Paused, may resume
    OnHold,
    /// Stopped watching
    Dropped,
}

impl ListKind {
    pub const ALL: [ListKind; 5] = [
        ListKind::Planned,
        ListKind::Watching,
        ListKind::Completed,
        ListKind::OnHold,
        ListKind::Dropped,
    ];

    /// Collection name under `users/{uid}/`.
    pub fn collection_name(&self) -> &'static str {
        match self {
            ListKind::Planned => "planned",
            ListKind::Watching => "watching",
            ListKind::Completed => "completed",
            ListKind::OnHold => "onhold",
            ListKind::Dropped => "dropped",
        }
    }

    /// Name shown to users, e.g. in history messages.
    pub fn display_name(&self) -> &'static str {
        match self {
            ListKind::Planned => "Planned",
            ListKind::Watching => "Watching",
            ListKind::Completed => "Completed",
            ListKind::OnHold => "On-Hold",
            ListKind::Dropped => "Dropped",
        }
    }

    /// Parse a collection name back into a list kind.
    pub fn parse(name: &str) -> Option<ListKind> {
        ListKind::ALL
            .iter()
            .copied()
            .find(|list| list.collection_name() == name)
    }
}

impl fmt::Display for ListKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.collection_name())
    }
}
