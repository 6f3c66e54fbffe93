use serde::{Deserialize, Serialize};

/// A relational collection the record source can read.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Tasks,
    Projects,
    BusinessProjects,
    Phases,
    Content,
    FinanceRecords,
    TimeEntries,
}

impl RecordKind {
    pub const ALL: [RecordKind; 7] = [
        Self::Tasks,
        Self::Projects,
        Self::BusinessProjects,
        Self::Phases,
        Self::Content,
        Self::FinanceRecords,
        Self::TimeEntries,
    ];

    /// Table backing this collection in the system of record.
    pub fn table(&self) -> &'static str {
        match self {
            Self::Tasks => "tasks",
            Self::Projects => "projects",
            Self::BusinessProjects => "business_projects",
            Self::Phases => "project_phases",
            Self::Content => "content_library",
            Self::FinanceRecords => "finance_records",
            Self::TimeEntries => "time_entries",
        }
    }
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.table())
    }
}

/// A record kind that is materialized as an episode in the graph.
///
/// Only tasks, projects and content items are synced; the other collections
/// are readable but have no episode template.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EpisodeKind {
    Task,
    Project,
    Content,
}

impl EpisodeKind {
    /// Order used by a full sync pass.
    pub const SYNC_ORDER: [EpisodeKind; 3] = [Self::Task, Self::Project, Self::Content];

    pub fn record_kind(&self) -> RecordKind {
        match self {
            Self::Task => RecordKind::Tasks,
            Self::Project => RecordKind::Projects,
            Self::Content => RecordKind::Content,
        }
    }

    /// Human label used in episode names and body headers.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Task => "Task",
            Self::Project => "Project",
            Self::Content => "Content",
        }
    }

    /// Constant source description attached to every episode of this kind.
    pub fn source_label(&self) -> &'static str {
        match self {
            Self::Task => "TG-Dashboard Task",
            Self::Project => "TG-Dashboard Project",
            Self::Content => "TG-Dashboard Content Library",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Task => "tasks",
            Self::Project => "projects",
            Self::Content => "content",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "task" | "tasks" => Some(Self::Task),
            "project" | "projects" => Some(Self::Project),
            "content" => Some(Self::Content),
            _ => None,
        }
    }
}

impl std::fmt::Display for EpisodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
