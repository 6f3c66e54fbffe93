//! Episode formatting.
//!
//! Each syncable kind has a fixed field table; one generic formatter walks
//! the table and renders `"{label}: {value}"` lines. Formatting is pure: the
//! same record always yields the same body, which is what makes re-syncing
//! idempotent from the engine's point of view.
//!
//! Sentinel values (`"No description"`, `"None"`, ...) are part of the text
//! the extraction engine sees, so changing them changes what gets extracted.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use thiserror::Error;

use crate::models::{Episode, EpisodeKind, Record};

#[derive(Debug, Error, PartialEq)]
pub enum FormatError {
    #[error("Invalid timestamp {value:?} in field {field}")]
    InvalidTimestamp { field: &'static str, value: String },
}

/// How a field is rendered when the record lacks it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    /// Line always present; the sentinel stands in for a missing value.
    Default(&'static str),
    /// Line always present; list items joined with `", "`, empty when absent.
    Joined,
    /// Line appended only when the record has a value.
    Optional,
}

#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub key: &'static str,
    pub label: &'static str,
    pub rule: Presence,
}

const fn field(key: &'static str, label: &'static str, rule: Presence) -> FieldSpec {
    FieldSpec { key, label, rule }
}

const TASK_FIELDS: &[FieldSpec] = &[
    field("title", "Task", Presence::Default("Untitled Task")),
    field("description", "Description", Presence::Default("No description")),
    field("status", "Status", Presence::Default("unknown")),
    field("priority", "Priority", Presence::Default("normal")),
    field("area", "Area", Presence::Default("general")),
    field("labels", "Labels", Presence::Joined),
    field("due_date", "Due Date", Presence::Optional),
    field("project_id", "Project ID", Presence::Optional),
];

const PROJECT_FIELDS: &[FieldSpec] = &[
    field("name", "Project", Presence::Default("Untitled Project")),
    field("description", "Description", Presence::Default("No description")),
    field("status", "Status", Presence::Default("active")),
    field(
        "business_project_id",
        "Business Project ID",
        Presence::Default("None"),
    ),
    field("phase_id", "Phase ID", Presence::Default("None")),
];

const CONTENT_FIELDS: &[FieldSpec] = &[
    field("title", "Content", Presence::Default("Untitled Content")),
    field("url", "URL", Presence::Default("No URL")),
    field("content_type", "Type", Presence::Default("unknown")),
    field("summary", "Summary", Presence::Default("No summary")),
    field("ai_analysis", "AI Analysis", Presence::Default("No analysis")),
    field("tags", "Tags", Presence::Joined),
];

/// Field table for a kind. The first entry is the record's title field.
pub fn fields_for(kind: EpisodeKind) -> &'static [FieldSpec] {
    match kind {
        EpisodeKind::Task => TASK_FIELDS,
        EpisodeKind::Project => PROJECT_FIELDS,
        EpisodeKind::Content => CONTENT_FIELDS,
    }
}

/// Record field holding the human title.
pub fn title_field(kind: EpisodeKind) -> &'static str {
    fields_for(kind)[0].key
}

/// Render the episode body for a record.
pub fn body(kind: EpisodeKind, record: &Record) -> String {
    fields_for(kind)
        .iter()
        .filter_map(|spec| {
            let value = match spec.rule {
                Presence::Default(sentinel) => {
                    Some(record.text(spec.key).unwrap_or_else(|| sentinel.to_string()))
                }
                Presence::Joined => Some(record.list(spec.key).join(", ")),
                Presence::Optional => record.text(spec.key),
            }?;
            Some(format!("{}: {}", spec.label, value))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// `"<Kind>: <title>"`, with `Untitled` standing in for a missing title.
pub fn name(kind: EpisodeKind, record: &Record) -> String {
    let title = record
        .text(title_field(kind))
        .unwrap_or_else(|| "Untitled".to_string());
    format!("{}: {}", kind.label(), title)
}

/// Format a record, using the current instant when it has no `created_at`.
pub fn format(kind: EpisodeKind, record: &Record) -> Result<Episode, FormatError> {
    format_at(kind, record, Utc::now())
}

/// Format a record with an explicit fallback reference time.
pub fn format_at(
    kind: EpisodeKind,
    record: &Record,
    now: DateTime<Utc>,
) -> Result<Episode, FormatError> {
    let reference_time = match record.text("created_at") {
        Some(raw) => parse_timestamp(&raw).ok_or(FormatError::InvalidTimestamp {
            field: "created_at",
            value: raw,
        })?,
        None => now,
    };

    Ok(Episode {
        name: name(kind, record),
        body: body(kind, record),
        source_label: kind.source_label().to_string(),
        reference_time,
    })
}

/// Parse an ISO-8601 timestamp. Values without an offset are taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    // Postgres renders offsets as `+00` without minutes.
    if let Ok(dt) = DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f%#z") {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f%#z") {
        return Some(dt.with_timezone(&Utc));
    }
    for pattern in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, pattern) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
