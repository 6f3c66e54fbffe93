use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;
use rusqlite::types::ValueRef;
use rusqlite::Connection;
use serde_json::{Map, Value};

use super::{schema, RecordSource, SourceError};
use crate::models::{Record, RecordKind};

/// Record source backed by a local SQLite mirror of the dashboard tables.
#[derive(Clone)]
pub struct SqliteSource {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteSource {
    pub fn open(path: PathBuf) -> Result<Self> {
        let parent = path
            .parent()
            .ok_or_else(|| anyhow::anyhow!("Database path has no parent directory"))?;
        std::fs::create_dir_all(parent)?;
        let conn = Connection::open(&path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        Ok(Self::from_connection(conn))
    }

    pub fn open_default() -> Result<Self> {
        Self::open(Self::default_path()?)
    }

    pub fn open_memory() -> Result<Self> {
        Ok(Self::from_connection(Connection::open_in_memory()?))
    }

    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    /// Platform data directory location of the mirror database.
    pub fn default_path() -> Result<PathBuf> {
        let dirs = directories::ProjectDirs::from("", "", "dashboard-graph")
            .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
        Ok(dirs.data_dir().join("dashboard.db"))
    }

    pub fn migrate(&self) -> Result<()> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| anyhow::anyhow!("database lock poisoned"))?;
        schema::run_migrations(&conn)
    }

    fn select_all(&self, kind: RecordKind) -> Result<Vec<Record>> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| anyhow::anyhow!("database lock poisoned"))?;
        let mut stmt = conn.prepare(&format!("SELECT * FROM {} ORDER BY rowid", kind.table()))?;
        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();

        let records = stmt
            .query_map([], |row| {
                let mut fields = Map::with_capacity(columns.len());
                for (i, name) in columns.iter().enumerate() {
                    fields.insert(name.clone(), column_value(row.get_ref(i)?));
                }
                Ok(Record::new(fields))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(records)
    }
}

#[async_trait]
impl RecordSource for SqliteSource {
    async fn fetch(&self, kind: RecordKind) -> Result<Vec<Record>, SourceError> {
        let records = self
            .select_all(kind)
            .map_err(|e| SourceError::fetch(kind, e))?;
        tracing::debug!("Fetched {} rows from {}", records.len(), kind);
        Ok(records)
    }
}

/// Map a column to a record value. TEXT holding a JSON array becomes a list.
fn column_value(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::from(i),
        ValueRef::Real(f) => Value::from(f),
        ValueRef::Text(bytes) => {
            let text = String::from_utf8_lossy(bytes);
            if text.starts_with('[') {
                if let Ok(list @ Value::Array(_)) = serde_json::from_str::<Value>(&text) {
                    return list;
                }
            }
            Value::String(text.into_owned())
        }
        ValueRef::Blob(bytes) => Value::String(String::from_utf8_lossy(bytes).into_owned()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn seeded() -> SqliteSource {
        let source = SqliteSource::open_memory().unwrap();
        source.migrate().unwrap();
        {
            let conn = source.conn.lock().unwrap();
            conn.execute_batch(
                r#"INSERT INTO tasks (id, title, status, labels, created_at)
                   VALUES ('t1', 'Ship v1', 'in_progress', '["backend","urgent"]', '2024-01-01T00:00:00');
                   INSERT INTO tasks (id, title, status, labels)
                   VALUES ('t2', 'Write docs', 'todo', '[not json');"#,
            )
            .unwrap();
        }
        source
    }

    #[tokio::test]
    async fn fetch_returns_rows_in_insert_order() {
        let source = seeded();
        let tasks = source.fetch_tasks().await.unwrap();

        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].id(), Some("t1".to_string()));
        assert_eq!(tasks[1].id(), Some("t2".to_string()));
    }

    #[tokio::test]
    async fn json_array_text_becomes_list() {
        let source = seeded();
        let tasks = source.fetch_tasks().await.unwrap();

        assert_eq!(tasks[0].get("labels"), Some(&json!(["backend", "urgent"])));
        assert_eq!(tasks[1].get("labels"), Some(&json!("[not json")));
        assert_eq!(tasks[1].get("due_date"), Some(&Value::Null));
    }

    #[tokio::test]
    async fn missing_table_is_a_fetch_failure() {
        let source = SqliteSource::open_memory().unwrap();
        let err = source.fetch(RecordKind::FinanceRecords).await.unwrap_err();
        assert!(matches!(
            err,
            SourceError::FetchFailed { table: "finance_records", .. }
        ));
    }
}
