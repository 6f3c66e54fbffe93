//! Runtime configuration.
//!
//! Loaded once by the binary and passed to constructors; nothing reads the
//! environment behind a component's back.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::sync::{FetchFailurePolicy, SyncOptions};

/// Default engine URL for local development.
const DEFAULT_GRAPH_URL: &str = "http://localhost:8001";

/// Default HTTP port for the query service.
pub const DEFAULT_PORT: u16 = 8000;

#[derive(Debug, Clone)]
pub struct Config {
    pub source: SourceConfig,
    pub graph: GraphConfig,
    pub sync: SyncOptions,
    pub server: ServerConfig,
}

/// Where records are read from.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceConfig {
    /// PostgREST endpoint with a service key.
    Rest { url: String, api_key: String },
    /// Local SQLite mirror; `None` means the platform default path.
    Sqlite { path: Option<PathBuf> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct GraphConfig {
    pub url: String,
    pub api_key: Option<String>,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_GRAPH_URL.to_string(),
            api_key: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// - `DGRAPH_SOURCE_URL` / `VITE_SUPABASE_URL` and
    ///   `DGRAPH_SOURCE_KEY` / `SUPABASE_SERVICE_ROLE_KEY` select the REST source
    /// - `DGRAPH_SQLITE_PATH` overrides the local mirror path
    /// - `DGRAPH_GRAPH_URL`, `DGRAPH_GRAPH_API_KEY` locate the engine
    /// - `DGRAPH_SYNC_CONCURRENCY`, `DGRAPH_FETCH_POLICY` (`empty` | `abort`)
    /// - `DGRAPH_HOST`, `DGRAPH_PORT`
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load a `.env` file from the working directory (or a parent) into the
    /// process environment, then read configuration from the environment.
    /// Variables already set take precedence over the file.
    pub fn load() -> Self {
        match dotenvy::dotenv() {
            Ok(path) => tracing::debug!("Loaded environment from {}", path.display()),
            Err(e) if e.not_found() => {}
            Err(e) => tracing::warn!("Ignoring unreadable .env file: {}", e),
        }
        Self::from_env()
    }

    /// Read configuration from a dotenv file without touching the process
    /// environment. Variables set in the environment take precedence.
    pub fn from_env_file(path: &Path) -> anyhow::Result<Self> {
        let file = dotenvy::from_path_iter(path)?.collect::<Result<HashMap<_, _>, _>>()?;
        Ok(Self::from_lookup(|key| {
            std::env::var(key).ok().or_else(|| file.get(key).cloned())
        }))
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |keys: &[&str]| {
            keys.iter()
                .find_map(|k| lookup(k).filter(|v| !v.trim().is_empty()))
        };

        let source = match (
            get(&["DGRAPH_SOURCE_URL", "VITE_SUPABASE_URL"]),
            get(&["DGRAPH_SOURCE_KEY", "SUPABASE_SERVICE_ROLE_KEY"]),
        ) {
            (Some(url), Some(api_key)) => SourceConfig::Rest { url, api_key },
            _ => SourceConfig::Sqlite {
                path: get(&["DGRAPH_SQLITE_PATH"]).map(PathBuf::from),
            },
        };

        let graph = GraphConfig {
            url: get(&["DGRAPH_GRAPH_URL"]).unwrap_or_else(|| DEFAULT_GRAPH_URL.to_string()),
            api_key: get(&["DGRAPH_GRAPH_API_KEY"]),
        };

        let mut sync = SyncOptions::default();
        if let Some(n) = get(&["DGRAPH_SYNC_CONCURRENCY"]).and_then(|s| s.parse::<usize>().ok()) {
            sync.concurrency = n.max(1);
        }
        if let Some(policy) =
            get(&["DGRAPH_FETCH_POLICY"]).and_then(|s| FetchFailurePolicy::from_str(&s))
        {
            sync.fetch_policy = policy;
        }

        let defaults = ServerConfig::default();
        let server = ServerConfig {
            host: get(&["DGRAPH_HOST"]).unwrap_or(defaults.host),
            port: get(&["DGRAPH_PORT"])
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.port),
        };

        Self {
            source,
            graph,
            sync,
            server,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn config(pairs: &[(&str, &str)]) -> Config {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|k| env.get(k).cloned())
    }

    #[test]
    fn defaults_to_local_sqlite_and_local_engine() {
        let config = config(&[]);
        assert_eq!(config.source, SourceConfig::Sqlite { path: None });
        assert_eq!(config.graph, GraphConfig::default());
        assert_eq!(config.sync, SyncOptions::default());
        assert_eq!(config.server.port, DEFAULT_PORT);
    }

    #[test]
    fn supabase_variables_select_rest_source() {
        let config = config(&[
            ("VITE_SUPABASE_URL", "https://example.supabase.co"),
            ("SUPABASE_SERVICE_ROLE_KEY", "secret"),
        ]);
        assert_eq!(
            config.source,
            SourceConfig::Rest {
                url: "https://example.supabase.co".to_string(),
                api_key: "secret".to_string(),
            }
        );
    }

    #[test]
    fn rest_source_needs_both_url_and_key() {
        let config = config(&[("DGRAPH_SOURCE_URL", "https://example.supabase.co")]);
        assert!(matches!(config.source, SourceConfig::Sqlite { .. }));
    }

    #[test]
    fn sync_tuning_is_parsed() {
        let config = config(&[
            ("DGRAPH_SYNC_CONCURRENCY", "0"),
            ("DGRAPH_FETCH_POLICY", "abort"),
            ("DGRAPH_PORT", "9100"),
        ]);
        assert_eq!(config.sync.concurrency, 1);
        assert_eq!(config.sync.fetch_policy, FetchFailurePolicy::Abort);
        assert_eq!(config.server.port, 9100);
    }

    #[test]
    fn dotenv_file_selects_rest_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "# dashboard credentials").unwrap();
        writeln!(file, "VITE_SUPABASE_URL=https://dotenv.supabase.co").unwrap();
        writeln!(file, "SUPABASE_SERVICE_ROLE_KEY=\"from-file\"").unwrap();
        writeln!(file, "DGRAPH_SYNC_CONCURRENCY=4").unwrap();

        let config = Config::from_env_file(&path).unwrap();

        assert_eq!(
            config.source,
            SourceConfig::Rest {
                url: "https://dotenv.supabase.co".to_string(),
                api_key: "from-file".to_string(),
            }
        );
        assert_eq!(config.sync.concurrency, 4);
    }

    #[test]
    fn missing_dotenv_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Config::from_env_file(&dir.path().join("absent.env")).is_err());
    }
}
