#![cfg_attr(
    not(any(feature = "pg", feature = "mysql", feature = "sqlite")),
    allow(unused_imports, unused_variables, dead_code, unreachable_code)
)]

//! SQL backend for list-view requests.
//!
//! Wraps a SeaORM connection behind [`DbHandle`] and provides
//! [`SqlQueryAssembler`], the [`tablekit_core::QueryAssembler`] that compiles
//! predicates, ordering, grouping and paging into sea-query statements.
//!
//! # Example
//! ```rust,no_run
//! #[tokio::main]
//! async fn main() -> tablekit_db::Result<()> {
//!     use tablekit_db::{ConnectOpts, DbHandle, SqlQueryAssembler, TableSource};
//!
//!     let db = DbHandle::connect("sqlite::memory:", ConnectOpts::default()).await?;
//!     let source = TableSource::new("people").select(["id", "name"]);
//!     let _assembler = SqlQueryAssembler::new(db.sea(), source.to_select());
//!     db.close().await?;
//!     Ok(())
//! }
//! ```

pub mod assembler;
pub mod compile;
pub mod source;

pub use assembler::SqlQueryAssembler;
pub use source::{JoinKind, JoinSource, TableSource};

use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use thiserror::Error;

/// Library-local result type.
pub type Result<T> = std::result::Result<T, DbError>;

/// Typed error for the DB handle.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("Unknown DSN: {0}")]
    UnknownDsn(String),

    #[error("Feature not enabled: {0}")]
    FeatureDisabled(&'static str),

    #[error(transparent)]
    Sea(#[from] sea_orm::DbErr),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Supported engines.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DbEngine {
    Postgres,
    MySql,
    Sqlite,
}

/// Pool knobs applied when connecting.
#[derive(Clone, Debug)]
pub struct ConnectOpts {
    /// Maximum number of connections in the pool.
    pub max_conns: Option<u32>,
    pub min_conns: Option<u32>,
    /// Timeout to acquire a connection from the pool.
    pub acquire_timeout: Option<Duration>,
    pub idle_timeout: Option<Duration>,
    pub max_lifetime: Option<Duration>,
    pub test_before_acquire: bool,
    /// For SQLite file DSNs, create parent directories if missing.
    pub create_sqlite_dirs: bool,
    /// Let sqlx log every statement it runs.
    pub sqlx_logging: bool,
}

impl Default for ConnectOpts {
    fn default() -> Self {
        Self {
            max_conns: Some(10),
            min_conns: None,
            acquire_timeout: Some(Duration::from_secs(30)),
            idle_timeout: None,
            max_lifetime: None,
            test_before_acquire: false,
            create_sqlite_dirs: true,
            sqlx_logging: false,
        }
    }
}

/// Main handle.
#[derive(Debug, Clone)]
pub struct DbHandle {
    engine: DbEngine,
    dsn: String,
    sea: DatabaseConnection,
}

impl DbHandle {
    /// Detect engine by DSN scheme.
    pub fn detect(dsn: &str) -> Result<DbEngine> {
        let s = dsn.trim_start();
        if s.starts_with("postgres://") || s.starts_with("postgresql://") {
            Ok(DbEngine::Postgres)
        } else if s.starts_with("mysql://") {
            Ok(DbEngine::MySql)
        } else if s.starts_with("sqlite:") {
            Ok(DbEngine::Sqlite)
        } else {
            Err(DbError::UnknownDsn(redact_credentials_in_dsn(Some(dsn))))
        }
    }

    /// Connect and build handle.
    pub async fn connect(dsn: &str, opts: ConnectOpts) -> Result<Self> {
        let engine = Self::detect(dsn)?;
        match engine {
            DbEngine::Postgres if !cfg!(feature = "pg") => {
                return Err(DbError::FeatureDisabled("PostgreSQL feature not enabled"))
            }
            DbEngine::MySql if !cfg!(feature = "mysql") => {
                return Err(DbError::FeatureDisabled("MySQL feature not enabled"))
            }
            DbEngine::Sqlite if !cfg!(feature = "sqlite") => {
                return Err(DbError::FeatureDisabled("SQLite feature not enabled"))
            }
            _ => {}
        }

        let dsn = match engine {
            DbEngine::Sqlite => prepare_sqlite_path(dsn, opts.create_sqlite_dirs)?,
            _ => dsn.to_string(),
        };

        let mut o = ConnectOptions::new(dsn.clone());
        // Every pooled connection to `:memory:` opens its own empty database.
        if is_sqlite_memory(&dsn) {
            o.max_connections(1);
        } else if let Some(n) = opts.max_conns {
            o.max_connections(n);
        }
        if let Some(n) = opts.min_conns {
            o.min_connections(n);
        }
        if let Some(t) = opts.acquire_timeout {
            o.acquire_timeout(t);
        }
        if let Some(t) = opts.idle_timeout {
            o.idle_timeout(t);
        }
        if let Some(t) = opts.max_lifetime {
            o.max_lifetime(t);
        }
        o.test_before_acquire(opts.test_before_acquire);
        o.sqlx_logging(opts.sqlx_logging);

        tracing::debug!(
            dsn = %redact_credentials_in_dsn(Some(&dsn)),
            ?engine,
            "connecting to database"
        );
        let sea = Database::connect(o).await?;

        Ok(Self { engine, dsn, sea })
    }

    /// Graceful pool close.
    pub async fn close(self) -> Result<()> {
        self.sea.close().await?;
        Ok(())
    }

    pub fn engine(&self) -> DbEngine {
        self.engine
    }

    /// Get the DSN used for this connection.
    pub fn dsn(&self) -> &str {
        &self.dsn
    }

    /// Get SeaORM connection (clone; cheap handle).
    pub fn sea(&self) -> DatabaseConnection {
        self.sea.clone()
    }

    pub fn seaorm(&self) -> &DatabaseConnection {
        &self.sea
    }
}

/// Replace the password part of a DSN so it can be logged.
pub fn redact_credentials_in_dsn(dsn: Option<&str>) -> String {
    match dsn {
        Some(dsn) if dsn.contains('@') => match url::Url::parse(dsn) {
            Ok(mut parsed) => {
                if parsed.password().is_some() {
                    let _ = parsed.set_password(Some("***"));
                }
                parsed.to_string()
            }
            Err(_) => "***".to_string(),
        },
        Some(dsn) => dsn.to_string(),
        None => "none".to_string(),
    }
}

/// In-memory SQLite DSNs (`sqlite::memory:`, `mode=memory`).
pub fn is_sqlite_memory(dsn: &str) -> bool {
    dsn.starts_with("sqlite:") && (dsn.contains(":memory:") || dsn.contains("mode=memory"))
}

fn prepare_sqlite_path(dsn: &str, create_dirs: bool) -> Result<String> {
    if !create_dirs || dsn.contains(":memory:") {
        return Ok(dsn.to_string());
    }

    // Handles "sqlite:/path" and "sqlite://path"; URI forms have no directory to create.
    let raw = dsn
        .strip_prefix("sqlite://")
        .or_else(|| dsn.strip_prefix("sqlite:"))
        .unwrap_or(dsn);

    if !raw.starts_with("file:") && !raw.contains('?') {
        if let Some(parent) = std::path::Path::new(raw).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
    }

    Ok(dsn.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detect_engines() {
        assert_eq!(
            DbHandle::detect("postgres://u:p@localhost/db").unwrap(),
            DbEngine::Postgres
        );
        assert_eq!(
            DbHandle::detect("mysql://localhost/db").unwrap(),
            DbEngine::MySql
        );
        assert_eq!(
            DbHandle::detect("sqlite::memory:").unwrap(),
            DbEngine::Sqlite
        );
        assert!(matches!(
            DbHandle::detect("oracle://x"),
            Err(DbError::UnknownDsn(_))
        ));
    }

    #[test]
    fn redacts_password() {
        let s = redact_credentials_in_dsn(Some("postgres://app:secret@db:5432/main"));
        assert!(!s.contains("secret"));
        assert!(s.contains("***"));
        assert_eq!(redact_credentials_in_dsn(None), "none");
        assert_eq!(
            redact_credentials_in_dsn(Some("sqlite::memory:")),
            "sqlite::memory:"
        );
    }

    #[test]
    fn memory_dsn_detection() {
        assert!(is_sqlite_memory("sqlite::memory:"));
        assert!(is_sqlite_memory("sqlite:file:dt?mode=memory&cache=shared"));
        assert!(!is_sqlite_memory("sqlite:///tmp/app.db"));
    }

    #[test]
    fn sqlite_parent_dirs_are_created() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("nested").join("app.db");
        let dsn = format!("sqlite://{}", db.display());
        let out = prepare_sqlite_path(&dsn, true).unwrap();
        assert_eq!(out, dsn);
        assert!(dir.path().join("nested").is_dir());
    }
}
