//! Database Connection and Setup
//!
//! Opens the `aggr` database, creates the schema on first run and seeds the
//! built-in series once the schema transaction has committed.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use rusqlite::{params, Connection, ErrorCode, Transaction};
use tokio::sync::Mutex;

use crate::domain::{now_ms, DomainError, DomainResult, Serie};

/// Name of the database
pub const DB_NAME: &str = "aggr";

/// Schema version written to `PRAGMA user_version`
pub const DB_VERSION: u32 = 1;

/// Busy retries before a locked database is reported to the caller
const BUSY_RETRIES: i32 = 50;
const BUSY_BACKOFF: Duration = Duration::from_millis(20);

/// Connection shared by all repositories
pub type SharedConnection = Arc<Mutex<Option<Connection>>>;

/// Connection lifecycle anomalies. Reported, never retried here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DbEvent {
    /// Another connection holds the lock we are waiting on
    Blocked,
    /// Our connection lags behind a newer schema written by another opener
    Blocking { on_disk: u32 },
    /// The connection can no longer be used
    Terminated { code: String },
}

impl std::fmt::Display for DbEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DbEvent::Blocked => write!(f, "blocked"),
            DbEvent::Blocking { on_disk } => write!(f, "blocking (on-disk version {})", on_disk),
            DbEvent::Terminated { code } => write!(f, "terminated ({})", code),
        }
    }
}

/// Log a lifecycle anomaly
pub fn report(event: &DbEvent) {
    log::warn!("[db] {} received", event);
}

/// Database state wrapper
#[derive(Clone)]
pub struct DbState {
    conn: SharedConnection,
    path: Option<PathBuf>,
}

impl DbState {
    /// Connection handle for repositories
    pub fn connection(&self) -> SharedConnection {
        self.conn.clone()
    }

    /// File backing the database, `None` when in memory
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub async fn is_open(&self) -> bool {
        self.conn.lock().await.is_some()
    }

    /// Close the connection. Later operations fail with `NotInitialized`.
    pub async fn close(&self) -> DomainResult<()> {
        let conn = self.conn.lock().await.take();
        if let Some(conn) = conn {
            conn.close().map_err(|(_, e)| storage_error(e))?;
            log::info!("[db] connection closed");
        }
        Ok(())
    }
}

/// Initialize the database at `db_path` (in memory when `None`).
///
/// On first creation the schema transaction commits before the seeding
/// transaction starts, and this only returns once both have committed.
pub async fn init_db(db_path: Option<&Path>, defaults: &[Serie]) -> DomainResult<DbState> {
    let mut conn = match db_path {
        Some(path) => {
            log::info!("[db] open '{}' ({})", DB_NAME, path.display());
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            Connection::open(path).map_err(storage_error)?
        }
        None => {
            log::info!("[db] open '{}' (in memory)", DB_NAME);
            Connection::open_in_memory().map_err(storage_error)?
        }
    };

    conn.busy_handler(Some(on_busy)).map_err(storage_error)?;

    let old_version = schema_version(&conn)?;
    if old_version > DB_VERSION {
        return Err(DomainError::VersionMismatch {
            on_disk: old_version,
            supported: DB_VERSION,
        });
    }

    if old_version < DB_VERSION {
        log::debug!("[db] upgrade received {} -> {}", old_version, DB_VERSION);
        run_migrations(&mut conn, old_version)?;
        log::debug!("[db] upgrade completed");

        if old_version == 0 {
            insert_default(&mut conn, defaults)?;
        }
    }

    log::info!("[db] database initialized");

    Ok(DbState {
        conn: Arc::new(Mutex::new(Some(conn))),
        path: db_path.map(Path::to_path_buf),
    })
}

/// Borrow the open connection, reporting a schema that moved past ours
pub(crate) fn open_connection(guard: &Option<Connection>) -> DomainResult<&Connection> {
    let conn = guard.as_ref().ok_or(DomainError::NotInitialized)?;

    let on_disk = schema_version(conn)?;
    if on_disk > DB_VERSION {
        report(&DbEvent::Blocking { on_disk });
    }

    Ok(conn)
}

/// Wrap a storage error, reporting the ones that leave the connection unusable
pub fn storage_error(err: rusqlite::Error) -> DomainError {
    if let Some(code) = terminal_code(&err) {
        report(&DbEvent::Terminated {
            code: format!("{:?}", code),
        });
    }
    DomainError::Storage(err)
}

fn terminal_code(err: &rusqlite::Error) -> Option<ErrorCode> {
    match err.sqlite_error_code() {
        Some(
            code @ (ErrorCode::SystemIoFailure
            | ErrorCode::DatabaseCorrupt
            | ErrorCode::NotADatabase
            | ErrorCode::CannotOpen),
        ) => Some(code),
        _ => None,
    }
}

fn on_busy(attempts: i32) -> bool {
    if attempts == 0 {
        report(&DbEvent::Blocked);
    }
    if attempts >= BUSY_RETRIES {
        return false;
    }
    // runs inside the SQLite call on the worker thread; bounded to ~1s per statement
    std::thread::sleep(BUSY_BACKOFF);
    true
}

fn schema_version(conn: &Connection) -> DomainResult<u32> {
    conn.pragma_query_value(None, "user_version", |row| row.get(0))
        .map_err(storage_error)
}

/// Schema steps; entry `n` upgrades version `n` to `n + 1`
const MIGRATIONS: [fn(&Transaction) -> rusqlite::Result<()>; DB_VERSION as usize] = [create_stores];

/// Run database migrations in a single transaction
fn run_migrations(conn: &mut Connection, old_version: u32) -> DomainResult<()> {
    let tx = conn.transaction().map_err(storage_error)?;

    for migration in &MIGRATIONS[old_version as usize..] {
        migration(&tx).map_err(storage_error)?;
    }

    tx.pragma_update(None, "user_version", DB_VERSION)
        .map_err(storage_error)?;
    tx.commit().map_err(storage_error)
}

/// Version 1: the four stores and their `updated_at` indexes
fn create_stores(tx: &Transaction) -> rusqlite::Result<()> {
    log::debug!("[db] create stores");

    tx.execute_batch(
        "CREATE TABLE workspaces (
            id TEXT PRIMARY KEY NOT NULL,
            updated_at INTEGER NOT NULL,
            document TEXT NOT NULL
        );
        CREATE INDEX idx_workspaces_updated_at ON workspaces(updated_at);

        CREATE TABLE series (
            id TEXT PRIMARY KEY NOT NULL,
            updated_at INTEGER NOT NULL,
            document TEXT NOT NULL
        );
        CREATE INDEX idx_series_updated_at ON series(updated_at);

        CREATE TABLE products (
            exchange TEXT PRIMARY KEY NOT NULL,
            document TEXT NOT NULL
        );

        CREATE TABLE gifs (
            slug TEXT PRIMARY KEY NOT NULL,
            document TEXT NOT NULL
        );",
    )
}

/// Seed the built-in series, all stamped with the same time
fn insert_default(conn: &mut Connection, defaults: &[Serie]) -> DomainResult<()> {
    log::info!("[db] insert default");

    let now = now_ms();
    let tx = conn.transaction().map_err(storage_error)?;

    {
        let mut stmt = tx
            .prepare("INSERT INTO series (id, updated_at, document) VALUES (?1, ?2, ?3)")
            .map_err(storage_error)?;

        for serie in defaults {
            let mut serie = serie.clone();
            serie.created_at = now;
            serie.updated_at = now;
            serie.strip_reserved();

            let document = serde_json::to_string(&serie)?;
            stmt.execute(params![serie.id, now, document])
                .map_err(storage_error)?;
        }
    }

    tx.commit().map_err(storage_error)?;

    log::debug!("[db] {} default series added", defaults.len());
    Ok(())
}

/// Remove the database files at `db_path`
pub fn delete_database(db_path: &Path) -> DomainResult<()> {
    let mut removed = 0;

    for suffix in ["", "-wal", "-shm", "-journal"] {
        let mut file = db_path.as_os_str().to_owned();
        file.push(suffix);
        let file = PathBuf::from(file);

        match std::fs::remove_file(&file) {
            Ok(()) => removed += 1,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
    }

    log::info!("[db] deleted '{}' ({} files)", db_path.display(), removed);
    Ok(())
}
