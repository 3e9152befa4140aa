use rusqlite::Connection;
use std::path::Path;
use tokio::task;
use crate::error::{Result, QaError};

// WAL mode for concurrent readers while an ingest runs, NORMAL sync for speed
// 64MB page cache and 256MB mmap for large dumps
const WRITE_PRAGMAS: &str = "PRAGMA journal_mode = WAL; \
     PRAGMA synchronous = NORMAL; \
     PRAGMA temp_store = MEMORY; \
     PRAGMA cache_size = -65536; \
     PRAGMA mmap_size = 268435456; \
     PRAGMA wal_autocheckpoint = 1000;";

// Serving connections never write; query_only turns a stray write into an error
const READ_PRAGMAS: &str = "PRAGMA query_only = ON; \
     PRAGMA temp_store = MEMORY; \
     PRAGMA cache_size = -65536; \
     PRAGMA mmap_size = 268435456;";

/// Handle on one triple index file; connections are opened per use
#[derive(Debug, Clone)]
pub struct Db {
    path: std::path::PathBuf,
}

impl Db {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Self {
        Self {
            path: db_path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Open a read-write connection, as used by ingestion
    pub fn open_connection(&self) -> Result<Connection> {
        let conn = Connection::open(&self.path)
            .map_err(QaError::Database)?;
        conn.execute_batch(WRITE_PRAGMAS)?;
        Ok(conn)
    }

    /// Open a connection for lookups only
    pub fn open_read_connection(&self) -> Result<Connection> {
        let conn = Connection::open(&self.path)
            .map_err(QaError::Database)?;
        conn.execute_batch(READ_PRAGMAS)?;
        Ok(conn)
    }

    /// Run `f` on a fresh read-write connection on the blocking pool
    pub async fn with_connection<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let db = self.clone();
        task::spawn_blocking(move || {
            let mut conn = db.open_connection()?;
            f(&mut conn)
        })
        .await
        .map_err(|e| QaError::Io(std::io::Error::new(
            std::io::ErrorKind::Other,
            format!("database task failed: {}", e),
        )))?
    }
}

pub mod migrate;
