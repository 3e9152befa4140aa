use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use rusqlite::{params, Connection};

use super::{non_empty, normalize_object, TripleIndex, FIELD_LABEL, FIELD_TYPE};
use crate::db::Db;
use crate::error::{QaError, Result};
use crate::model::{Direction, Element, Language};

const OBJECTS_SQL: &str = "SELECT DISTINCT object FROM triples WHERE predicate = ?1 AND subject = ?2";
const SUBJECTS_SQL: &str = "SELECT DISTINCT subject FROM triples WHERE predicate = ?1 AND object = ?2";
const STATE_SQL: &str = "SELECT COUNT(*), COALESCE(SUM(triple_count), 0), COALESCE(MAX(ingested_at), '') FROM dumps";

/// Idle read connections kept per index.
const MAX_IDLE_CONNECTIONS: usize = 4;

/// What the ingest pipeline last recorded in an index.
///
/// Any ingest, re-ingest or cleanup changes at least one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexState {
    pub dumps: i64,
    pub triples: i64,
    pub last_ingested_at: String,
}

/// Triple index persisted in a SQLite file built by the ingest pipeline.
///
/// Lookups borrow a read-only connection from a small idle pool, opening a
/// new one when the pool is empty, so concurrent lookups never share one.
#[derive(Debug)]
pub struct SqliteIndex {
    db: Db,
    busy_timeout: Duration,
    idle: Mutex<Vec<Connection>>,
}

impl SqliteIndex {
    /// Open an existing index file. Fails `IndexUnavailable` if it is missing.
    pub fn open<P: AsRef<Path>>(path: P, busy_timeout: Duration) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(QaError::IndexUnavailable(path.display().to_string()));
        }
        Ok(Self {
            db: Db::new(path),
            busy_timeout,
            idle: Mutex::new(Vec::new()),
        })
    }

    pub fn path(&self) -> &Path {
        self.db.path()
    }

    /// Current ingest bookkeeping of the index file.
    pub fn state(&self) -> Result<IndexState> {
        self.with_connection(|conn| {
            let state = conn.query_row(STATE_SQL, [], |row| {
                Ok(IndexState {
                    dumps: row.get(0)?,
                    triples: row.get(1)?,
                    last_ingested_at: row.get(2)?,
                })
            })?;
            Ok(state)
        })
    }

    /// Close the idle connections; later lookups open fresh ones.
    pub fn release_connections(&self) {
        self.idle.lock().unwrap_or_else(|e| e.into_inner()).clear();
    }

    fn with_connection<T>(&self, f: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        let pooled = self.idle.lock().unwrap_or_else(|e| e.into_inner()).pop();
        let conn = match pooled {
            Some(conn) => conn,
            None => {
                let conn = self.db.open_read_connection()?;
                conn.busy_timeout(self.busy_timeout)?;
                conn
            }
        };
        let result = f(&conn);
        let mut idle = self.idle.lock().unwrap_or_else(|e| e.into_inner());
        if idle.len() < MAX_IDLE_CONNECTIONS {
            idle.push(conn);
        }
        result
    }

    fn select(&self, sql: &str, predicate: &str, term: &str) -> Result<BTreeSet<String>> {
        self.with_connection(|conn| {
            let mut stmt = conn.prepare_cached(sql)?;
            let rows = stmt.query_map(params![predicate, term], |row| row.get::<_, String>(0))?;
            let mut out = BTreeSet::new();
            for row in rows {
                out.insert(row?);
            }
            Ok(out)
        })
    }

    #[cfg(test)]
    fn idle_connections(&self) -> usize {
        self.idle.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

impl TripleIndex for SqliteIndex {
    fn lookup_property(&self, field: &str, anchor: &str, direction: Direction) -> Result<BTreeSet<String>> {
        let values = match direction {
            Direction::Subject => self
                .select(OBJECTS_SQL, field, anchor)?
                .iter()
                .map(|o| normalize_object(o))
                .collect(),
            Direction::Object => self.select(SUBJECTS_SQL, field, anchor)?,
        };
        log::trace!("lookup {} {:?} {} -> {} values", field, direction, anchor, values.len());
        non_empty(values)
    }

    fn lookup_topics_by_label_or_type(&self, term: &str, language: &Language) -> Result<BTreeSet<Element>> {
        let mut subjects = self.select(SUBJECTS_SQL, FIELD_LABEL, &language.tagged(term))?;
        if subjects.is_empty() {
            subjects = self.select(SUBJECTS_SQL, FIELD_TYPE, term)?;
        }
        non_empty(subjects)?.into_iter().map(Element::topic).collect()
    }
}
