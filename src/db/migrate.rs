//! Schema migrations for triple index files.
//!
//! Migrations live as `NNN_name.sql` files and are applied in version order,
//! each in its own transaction, and recorded in `schema_migrations`.

use rusqlite::{Connection, params};
use std::fs;
use std::path::Path;
use crate::error::{Result, QaError};

/// Tables every triple index must contain once migrations have run
pub const EXPECTED_TABLES: &[&str] = &["dumps", "schema_migrations", "triples"];

const MIGRATIONS_TABLE_SQL: &str = "CREATE TABLE IF NOT EXISTS schema_migrations (
    version INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    applied_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
)";

#[derive(Debug)]
struct Migration {
    version: u32,
    name: String,
    sql: String,
}

impl Migration {
    /// Read `NNN_name.sql`; the numeric prefix is the version.
    fn read(path: &Path) -> Result<Self> {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| QaError::Config(format!("Invalid migration file: {}", path.display())))?;
        let name = file_name.trim_end_matches(".sql").to_string();
        let version = name
            .split('_')
            .next()
            .and_then(|prefix| prefix.parse::<u32>().ok())
            .ok_or_else(|| QaError::Config(format!("Migration without numeric version: {}", file_name)))?;
        let sql = fs::read_to_string(path)?;
        Ok(Self { version, name, sql })
    }

    fn apply(&self, conn: &mut Connection) -> Result<()> {
        let tx = conn.transaction()?;
        tx.execute_batch(&self.sql).map_err(|e| {
            QaError::Database(rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_ERROR),
                Some(format!("Failed to execute migration {}: {}", self.name, e)),
            ))
        })?;
        tx.execute(
            "INSERT INTO schema_migrations (version, name) VALUES (?1, ?2)",
            params![self.version, self.name],
        )?;
        tx.commit()?;
        Ok(())
    }
}

/// State of an index file's schema relative to a migrations directory
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaReport {
    pub missing_tables: Vec<String>,
    pub applied: Vec<String>,
    pub pending: Vec<String>,
}

impl SchemaReport {
    pub fn is_current(&self) -> bool {
        self.missing_tables.is_empty() && self.pending.is_empty()
    }
}

/// Names of applied migrations, in version order
pub fn get_applied_migrations(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn.prepare("SELECT name FROM schema_migrations ORDER BY version")?;
    let names = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<std::result::Result<Vec<_>, rusqlite::Error>>()?;
    Ok(names)
}

/// Names of the tables present in the database, sorted
pub fn list_tables(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn.prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")?;
    let tables = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<std::result::Result<Vec<_>, rusqlite::Error>>()?;
    Ok(tables)
}

fn load_migrations(migrations_dir: &Path) -> Result<Vec<Migration>> {
    let mut paths: Vec<_> = fs::read_dir(migrations_dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.extension().and_then(|s| s.to_str()) == Some("sql"))
        .collect();
    paths.sort();

    let mut migrations = paths
        .iter()
        .map(|p| Migration::read(p))
        .collect::<Result<Vec<_>>>()?;
    migrations.sort_by_key(|m| m.version);
    Ok(migrations)
}

/// Compare an index against the expected tables and the migrations on disk.
///
/// Read-only: nothing is created, so an index built before a migration was
/// added reports it as pending.
pub fn inspect_schema(conn: &Connection, migrations_dir: &Path) -> Result<SchemaReport> {
    let tables = list_tables(conn)?;
    let missing_tables: Vec<String> = EXPECTED_TABLES
        .iter()
        .filter(|t| !tables.iter().any(|present| present == *t))
        .map(|t| t.to_string())
        .collect();

    let applied = if tables.iter().any(|t| t == "schema_migrations") {
        get_applied_migrations(conn)?
    } else {
        Vec::new()
    };
    let pending = load_migrations(migrations_dir)?
        .into_iter()
        .map(|m| m.name)
        .filter(|name| !applied.contains(name))
        .collect();

    Ok(SchemaReport { missing_tables, applied, pending })
}

/// Apply every migration not yet recorded in `schema_migrations`
pub fn run_migrations(conn: &mut Connection, migrations_dir: &Path) -> Result<()> {
    conn.execute(MIGRATIONS_TABLE_SQL, [])?;

    let applied = get_applied_migrations(conn)?;
    for migration in load_migrations(migrations_dir)? {
        if applied.contains(&migration.name) {
            log::debug!("Migration {} already applied, skipping", migration.name);
            continue;
        }
        log::info!("Applying migration: {} (version {})", migration.name, migration.version);
        migration.apply(conn)?;
    }

    log::debug!("Index schema is current");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn repo_migrations() -> std::path::PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("migrations")
    }

    #[test]
    fn test_migrations_load_in_version_order() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("010_labels.sql"), "CREATE TABLE labels (id INTEGER);").unwrap();
        fs::write(temp_dir.path().join("002_dumps.sql"), "CREATE TABLE d (id INTEGER);").unwrap();
        fs::write(temp_dir.path().join("notes.txt"), "ignored").unwrap();

        let migrations = load_migrations(temp_dir.path()).unwrap();
        let versions: Vec<u32> = migrations.iter().map(|m| m.version).collect();
        assert_eq!(versions, vec![2, 10]);
        assert_eq!(migrations[1].name, "010_labels");
    }

    #[test]
    fn test_migration_without_version_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("triples.sql"), "SELECT 1;").unwrap();
        assert!(matches!(load_migrations(temp_dir.path()), Err(QaError::Config(_))));
    }

    #[test]
    fn test_full_migration_schema() {
        let temp_dir = TempDir::new().unwrap();
        let mut conn = Connection::open(temp_dir.path().join("test.db")).unwrap();

        run_migrations(&mut conn, &repo_migrations()).unwrap();

        let tables = list_tables(&conn).unwrap();
        for table in EXPECTED_TABLES {
            assert!(tables.contains(&table.to_string()), "missing table {}", table);
        }

        let indexes: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='index' AND name LIKE 'idx_%' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get::<_, String>(0))
            .unwrap()
            .collect::<std::result::Result<Vec<_>, rusqlite::Error>>()
            .unwrap();
        assert!(indexes.contains(&"idx_triples_predicate_subject".to_string()));
        assert!(indexes.contains(&"idx_triples_predicate_object".to_string()));

        // Running again is a no-op
        run_migrations(&mut conn, &repo_migrations()).unwrap();
        assert_eq!(get_applied_migrations(&conn).unwrap().len(), 2);
    }

    #[test]
    fn test_inspect_schema() {
        let temp_dir = TempDir::new().unwrap();
        let mut conn = Connection::open(temp_dir.path().join("test.db")).unwrap();

        let report = inspect_schema(&conn, &repo_migrations()).unwrap();
        assert!(!report.is_current());
        assert_eq!(report.missing_tables.len(), EXPECTED_TABLES.len());
        assert_eq!(report.pending, vec!["001_triples".to_string(), "002_dumps".to_string()]);

        run_migrations(&mut conn, &repo_migrations()).unwrap();
        let report = inspect_schema(&conn, &repo_migrations()).unwrap();
        assert!(report.is_current());
        assert_eq!(report.applied.len(), 2);
    }
}
