//! Incremental ingestion: skip unchanged dumps by comparing file hashes with the index.
//!
//! Only new or modified dumps are scanned again; a modified dump's previous
//! triples are replaced as a whole.

use std::collections::{HashMap, HashSet};

use rusqlite::params;

use crate::db::Db;
use crate::error::{QaError, Result};
use super::metadata::{compute_file_hash, dump_id};
use super::walker::DumpFile;

/// Result of classifying discovered dumps against the index.
#[derive(Debug, Default)]
pub struct DumpClassification {
    /// Dumps never ingested into this index.
    pub new_dumps: Vec<DumpFile>,
    /// Dumps recorded with a different hash.
    pub modified_dumps: Vec<DumpFile>,
    /// Dumps recorded with the same hash (skipped).
    pub unchanged_dumps: Vec<DumpFile>,
}

/// Load every recorded dump path with its stored file hash.
pub async fn get_existing_hashes(db: &Db) -> Result<HashMap<String, String>> {
    db.with_connection(|conn| {
        let mut stmt = conn.prepare("SELECT dump_path, file_hash FROM dumps")?;
        let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?;
        let mut map = HashMap::new();
        for row in rows {
            let (path, hash) = row?;
            map.insert(path, hash);
        }
        Ok::<HashMap<String, String>, QaError>(map)
    })
    .await
}

/// Classify discovered dumps into new, modified, or unchanged.
pub fn classify_dumps(dumps: &[DumpFile], existing_hashes: &HashMap<String, String>) -> Result<DumpClassification> {
    let mut classification = DumpClassification::default();

    for dump in dumps {
        let current_hash = compute_file_hash(&dump.absolute_path)?;
        match existing_hashes.get(&dump.relative_path) {
            None => classification.new_dumps.push(dump.clone()),
            Some(stored) if stored != &current_hash => classification.modified_dumps.push(dump.clone()),
            Some(_) => classification.unchanged_dumps.push(dump.clone()),
        }
    }

    Ok(classification)
}

/// Recorded dump paths that are no longer among `existing_dumps`.
pub async fn find_deleted_dumps(db: &Db, existing_dumps: &HashSet<String>) -> Result<Vec<String>> {
    let recorded = get_existing_hashes(db).await?;
    let mut deleted: Vec<String> = recorded
        .into_keys()
        .filter(|path| !existing_dumps.contains(path))
        .collect();
    deleted.sort();
    Ok(deleted)
}

/// Delete dumps and all their triples. Returns the number of triples removed.
pub async fn delete_dumps(db: &Db, dump_paths: &[String]) -> Result<usize> {
    if dump_paths.is_empty() {
        return Ok(0);
    }

    let paths = dump_paths.to_vec();
    db.with_connection(move |conn| {
        let tx = conn.transaction()?;
        let mut removed = 0;
        for path in &paths {
            let id = dump_id(path);
            removed += tx.execute("DELETE FROM triples WHERE dump_id = ?1", params![id])?;
            tx.execute("DELETE FROM dumps WHERE dump_id = ?1", params![id])?;
        }
        tx.commit()?;
        Ok::<usize, QaError>(removed)
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::db_writer::{record_dump, write_batch};
    use crate::ingest::scanner::Triple;
    use std::io::Write;
    use std::path::PathBuf;

    fn dump_file(relative_path: &str, absolute_path: &std::path::Path) -> DumpFile {
        DumpFile {
            relative_path: relative_path.to_string(),
            absolute_path: absolute_path.to_path_buf(),
            file_size: 0,
        }
    }

    fn temp_dump(content: &[u8]) -> tempfile::NamedTempFile {
        let temp = tempfile::NamedTempFile::new().unwrap();
        temp.as_file().write_all(content).unwrap();
        temp.as_file().sync_all().unwrap();
        temp
    }

    #[test]
    fn test_classify_dumps() {
        let new = temp_dump(b"a1 label A @en");
        let same = temp_dump(b"b1 label B @en");
        let changed = temp_dump(b"c1 label C @en");

        let dumps = vec![
            dump_file("new.nt", new.path()),
            dump_file("same.nt", same.path()),
            dump_file("changed.nt", changed.path()),
        ];
        let mut existing = HashMap::new();
        existing.insert("same.nt".to_string(), compute_file_hash(same.path()).unwrap());
        existing.insert("changed.nt".to_string(), "old_hash_placeholder".to_string());

        let classification = classify_dumps(&dumps, &existing).unwrap();
        assert_eq!(classification.new_dumps.len(), 1);
        assert_eq!(classification.new_dumps[0].relative_path, "new.nt");
        assert_eq!(classification.modified_dumps.len(), 1);
        assert_eq!(classification.modified_dumps[0].relative_path, "changed.nt");
        assert_eq!(classification.unchanged_dumps.len(), 1);
    }

    async fn setup_test_db() -> (Db, tempfile::TempDir) {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let db = Db::new(temp_dir.path().join("test.db"));
        let migrations_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("migrations");
        db.with_connection(move |conn| crate::db::migrate::run_migrations(conn, &migrations_dir))
            .await
            .unwrap();
        (db, temp_dir)
    }

    async fn seed_dump(db: &Db, path: &str, hash: &str) {
        let path = path.to_string();
        let hash = hash.to_string();
        db.with_connection(move |conn| {
            let id = dump_id(&path);
            let rows = [Triple {
                subject: "m.0a1".into(),
                predicate: "label".into(),
                object: format!("{} @en", path),
            }];
            let n = write_batch(conn, &id, &rows)?;
            record_dump(conn, &id, &path, &hash, n)
        })
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_get_existing_hashes() {
        let (db, _temp_dir) = setup_test_db().await;
        seed_dump(&db, "films.nt", "abc123").await;
        let hashes = get_existing_hashes(&db).await.unwrap();
        assert_eq!(hashes.len(), 1);
        assert_eq!(hashes.get("films.nt"), Some(&"abc123".to_string()));
    }

    #[tokio::test]
    async fn test_find_and_delete_dumps() {
        let (db, _temp_dir) = setup_test_db().await;
        seed_dump(&db, "gone.nt", "h1").await;
        seed_dump(&db, "kept.nt", "h2").await;

        let on_disk: HashSet<String> = ["kept.nt".to_string()].into_iter().collect();
        let deleted = find_deleted_dumps(&db, &on_disk).await.unwrap();
        assert_eq!(deleted, vec!["gone.nt".to_string()]);

        assert_eq!(delete_dumps(&db, &deleted).await.unwrap(), 1);
        let hashes = get_existing_hashes(&db).await.unwrap();
        assert_eq!(hashes.len(), 1);
        assert!(hashes.contains_key("kept.nt"));

        let triples: i64 = db
            .with_connection(|conn| Ok::<i64, QaError>(conn.query_row("SELECT COUNT(*) FROM triples", [], |r| r.get(0))?))
            .await
            .unwrap();
        assert_eq!(triples, 1);
    }

    #[tokio::test]
    async fn test_delete_nothing() {
        let (db, _temp_dir) = setup_test_db().await;
        assert_eq!(delete_dumps(&db, &[]).await.unwrap(), 0);
    }
}
