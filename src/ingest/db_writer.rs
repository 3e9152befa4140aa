use rusqlite::{params, Connection};
use chrono::Utc;
use crate::error::Result;
use super::scanner::Triple;

/// Insert one batch of triples for `dump_id` inside a single transaction.
///
/// Rows already present for the dump are ignored. Returns the number of
/// rows actually inserted.
pub fn write_batch(conn: &mut Connection, dump_id: &str, batch: &[Triple]) -> Result<usize> {
    if batch.is_empty() {
        return Ok(0);
    }

    let tx = conn.transaction()?;
    let inserted = insert_triples(&tx, dump_id, batch)?;
    tx.commit()?;
    Ok(inserted)
}

/// Insert triples on `conn` without opening a transaction of its own.
///
/// Callers that must keep a dump's rows all-or-nothing run this inside
/// their own transaction.
pub fn insert_triples(conn: &Connection, dump_id: &str, batch: &[Triple]) -> Result<usize> {
    let mut stmt = conn.prepare_cached(
        "INSERT OR IGNORE INTO triples (subject, predicate, object, dump_id) VALUES (?1, ?2, ?3, ?4)",
    )?;
    let mut inserted = 0;
    for triple in batch {
        inserted += stmt.execute(params![triple.subject, triple.predicate, triple.object, dump_id])?;
    }
    Ok(inserted)
}

/// Insert or update the bookkeeping row of an ingested dump.
pub fn record_dump(
    conn: &Connection,
    dump_id: &str,
    dump_path: &str,
    file_hash: &str,
    triple_count: usize,
) -> Result<()> {
    conn.execute(
        r#"
        INSERT INTO dumps (dump_id, dump_path, file_hash, triple_count, ingested_at)
        VALUES (?1, ?2, ?3, ?4, ?5)
        ON CONFLICT(dump_id) DO UPDATE SET
            dump_path = excluded.dump_path,
            file_hash = excluded.file_hash,
            triple_count = excluded.triple_count,
            ingested_at = excluded.ingested_at
        "#,
        params![dump_id, dump_path, file_hash, triple_count as i64, Utc::now().to_rfc3339()],
    )?;
    Ok(())
}

/// Remove every triple contributed by `dump_id`. Returns the number of rows deleted.
pub fn delete_dump_triples(conn: &Connection, dump_id: &str) -> Result<usize> {
    Ok(conn.execute("DELETE FROM triples WHERE dump_id = ?1", params![dump_id])?)
}
