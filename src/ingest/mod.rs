//! Dump ingestion: discover dump files, scan them into triples and load
//! them into an index database, incrementally by file hash.

pub mod walker;
pub mod metadata;
pub mod scanner;
pub mod db_writer;
pub mod incremental;

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use flate2::read::GzDecoder;

use crate::config::IngestConfig;
use crate::db::Db;
use crate::error::Result;

pub use walker::{DumpFile, discover_dumps, DUMP_EXTENSIONS};
pub use incremental::{
    DumpClassification, classify_dumps, delete_dumps, find_deleted_dumps, get_existing_hashes,
};
pub use metadata::{compute_file_hash, dump_id};
pub use scanner::{Triple, TripleScanner, reduce_type};
pub use db_writer::{delete_dump_triples, insert_triples, record_dump, write_batch};

/// Restricts which scanned triples reach the index.
#[derive(Debug, Clone, Default)]
pub struct IngestFilter {
    predicates: Option<HashSet<String>>,
    subjects: Option<HashSet<String>>,
}

impl IngestFilter {
    /// Filter that keeps everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep only these predicates. An empty list keeps all of them.
    pub fn with_predicates<I, S>(mut self, predicates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let set: HashSet<String> = predicates.into_iter().map(Into::into).collect();
        self.predicates = (!set.is_empty()).then_some(set);
        self
    }

    /// Keep only these subjects. An empty list keeps all of them.
    pub fn with_subjects<I, S>(mut self, subjects: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let set: HashSet<String> = subjects.into_iter().map(Into::into).collect();
        self.subjects = (!set.is_empty()).then_some(set);
        self
    }

    pub fn accepts(&self, triple: &Triple) -> bool {
        self.predicates.as_ref().map_or(true, |p| p.contains(&triple.predicate))
            && self.subjects.as_ref().map_or(true, |s| s.contains(&triple.subject))
    }
}

/// Knobs for one ingestion run
#[derive(Debug, Clone)]
pub struct IngestOptions {
    pub batch_size: usize,
    pub max_object_len: usize,
    pub filter: IngestFilter,
}

impl IngestOptions {
    pub fn from_config(config: &IngestConfig) -> Self {
        Self {
            batch_size: config.batch_size.max(1),
            max_object_len: config.max_object_len,
            filter: IngestFilter::new().with_predicates(config.predicates.iter().cloned()),
        }
    }
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self::from_config(&IngestConfig::default())
    }
}

/// Counters for one ingested dump
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DumpStats {
    pub lines: usize,
    pub triples: usize,
    /// Lines that produced no row: blank, unparseable or filtered out.
    pub skipped: usize,
}

/// Open a dump for line reading; `.gz` dumps are decompressed on the fly.
pub fn open_dump(path: &Path) -> Result<Box<dyn BufRead>> {
    let file = File::open(path)?;
    let gzipped = path
        .extension()
        .and_then(|s| s.to_str())
        .map_or(false, |ext| ext.eq_ignore_ascii_case("gz"));
    if gzipped {
        Ok(Box::new(BufReader::new(GzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Ingest a single dump file
///
/// Replaces whatever the dump contributed before, streams its lines through
/// the scanner in batches and records the dump's hash. Everything happens in
/// one transaction: a dump that fails halfway leaves its previous triples
/// in place.
pub async fn ingest_dump(db: &Db, dump: &DumpFile, options: &IngestOptions) -> Result<DumpStats> {
    let file_hash = compute_file_hash(&dump.absolute_path)?;
    let id = dump_id(&dump.relative_path);
    let relative_path = dump.relative_path.clone();
    let path = dump.absolute_path.clone();
    let options = options.clone();

    db.with_connection(move |conn| {
        let tx = conn.transaction()?;
        let replaced = delete_dump_triples(&tx, &id)?;
        if replaced > 0 {
            log::debug!("Replacing {} previous triples of {}", replaced, relative_path);
        }

        let scanner = TripleScanner::new(options.max_object_len);
        let reader = open_dump(&path)?;
        let mut stats = DumpStats::default();
        let mut batch = Vec::with_capacity(options.batch_size);

        for line in reader.lines() {
            let line = line?;
            stats.lines += 1;
            match scanner.scan_line(&line) {
                Some(triple) if options.filter.accepts(&triple) => {
                    batch.push(triple);
                    if batch.len() >= options.batch_size {
                        stats.triples += insert_triples(&tx, &id, &batch)?;
                        batch.clear();
                    }
                }
                _ => stats.skipped += 1,
            }
        }
        stats.triples += insert_triples(&tx, &id, &batch)?;

        record_dump(&tx, &id, &relative_path, &file_hash, stats.triples)?;
        tx.commit()?;
        Ok(stats)
    })
    .await
}
