use clap::Parser;
use factqa::Config;
use factqa::db::{Db, migrate};
use factqa::ingest::{
    discover_dumps, ingest_dump, IngestFilter, IngestOptions,
    get_existing_hashes, classify_dumps, find_deleted_dumps, delete_dumps,
};
use std::path::{Path, PathBuf};
use std::collections::HashSet;
use std::time::Instant;
use anyhow::Result;

#[derive(Parser, Debug)]
#[command(name = "ingest")]
#[command(about = "Ingest triple dumps into a FactQA index (incremental by default)")]
struct Args {
    /// Dump file or directory of dumps
    dump_path: PathBuf,

    /// Index to build or update (default: factqa.default_index)
    #[arg(short, long)]
    index: Option<String>,

    /// Force re-ingestion of all dumps (ignore hashes)
    #[arg(short, long)]
    force: bool,

    /// Clean up dumps that no longer exist on disk
    #[arg(short, long)]
    cleanup: bool,

    /// Keep only triples about these subjects (repeatable)
    #[arg(long = "subject")]
    subjects: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logger
    env_logger::Builder::from_env(
        env_logger::Env::default()
            .filter_or("RUST_LOG", "info")
    ).init();

    let args = Args::parse();

    log::info!("Starting FactQA ingestion");

    let config = Config::load()?;
    let index_name = args.index.as_deref().unwrap_or(&config.factqa.default_index);
    let index_path = config.index_path(index_name)?;
    log::info!("Dump path: {}", args.dump_path.display());
    log::info!("Index: {} ({})", index_name, index_path.display());

    if let Some(parent) = index_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let db = Db::new(&index_path);

    // Run migrations
    let migrations_dir = Path::new("migrations");
    db.with_connection(|conn| {
        migrate::run_migrations(conn, migrations_dir)
    }).await?;

    log::info!("Index initialized");

    let dumps = discover_dumps(&args.dump_path)?;
    if dumps.is_empty() {
        log::warn!("No dump files found. Supported extensions: {}", factqa::ingest::DUMP_EXTENSIONS.join(", "));
        return Ok(());
    }

    let existing_hashes = get_existing_hashes(&db).await?;
    let classification = classify_dumps(&dumps, &existing_hashes)?;
    let num_new = classification.new_dumps.len();
    let num_modified = classification.modified_dumps.len();
    let num_unchanged = classification.unchanged_dumps.len();

    let to_process: Vec<_> = if args.force {
        log::info!("Mode: full re-ingestion (all dumps)");
        dumps.clone()
    } else {
        log::info!("Classification: new={}, modified={}, unchanged (skip)={}", num_new, num_modified, num_unchanged);
        classification.new_dumps.into_iter()
            .chain(classification.modified_dumps)
            .collect()
    };

    let mut options = IngestOptions::from_config(&config.ingest);
    if !args.subjects.is_empty() {
        options.filter = IngestFilter::new()
            .with_predicates(config.ingest.predicates.iter().cloned())
            .with_subjects(args.subjects.iter().cloned());
    }

    let start = Instant::now();
    let total = to_process.len();
    let mut total_triples = 0usize;
    let mut total_skipped = 0usize;
    let mut errors = 0usize;

    for (idx, dump) in to_process.iter().enumerate() {
        log::info!("[{}/{}] Processing: {}", idx + 1, total, dump.relative_path);
        match ingest_dump(&db, dump, &options).await {
            Ok(stats) => {
                total_triples += stats.triples;
                total_skipped += stats.skipped;
                log::info!("✓ {} ({} triples, {} lines skipped)", dump.relative_path, stats.triples, stats.skipped);
            }
            Err(e) => {
                errors += 1;
                log::error!("✗ {}: {}", dump.relative_path, e);
            }
        }
    }

    let elapsed = start.elapsed();

    // Dumps recorded in the index but gone from disk; only meaningful for a directory walk
    let deleted = if args.dump_path.is_dir() {
        let on_disk: HashSet<String> = dumps.iter().map(|d| d.relative_path.clone()).collect();
        find_deleted_dumps(&db, &on_disk).await?
    } else {
        Vec::new()
    };
    let removed_triples = if !deleted.is_empty() && args.cleanup {
        log::info!("Removing {} dump(s) no longer on disk", deleted.len());
        delete_dumps(&db, &deleted).await?
    } else {
        if !deleted.is_empty() {
            log::info!("Found {} dump(s) in the index that no longer exist on disk (use --cleanup to remove)", deleted.len());
        }
        0
    };

    log::info!("=== Ingestion Complete ===");
    log::info!("Dumps discovered: {}", dumps.len());
    log::info!("  New: {}", num_new);
    log::info!("  Modified: {}", num_modified);
    log::info!("  Unchanged (skipped): {}", num_unchanged);
    log::info!("Dumps processed: {} (errors: {})", total, errors);
    log::info!("Triples inserted: {}", total_triples);
    log::info!("Lines skipped: {}", total_skipped);
    if removed_triples > 0 {
        log::info!("Triples removed with deleted dumps: {}", removed_triples);
    }
    log::info!("Time: {:?}", elapsed);

    if errors > 0 {
        log::warn!("Some dumps failed to ingest. Check logs above for details.");
    }

    Ok(())
}
