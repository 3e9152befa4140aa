use factqa::Config;
use factqa::cache::CachedIndex;
use factqa::db::{Db, migrate};
use factqa::error::QaError;
use factqa::index::SqliteIndex;
use factqa::qa::Engine;
use factqa::server::{run_with_timeout, QaServer};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt};
use std::path::Path;
use std::sync::Arc;
use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    // RUST_LOG wins over factqa.log_level
    let default_level = Config::load()
        .map(|c| c.factqa.log_level)
        .unwrap_or_else(|_| "info".to_string());
    env_logger::Builder::from_env(
        env_logger::Env::default()
            .filter_or("RUST_LOG", default_level)
    ).init();

    // Parse command-line arguments
    let args: Vec<String> = std::env::args().collect();
    let command = args.get(1).map(|s| s.as_str()).unwrap_or("verify");
    let index_arg = args.get(2).map(|s| s.as_str());

    match command {
        "serve" => run_server().await?,
        "ask" => run_console(index_arg).await?,
        "verify" | _ => run_index_verification(index_arg).await?,
    }

    Ok(())
}

/// Run the line protocol server
async fn run_server() -> Result<()> {
    log::info!("Starting FactQA server v{}", env!("CARGO_PKG_VERSION"));

    let config = Config::load()?;
    log::info!("Index root: {}", config.index_root().display());
    log::info!("Language: {}", config.language());

    let server = Arc::new(QaServer::from_config(&config));
    server.serve(&config.listen_addr()).await?;

    Ok(())
}

/// Answer questions read from stdin, one per line
///
/// Each question runs on the blocking pool under the lookup timeout, as it
/// would through the server.
async fn run_console(index_arg: Option<&str>) -> Result<()> {
    let config = Config::load()?;
    let name = index_arg.unwrap_or(&config.factqa.default_index);
    let path = config.index_path(name)?;

    let index = CachedIndex::new(
        SqliteIndex::open(&path, config.lookup_timeout())?,
        config.server.lookup_cache_capacity,
    );
    let engine = Arc::new(Engine::with_catalog(index, Arc::new(config.catalog()), config.language()));
    let timeout = config.lookup_timeout();
    log::info!("Asking index {} ({})", name, path.display());

    let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    while let Some(question) = lines.next_line().await? {
        if question.trim().is_empty() {
            continue;
        }
        let engine = engine.clone();
        let asked = question.clone();
        let reply = match run_with_timeout(timeout, move || engine.answer(&asked)).await {
            Ok(text) => text,
            Err(e) => {
                log::debug!("{}: {}", question, e);
                e.user_message().to_string()
            }
        };
        stdout.write_all(format!("{}\n", reply).as_bytes()).await?;
        stdout.flush().await?;
    }

    Ok(())
}

/// Verify that an index exists and carries the expected schema
async fn run_index_verification(index_arg: Option<&str>) -> Result<()> {
    log::info!("Starting FactQA v{}", env!("CARGO_PKG_VERSION"));

    let config = Config::load()?;
    log::info!("Configuration loaded successfully");
    let name = index_arg.unwrap_or(&config.factqa.default_index);
    let path = config.index_path(name)?;
    log::info!("Index path: {}", path.display());

    if !path.is_file() {
        anyhow::bail!("Index {} not found at {}. Build it with the ingest binary first.", name, path.display());
    }

    let db = Db::new(&path);
    let migrations_dir = Path::new("migrations");
    let (triples, dumps) = db.with_connection(move |conn| {
        let report = migrate::inspect_schema(conn, migrations_dir)?;
        for table in &report.missing_tables {
            log::error!("Missing table: {}", table);
        }
        if !report.missing_tables.is_empty() {
            return Err(QaError::Config("Not all required tables exist".to_string()));
        }
        log::debug!("✓ {} migrations applied", report.applied.len());
        for name in &report.pending {
            log::warn!("Migration {} not applied; re-run ingest to update the index", name);
        }

        let integrity: String = conn.query_row("PRAGMA integrity_check", [], |row| row.get(0))?;
        if integrity != "ok" {
            return Err(QaError::Config(format!("Index integrity check failed: {}", integrity)));
        }
        log::info!("✓ Index integrity: OK");

        let triples: i64 = conn.query_row("SELECT COUNT(*) FROM triples", [], |row| row.get(0))?;
        let dumps: i64 = conn.query_row("SELECT COUNT(*) FROM dumps", [], |row| row.get(0))?;
        Ok((triples, dumps))
    }).await?;

    log::info!("✓ Index {} verified: {} triples from {} dump(s)", name, triples, dumps);
    Ok(())
}
