use factqa::{config::Config, db::Db, error::QaError};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::load()?;
    let name = std::env::args().nth(1).unwrap_or_else(|| config.factqa.default_index.clone());
    let path = config.index_path(&name)?;
    if !path.is_file() {
        return Err(format!("Index {} not found at {}", name, path.display()).into());
    }
    let db = Db::new(&path);

    println!("\n=== FactQA Index Statistics: {} ===\n", name);

    let (predicates, dumps) = db.with_connection(|conn| {
        let mut stmt = conn.prepare(
            r#"
            SELECT predicate, COUNT(*) AS count, COUNT(DISTINCT subject) AS subjects
            FROM triples
            GROUP BY predicate
            ORDER BY count DESC, predicate
            "#
        )?;
        let mut rows = stmt.query([])?;
        let mut predicates = Vec::new();
        while let Some(row) = rows.next()? {
            predicates.push((
                row.get::<_, String>(0)?,
                row.get::<_, i64>(1)?, // triples
                row.get::<_, i64>(2)?, // distinct subjects
            ));
        }

        let mut stmt = conn.prepare(
            "SELECT dump_path, triple_count, ingested_at FROM dumps ORDER BY dump_path"
        )?;
        let mut rows = stmt.query([])?;
        let mut dumps = Vec::new();
        while let Some(row) = rows.next()? {
            dumps.push((
                row.get::<_, String>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, String>(2)?,
            ));
        }

        Ok::<_, QaError>((predicates, dumps))
    }).await?;

    if predicates.is_empty() {
        println!("The index holds no triples.");
        println!("\nRun the ingest binary to load a dump.");
        return Ok(());
    }

    let total: i64 = predicates.iter().map(|(_, count, _)| count).sum();
    println!("Triples per predicate ({} total):\n", total);
    println!("{:-<80}", "");
    println!("{:<50} {:>12} {:>14}", "Predicate", "Triples", "Subjects");
    println!("{:-<80}", "");
    for (predicate, count, subjects) in &predicates {
        println!("{:<50} {:>12} {:>14}", predicate, count, subjects);
    }
    println!("{:-<80}", "");

    println!("\nRecorded dumps:\n");
    println!("{:<46} {:>10}  {}", "Dump", "Triples", "Ingested at");
    println!("{:-<80}", "");
    for (dump_path, triple_count, ingested_at) in &dumps {
        println!("{:<46} {:>10}  {}", dump_path, triple_count, ingested_at);
    }
    println!();

    Ok(())
}
