use std::collections::BTreeMap;
use std::fs::File;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use itax_data::{TaxSlabLoader, TaxSlabRecord};
use itax_db_sqlite::SqliteRepository;

/// Replace income-tax slab schedules with the rows of a CSV file.
///
/// Columns: assessment_year, regime (old|new), min_income, max_income
/// (empty for the top band), rate (fraction, e.g. 0.05). Every
/// (assessment_year, regime) pair in the file is replaced as a whole.
#[derive(Parser, Debug)]
#[command(name = "itax-data-loader", version, about)]
struct Args {
    /// Slab schedule CSV
    #[arg(short, long)]
    file: PathBuf,

    /// SQLite path or `sqlite:` URL; created if missing
    #[arg(short, long, default_value = "itax.db")]
    database: String,

    /// Apply schema migrations first
    #[arg(short, long)]
    migrate: bool,

    /// Apply the seed files in this directory before loading
    #[arg(short, long)]
    seeds: Option<PathBuf>,
}

fn schedules(records: &[TaxSlabRecord]) -> BTreeMap<(i32, String), usize> {
    let mut counts = BTreeMap::new();
    for record in records {
        *counts
            .entry((record.assessment_year, record.regime.trim().to_lowercase()))
            .or_insert(0) += 1;
    }
    counts
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let repo = SqliteRepository::new(&args.database)
        .await
        .with_context(|| format!("Failed to open database {}", args.database))?;

    if args.migrate {
        repo.run_migrations().await.context("Migrations failed")?;
        println!("Schema is up to date.");
    }
    if let Some(dir) = &args.seeds {
        repo.run_seeds(dir)
            .await
            .with_context(|| format!("Seeding from {} failed", dir.display()))?;
        println!("Applied seeds from {}.", dir.display());
    }

    let file = File::open(&args.file).with_context(|| format!("Failed to open {}", args.file.display()))?;
    let records = TaxSlabLoader::parse(file).with_context(|| format!("{} is not a valid slab CSV", args.file.display()))?;

    let inserted = TaxSlabLoader::load(&repo, &records)
        .await
        .context("Slab schedule rejected")?;

    for ((year, regime), slabs) in schedules(&records) {
        println!("AY {year}-{:02} {regime}: {slabs} slabs", (year + 1).rem_euclid(100));
    }
    println!("Loaded {inserted} slabs from {}.", args.file.display());

    Ok(())
}
