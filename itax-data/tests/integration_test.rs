//! Slab loading against the SQLite backend.

use itax_core::{
    IncomeBreakdown, Regime, RegimeParameters, RepositoryError, TaxLiabilityEngine, TaxRepository,
};
use itax_data::{TaxSlabLoader, TaxSlabLoaderError};
use itax_db_sqlite::SqliteRepository;
use pretty_assertions::assert_eq;
use rust_decimal_macros::dec;
use sqlx::sqlite::SqlitePoolOptions;

const TEST_CSV: &str = include_str!("../test-data/tax_slabs.csv");

async fn setup_test_db() -> SqliteRepository {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to create in-memory database");

    let repo = SqliteRepository::new_with_pool(pool).await;
    repo.run_migrations()
        .await
        .expect("Failed to run migrations");
    repo
}

#[tokio::test]
async fn load_counts_every_row() {
    let repo = setup_test_db().await;
    let records = TaxSlabLoader::parse(TEST_CSV.as_bytes()).expect("Failed to parse CSV");

    let inserted = TaxSlabLoader::load(&repo, &records)
        .await
        .expect("Failed to load slabs");

    assert_eq!(inserted, 17);
}

#[tokio::test]
async fn loaded_2025_schedules_match_statutory() {
    let repo = setup_test_db().await;
    let records = TaxSlabLoader::parse(TEST_CSV.as_bytes()).unwrap();
    TaxSlabLoader::load(&repo, &records).await.unwrap();

    for regime in Regime::ALL {
        let slabs = repo.get_tax_slabs(2025, regime).await.unwrap();
        assert_eq!(slabs, RegimeParameters::statutory(regime).slabs);
    }
}

#[tokio::test]
async fn loaded_schedule_drives_the_engine() {
    let repo = setup_test_db().await;
    let records = TaxSlabLoader::parse(TEST_CSV.as_bytes()).unwrap();
    TaxSlabLoader::load(&repo, &records).await.unwrap();

    let new = RegimeParameters {
        assessment_year: 2026,
        slabs: repo.get_tax_slabs(2026, Regime::New).await.unwrap(),
        ..RegimeParameters::new_regime()
    };
    let engine = TaxLiabilityEngine::new(RegimeParameters::old_regime(), new).unwrap();

    let result = engine
        .compute_liability(&IncomeBreakdown::salary(dec!(1675000)), dec!(0))
        .unwrap();

    // taxable 1600000: 20000 + 40000 + 60000
    assert_eq!(result.new.taxable_income, dec!(1600000));
    assert_eq!(result.new.base_tax, dec!(120000));
}

#[tokio::test]
async fn load_is_idempotent() {
    let repo = setup_test_db().await;
    let records = TaxSlabLoader::parse(TEST_CSV.as_bytes()).unwrap();

    TaxSlabLoader::load(&repo, &records).await.expect("First load failed");
    TaxSlabLoader::load(&repo, &records).await.expect("Second load failed");

    assert_eq!(repo.get_tax_slabs(2025, Regime::Old).await.unwrap().len(), 4);
    assert_eq!(repo.get_tax_slabs(2025, Regime::New).await.unwrap().len(), 6);
    assert_eq!(repo.get_tax_slabs(2026, Regime::New).await.unwrap().len(), 7);
}

#[tokio::test]
async fn load_replaces_only_groups_in_file() {
    let repo = setup_test_db().await;
    sqlx::query(
        "INSERT INTO tax_slabs (assessment_year, regime, min_income, max_income, rate) VALUES
         (2025, 'new', 0, NULL, 0.10),
         (2024, 'old', 0, NULL, 0.10)",
    )
    .execute(repo.pool())
    .await
    .expect("Failed to insert existing slabs");

    let csv = "assessment_year,regime,min_income,max_income,rate\n\
               2025,new,0,300000,0\n\
               2025,new,300000,,0.05";
    let records = TaxSlabLoader::parse(csv.as_bytes()).unwrap();
    TaxSlabLoader::load(&repo, &records).await.unwrap();

    let replaced = repo.get_tax_slabs(2025, Regime::New).await.unwrap();
    assert_eq!(replaced.len(), 2);
    assert_eq!(replaced[1].rate, dec!(0.05));
    assert_eq!(repo.get_tax_slabs(2024, Regime::Old).await.unwrap().len(), 1);
}

#[tokio::test]
async fn invalid_schedule_writes_nothing() {
    let repo = setup_test_db().await;
    let csv = "assessment_year,regime,min_income,max_income,rate\n\
               2025,old,0,250000,0\n\
               2025,old,250000,,0.05\n\
               2025,new,0,300000,0\n\
               2025,new,300000,700000,0.05";
    let records = TaxSlabLoader::parse(csv.as_bytes()).unwrap();

    let result = TaxSlabLoader::load(&repo, &records).await;

    assert!(matches!(
        result,
        Err(TaxSlabLoaderError::InvalidSchedule {
            regime: Regime::New,
            ..
        })
    ));
    assert!(repo.get_tax_slabs(2025, Regime::Old).await.unwrap().is_empty());
}

#[tokio::test]
async fn unknown_regime_is_rejected() {
    let repo = setup_test_db().await;
    let csv = "assessment_year,regime,min_income,max_income,rate\n2025,flat,0,,0.10";
    let records = TaxSlabLoader::parse(csv.as_bytes()).unwrap();

    let result = TaxSlabLoader::load(&repo, &records).await;

    assert_eq!(result, Err(TaxSlabLoaderError::InvalidRegime("flat".to_string())));
}

#[tokio::test]
async fn loading_slabs_does_not_create_regime_parameters() {
    let repo = setup_test_db().await;
    let records = TaxSlabLoader::parse(TEST_CSV.as_bytes()).unwrap();
    TaxSlabLoader::load(&repo, &records).await.unwrap();

    assert_eq!(
        repo.get_regime_parameters(2026, Regime::New).await,
        Err(RepositoryError::NotFound)
    );
}
