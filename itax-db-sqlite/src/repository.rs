use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use itax_core::{
    DeadlineCategory, DeductionItem, DeductionSection, IncomeBreakdown, NewDeductionItem,
    NewSavedComputation, NewTaxDeadline, NewUserProfile, Regime, RegimeParameters,
    RepositoryError, SavedComputation, SurchargeBand, TaxDeadline, TaxRepository, TaxSlab,
    UserProfile,
};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{Decode, Row, Sqlite, Type};
use tracing::{debug, info};

use crate::decimal::{decimal_to_f64, get_decimal, get_optional_decimal};

pub struct SqliteRepository {
    pool: SqlitePool,
}

impl SqliteRepository {
    /// Opens `connection_string` (a file path, `sqlite:` URL or `:memory:`),
    /// creating the file if needed.
    pub async fn new(connection_string: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(connection_string)
            .with_context(|| format!("Invalid SQLite connection string: {connection_string}"))?
            .create_if_missing(true)
            .foreign_keys(true);

        // Every connection to :memory: is a separate database.
        let pool = if connection_string.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new()
        }
        .connect_with(options)
        .await
        .with_context(|| format!("Failed to connect to database: {connection_string}"))?;

        Ok(Self { pool })
    }

    pub async fn new_with_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("Failed to run database migrations")?;
        Ok(())
    }

    /// Executes every `.sql` file in `seeds_dir`, in filename order.
    pub async fn run_seeds(
        &self,
        seeds_dir: &Path,
    ) -> Result<()> {
        let mut entries: Vec<_> = std::fs::read_dir(seeds_dir)
            .with_context(|| format!("Failed to read seeds directory '{}'", seeds_dir.display()))?
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().extension().is_some_and(|ext| ext == "sql"))
            .collect();
        entries.sort_by_key(|entry| entry.file_name());

        for entry in entries {
            let path = entry.path();
            let sql = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read seed file '{}'", path.display()))?;
            sqlx::raw_sql(&sql)
                .execute(&self.pool)
                .await
                .with_context(|| format!("Failed to execute seed file '{}'", path.display()))?;
            debug!(file = %path.display(), "applied seed file");
        }

        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn get_surcharge_bands(
        &self,
        assessment_year: i32,
        regime: Regime,
    ) -> Result<Vec<SurchargeBand>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT threshold, rate FROM surcharge_bands
             WHERE assessment_year = ? AND regime = ?
             ORDER BY threshold",
        )
        .bind(assessment_year)
        .bind(regime.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(database)?;

        rows.iter()
            .map(|row| {
                Ok(SurchargeBand {
                    threshold: get_decimal(row, "threshold")?,
                    rate: get_decimal(row, "rate")?,
                })
            })
            .collect()
    }

    async fn get_deadline(
        &self,
        id: i64,
    ) -> Result<TaxDeadline, RepositoryError> {
        let row = sqlx::query(
            "SELECT id, assessment_year, title, description, due_date, category, completed
             FROM tax_deadline WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(database)?
        .ok_or(RepositoryError::NotFound)?;

        row_to_deadline(&row)
    }

    async fn get_deduction(
        &self,
        id: i64,
    ) -> Result<DeductionItem, RepositoryError> {
        let row = sqlx::query(
            "SELECT id, profile_id, assessment_year, section, description, amount, created_at
             FROM deduction_item WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(database)?
        .ok_or(RepositoryError::NotFound)?;

        row_to_deduction(&row)
    }
}

fn database(e: sqlx::Error) -> RepositoryError {
    RepositoryError::Database(e.to_string())
}

fn column<'r, T>(
    row: &'r SqliteRow,
    name: &str,
) -> Result<T, RepositoryError>
where
    T: Decode<'r, Sqlite> + Type<Sqlite>,
{
    row.try_get(name)
        .map_err(|e| RepositoryError::Database(format!("Failed to get {name}: {e}")))
}

fn regime_column(
    row: &SqliteRow,
    name: &str,
) -> Result<Regime, RepositoryError> {
    let raw: String = column(row, name)?;
    Regime::parse(&raw).ok_or_else(|| RepositoryError::Database(format!("Invalid regime: {raw}")))
}

fn ensure_affected(rows_affected: u64) -> Result<(), RepositoryError> {
    if rows_affected == 0 {
        return Err(RepositoryError::NotFound);
    }
    Ok(())
}

fn row_to_slab(row: &SqliteRow) -> Result<TaxSlab, RepositoryError> {
    Ok(TaxSlab {
        assessment_year: column(row, "assessment_year")?,
        regime: regime_column(row, "regime")?,
        min_income: get_decimal(row, "min_income")?,
        max_income: get_optional_decimal(row, "max_income")?,
        rate: get_decimal(row, "rate")?,
    })
}

fn row_to_profile(row: &SqliteRow) -> Result<UserProfile, RepositoryError> {
    let preferred: Option<String> = column(row, "preferred_regime")?;
    let preferred_regime = preferred
        .map(|raw| {
            Regime::parse(&raw)
                .ok_or_else(|| RepositoryError::Database(format!("Invalid regime: {raw}")))
        })
        .transpose()?;

    Ok(UserProfile {
        id: column(row, "id")?,
        name: column(row, "name")?,
        pan: column(row, "pan")?,
        preferred_regime,
        created_at: column::<DateTime<Utc>>(row, "created_at")?,
        updated_at: column::<DateTime<Utc>>(row, "updated_at")?,
    })
}

fn row_to_deduction(row: &SqliteRow) -> Result<DeductionItem, RepositoryError> {
    let code: String = column(row, "section")?;
    let section = DeductionSection::parse(&code)
        .ok_or_else(|| RepositoryError::Database(format!("Invalid deduction section: {code}")))?;

    Ok(DeductionItem {
        id: column(row, "id")?,
        profile_id: column(row, "profile_id")?,
        assessment_year: column(row, "assessment_year")?,
        section,
        description: column(row, "description")?,
        amount: get_decimal(row, "amount")?,
        created_at: column::<DateTime<Utc>>(row, "created_at")?,
    })
}

fn row_to_computation(row: &SqliteRow) -> Result<SavedComputation, RepositoryError> {
    Ok(SavedComputation {
        id: column(row, "id")?,
        profile_id: column(row, "profile_id")?,
        assessment_year: column(row, "assessment_year")?,
        income: IncomeBreakdown {
            salary: get_decimal(row, "salary")?,
            house_property: get_decimal(row, "house_property")?,
            business_profession: get_decimal(row, "business_profession")?,
            capital_gains: get_decimal(row, "capital_gains")?,
            other_sources: get_decimal(row, "other_sources")?,
        },
        deductions: get_decimal(row, "deductions")?,
        old_final_tax: get_decimal(row, "old_final_tax")?,
        new_final_tax: get_decimal(row, "new_final_tax")?,
        recommended_regime: regime_column(row, "recommended_regime")?,
        savings: get_decimal(row, "savings")?,
        created_at: column::<DateTime<Utc>>(row, "created_at")?,
    })
}

fn row_to_deadline(row: &SqliteRow) -> Result<TaxDeadline, RepositoryError> {
    let category: String = column(row, "category")?;
    Ok(TaxDeadline {
        id: column(row, "id")?,
        assessment_year: column(row, "assessment_year")?,
        title: column(row, "title")?,
        description: column(row, "description")?,
        due_date: column::<NaiveDate>(row, "due_date")?,
        category: DeadlineCategory::parse(&category).ok_or_else(|| {
            RepositoryError::Database(format!("Invalid deadline category: {category}"))
        })?,
        completed: column(row, "completed")?,
    })
}

const COMPUTATION_COLUMNS: &str = "id, profile_id, assessment_year, salary, house_property,
    business_profession, capital_gains, other_sources, deductions, old_final_tax,
    new_final_tax, recommended_regime, savings, created_at";

#[async_trait]
impl TaxRepository for SqliteRepository {
    async fn get_regime_parameters(
        &self,
        assessment_year: i32,
        regime: Regime,
    ) -> Result<RegimeParameters, RepositoryError> {
        let row = sqlx::query(
            "SELECT standard_deduction, rebate_ceiling, rebate_cap, cess_rate,
                    allows_itemized_deductions
             FROM regime_config WHERE assessment_year = ? AND regime = ?",
        )
        .bind(assessment_year)
        .bind(regime.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(database)?
        .ok_or(RepositoryError::NotFound)?;

        Ok(RegimeParameters {
            assessment_year,
            regime,
            standard_deduction: get_decimal(&row, "standard_deduction")?,
            rebate_ceiling: get_decimal(&row, "rebate_ceiling")?,
            rebate_cap: get_decimal(&row, "rebate_cap")?,
            cess_rate: get_decimal(&row, "cess_rate")?,
            allows_itemized_deductions: column(&row, "allows_itemized_deductions")?,
            slabs: self.get_tax_slabs(assessment_year, regime).await?,
            surcharge_bands: self.get_surcharge_bands(assessment_year, regime).await?,
        })
    }

    async fn list_assessment_years(&self) -> Result<Vec<i32>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT DISTINCT assessment_year FROM regime_config ORDER BY assessment_year DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(database)?;

        rows.iter().map(|row| column(row, "assessment_year")).collect()
    }

    async fn get_tax_slabs(
        &self,
        assessment_year: i32,
        regime: Regime,
    ) -> Result<Vec<TaxSlab>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT assessment_year, regime, min_income, max_income, rate
             FROM tax_slabs
             WHERE assessment_year = ? AND regime = ?
             ORDER BY min_income",
        )
        .bind(assessment_year)
        .bind(regime.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(database)?;

        rows.iter().map(row_to_slab).collect()
    }

    async fn insert_tax_slab(
        &self,
        slab: &TaxSlab,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO tax_slabs (assessment_year, regime, min_income, max_income, rate)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(slab.assessment_year)
        .bind(slab.regime.as_str())
        .bind(decimal_to_f64(slab.min_income))
        .bind(slab.max_income.map(decimal_to_f64))
        .bind(decimal_to_f64(slab.rate))
        .execute(&self.pool)
        .await
        .map_err(database)?;

        Ok(())
    }

    async fn delete_tax_slabs(
        &self,
        assessment_year: i32,
        regime: Regime,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM tax_slabs WHERE assessment_year = ? AND regime = ?")
            .bind(assessment_year)
            .bind(regime.as_str())
            .execute(&self.pool)
            .await
            .map_err(database)?;

        debug!(
            assessment_year,
            %regime,
            deleted = result.rows_affected(),
            "deleted tax slabs"
        );
        Ok(())
    }

    async fn replace_tax_slabs(
        &self,
        assessment_year: i32,
        regime: Regime,
        slabs: &[TaxSlab],
    ) -> Result<usize, RepositoryError> {
        // Dropping the transaction on an early return rolls it back.
        let mut tx = self.pool.begin().await.map_err(database)?;

        sqlx::query("DELETE FROM tax_slabs WHERE assessment_year = ? AND regime = ?")
            .bind(assessment_year)
            .bind(regime.as_str())
            .execute(&mut *tx)
            .await
            .map_err(database)?;

        for slab in slabs {
            sqlx::query(
                "INSERT INTO tax_slabs (assessment_year, regime, min_income, max_income, rate)
                 VALUES (?, ?, ?, ?, ?)",
            )
            .bind(assessment_year)
            .bind(regime.as_str())
            .bind(decimal_to_f64(slab.min_income))
            .bind(slab.max_income.map(decimal_to_f64))
            .bind(decimal_to_f64(slab.rate))
            .execute(&mut *tx)
            .await
            .map_err(database)?;
        }

        tx.commit().await.map_err(database)?;
        debug!(assessment_year, %regime, slabs = slabs.len(), "replaced tax slabs");
        Ok(slabs.len())
    }

    async fn create_profile(
        &self,
        profile: NewUserProfile,
    ) -> Result<UserProfile, RepositoryError> {
        let now = Utc::now();
        let result = sqlx::query(
            "INSERT INTO user_profile (name, pan, preferred_regime, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&profile.name)
        .bind(&profile.pan)
        .bind(profile.preferred_regime.map(|r| r.as_str()))
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(database)?;

        let id = result.last_insert_rowid();
        info!(id, name = %profile.name, "created profile");
        self.get_profile(id).await
    }

    async fn get_profile(
        &self,
        id: i64,
    ) -> Result<UserProfile, RepositoryError> {
        let row = sqlx::query(
            "SELECT id, name, pan, preferred_regime, created_at, updated_at
             FROM user_profile WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(database)?
        .ok_or(RepositoryError::NotFound)?;

        row_to_profile(&row)
    }

    async fn update_profile(
        &self,
        profile: &UserProfile,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE user_profile SET name = ?, pan = ?, preferred_regime = ?, updated_at = ?
             WHERE id = ?",
        )
        .bind(&profile.name)
        .bind(&profile.pan)
        .bind(profile.preferred_regime.map(|r| r.as_str()))
        .bind(Utc::now())
        .bind(profile.id)
        .execute(&self.pool)
        .await
        .map_err(database)?;

        ensure_affected(result.rows_affected())
    }

    async fn list_profiles(&self) -> Result<Vec<UserProfile>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT id, name, pan, preferred_regime, created_at, updated_at
             FROM user_profile ORDER BY name, id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(database)?;

        rows.iter().map(row_to_profile).collect()
    }

    async fn add_deduction(
        &self,
        item: NewDeductionItem,
    ) -> Result<DeductionItem, RepositoryError> {
        self.get_profile(item.profile_id).await?;

        let result = sqlx::query(
            "INSERT INTO deduction_item (
                profile_id, assessment_year, section, description, amount, created_at
            ) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(item.profile_id)
        .bind(item.assessment_year)
        .bind(item.section.as_str())
        .bind(&item.description)
        .bind(decimal_to_f64(item.amount))
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(database)?;

        let id = result.last_insert_rowid();
        info!(id, profile_id = item.profile_id, section = %item.section, "added deduction");
        self.get_deduction(id).await
    }

    async fn list_deductions(
        &self,
        profile_id: i64,
        assessment_year: i32,
    ) -> Result<Vec<DeductionItem>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT id, profile_id, assessment_year, section, description, amount, created_at
             FROM deduction_item
             WHERE profile_id = ? AND assessment_year = ?
             ORDER BY id",
        )
        .bind(profile_id)
        .bind(assessment_year)
        .fetch_all(&self.pool)
        .await
        .map_err(database)?;

        rows.iter().map(row_to_deduction).collect()
    }

    async fn delete_deduction(
        &self,
        id: i64,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM deduction_item WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(database)?;

        ensure_affected(result.rows_affected())
    }

    async fn save_computation(
        &self,
        computation: NewSavedComputation,
    ) -> Result<SavedComputation, RepositoryError> {
        let income = computation.income;
        let result = sqlx::query(
            "INSERT INTO saved_computation (
                profile_id, assessment_year, salary, house_property, business_profession,
                capital_gains, other_sources, deductions, old_final_tax, new_final_tax,
                recommended_regime, savings, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(computation.profile_id)
        .bind(computation.assessment_year)
        .bind(decimal_to_f64(income.salary))
        .bind(decimal_to_f64(income.house_property))
        .bind(decimal_to_f64(income.business_profession))
        .bind(decimal_to_f64(income.capital_gains))
        .bind(decimal_to_f64(income.other_sources))
        .bind(decimal_to_f64(computation.deductions))
        .bind(decimal_to_f64(computation.old_final_tax))
        .bind(decimal_to_f64(computation.new_final_tax))
        .bind(computation.recommended_regime.as_str())
        .bind(decimal_to_f64(computation.savings))
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(database)?;

        let id = result.last_insert_rowid();
        info!(id, "saved computation");
        self.get_computation(id).await
    }

    async fn get_computation(
        &self,
        id: i64,
    ) -> Result<SavedComputation, RepositoryError> {
        let row = sqlx::query(&format!("SELECT {COMPUTATION_COLUMNS} FROM saved_computation WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(database)?
            .ok_or(RepositoryError::NotFound)?;

        row_to_computation(&row)
    }

    async fn list_computations(
        &self,
        profile_id: Option<i64>,
        assessment_year: Option<i32>,
    ) -> Result<Vec<SavedComputation>, RepositoryError> {
        let rows = sqlx::query(&format!(
            "SELECT {COMPUTATION_COLUMNS} FROM saved_computation
             WHERE (?1 IS NULL OR profile_id = ?1)
               AND (?2 IS NULL OR assessment_year = ?2)
             ORDER BY created_at DESC, id DESC"
        ))
        .bind(profile_id)
        .bind(assessment_year)
        .fetch_all(&self.pool)
        .await
        .map_err(database)?;

        rows.iter().map(row_to_computation).collect()
    }

    async fn delete_computation(
        &self,
        id: i64,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM saved_computation WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(database)?;

        ensure_affected(result.rows_affected())
    }

    async fn create_deadline(
        &self,
        deadline: NewTaxDeadline,
    ) -> Result<TaxDeadline, RepositoryError> {
        let result = sqlx::query(
            "INSERT INTO tax_deadline (assessment_year, title, description, due_date, category)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(deadline.assessment_year)
        .bind(&deadline.title)
        .bind(&deadline.description)
        .bind(deadline.due_date)
        .bind(deadline.category.as_str())
        .execute(&self.pool)
        .await
        .map_err(database)?;

        self.get_deadline(result.last_insert_rowid()).await
    }

    async fn list_deadlines(
        &self,
        assessment_year: i32,
        pending_only: bool,
    ) -> Result<Vec<TaxDeadline>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT id, assessment_year, title, description, due_date, category, completed
             FROM tax_deadline
             WHERE assessment_year = ? AND (? = 0 OR completed = 0)
             ORDER BY due_date, id",
        )
        .bind(assessment_year)
        .bind(pending_only)
        .fetch_all(&self.pool)
        .await
        .map_err(database)?;

        rows.iter().map(row_to_deadline).collect()
    }

    async fn set_deadline_completed(
        &self,
        id: i64,
        completed: bool,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE tax_deadline SET completed = ? WHERE id = ?")
            .bind(completed)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(database)?;

        ensure_affected(result.rows_affected())
    }
}
