//! Money columns are stored as SQLite REAL (or INTEGER when a seed writes a
//! whole number) and read back into [`Decimal`].

use itax_core::RepositoryError;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, TypeInfo, ValueRef};

/// Reads a numeric column. NULL reads as zero.
pub fn get_decimal(
    row: &SqliteRow,
    column: &str,
) -> Result<Decimal, RepositoryError> {
    let value = row
        .try_get_raw(column)
        .map_err(|e| RepositoryError::Database(format!("Column '{column}' not found: {e}")))?;

    let type_name = value.type_info().name().to_string();
    match type_name.as_str() {
        "INTEGER" => {
            let raw: i64 = row.try_get(column).map_err(|e| {
                RepositoryError::Database(format!("Failed to read INTEGER '{column}': {e}"))
            })?;
            Ok(Decimal::from(raw))
        }
        "REAL" => {
            let raw: f64 = row.try_get(column).map_err(|e| {
                RepositoryError::Database(format!("Failed to read REAL '{column}': {e}"))
            })?;
            Decimal::try_from(raw).map_err(|e| {
                RepositoryError::Database(format!("'{column}' value {raw} is not a decimal: {e}"))
            })
        }
        "NULL" => Ok(Decimal::ZERO),
        other => Err(RepositoryError::Database(format!(
            "Unexpected type '{other}' for column '{column}'"
        ))),
    }
}

/// Like [`get_decimal`] but NULL reads as `None`.
pub fn get_optional_decimal(
    row: &SqliteRow,
    column: &str,
) -> Result<Option<Decimal>, RepositoryError> {
    let value = row
        .try_get_raw(column)
        .map_err(|e| RepositoryError::Database(format!("Column '{column}' not found: {e}")))?;

    if value.is_null() {
        return Ok(None);
    }
    get_decimal(row, column).map(Some)
}

pub fn decimal_to_f64(d: Decimal) -> f64 {
    d.to_f64().unwrap_or(0.0)
}
