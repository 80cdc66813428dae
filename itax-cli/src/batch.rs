//! CSV input for `itax batch`.
//!
//! ## CSV Format
//!
//! Headers are matched by name, so column order does not matter.
//!
//! | Column                | Required | Notes                                   |
//! |-----------------------|----------|-----------------------------------------|
//! | `label`               | yes      | Free text identifying the row           |
//! | `salary`              | no       | Empty cell or missing column means 0    |
//! | `house_property`      | no       |                                         |
//! | `business_profession` | no       |                                         |
//! | `capital_gains`       | no       |                                         |
//! | `other_sources`       | no       |                                         |
//! | `deductions`          | no       | Itemized total, old regime only         |
//!
//! Amounts accept comma separators (`12,50,000`) and a leading `₹`.
//!
//! ```csv
//! label,salary,other_sources,deductions
//! Asha,"12,00,000",15000,150000
//! Ravi,700000,,
//! ```

use std::path::{Path, PathBuf};

use itax_core::calculations::common::parse_amount;
use itax_core::{IncomeBreakdown, LiabilityError};
use rust_decimal::Decimal;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct CsvRow {
    label: String,
    #[serde(default)]
    salary: Option<String>,
    #[serde(default)]
    house_property: Option<String>,
    #[serde(default)]
    business_profession: Option<String>,
    #[serde(default)]
    capital_gains: Option<String>,
    #[serde(default)]
    other_sources: Option<String>,
    #[serde(default)]
    deductions: Option<String>,
}

/// Errors that can occur while reading batch input.
#[derive(Debug, thiserror::Error)]
pub enum BatchLoadError {
    #[error("cannot read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Bad structure, missing `label` column, wrong column count.
    #[error("CSV parse error: {0}")]
    Parse(#[from] csv::Error),

    /// `row` is 1-based and excludes the header.
    #[error("row {row}: {source}")]
    InvalidAmount {
        row: usize,
        #[source]
        source: LiabilityError,
    },
}

/// One input row, ready for the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchEntry {
    pub row: usize,
    pub label: String,
    pub income: IncomeBreakdown,
    pub deductions: Decimal,
}

fn convert_row(
    row: CsvRow,
    row_number: usize,
) -> Result<BatchEntry, BatchLoadError> {
    let amount = |field: &str, cell: &Option<String>| {
        parse_amount(field, cell.as_deref().unwrap_or_default()).map_err(|source| {
            BatchLoadError::InvalidAmount {
                row: row_number,
                source,
            }
        })
    };

    let income = IncomeBreakdown {
        salary: amount("salary", &row.salary)?,
        house_property: amount("house_property", &row.house_property)?,
        business_profession: amount("business_profession", &row.business_profession)?,
        capital_gains: amount("capital_gains", &row.capital_gains)?,
        other_sources: amount("other_sources", &row.other_sources)?,
    };
    let deductions = amount("deductions", &row.deductions)?;

    Ok(BatchEntry {
        row: row_number,
        label: row.label,
        income,
        deductions,
    })
}

/// Parses CSV text into entries, in file order.
pub fn load_from_str(input: &str) -> Result<Vec<BatchEntry>, BatchLoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .flexible(false)
        .from_reader(input.as_bytes());

    reader
        .deserialize::<CsvRow>()
        .enumerate()
        .map(|(idx, result)| convert_row(result?, idx + 1))
        .collect()
}

pub fn load_from_file(path: &Path) -> Result<Vec<BatchEntry>, BatchLoadError> {
    let contents = std::fs::read_to_string(path).map_err(|source| BatchLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    load_from_str(&contents)
}
