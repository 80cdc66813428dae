//! Rendering of command results as a table, JSON or CSV.

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tabled::settings::Style;
use tabled::{Table, Tabled};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Csv,
}

/// Renders a command result.
///
/// JSON serializes `value` whole; tables and CSV show the flattened `rows`.
pub fn render<V, R>(
    format: OutputFormat,
    value: &V,
    rows: &[R],
) -> Result<String>
where
    V: Serialize + ?Sized,
    R: Tabled + Serialize,
{
    match format {
        OutputFormat::Table => Ok(table(rows)),
        OutputFormat::Json => json(value),
        OutputFormat::Csv => csv_text(rows),
    }
}

pub fn table<R: Tabled>(rows: &[R]) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

pub fn json<V: Serialize + ?Sized>(value: &V) -> Result<String> {
    serde_json::to_string_pretty(value).context("Failed to serialize output as JSON")
}

pub fn csv_text<R: Serialize>(rows: &[R]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in rows {
        writer.serialize(row).context("Failed to write CSV row")?;
    }
    let bytes = writer.into_inner().context("Failed to flush CSV output")?;
    let mut text = String::from_utf8(bytes).context("CSV output is not UTF-8")?;
    // Callers add their own line break.
    text.truncate(text.trim_end().len());
    Ok(text)
}
