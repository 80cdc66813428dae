use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use itax_core::Regime;

use crate::config::Overrides;
use crate::output::OutputFormat;

/// Indian income-tax calculator.
///
/// Computes liability under the old and new regimes, recommends the cheaper
/// one, and keeps profiles, deductions, computation history and the tax
/// calendar in a local database.
#[derive(Debug, Parser)]
#[command(name = "itax", version, about)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Args)]
pub struct GlobalArgs {
    /// Settings file (defaults to ./itax.toml when present).
    #[arg(long, global = true, env = "ITAX_CONFIG")]
    pub config: Option<PathBuf>,

    /// Database backend.
    #[arg(long, global = true)]
    pub backend: Option<String>,

    /// Database connection string: a file path or `:memory:` for SQLite.
    #[arg(long, global = true)]
    pub db: Option<String>,

    /// Assessment year, by its first calendar year (2025 for AY 2025-26).
    #[arg(long, global = true)]
    pub year: Option<i32>,

    #[arg(long, global = true, value_enum)]
    pub output: Option<OutputFormat>,

    /// Log level or filter directive; overrides RUST_LOG.
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Also append log records to this file.
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    /// Suppress log output on stderr.
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

impl GlobalArgs {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            backend: self.backend.clone(),
            connection_string: self.db.clone(),
            assessment_year: self.year,
            output: self.output,
            log_level: self.log_level.clone(),
            log_file: self.log_file.clone(),
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Compare liability under both regimes.
    Compute(ComputeArgs),

    /// Write the comparison report as CSV.
    Export {
        #[command(flatten)]
        computation: ComputationArgs,

        /// Destination file.
        #[arg(long)]
        out: PathBuf,
    },

    /// List unused deduction headroom and what claiming it would save.
    Recommend(ComputationArgs),

    /// Advance-tax instalments for the year's liability.
    AdvanceTax {
        #[command(flatten)]
        computation: ComputationArgs,

        /// Tax already deducted at source.
        #[arg(long, default_value = "0")]
        tds: String,

        /// Regime to plan for; defaults to the recommended one.
        #[arg(long, value_enum)]
        regime: Option<RegimeArg>,
    },

    /// Compare both regimes for every row of a CSV file.
    Batch {
        #[arg(long)]
        file: PathBuf,
    },

    /// Show the regime parameters in force for the year.
    Params,

    #[command(subcommand)]
    Profile(ProfileCommand),

    #[command(subcommand)]
    Deduction(DeductionCommand),

    /// Saved computations.
    #[command(subcommand)]
    History(HistoryCommand),

    /// Income-tax calendar.
    #[command(subcommand)]
    Deadlines(DeadlineCommand),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RegimeArg {
    Old,
    New,
}

impl From<RegimeArg> for Regime {
    fn from(arg: RegimeArg) -> Self {
        match arg {
            RegimeArg::Old => Regime::Old,
            RegimeArg::New => Regime::New,
        }
    }
}

/// Income by head. Amounts accept `12,50,000` and a leading `₹`.
#[derive(Debug, Clone, Default, Args)]
pub struct IncomeArgs {
    #[arg(long, default_value = "0")]
    pub salary: String,

    #[arg(long, default_value = "0")]
    pub house_property: String,

    /// Business or professional income.
    #[arg(long = "business", default_value = "0")]
    pub business_profession: String,

    #[arg(long, default_value = "0")]
    pub capital_gains: String,

    #[arg(long, default_value = "0")]
    pub other_sources: String,
}

/// Where old-regime deductions come from; at most one source.
#[derive(Debug, Clone, Default, Args)]
pub struct DeductionArgs {
    /// Lump-sum deductions total.
    #[arg(long, conflicts_with_all = ["profile", "claim"])]
    pub deductions: Option<String>,

    /// Use the deduction items stored for this profile and year.
    #[arg(long, conflicts_with = "claim")]
    pub profile: Option<i64>,

    /// Itemized claim as SECTION=AMOUNT, e.g. 80C=150000. Repeatable.
    #[arg(long)]
    pub claim: Vec<String>,
}

#[derive(Debug, Clone, Default, Args)]
pub struct ComputationArgs {
    #[command(flatten)]
    pub income: IncomeArgs,

    #[command(flatten)]
    pub deductions: DeductionArgs,
}

#[derive(Debug, Clone, Default, Args)]
pub struct ComputeArgs {
    #[command(flatten)]
    pub computation: ComputationArgs,

    /// Store the result in the computation history.
    #[arg(long)]
    pub save: bool,
}

#[derive(Debug, Subcommand)]
pub enum ProfileCommand {
    Create {
        #[arg(long)]
        name: String,

        /// Permanent Account Number, e.g. ABCDE1234F.
        #[arg(long)]
        pan: Option<String>,

        /// Preferred regime.
        #[arg(long, value_enum)]
        regime: Option<RegimeArg>,
    },
    List,
    Show { id: i64 },
}

#[derive(Debug, Subcommand)]
pub enum DeductionCommand {
    Add {
        #[arg(long)]
        profile: i64,

        /// Section code: 80C, 80CCD(1B), 80D, 80E, 80G, 80TTA, 24(b), OTHER.
        #[arg(long)]
        section: String,

        #[arg(long)]
        amount: String,

        #[arg(long, default_value = "")]
        description: String,
    },
    List {
        #[arg(long)]
        profile: i64,
    },
    Remove { id: i64 },
}

#[derive(Debug, Subcommand)]
pub enum HistoryCommand {
    List {
        #[arg(long)]
        profile: Option<i64>,

        /// Only computations for the selected year.
        #[arg(long)]
        this_year: bool,
    },
    Show { id: i64 },
    Delete { id: i64 },
}

#[derive(Debug, Subcommand)]
pub enum DeadlineCommand {
    List {
        /// Hide completed entries.
        #[arg(long)]
        pending: bool,
    },
    Complete {
        id: i64,

        /// Mark as not completed instead.
        #[arg(long)]
        undo: bool,
    },
}
