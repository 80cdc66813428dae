use std::io;

use anyhow::Context;
use clap::Parser;
use tracing::debug;

use itax_cli::app::{self, AppContext};
use itax_cli::cli::Cli;
use itax_cli::config::Settings;
use itax_cli::{commands, logging};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = Settings::load(cli.global.config.as_deref())?.apply(cli.global.overrides());

    logging::init_logging(&settings.logging.level);
    // An explicit flag beats RUST_LOG.
    if let Some(level) = &cli.global.log_level {
        logging::set_log_level(level)?;
    }
    if let Some(path) = &settings.logging.file {
        logging::enable_file_logging(path)?;
    }
    if cli.global.quiet {
        logging::set_stderr_enabled(false)?;
    }

    let db_config = settings.db_config();
    debug!(backend = %db_config.backend, "connecting");
    let registry = app::build_registry();
    let repo = registry
        .create(&db_config)
        .await
        .with_context(|| format!("Failed to open {} database '{}'", db_config.backend, db_config.connection_string))?;

    let ctx = AppContext {
        repo,
        assessment_year: settings.assessment_year,
        output: settings.output,
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    commands::run(&ctx, cli.command, &mut out).await
}
