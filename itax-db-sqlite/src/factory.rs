use std::path::PathBuf;

use async_trait::async_trait;
use itax_core::db::{DbConfig, RepositoryError, RepositoryFactory, TaxRepository};
use tracing::info;

use crate::repository::SqliteRepository;

/// Directory holding the seed SQL files.
///
/// 1. `ITAX_DB_SQLITE_SEEDS_DIR` when set.
/// 2. `./seeds` when it exists in the working directory.
/// 3. The crate's own `seeds` directory.
fn seeds_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("ITAX_DB_SQLITE_SEEDS_DIR") {
        return PathBuf::from(dir);
    }
    let cwd_seeds = PathBuf::from("./seeds");
    if cwd_seeds.is_dir() {
        return cwd_seeds;
    }
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("seeds")
}

/// [`RepositoryFactory`] for the `"sqlite"` backend.
///
/// ```rust,no_run
/// use itax_core::db::RepositoryRegistry;
/// use itax_db_sqlite::SqliteRepositoryFactory;
///
/// let mut registry = RepositoryRegistry::new();
/// registry.register(Box::new(SqliteRepositoryFactory));
/// ```
pub struct SqliteRepositoryFactory;

#[async_trait]
impl RepositoryFactory for SqliteRepositoryFactory {
    fn backend_name(&self) -> &'static str {
        "sqlite"
    }

    /// `config.connection_string` is a file path (created if missing), a
    /// `sqlite:` URL or `:memory:`. Migrations and seeds run on every open.
    async fn create(
        &self,
        config: &DbConfig,
    ) -> Result<Box<dyn TaxRepository>, RepositoryError> {
        let repo = SqliteRepository::new(&config.connection_string)
            .await
            .map_err(|e| RepositoryError::Connection(format!("{e:#}")))?;
        repo.run_migrations()
            .await
            .map_err(|e| RepositoryError::Database(format!("{e:#}")))?;

        let seeds = seeds_dir();
        repo.run_seeds(&seeds)
            .await
            .map_err(|e| RepositoryError::Database(format!("{e:#}")))?;

        info!(
            database = %config.connection_string,
            seeds = %seeds.display(),
            "opened sqlite repository"
        );
        Ok(Box::new(repo))
    }
}
