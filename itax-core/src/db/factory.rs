use std::collections::HashMap;

use async_trait::async_trait;
use tracing::debug;

use super::repository::{RepositoryError, TaxRepository};

/// Where to store data, independent of the backend.
///
/// `backend` selects a registered [`RepositoryFactory`] by name and
/// `connection_string` is handed to it untouched.
///
/// | backend  | connection_string           |
/// |----------|-----------------------------|
/// | `sqlite` | `itax.db`, `:memory:`       |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbConfig {
    pub backend: String,
    pub connection_string: String,
}

impl DbConfig {
    pub fn new(
        backend: impl Into<String>,
        connection_string: impl Into<String>,
    ) -> Self {
        Self {
            backend: backend.into(),
            connection_string: connection_string.into(),
        }
    }
}

impl Default for DbConfig {
    fn default() -> Self {
        Self::new("sqlite", "itax.db")
    }
}

/// Opens repositories for one backend. Backend crates export a unit struct
/// implementing this and the binary registers it at startup.
#[async_trait]
pub trait RepositoryFactory: Send + Sync {
    /// Lowercase name matched against [`DbConfig::backend`].
    fn backend_name(&self) -> &'static str;

    /// Connects and returns a repository ready for use; migrations and
    /// seed data are applied here.
    async fn create(
        &self,
        config: &DbConfig,
    ) -> Result<Box<dyn TaxRepository>, RepositoryError>;
}

/// Backend factories keyed by name.
#[derive(Default)]
pub struct RepositoryRegistry {
    factories: HashMap<&'static str, Box<dyn RepositoryFactory>>,
}

impl RepositoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a factory, replacing any previous one with the same name.
    pub fn register(
        &mut self,
        factory: Box<dyn RepositoryFactory>,
    ) {
        self.factories.insert(factory.backend_name(), factory);
    }

    /// Registered backend names, sorted.
    pub fn available_backends(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.factories.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Opens a repository with the factory named by `config.backend`.
    ///
    /// # Errors
    /// * [`RepositoryError::Configuration`] when no such backend is registered.
    /// * Whatever the factory returns.
    pub async fn create(
        &self,
        config: &DbConfig,
    ) -> Result<Box<dyn TaxRepository>, RepositoryError> {
        let factory = self.factories.get(config.backend.as_str()).ok_or_else(|| {
            RepositoryError::Configuration(format!(
                "unknown backend '{}'; available: {:?}",
                config.backend,
                self.available_backends()
            ))
        })?;

        debug!(backend = %config.backend, "opening repository");
        factory.create(config).await
    }
}
