//! SQLite backend for the itax repository.

pub mod decimal;
pub mod factory;
pub mod repository;

pub use factory::SqliteRepositoryFactory;
pub use repository::SqliteRepository;
