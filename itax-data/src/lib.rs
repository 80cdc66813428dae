//! Bulk loading of slab schedules into a [`itax_core::TaxRepository`].

mod loader;

pub use loader::{TaxSlabLoader, TaxSlabLoaderError, TaxSlabRecord};
