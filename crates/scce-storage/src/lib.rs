//! `EntityStore` and `SwapRepository` implementations for the scheduling
//! core: an in-memory store for tests and database-less CLI use, and an
//! optional Postgres-backed store behind the `postgres` feature.

pub mod error;

#[cfg(feature = "inmemory")]
pub mod inmemory;

#[cfg(feature = "postgres")]
pub mod postgres;

#[cfg(feature = "inmemory")]
pub use inmemory::InMemoryStore;

#[cfg(feature = "postgres")]
pub use postgres::{connect, PgStore};

pub use error::{Result, StorageError};
