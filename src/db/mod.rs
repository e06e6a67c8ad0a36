//! SQLite storage for the rate cache.
//!
//! This module provides:
//! - Database initialization and schema migration
//! - SQLite pragma configuration
//! - Repository layer for cached rate reads and writes

pub mod migrations;
pub mod repo;

pub use migrations::init_db;
pub use repo::{CachedRate, Repository};
