//! Shared utilities, configuration, and error handling for Fellowship
//!
//! This crate provides common functionality used across the Fellowship services:
//! - Configuration management following 12-factor principles
//! - The caller-facing error taxonomy and the storage error type
//! - Pagination and validated request extractors

pub mod config;
pub mod db;
pub mod error;
pub mod extractors;
pub mod state;

pub use db::RepositoryError;
pub use error::{Error, Result};
pub use extractors::{Page, Pagination, ValidatedJson};
pub use state::StateError;
