//! # Navscope Database Crate
//!
//! This crate is the portfolio store: users and the instruments they hold,
//! persisted in PostgreSQL.
//!
//! ## Architectural Principles
//!
//! - **Layer 3 Adapter:** This crate encapsulates all database-specific logic behind the
//!   `PortfolioStore` trait, hiding the SQL from the rest of the application.
//! - **Explicit lifecycle:** The pool is created once at startup, migrated, and health-checked.
//!   There is no global connection; callers own the `DbRepository`.
//! - **Asynchronous & Pooled:** All operations are asynchronous over a shared `PgPool`.
//!
//! ## Public API
//!
//! - `connect`, `run_migrations`, `health_check`: Pool lifecycle.
//! - `PortfolioStore`: The store interface consumed by the web server and CLI.
//! - `DbRepository`: The PostgreSQL implementation of `PortfolioStore`.
//! - `DbError`: The specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod connection;
pub mod error;
pub mod repository;
pub mod store;

// Re-export the key components to create a clean, public-facing API.
pub use connection::{PoolSettings, connect, database_url_from_env, health_check, run_migrations};
pub use error::DbError;
pub use repository::DbRepository;
pub use store::{NewPortfolioItem, PortfolioItem, PortfolioStore, UserProfile};
