//! Database storage implementation using SeaORM
//!
//! This module provides database connectivity and operations using SeaORM ORM.

/// Database entities module
pub mod entities;
/// Database migration module
pub mod migration;
/// SeaORM store implementation module
pub mod seaorm_db;

pub use seaorm_db::{DatabaseBackendType, SeaOrmStore};
