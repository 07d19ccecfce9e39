//! Core domain types for the monitor
//!
//! This module contains the entities shared by the evaluators, the store and the HTTP surface.

pub mod models;

pub use models::*;
