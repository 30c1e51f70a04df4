//! Shared types, errors, and configuration for Ledgerline.
//!
//! This crate provides common types used across all other crates:
//! - Typed IDs for type-safe entity references
//! - Money rounding and tolerance helpers
//! - Configuration management

pub mod config;
pub mod types;

pub use config::AppConfig;
