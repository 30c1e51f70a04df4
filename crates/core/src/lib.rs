//! Core business logic for Ledgerline.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, validation rules, and calculations live here.
//!
//! # Modules
//!
//! - `auth` - Actor roles for admin-only operations
//! - `coa` - Chart of accounts rules (code suggestion, tree integrity)
//! - `sequence` - Reference/voucher number formatting and increment
//! - `fiscal` - Financial period lock rules
//! - `ledger` - Double-entry posting validation, templates, reversal
//! - `retry` - Bounded retry wrapper for atomic postings
//! - `invoice` - Invoice line recalculation from job expenses
//! - `reports` - Ledger, trial balance, P&L and balance sheet derivation

pub mod auth;
pub mod coa;
pub mod fiscal;
pub mod invoice;
pub mod ledger;
pub mod reports;
pub mod retry;
pub mod sequence;

#[cfg(test)]
mod sequence_props;
