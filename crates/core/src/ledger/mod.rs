//! Double-entry bookkeeping logic.
//!
//! This module implements the core ledger functionality:
//! - Strict posting input types
//! - Balance and sign validation
//! - Error taxonomy for ledger operations
//! - Posting templates for business events
//! - Reversal of posted transactions

pub mod error;
pub mod reversal;
pub mod service;
pub mod templates;
pub mod types;
pub mod validation;

#[cfg(test)]
mod validation_props;

pub use error::{ErrorKind, LedgerError};
pub use reversal::ReversalService;
pub use service::LedgerService;
pub use templates::{
    AccountRole, AccountRoleMap, OpeningStockInput, PaymentInput, PaymentMode, PaymentParty,
    PostingTemplates, PurchaseInput, PurchaseLine, StockLine,
};
pub use types::{
    EntryInput, PostedEntry, PostedTransaction, PostingOptions, PostingRequest, PostingTotals,
    TransactionFilter, TransactionType,
};
pub use validation::validate_entries;
