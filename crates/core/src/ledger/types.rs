//! Ledger domain types for transaction posting.
//!
//! This module defines the strict input structures accepted by the posting
//! engine and the shapes it returns once a transaction is committed.

use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use ledgerline_shared::types::{
    AccountEntryId, AccountId, TenantId, TransactionId, checked_sum, within_tolerance,
};

use super::error::LedgerError;
use crate::sequence::ReferencePrefix;

/// Transaction type classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    /// General journal entry. Always receives an allocated `JV` reference.
    Journal,
    /// Money received.
    Receipt,
    /// Money paid out.
    Payment,
    /// Customer invoice issuance.
    Invoice,
    /// Vendor purchase.
    Purchase,
}

impl TransactionType {
    /// Returns the stored string form.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Journal => "JOURNAL",
            Self::Receipt => "RECEIPT",
            Self::Payment => "PAYMENT",
            Self::Invoice => "INVOICE",
            Self::Purchase => "PURCHASE",
        }
    }

    /// Prefix used when the engine allocates a reference itself.
    #[must_use]
    pub const fn default_prefix(&self) -> ReferencePrefix {
        match self {
            Self::Journal => ReferencePrefix::Jv,
            _ => ReferencePrefix::Tx,
        }
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "JOURNAL" => Ok(Self::Journal),
            "RECEIPT" => Ok(Self::Receipt),
            "PAYMENT" => Ok(Self::Payment),
            "INVOICE" => Ok(Self::Invoice),
            "PURCHASE" => Ok(Self::Purchase),
            other => Err(LedgerError::Validation(format!(
                "unknown transaction type '{other}'"
            ))),
        }
    }
}

/// One line of a posting request.
///
/// Either side may be zero; neither may be negative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryInput {
    /// The account to post to.
    pub account_id: AccountId,
    /// Debit amount.
    pub debit: Decimal,
    /// Credit amount.
    pub credit: Decimal,
    /// Optional line description.
    pub description: Option<String>,
}

impl EntryInput {
    /// Creates a debit line.
    #[must_use]
    pub const fn debit(account_id: AccountId, amount: Decimal) -> Self {
        Self {
            account_id,
            debit: amount,
            credit: Decimal::ZERO,
            description: None,
        }
    }

    /// Creates a credit line.
    #[must_use]
    pub const fn credit(account_id: AccountId, amount: Decimal) -> Self {
        Self {
            account_id,
            debit: Decimal::ZERO,
            credit: amount,
            description: None,
        }
    }

    /// Attaches a line description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Builds a line from loosely-typed textual amounts.
    ///
    /// Empty strings are read as zero.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for text that is not a finite decimal number.
    pub fn parse(account_id: AccountId, debit: &str, credit: &str) -> Result<Self, LedgerError> {
        Ok(Self {
            account_id,
            debit: parse_amount(debit)?,
            credit: parse_amount(credit)?,
            description: None,
        })
    }
}

fn parse_amount(raw: &str) -> Result<Decimal, LedgerError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(Decimal::ZERO);
    }
    Decimal::from_str(trimmed)
        .map_err(|_| LedgerError::Validation(format!("amount '{raw}' is not a number")))
}

/// A request to post one balanced transaction.
#[derive(Debug, Clone)]
pub struct PostingRequest {
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Caller-supplied reference. Ignored for journals.
    pub reference: Option<String>,
    /// Prefix override for allocated references.
    pub prefix: Option<ReferencePrefix>,
    /// Transaction date; selects the period and the reference year.
    pub date: NaiveDate,
    /// Transaction description.
    pub description: String,
    /// The type of transaction.
    pub transaction_type: TransactionType,
    /// The entry lines (at least 2).
    pub entries: Vec<EntryInput>,
}

impl PostingRequest {
    /// Returns true when the engine must allocate the reference.
    #[must_use]
    pub fn needs_allocation(&self) -> bool {
        self.transaction_type == TransactionType::Journal
            || self.reference.as_deref().is_none_or(|r| r.trim().is_empty())
    }

    /// Prefix to allocate under.
    #[must_use]
    pub fn allocation_prefix(&self) -> ReferencePrefix {
        self.prefix
            .unwrap_or_else(|| self.transaction_type.default_prefix())
    }
}

/// Caller-controlled posting behaviour.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PostingOptions {
    /// Retry once under a freshly allocated reference after a reference
    /// collision. A caller-supplied reference is replaced.
    pub regenerate_on_duplicate: bool,
}

/// Debit and credit sums of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PostingTotals {
    /// Total debits.
    pub debit: Decimal,
    /// Total credits.
    pub credit: Decimal,
}

impl PostingTotals {
    /// Sums the entry lines.
    ///
    /// # Errors
    ///
    /// Returns `Validation` if either column overflows.
    pub fn from_entries(entries: &[EntryInput]) -> Result<Self, LedgerError> {
        let overflow = || LedgerError::Validation("entry totals overflow".into());
        Ok(Self {
            debit: checked_sum(entries.iter().map(|e| e.debit)).ok_or_else(overflow)?,
            credit: checked_sum(entries.iter().map(|e| e.credit)).ok_or_else(overflow)?,
        })
    }

    /// Returns true when debits and credits agree within tolerance.
    #[must_use]
    pub fn is_balanced(&self) -> bool {
        within_tolerance(self.debit, self.credit)
    }
}

/// A persisted entry line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostedEntry {
    /// Entry ID.
    pub id: AccountEntryId,
    /// Account posted to.
    pub account_id: AccountId,
    /// Debit amount.
    pub debit: Decimal,
    /// Credit amount.
    pub credit: Decimal,
    /// Line description.
    pub description: Option<String>,
}

/// A committed transaction with its entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostedTransaction {
    /// Transaction ID.
    pub id: TransactionId,
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Unique reference within the tenant.
    pub reference: String,
    /// Transaction date.
    pub date: NaiveDate,
    /// Description.
    pub description: String,
    /// Transaction type.
    pub transaction_type: TransactionType,
    /// Entry lines.
    pub entries: Vec<PostedEntry>,
}

impl PostedTransaction {
    /// Sums the committed entry lines.
    #[must_use]
    pub fn totals(&self) -> PostingTotals {
        PostingTotals {
            debit: self.entries.iter().map(|e| e.debit).sum(),
            credit: self.entries.iter().map(|e| e.credit).sum(),
        }
    }
}

/// Filter for listing transactions.
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    /// Restrict to one type.
    pub transaction_type: Option<TransactionType>,
    /// Earliest date, inclusive.
    pub from: Option<NaiveDate>,
    /// Latest date, inclusive.
    pub to: Option<NaiveDate>,
}
