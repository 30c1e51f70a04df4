//! Posting templates for business events.
//!
//! Each template turns one business event into the exact entry lines it
//! requires. Contra accounts come from an [`AccountRoleMap`] resolved once per
//! call; a missing role is a `MissingAccountRole` error, never a fallback.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use ledgerline_shared::types::{
    AccountId, TenantId, checked_extend, checked_percent, checked_sum,
};

use super::error::LedgerError;
use super::types::{EntryInput, PostingRequest, TransactionType};
use crate::sequence::ReferencePrefix;

/// System account roles a tenant maps to concrete accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccountRole {
    /// Customer receivables.
    AccountsReceivable,
    /// Vendor payables.
    AccountsPayable,
    /// Sales revenue.
    Revenue,
    /// Inventory on hand.
    Inventory,
    /// Recoverable tax paid on purchases.
    InputTax,
    /// Equity offset for opening balances.
    OpeningBalanceEquity,
    /// Default cash account for payments.
    Cash,
}

impl AccountRole {
    /// All roles, in seeding order.
    pub const ALL: [Self; 7] = [
        Self::Cash,
        Self::AccountsReceivable,
        Self::Inventory,
        Self::InputTax,
        Self::AccountsPayable,
        Self::OpeningBalanceEquity,
        Self::Revenue,
    ];

    /// Returns the stored string form.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::AccountsReceivable => "ACCOUNTS_RECEIVABLE",
            Self::AccountsPayable => "ACCOUNTS_PAYABLE",
            Self::Revenue => "REVENUE",
            Self::Inventory => "INVENTORY",
            Self::InputTax => "INPUT_TAX",
            Self::OpeningBalanceEquity => "OPENING_BALANCE_EQUITY",
            Self::Cash => "CASH",
        }
    }

    /// Canonical account code used when seeding a chart of accounts.
    #[must_use]
    pub const fn default_code(&self) -> &'static str {
        match self {
            Self::Cash => "1110",
            Self::AccountsReceivable => "1130",
            Self::Inventory => "1140",
            Self::InputTax => "1150",
            Self::AccountsPayable => "2110",
            Self::OpeningBalanceEquity => "3100",
            Self::Revenue => "4100",
        }
    }
}

impl fmt::Display for AccountRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccountRole {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| LedgerError::Validation(format!("unknown account role '{s}'")))
    }
}

/// Tenant-scoped mapping from role to account.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountRoleMap {
    roles: HashMap<AccountRole, AccountId>,
}

impl AccountRoleMap {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Maps `role` to `account_id`, replacing any previous mapping.
    pub fn insert(&mut self, role: AccountRole, account_id: AccountId) {
        self.roles.insert(role, account_id);
    }

    /// Resolves a role.
    ///
    /// # Errors
    ///
    /// Returns `MissingAccountRole` if the tenant has not mapped it.
    pub fn resolve(&self, role: AccountRole) -> Result<AccountId, LedgerError> {
        self.roles
            .get(&role)
            .copied()
            .ok_or(LedgerError::MissingAccountRole(role))
    }
}

impl FromIterator<(AccountRole, AccountId)> for AccountRoleMap {
    fn from_iter<I: IntoIterator<Item = (AccountRole, AccountId)>>(iter: I) -> Self {
        Self {
            roles: iter.into_iter().collect(),
        }
    }
}

/// Who a payment is exchanged with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentParty {
    /// Money received from a customer.
    Customer,
    /// Money paid to a vendor.
    Vendor,
}

/// How a payment was settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMode {
    /// Physical cash.
    Cash,
    /// Bank transfer.
    Bank,
    /// Cheque.
    Cheque,
}

impl fmt::Display for PaymentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cash => write!(f, "cash"),
            Self::Bank => write!(f, "bank"),
            Self::Cheque => write!(f, "cheque"),
        }
    }
}

/// A customer receipt or vendor payment.
#[derive(Debug, Clone)]
pub struct PaymentInput {
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Customer or vendor.
    pub party: PaymentParty,
    /// Customer or vendor display name.
    pub party_name: String,
    /// Amount settled.
    pub amount: Decimal,
    /// Settlement mode.
    pub mode: PaymentMode,
    /// Bank or cash account; the `Cash` role is used when absent.
    pub cash_account: Option<AccountId>,
    /// External reference such as a cheque or bank transfer number.
    pub external_reference: Option<String>,
    /// Payment date.
    pub date: NaiveDate,
}

/// One purchased item.
#[derive(Debug, Clone)]
pub struct PurchaseLine {
    /// Item description.
    pub description: String,
    /// Quantity.
    pub quantity: Decimal,
    /// Unit price before tax.
    pub unit_price: Decimal,
    /// Input tax percentage.
    pub tax_percent: Decimal,
}

impl PurchaseLine {
    /// Net amount, rounded to cents.
    ///
    /// # Errors
    ///
    /// Returns `Validation` if the amount overflows.
    pub fn amount(&self) -> Result<Decimal, LedgerError> {
        checked_extend(self.quantity, self.unit_price)
            .ok_or_else(|| out_of_range(&self.description))
    }

    /// Tax amount, rounded to cents.
    ///
    /// # Errors
    ///
    /// Returns `Validation` if the amount or its tax overflows.
    pub fn tax(&self) -> Result<Decimal, LedgerError> {
        checked_percent(self.amount()?, self.tax_percent)
            .ok_or_else(|| out_of_range(&self.description))
    }
}

/// A vendor purchase.
#[derive(Debug, Clone)]
pub struct PurchaseInput {
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Vendor display name.
    pub vendor_name: String,
    /// Vendor bill number, stored as the transaction reference if present.
    pub bill_reference: Option<String>,
    /// Purchase date.
    pub date: NaiveDate,
    /// Purchased items.
    pub lines: Vec<PurchaseLine>,
}

/// One item of opening stock.
#[derive(Debug, Clone)]
pub struct StockLine {
    /// Item description.
    pub description: String,
    /// Quantity on hand.
    pub quantity: Decimal,
    /// Unit cost.
    pub unit_cost: Decimal,
}

/// Opening stock valuation.
#[derive(Debug, Clone)]
pub struct OpeningStockInput {
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Valuation date.
    pub date: NaiveDate,
    /// Stock on hand.
    pub lines: Vec<StockLine>,
}

/// Builds posting requests for business events.
pub struct PostingTemplates;

impl PostingTemplates {
    /// Invoice issuance: AR debit, Revenue credit, both for the grand total.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for a non-positive total and
    /// `MissingAccountRole` if AR or Revenue is unmapped.
    pub fn invoice(
        tenant_id: TenantId,
        invoice_number: &str,
        date: NaiveDate,
        grand_total: Decimal,
        roles: &AccountRoleMap,
    ) -> Result<PostingRequest, LedgerError> {
        ensure_positive(grand_total, "invoice grand total")?;
        let receivable = roles.resolve(AccountRole::AccountsReceivable)?;
        let revenue = roles.resolve(AccountRole::Revenue)?;

        Ok(PostingRequest {
            tenant_id,
            reference: None,
            prefix: Some(ReferencePrefix::Tx),
            date,
            description: format!("Invoice {invoice_number}"),
            transaction_type: TransactionType::Invoice,
            entries: vec![
                EntryInput::debit(receivable, grand_total).with_description(invoice_number),
                EntryInput::credit(revenue, grand_total).with_description(invoice_number),
            ],
        })
    }

    /// Purchase: Inventory debit (net), Input Tax debit (when tax > 0),
    /// Accounts Payable credit (gross).
    ///
    /// # Errors
    ///
    /// Returns `Validation` for an empty or non-positive purchase and
    /// `MissingAccountRole` for unmapped roles.
    pub fn purchase(
        input: &PurchaseInput,
        roles: &AccountRoleMap,
    ) -> Result<PostingRequest, LedgerError> {
        if input.lines.is_empty() {
            return Err(LedgerError::Validation("purchase has no lines".into()));
        }
        for line in &input.lines {
            if line.quantity <= Decimal::ZERO
                || line.unit_price < Decimal::ZERO
                || line.tax_percent < Decimal::ZERO
            {
                return Err(LedgerError::Validation(format!(
                    "purchase line '{}' has an invalid quantity, price or tax",
                    line.description
                )));
            }
        }

        let net = sum_lines(input.lines.iter().map(PurchaseLine::amount), "purchase net")?;
        let tax = sum_lines(input.lines.iter().map(PurchaseLine::tax), "purchase tax")?;
        let total = net
            .checked_add(tax)
            .ok_or_else(|| out_of_range("purchase total"))?;
        ensure_positive(total, "purchase total")?;

        let inventory = roles.resolve(AccountRole::Inventory)?;
        let payable = roles.resolve(AccountRole::AccountsPayable)?;

        let mut entries = vec![EntryInput::debit(inventory, net)];
        if tax > Decimal::ZERO {
            entries.push(EntryInput::debit(roles.resolve(AccountRole::InputTax)?, tax));
        }
        entries.push(EntryInput::credit(payable, total).with_description(&input.vendor_name));

        Ok(PostingRequest {
            tenant_id: input.tenant_id,
            reference: input.bill_reference.clone(),
            prefix: Some(ReferencePrefix::Tx),
            date: input.date,
            description: format!("Purchase from {}", input.vendor_name),
            transaction_type: TransactionType::Purchase,
            entries,
        })
    }

    /// Payment: customer receipts debit cash and credit AR under an `RV`
    /// voucher; vendor payments debit AP and credit cash under a `PV`
    /// voucher.
    ///
    /// The external reference is kept in the description; the voucher number
    /// is always allocated.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for a non-positive amount and
    /// `MissingAccountRole` for unmapped roles.
    pub fn payment(
        input: &PaymentInput,
        roles: &AccountRoleMap,
    ) -> Result<PostingRequest, LedgerError> {
        ensure_positive(input.amount, "payment amount")?;
        let cash = match input.cash_account {
            Some(account) => account,
            None => roles.resolve(AccountRole::Cash)?,
        };

        let suffix = input
            .external_reference
            .as_deref()
            .map(|r| format!(" ({r})"))
            .unwrap_or_default();

        let (prefix, transaction_type, entries, description) = match input.party {
            PaymentParty::Customer => {
                let receivable = roles.resolve(AccountRole::AccountsReceivable)?;
                (
                    ReferencePrefix::Rv,
                    TransactionType::Receipt,
                    vec![
                        EntryInput::debit(cash, input.amount),
                        EntryInput::credit(receivable, input.amount),
                    ],
                    format!(
                        "Receipt from {} by {}{suffix}",
                        input.party_name, input.mode
                    ),
                )
            }
            PaymentParty::Vendor => {
                let payable = roles.resolve(AccountRole::AccountsPayable)?;
                (
                    ReferencePrefix::Pv,
                    TransactionType::Payment,
                    vec![
                        EntryInput::debit(payable, input.amount),
                        EntryInput::credit(cash, input.amount),
                    ],
                    format!("Payment to {} by {}{suffix}", input.party_name, input.mode),
                )
            }
        };

        Ok(PostingRequest {
            tenant_id: input.tenant_id,
            reference: None,
            prefix: Some(prefix),
            date: input.date,
            description,
            transaction_type,
            entries,
        })
    }

    /// Opening stock: Inventory debit, Opening Balance Equity credit.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for empty or non-positive stock and
    /// `MissingAccountRole` for unmapped roles.
    pub fn opening_stock(
        input: &OpeningStockInput,
        roles: &AccountRoleMap,
    ) -> Result<PostingRequest, LedgerError> {
        if input
            .lines
            .iter()
            .any(|l| l.quantity < Decimal::ZERO || l.unit_cost < Decimal::ZERO)
        {
            return Err(LedgerError::Validation(
                "opening stock quantities and costs must be non-negative".into(),
            ));
        }
        let value = sum_lines(
            input.lines.iter().map(|l| {
                checked_extend(l.quantity, l.unit_cost).ok_or_else(|| out_of_range(&l.description))
            }),
            "opening stock value",
        )?;
        ensure_positive(value, "opening stock value")?;

        let inventory = roles.resolve(AccountRole::Inventory)?;
        let equity = roles.resolve(AccountRole::OpeningBalanceEquity)?;

        Ok(PostingRequest {
            tenant_id: input.tenant_id,
            reference: None,
            prefix: None,
            date: input.date,
            description: format!("Opening stock valuation ({} items)", input.lines.len()),
            transaction_type: TransactionType::Journal,
            entries: vec![
                EntryInput::debit(inventory, value),
                EntryInput::credit(equity, value),
            ],
        })
    }
}

fn out_of_range(what: &str) -> LedgerError {
    LedgerError::Validation(format!("{what} is too large"))
}

fn sum_lines<I>(amounts: I, what: &str) -> Result<Decimal, LedgerError>
where
    I: IntoIterator<Item = Result<Decimal, LedgerError>>,
{
    let amounts = amounts.into_iter().collect::<Result<Vec<_>, _>>()?;
    checked_sum(amounts).ok_or_else(|| out_of_range(what))
}

fn ensure_positive(amount: Decimal, what: &str) -> Result<(), LedgerError> {
    if amount <= Decimal::ZERO {
        return Err(LedgerError::Validation(format!("{what} must be positive")));
    }
    Ok(())
}
