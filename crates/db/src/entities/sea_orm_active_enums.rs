//! `SeaORM` active enums mapped to Postgres enum types.
//!
//! Each enum converts to and from its `ledgerline-core` counterpart so
//! repositories never compare raw strings.

use ledgerline_core::coa;
use ledgerline_core::invoice;
use ledgerline_core::ledger;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "account_type")]
pub enum AccountType {
    #[sea_orm(string_value = "ASSET")]
    Asset,
    #[sea_orm(string_value = "LIABILITY")]
    Liability,
    #[sea_orm(string_value = "EQUITY")]
    Equity,
    #[sea_orm(string_value = "REVENUE")]
    Revenue,
    #[sea_orm(string_value = "EXPENSE")]
    Expense,
}

impl From<AccountType> for coa::AccountType {
    fn from(value: AccountType) -> Self {
        match value {
            AccountType::Asset => Self::Asset,
            AccountType::Liability => Self::Liability,
            AccountType::Equity => Self::Equity,
            AccountType::Revenue => Self::Revenue,
            AccountType::Expense => Self::Expense,
        }
    }
}

impl From<coa::AccountType> for AccountType {
    fn from(value: coa::AccountType) -> Self {
        match value {
            coa::AccountType::Asset => Self::Asset,
            coa::AccountType::Liability => Self::Liability,
            coa::AccountType::Equity => Self::Equity,
            coa::AccountType::Revenue => Self::Revenue,
            coa::AccountType::Expense => Self::Expense,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "transaction_type")]
pub enum TransactionType {
    #[sea_orm(string_value = "JOURNAL")]
    Journal,
    #[sea_orm(string_value = "RECEIPT")]
    Receipt,
    #[sea_orm(string_value = "PAYMENT")]
    Payment,
    #[sea_orm(string_value = "INVOICE")]
    Invoice,
    #[sea_orm(string_value = "PURCHASE")]
    Purchase,
}

impl From<TransactionType> for ledger::TransactionType {
    fn from(value: TransactionType) -> Self {
        match value {
            TransactionType::Journal => Self::Journal,
            TransactionType::Receipt => Self::Receipt,
            TransactionType::Payment => Self::Payment,
            TransactionType::Invoice => Self::Invoice,
            TransactionType::Purchase => Self::Purchase,
        }
    }
}

impl From<ledger::TransactionType> for TransactionType {
    fn from(value: ledger::TransactionType) -> Self {
        match value {
            ledger::TransactionType::Journal => Self::Journal,
            ledger::TransactionType::Receipt => Self::Receipt,
            ledger::TransactionType::Payment => Self::Payment,
            ledger::TransactionType::Invoice => Self::Invoice,
            ledger::TransactionType::Purchase => Self::Purchase,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "account_role")]
pub enum AccountRole {
    #[sea_orm(string_value = "ACCOUNTS_RECEIVABLE")]
    AccountsReceivable,
    #[sea_orm(string_value = "ACCOUNTS_PAYABLE")]
    AccountsPayable,
    #[sea_orm(string_value = "REVENUE")]
    Revenue,
    #[sea_orm(string_value = "INVENTORY")]
    Inventory,
    #[sea_orm(string_value = "INPUT_TAX")]
    InputTax,
    #[sea_orm(string_value = "OPENING_BALANCE_EQUITY")]
    OpeningBalanceEquity,
    #[sea_orm(string_value = "CASH")]
    Cash,
}

impl From<AccountRole> for ledger::AccountRole {
    fn from(value: AccountRole) -> Self {
        match value {
            AccountRole::AccountsReceivable => Self::AccountsReceivable,
            AccountRole::AccountsPayable => Self::AccountsPayable,
            AccountRole::Revenue => Self::Revenue,
            AccountRole::Inventory => Self::Inventory,
            AccountRole::InputTax => Self::InputTax,
            AccountRole::OpeningBalanceEquity => Self::OpeningBalanceEquity,
            AccountRole::Cash => Self::Cash,
        }
    }
}

impl From<ledger::AccountRole> for AccountRole {
    fn from(value: ledger::AccountRole) -> Self {
        match value {
            ledger::AccountRole::AccountsReceivable => Self::AccountsReceivable,
            ledger::AccountRole::AccountsPayable => Self::AccountsPayable,
            ledger::AccountRole::Revenue => Self::Revenue,
            ledger::AccountRole::Inventory => Self::Inventory,
            ledger::AccountRole::InputTax => Self::InputTax,
            ledger::AccountRole::OpeningBalanceEquity => Self::OpeningBalanceEquity,
            ledger::AccountRole::Cash => Self::Cash,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "invoice_category")]
pub enum InvoiceCategory {
    #[sea_orm(string_value = "SERVICE")]
    Service,
    #[sea_orm(string_value = "FREIGHT")]
    Freight,
}

impl From<InvoiceCategory> for invoice::InvoiceCategory {
    fn from(value: InvoiceCategory) -> Self {
        match value {
            InvoiceCategory::Service => Self::Service,
            InvoiceCategory::Freight => Self::Freight,
        }
    }
}

impl From<invoice::InvoiceCategory> for InvoiceCategory {
    fn from(value: invoice::InvoiceCategory) -> Self {
        match value {
            invoice::InvoiceCategory::Service => Self::Service,
            invoice::InvoiceCategory::Freight => Self::Freight,
        }
    }
}
