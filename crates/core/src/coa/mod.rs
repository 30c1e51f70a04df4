//! Chart of accounts rules.
//!
//! Account types and their normal balances, code validation and child code
//! suggestion, and acyclicity checks for the account tree.

pub mod code;
pub mod tree;
pub mod types;

pub use code::{suggest_child_code, validate_code};
pub use tree::ensure_acyclic;
pub use types::{Account, AccountFilter, AccountType, AccountUpdate, NewAccount, NormalBalance};
