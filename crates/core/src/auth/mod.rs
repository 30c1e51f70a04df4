//! Actor roles.
//!
//! Authentication happens outside this crate; callers arrive with an
//! [`Actor`] already resolved from their session.

use serde::{Deserialize, Serialize};
use ledgerline_shared::types::UserId;

/// User roles within a tenant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Full access, including period close/open.
    Admin,
    /// Can post transactions and manage invoices.
    Accountant,
    /// Read-only access.
    Viewer,
}

impl UserRole {
    /// Returns true if this role can close or reopen financial periods.
    #[must_use]
    pub const fn can_manage_periods(&self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Returns true if this role can create ledger postings.
    #[must_use]
    pub const fn can_post(&self) -> bool {
        matches!(self, Self::Admin | Self::Accountant)
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Admin => write!(f, "admin"),
            Self::Accountant => write!(f, "accountant"),
            Self::Viewer => write!(f, "viewer"),
        }
    }
}

/// The authenticated caller of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    /// The acting user.
    pub user_id: UserId,
    /// The user's role within the tenant.
    pub role: UserRole,
}

impl Actor {
    /// Creates a new actor.
    #[must_use]
    pub const fn new(user_id: UserId, role: UserRole) -> Self {
        Self { user_id, role }
    }
}
