//! Account-role mapping repository.
//!
//! Posting templates never look accounts up by code. Each tenant maps the
//! roles a template needs (receivables, payables, revenue, ...) to one of its
//! accounts, and the map is resolved once per template call.

use chrono::Utc;
use ledgerline_core::ledger::{AccountRole, AccountRoleMap, LedgerError};
use ledgerline_shared::types::{AccountId, TenantId};
use sea_orm::sea_query::OnConflict;
use sea_orm::{ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use tracing::info;

use super::account::existing_accounts;
use super::error::classify;
use crate::entities::account_roles;

/// Loads the role map of a tenant.
pub(crate) async fn load_role_map<C: ConnectionTrait>(
    conn: &C,
    tenant_id: TenantId,
) -> Result<AccountRoleMap, LedgerError> {
    let rows = account_roles::Entity::find()
        .filter(account_roles::Column::TenantId.eq(tenant_id.into_inner()))
        .all(conn)
        .await
        .map_err(classify)?;

    Ok(rows
        .into_iter()
        .map(|row| (AccountRole::from(row.role), AccountId::from_uuid(row.account_id)))
        .collect())
}

/// Repository for account-role mappings.
#[derive(Debug, Clone)]
pub struct AccountRoleRepository {
    db: DatabaseConnection,
}

impl AccountRoleRepository {
    /// Creates a new account-role repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Maps `role` to `account_id`, replacing any previous mapping.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` if the account is not in the tenant.
    pub async fn assign(
        &self,
        tenant_id: TenantId,
        role: AccountRole,
        account_id: AccountId,
    ) -> Result<(), LedgerError> {
        if existing_accounts(&self.db, tenant_id, &[account_id])
            .await?
            .is_empty()
        {
            return Err(LedgerError::AccountNotFound(account_id.into_inner()));
        }

        let model = account_roles::ActiveModel {
            tenant_id: Set(tenant_id.into_inner()),
            role: Set(role.into()),
            account_id: Set(account_id.into_inner()),
            updated_at: Set(Utc::now().into()),
        };

        account_roles::Entity::insert(model)
            .on_conflict(
                OnConflict::columns([account_roles::Column::TenantId, account_roles::Column::Role])
                    .update_columns([
                        account_roles::Column::AccountId,
                        account_roles::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec(&self.db)
            .await
            .map_err(classify)?;

        info!(%tenant_id, %role, %account_id, "account role assigned");
        Ok(())
    }

    /// Returns the role map of a tenant.
    pub async fn role_map(&self, tenant_id: TenantId) -> Result<AccountRoleMap, LedgerError> {
        load_role_map(&self.db, tenant_id).await
    }
}
