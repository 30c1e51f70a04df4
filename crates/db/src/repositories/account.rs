//! Account repository for chart of accounts database operations.
//!
//! Every query is scoped by tenant. Deletion re-checks children, entries and
//! role mappings inside the deleting transaction with the account row locked,
//! so a posting that references the account either lands first (and blocks
//! the delete) or fails its foreign key check.

use std::collections::HashMap;

use chrono::Utc;
use ledgerline_core::coa::{
    self, Account, AccountFilter, AccountUpdate, NewAccount, ensure_acyclic, validate_code,
};
use ledgerline_core::ledger::{AccountRole, LedgerError};
use ledgerline_shared::types::{AccountId, TenantId};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QuerySelect, Set, TransactionTrait,
};
use tracing::{info, warn};
use uuid::Uuid;

use super::error::classify;
use crate::entities::{
    account_entries, account_roles, accounts, sea_orm_active_enums::AccountType,
};

impl From<accounts::Model> for Account {
    fn from(model: accounts::Model) -> Self {
        Self {
            id: AccountId::from_uuid(model.id),
            tenant_id: TenantId::from_uuid(model.tenant_id),
            code: model.code,
            name: model.name,
            account_type: model.account_type.into(),
            parent_id: model.parent_id.map(AccountId::from_uuid),
            description: model.description,
            division: model.division,
        }
    }
}

fn validate_name(name: &str) -> Result<(), LedgerError> {
    if name.trim().is_empty() {
        return Err(LedgerError::Validation("account name is required".into()));
    }
    Ok(())
}

/// Loads an account of `tenant_id`, optionally locking the row.
async fn find_in_tenant<C: ConnectionTrait>(
    conn: &C,
    tenant_id: TenantId,
    account_id: AccountId,
    lock: bool,
) -> Result<Option<accounts::Model>, LedgerError> {
    let mut query = accounts::Entity::find_by_id(account_id.into_inner())
        .filter(accounts::Column::TenantId.eq(tenant_id.into_inner()));
    if lock {
        query = query.lock_exclusive();
    }
    query.one(conn).await.map_err(classify)
}

/// Returns the accounts among `ids` that belong to `tenant_id`.
pub(crate) async fn existing_accounts<C: ConnectionTrait>(
    conn: &C,
    tenant_id: TenantId,
    ids: &[AccountId],
) -> Result<Vec<AccountId>, LedgerError> {
    let ids: Vec<Uuid> = ids.iter().map(|id| id.into_inner()).collect();
    let found: Vec<Uuid> = accounts::Entity::find()
        .select_only()
        .column(accounts::Column::Id)
        .filter(accounts::Column::TenantId.eq(tenant_id.into_inner()))
        .filter(accounts::Column::Id.is_in(ids))
        .into_tuple()
        .all(conn)
        .await
        .map_err(classify)?;
    Ok(found.into_iter().map(AccountId::from_uuid).collect())
}

/// Repository for chart of accounts operations.
#[derive(Debug, Clone)]
pub struct AccountRepository {
    db: DatabaseConnection,
}

impl AccountRepository {
    /// Creates a new account repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates an account.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for a malformed code or blank name,
    /// `ParentNotFound` if the parent is not an account of the same tenant,
    /// and `DuplicateAccountCode` if the code is taken.
    pub async fn create_account(&self, input: NewAccount) -> Result<Account, LedgerError> {
        validate_code(&input.code)?;
        validate_name(&input.name)?;

        let txn = self.db.begin().await.map_err(classify)?;

        if let Some(parent_id) = input.parent_id
            && find_in_tenant(&txn, input.tenant_id, parent_id, false)
                .await?
                .is_none()
        {
            return Err(LedgerError::ParentNotFound(parent_id.into_inner()));
        }

        let now = Utc::now();
        let model = accounts::ActiveModel {
            id: Set(AccountId::new().into_inner()),
            tenant_id: Set(input.tenant_id.into_inner()),
            code: Set(input.code.clone()),
            name: Set(input.name),
            account_type: Set(input.account_type.into()),
            parent_id: Set(input.parent_id.map(AccountId::into_inner)),
            description: Set(input.description),
            division: Set(input.division),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        }
        .insert(&txn)
        .await
        .map_err(|e| match classify(e) {
            LedgerError::DuplicateReference(_) => {
                LedgerError::DuplicateAccountCode(input.code.clone())
            }
            other => other,
        })?;

        txn.commit().await.map_err(classify)?;

        info!(tenant_id = %input.tenant_id, code = %model.code, "account created");
        Ok(model.into())
    }

    /// Fetches one account.
    pub async fn get_account(
        &self,
        tenant_id: TenantId,
        account_id: AccountId,
    ) -> Result<Account, LedgerError> {
        find_in_tenant(&self.db, tenant_id, account_id, false)
            .await?
            .map(Account::from)
            .ok_or(LedgerError::AccountNotFound(account_id.into_inner()))
    }

    /// Finds an account by code.
    pub async fn find_by_code(
        &self,
        tenant_id: TenantId,
        code: &str,
    ) -> Result<Option<Account>, LedgerError> {
        let model = accounts::Entity::find()
            .filter(accounts::Column::TenantId.eq(tenant_id.into_inner()))
            .filter(accounts::Column::Code.eq(code))
            .one(&self.db)
            .await
            .map_err(classify)?;
        Ok(model.map(Account::from))
    }

    /// Lists accounts, ordered by code.
    pub async fn list_accounts(
        &self,
        tenant_id: TenantId,
        filter: &AccountFilter,
    ) -> Result<Vec<Account>, LedgerError> {
        let mut query =
            accounts::Entity::find().filter(accounts::Column::TenantId.eq(tenant_id.into_inner()));

        if let Some(account_type) = filter.account_type {
            query = query.filter(accounts::Column::AccountType.eq(AccountType::from(account_type)));
        }
        if let Some(division) = &filter.division {
            query = query.filter(accounts::Column::Division.eq(division.as_str()));
        }

        let mut accounts: Vec<Account> = query
            .all(&self.db)
            .await
            .map_err(classify)?
            .into_iter()
            .map(Account::from)
            .collect();
        accounts.sort_by(|a, b| coa::code::compare_codes(&a.code, &b.code));
        Ok(accounts)
    }

    /// Updates the editable fields of an account.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound`, `ParentNotFound` for a parent outside the
    /// tenant, and `CyclicParent` if the new parent is the account itself or
    /// one of its descendants.
    pub async fn update_account(
        &self,
        tenant_id: TenantId,
        account_id: AccountId,
        update: AccountUpdate,
    ) -> Result<Account, LedgerError> {
        if let Some(name) = &update.name {
            validate_name(name)?;
        }

        let txn = self.db.begin().await.map_err(classify)?;

        let existing = find_in_tenant(&txn, tenant_id, account_id, true)
            .await?
            .ok_or(LedgerError::AccountNotFound(account_id.into_inner()))?;

        if let Some(Some(parent_id)) = update.parent_id {
            if find_in_tenant(&txn, tenant_id, parent_id, false)
                .await?
                .is_none()
            {
                return Err(LedgerError::ParentNotFound(parent_id.into_inner()));
            }

            let links: Vec<(Uuid, Option<Uuid>)> = accounts::Entity::find()
                .select_only()
                .column(accounts::Column::Id)
                .column(accounts::Column::ParentId)
                .filter(accounts::Column::TenantId.eq(tenant_id.into_inner()))
                .into_tuple()
                .all(&txn)
                .await
                .map_err(classify)?;
            let parents: HashMap<AccountId, AccountId> = links
                .into_iter()
                .filter_map(|(id, parent)| {
                    parent.map(|p| (AccountId::from_uuid(id), AccountId::from_uuid(p)))
                })
                .collect();

            ensure_acyclic(account_id, parent_id, |id| parents.get(&id).copied())?;
        }

        let mut model: accounts::ActiveModel = existing.into();
        if let Some(name) = update.name {
            model.name = Set(name);
        }
        if let Some(description) = update.description {
            model.description = Set(description);
        }
        if let Some(parent_id) = update.parent_id {
            model.parent_id = Set(parent_id.map(AccountId::into_inner));
        }
        if let Some(division) = update.division {
            model.division = Set(division);
        }
        model.updated_at = Set(Utc::now().into());

        let updated = model.update(&txn).await.map_err(classify)?;
        txn.commit().await.map_err(classify)?;

        Ok(updated.into())
    }

    /// Deletes a childless account that no entry or role mapping references.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound`, `AccountHasChildren`, `AccountHasEntries`
    /// or `AccountMappedToRole`.
    pub async fn delete_account(
        &self,
        tenant_id: TenantId,
        account_id: AccountId,
    ) -> Result<(), LedgerError> {
        let txn = self.db.begin().await.map_err(classify)?;

        let account = find_in_tenant(&txn, tenant_id, account_id, true)
            .await?
            .ok_or(LedgerError::AccountNotFound(account_id.into_inner()))?;

        let children = accounts::Entity::find()
            .filter(accounts::Column::ParentId.eq(account.id))
            .count(&txn)
            .await
            .map_err(classify)?;
        if children > 0 {
            warn!(%tenant_id, code = %account.code, children, "refusing to delete account with children");
            return Err(LedgerError::AccountHasChildren(account.id));
        }

        let entries = account_entries::Entity::find()
            .filter(account_entries::Column::AccountId.eq(account.id))
            .count(&txn)
            .await
            .map_err(classify)?;
        if entries > 0 {
            warn!(%tenant_id, code = %account.code, entries, "refusing to delete account with entries");
            return Err(LedgerError::AccountHasEntries {
                account_id: account.id,
                count: entries,
            });
        }

        let mapped = account_roles::Entity::find()
            .filter(account_roles::Column::TenantId.eq(tenant_id.into_inner()))
            .filter(account_roles::Column::AccountId.eq(account.id))
            .one(&txn)
            .await
            .map_err(classify)?;
        if let Some(mapping) = mapped {
            let role = AccountRole::from(mapping.role);
            warn!(%tenant_id, code = %account.code, %role, "refusing to delete role-mapped account");
            return Err(LedgerError::AccountMappedToRole {
                account_id: account.id,
                role,
            });
        }

        accounts::Entity::delete_by_id(account.id)
            .exec(&txn)
            .await
            .map_err(classify)?;
        txn.commit().await.map_err(classify)?;

        info!(%tenant_id, code = %account.code, "account deleted");
        Ok(())
    }

    /// Suggests the code for the next child of `parent_id`.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` for an unknown parent and `Validation` if
    /// the parent code is not numeric.
    pub async fn suggest_child_code(
        &self,
        tenant_id: TenantId,
        parent_id: AccountId,
    ) -> Result<String, LedgerError> {
        let parent = find_in_tenant(&self.db, tenant_id, parent_id, false)
            .await?
            .ok_or(LedgerError::AccountNotFound(parent_id.into_inner()))?;

        let children: Vec<String> = accounts::Entity::find()
            .select_only()
            .column(accounts::Column::Code)
            .filter(accounts::Column::TenantId.eq(tenant_id.into_inner()))
            .filter(accounts::Column::ParentId.eq(parent.id))
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(classify)?;

        coa::suggest_child_code(&parent.code, &children)
    }
}
