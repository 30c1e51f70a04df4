//! Initial database migration.
//!
//! Creates the enums, the ledger tables (accounts, transactions, entries,
//! periods, account roles) and the invoicing tables (jobs, expenses,
//! invoices, invoice items).

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        db.execute_unprepared(ENUMS_SQL).await?;

        // Ledger
        db.execute_unprepared(ACCOUNTS_SQL).await?;
        db.execute_unprepared(TRANSACTIONS_SQL).await?;
        db.execute_unprepared(ACCOUNT_ENTRIES_SQL).await?;
        db.execute_unprepared(FINANCIAL_PERIODS_SQL).await?;
        db.execute_unprepared(ACCOUNT_ROLES_SQL).await?;

        // Invoicing
        db.execute_unprepared(JOBS_SQL).await?;
        db.execute_unprepared(JOB_EXPENSES_SQL).await?;
        db.execute_unprepared(INVOICES_SQL).await?;
        db.execute_unprepared(INVOICE_ITEMS_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

const ENUMS_SQL: &str = r"
CREATE TYPE account_type AS ENUM ('ASSET', 'LIABILITY', 'EQUITY', 'REVENUE', 'EXPENSE');

CREATE TYPE transaction_type AS ENUM ('JOURNAL', 'RECEIPT', 'PAYMENT', 'INVOICE', 'PURCHASE');

CREATE TYPE account_role AS ENUM (
    'ACCOUNTS_RECEIVABLE',
    'ACCOUNTS_PAYABLE',
    'REVENUE',
    'INVENTORY',
    'INPUT_TAX',
    'OPENING_BALANCE_EQUITY',
    'CASH'
);

CREATE TYPE invoice_category AS ENUM ('SERVICE', 'FREIGHT');
";

const ACCOUNTS_SQL: &str = r"
CREATE TABLE accounts (
    id              UUID PRIMARY KEY,
    tenant_id       UUID NOT NULL,
    code            VARCHAR(20) NOT NULL,
    name            VARCHAR(255) NOT NULL,
    account_type    account_type NOT NULL,
    parent_id       UUID REFERENCES accounts(id) ON DELETE RESTRICT,
    description     TEXT,
    division        VARCHAR(100),
    created_at      TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at      TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    CONSTRAINT accounts_tenant_code_key UNIQUE (tenant_id, code),
    CONSTRAINT accounts_not_own_parent CHECK (parent_id IS DISTINCT FROM id)
);

CREATE INDEX idx_accounts_tenant ON accounts(tenant_id);
CREATE INDEX idx_accounts_parent ON accounts(parent_id) WHERE parent_id IS NOT NULL;
";

const TRANSACTIONS_SQL: &str = r"
CREATE TABLE transactions (
    id                  UUID PRIMARY KEY,
    tenant_id           UUID NOT NULL,
    reference           VARCHAR(50) NOT NULL,
    transaction_date    DATE NOT NULL,
    description         TEXT NOT NULL,
    transaction_type    transaction_type NOT NULL,
    reverses_id         UUID REFERENCES transactions(id) ON DELETE RESTRICT,
    created_at          TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    CONSTRAINT transactions_tenant_reference_key UNIQUE (tenant_id, reference)
);

CREATE INDEX idx_transactions_tenant_date ON transactions(tenant_id, transaction_date);
CREATE UNIQUE INDEX transactions_reverses_key ON transactions(reverses_id)
    WHERE reverses_id IS NOT NULL;
";

const ACCOUNT_ENTRIES_SQL: &str = r"
CREATE TABLE account_entries (
    id              UUID PRIMARY KEY,
    transaction_id  UUID NOT NULL REFERENCES transactions(id) ON DELETE CASCADE,
    account_id      UUID NOT NULL REFERENCES accounts(id) ON DELETE RESTRICT,
    line_no         INTEGER NOT NULL,
    debit           NUMERIC(20, 4) NOT NULL DEFAULT 0,
    credit          NUMERIC(20, 4) NOT NULL DEFAULT 0,
    description     TEXT,

    CONSTRAINT account_entries_debit_non_negative CHECK (debit >= 0),
    CONSTRAINT account_entries_credit_non_negative CHECK (credit >= 0),
    CONSTRAINT account_entries_line_key UNIQUE (transaction_id, line_no)
);

CREATE INDEX idx_account_entries_account ON account_entries(account_id);
";

const FINANCIAL_PERIODS_SQL: &str = r"
CREATE TABLE financial_periods (
    tenant_id   UUID NOT NULL,
    year        INTEGER NOT NULL,
    month       INTEGER NOT NULL,
    is_closed   BOOLEAN NOT NULL DEFAULT FALSE,
    closed_by   UUID,
    closed_at   TIMESTAMPTZ,
    updated_at  TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    PRIMARY KEY (tenant_id, year, month),
    CONSTRAINT financial_periods_month_range CHECK (month BETWEEN 1 AND 12),
    CONSTRAINT financial_periods_close_audit CHECK (
        (is_closed AND closed_by IS NOT NULL AND closed_at IS NOT NULL)
        OR (NOT is_closed AND closed_by IS NULL AND closed_at IS NULL)
    )
);
";

const ACCOUNT_ROLES_SQL: &str = r"
CREATE TABLE account_roles (
    tenant_id   UUID NOT NULL,
    role        account_role NOT NULL,
    account_id  UUID NOT NULL REFERENCES accounts(id) ON DELETE RESTRICT,
    updated_at  TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    PRIMARY KEY (tenant_id, role)
);
";

const JOBS_SQL: &str = r"
CREATE TABLE jobs (
    id              UUID PRIMARY KEY,
    tenant_id       UUID NOT NULL,
    job_number      VARCHAR(50) NOT NULL,
    container_count INTEGER NOT NULL DEFAULT 0 CHECK (container_count >= 0),
    created_at      TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    CONSTRAINT jobs_tenant_number_key UNIQUE (tenant_id, job_number)
);
";

const JOB_EXPENSES_SQL: &str = r"
CREATE TABLE job_expenses (
    id                  UUID PRIMARY KEY,
    job_id              UUID NOT NULL REFERENCES jobs(id) ON DELETE CASCADE,
    description         TEXT NOT NULL,
    invoice_category    invoice_category,
    quantity            NUMERIC(20, 4) NOT NULL,
    rate                NUMERIC(20, 4) NOT NULL,
    tax_percent         NUMERIC(9, 4) NOT NULL DEFAULT 0,
    created_at          TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_job_expenses_job ON job_expenses(job_id);
";

const INVOICES_SQL: &str = r"
CREATE TABLE invoices (
    id              UUID PRIMARY KEY,
    tenant_id       UUID NOT NULL,
    invoice_number  VARCHAR(50) NOT NULL,
    category        invoice_category NOT NULL,
    job_id          UUID REFERENCES jobs(id) ON DELETE RESTRICT,
    customer_name   VARCHAR(255) NOT NULL,
    invoice_date    DATE NOT NULL,
    total_amount    NUMERIC(20, 4) NOT NULL DEFAULT 0,
    tax_amount      NUMERIC(20, 4) NOT NULL DEFAULT 0,
    grand_total     NUMERIC(20, 4) NOT NULL DEFAULT 0,
    is_approved     BOOLEAN NOT NULL DEFAULT FALSE,
    transaction_id  UUID REFERENCES transactions(id) ON DELETE RESTRICT,
    created_at      TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at      TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    CONSTRAINT invoices_tenant_number_key UNIQUE (tenant_id, invoice_number)
);

CREATE INDEX idx_invoices_job ON invoices(job_id) WHERE job_id IS NOT NULL;
";

const INVOICE_ITEMS_SQL: &str = r"
CREATE TABLE invoice_items (
    id              UUID PRIMARY KEY,
    invoice_id      UUID NOT NULL REFERENCES invoices(id) ON DELETE CASCADE,
    expense_id      UUID REFERENCES job_expenses(id) ON DELETE SET NULL,
    line_no         INTEGER NOT NULL,
    description     TEXT NOT NULL,
    quantity        NUMERIC(20, 4) NOT NULL,
    rate            NUMERIC(20, 4) NOT NULL,
    amount          NUMERIC(20, 4) NOT NULL,
    tax_percent     NUMERIC(9, 4) NOT NULL,
    tax_amount      NUMERIC(20, 4) NOT NULL,
    total           NUMERIC(20, 4) NOT NULL,

    CONSTRAINT invoice_items_line_key UNIQUE (invoice_id, line_no)
);
";

const DROP_ALL_SQL: &str = r"
DROP TABLE IF EXISTS invoice_items;
DROP TABLE IF EXISTS invoices;
DROP TABLE IF EXISTS job_expenses;
DROP TABLE IF EXISTS jobs;
DROP TABLE IF EXISTS account_roles;
DROP TABLE IF EXISTS financial_periods;
DROP TABLE IF EXISTS account_entries;
DROP TABLE IF EXISTS transactions;
DROP TABLE IF EXISTS accounts;

DROP TYPE IF EXISTS invoice_category;
DROP TYPE IF EXISTS account_role;
DROP TYPE IF EXISTS transaction_type;
DROP TYPE IF EXISTS account_type;
";
