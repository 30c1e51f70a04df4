//! Demo data seeder for Ledgerline development and testing.
//!
//! Seeds a demo tenant with a chart of accounts, the account-role mappings
//! the posting templates need, and a job with a synced draft invoice.
//! Re-running it leaves existing rows alone.
//!
//! Usage: cargo run --bin seeder

use anyhow::Context;
use chrono::Utc;
use ledgerline_core::coa::{AccountType, NewAccount};
use ledgerline_core::invoice::{InvoiceCategory, NewInvoice, ServiceChargePolicy};
use ledgerline_core::ledger::{AccountRole, LedgerError};
use ledgerline_core::retry::RetryPolicy;
use ledgerline_db::repositories::CreateExpenseInput;
use ledgerline_db::{AccountRepository, AccountRoleRepository, InvoiceRepository, JobRepository};
use ledgerline_shared::AppConfig;
use ledgerline_shared::types::{AccountId, TenantId};
use rust_decimal::Decimal;
use sea_orm::DatabaseConnection;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

/// Demo tenant ID (consistent for all seeds)
const DEMO_TENANT_ID: Uuid = Uuid::from_u128(0x0000_0000_0000_0000_0000_0000_0000_0001);

const DEMO_JOB_NUMBER: &str = "JOB-DEMO-001";

/// Code, name, type and parent code of every seeded account, parents first.
const CHART: &[(&str, &str, AccountType, Option<&str>)] = &[
    ("1000", "Assets", AccountType::Asset, None),
    ("1100", "Current Assets", AccountType::Asset, Some("1000")),
    ("1110", "Cash and Bank", AccountType::Asset, Some("1100")),
    ("1130", "Accounts Receivable", AccountType::Asset, Some("1100")),
    ("1140", "Inventory", AccountType::Asset, Some("1100")),
    ("1150", "Input Tax", AccountType::Asset, Some("1100")),
    ("2000", "Liabilities", AccountType::Liability, None),
    ("2110", "Accounts Payable", AccountType::Liability, Some("2000")),
    ("3000", "Equity", AccountType::Equity, None),
    ("3100", "Opening Balance Equity", AccountType::Equity, Some("3000")),
    ("4000", "Income", AccountType::Revenue, None),
    ("4100", "Service Revenue", AccountType::Revenue, Some("4000")),
    ("5000", "Expenses", AccountType::Expense, None),
    ("5100", "Operating Expenses", AccountType::Expense, Some("5000")),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ledgerline=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load().context("failed to load configuration")?;
    let db = ledgerline_db::connect_with(&config.database)
        .await
        .context("failed to connect to database")?;
    info!("Connected to database");

    let tenant_id = TenantId::from_uuid(DEMO_TENANT_ID);

    println!("Seeding chart of accounts...");
    seed_chart(&db, tenant_id).await?;

    println!("Seeding account roles...");
    seed_roles(&db, tenant_id).await?;

    println!("Seeding demo job and invoice...");
    let invoices = InvoiceRepository::with_policies(
        db.clone(),
        RetryPolicy::from(&config.posting),
        ServiceChargePolicy::from(&config.invoicing),
    );
    seed_job(&db, &invoices, tenant_id).await?;

    println!("Seeding complete!");
    Ok(())
}

/// Creates every chart account that does not exist yet.
async fn seed_chart(db: &DatabaseConnection, tenant_id: TenantId) -> anyhow::Result<()> {
    let accounts = AccountRepository::new(db.clone());

    for &(code, name, account_type, parent_code) in CHART {
        if accounts.find_by_code(tenant_id, code).await?.is_some() {
            println!("  {code} already exists, skipping...");
            continue;
        }

        let parent_id = match parent_code {
            Some(parent) => Some(
                accounts
                    .find_by_code(tenant_id, parent)
                    .await?
                    .with_context(|| format!("parent {parent} of {code} missing"))?
                    .id,
            ),
            None => None,
        };

        accounts
            .create_account(NewAccount {
                tenant_id,
                code: code.to_string(),
                name: name.to_string(),
                account_type,
                parent_id,
                description: None,
                division: None,
            })
            .await?;
        println!("  Created {code} {name}");
    }

    Ok(())
}

/// Maps every system role to its canonical account code.
async fn seed_roles(db: &DatabaseConnection, tenant_id: TenantId) -> anyhow::Result<()> {
    let accounts = AccountRepository::new(db.clone());
    let roles = AccountRoleRepository::new(db.clone());

    for role in AccountRole::ALL {
        let account_id: AccountId = accounts
            .find_by_code(tenant_id, role.default_code())
            .await?
            .with_context(|| format!("no account {} for role {role}", role.default_code()))?
            .id;
        roles.assign(tenant_id, role, account_id).await?;
        println!("  {role} -> {}", role.default_code());
    }

    Ok(())
}

/// Creates the demo job, its expenses and a synced service invoice.
async fn seed_job(
    db: &DatabaseConnection,
    invoices: &InvoiceRepository,
    tenant_id: TenantId,
) -> anyhow::Result<()> {
    let jobs = JobRepository::new(db.clone());

    let job = match jobs.create_job(tenant_id, DEMO_JOB_NUMBER, 2).await {
        Ok(job) => job,
        Err(LedgerError::DuplicateReference(_)) => {
            println!("  {DEMO_JOB_NUMBER} already exists, skipping...");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    for (description, category, quantity, rate, tax_percent) in [
        ("Terminal handling", Some(InvoiceCategory::Service), 2, 150, 5),
        ("Customs documentation", Some(InvoiceCategory::Service), 1, 80, 5),
        ("Ocean freight", Some(InvoiceCategory::Freight), 2, 1_200, 0),
        ("Driver allowance", None, 1, 40, 0),
    ] {
        jobs.add_expense(
            tenant_id,
            job.id,
            CreateExpenseInput {
                description: description.to_string(),
                invoice_category: category,
                quantity: Decimal::from(quantity),
                rate: Decimal::from(rate),
                tax_percent: Decimal::from(tax_percent),
            },
        )
        .await?;
    }

    let invoice = invoices
        .create_invoice(NewInvoice {
            tenant_id,
            category: InvoiceCategory::Service,
            job_id: Some(job.id),
            customer_name: "Harbour Traders".to_string(),
            date: Utc::now().date_naive(),
        })
        .await?;
    let synced = invoices.sync_invoice(tenant_id, invoice.id).await?;
    println!(
        "  Created {} with {} lines, grand total {}",
        synced.invoice.invoice_number,
        synced.lines.len(),
        synced.invoice.totals.grand_total
    );

    Ok(())
}
