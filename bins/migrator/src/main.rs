//! Database migration runner for Ledgerline.
//!
//! Usage:
//!   migrator up      - Apply the ledger and invoicing schema
//!   migrator down    - Drop the schema
//!   migrator status  - Show migration status
//!   migrator fresh   - Drop all tables and re-run migrations
//!
//! The connection string is read from `DATABASE_URL`.

use ledgerline_db::migration::Migrator;
use sea_orm_migration::prelude::*;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // The migrator CLI sets up its own tracing subscriber.
    cli::run_cli(Migrator).await;
}
