//! Financial period lock integration tests.

mod common;

use common::{connect, date, journal, setup_ledger};
use ledgerline_core::auth::{Actor, UserRole};
use ledgerline_core::fiscal::PeriodAction;
use ledgerline_core::ledger::LedgerError;
use ledgerline_db::{PeriodRepository, TransactionRepository};
use ledgerline_shared::types::UserId;
use rust_decimal_macros::dec;
use sea_orm::{ConnectionTrait, DbBackend, Statement, TransactionTrait};
use std::time::Duration;

fn admin() -> Actor {
    Actor::new(UserId::new(), UserRole::Admin)
}

#[tokio::test]
async fn test_closed_period_refuses_postings_until_reopened() {
    let Some(db) = connect().await else { return };
    let ledger = setup_ledger(&db).await;
    let periods = PeriodRepository::new(db.clone());
    let transactions = TransactionRepository::new(db.clone());
    let actor = admin();

    let closed = periods
        .set_period(ledger.tenant_id, 2026, 1, PeriodAction::Close, &actor)
        .await
        .unwrap();
    assert!(closed.is_closed);
    assert_eq!(closed.closed_by, Some(actor.user_id));
    assert!(closed.closed_at.is_some());

    let err = transactions
        .post_transaction(journal(
            ledger.tenant_id,
            date(2026, 1, 31),
            ledger.expense,
            ledger.cash,
            dec!(5),
        ))
        .await
        .unwrap_err();
    assert_eq!(err, LedgerError::PeriodClosed { month: 1, year: 2026 });

    // The neighbouring month is unaffected.
    transactions
        .post_transaction(journal(
            ledger.tenant_id,
            date(2026, 2, 1),
            ledger.expense,
            ledger.cash,
            dec!(5),
        ))
        .await
        .unwrap();

    let reopened = periods
        .set_period(ledger.tenant_id, 2026, 1, PeriodAction::Open, &actor)
        .await
        .unwrap();
    assert!(!reopened.is_closed);
    assert_eq!(reopened.closed_by, None);

    transactions
        .post_transaction(journal(
            ledger.tenant_id,
            date(2026, 1, 31),
            ledger.expense,
            ledger.cash,
            dec!(5),
        ))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_reversal_respects_period_of_reversal_date() {
    let Some(db) = connect().await else { return };
    let ledger = setup_ledger(&db).await;
    let periods = PeriodRepository::new(db.clone());
    let transactions = TransactionRepository::new(db.clone());

    let original = transactions
        .post_transaction(journal(
            ledger.tenant_id,
            date(2026, 3, 5),
            ledger.expense,
            ledger.cash,
            dec!(20),
        ))
        .await
        .unwrap();

    periods
        .set_period(ledger.tenant_id, 2026, 3, PeriodAction::Close, &admin())
        .await
        .unwrap();

    let err = transactions
        .reverse_transaction(ledger.tenant_id, original.id, date(2026, 3, 20), "Wrong month")
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::PeriodClosed { .. }));

    // Reversing into the next, open month is allowed.
    transactions
        .reverse_transaction(ledger.tenant_id, original.id, date(2026, 4, 1), "Wrong month")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_only_admins_toggle_periods() {
    let Some(db) = connect().await else { return };
    let ledger = setup_ledger(&db).await;
    let periods = PeriodRepository::new(db.clone());

    let accountant = Actor::new(UserId::new(), UserRole::Accountant);
    let err = periods
        .set_period(ledger.tenant_id, 2026, 5, PeriodAction::Close, &accountant)
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::Permission(_)));

    let err = periods
        .set_period(ledger.tenant_id, 2026, 13, PeriodAction::Close, &admin())
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::Validation(_)));

    assert!(!periods.is_closed(ledger.tenant_id, date(2026, 5, 1)).await.unwrap());
    let untouched = periods.get_period(ledger.tenant_id, 2026, 5).await.unwrap();
    assert!(!untouched.is_closed);
    assert!(periods.list_periods(ledger.tenant_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_close_waits_for_posting_into_untouched_month() {
    let Some(db) = connect().await else { return };
    let ledger = setup_ledger(&db).await;
    let periods = PeriodRepository::new(db.clone());

    // Hold the lock a posting dated July 2026 takes. No period row exists yet.
    let posting = db.begin().await.unwrap();
    posting
        .execute(Statement::from_sql_and_values(
            DbBackend::Postgres,
            "SELECT pg_advisory_xact_lock_shared(hashtextextended($1, 0))",
            [format!("{}:period:2026-07", ledger.tenant_id).into()],
        ))
        .await
        .unwrap();

    let close = tokio::spawn({
        let periods = periods.clone();
        let tenant_id = ledger.tenant_id;
        async move {
            periods
                .set_period(tenant_id, 2026, 7, PeriodAction::Close, &admin())
                .await
        }
    });
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(!close.is_finished());

    posting.commit().await.unwrap();
    let closed = close.await.unwrap().unwrap();
    assert!(closed.is_closed);
    assert!(periods.is_closed(ledger.tenant_id, date(2026, 7, 15)).await.unwrap());
}
