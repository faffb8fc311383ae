//! End-to-end scenarios exercised through the consumer facade.

use chrono::NaiveDate;
use ledger_core::core::LedgerStore;
use ledger_core::domain::{
    AccountCategory, AccountPatch, EntryLine, EntryStatus, NewAccount, NewEntry, SourceType,
};
use ledger_core::errors::LedgerError;
use ledger_core::storage::MemoryStorage;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

fn open_store() -> LedgerStore {
    LedgerStore::open(Box::new(MemoryStorage::new())).expect("open store")
}

fn entry_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 8, 20).unwrap()
}

/// Fresh debit/credit pair so scenario balances start from zero.
fn scenario_accounts(store: &mut LedgerStore) -> (Uuid, Uuid) {
    let cash = store
        .create_account(
            NewAccount::new("1901", "Scenario Cash", AccountCategory::CurrentAssets),
            "tester",
        )
        .unwrap();
    let sales = store
        .create_account(
            NewAccount::new("4901", "Scenario Sales", AccountCategory::OperatingRevenue),
            "tester",
        )
        .unwrap();
    (cash.id, sales.id)
}

fn sale_entry(cash: Uuid, sales: Uuid, debit: Decimal, credit: Decimal) -> NewEntry {
    NewEntry::new(
        entry_date(),
        SourceType::Order,
        "Scenario sale",
        vec![
            EntryLine::debit(cash, debit),
            EntryLine::credit(sales, credit),
        ],
    )
}

#[test]
fn posting_a_balanced_entry_moves_both_balances() {
    let mut store = open_store();
    let (cash, sales) = scenario_accounts(&mut store);
    let entry = store
        .create_journal_entry(sale_entry(cash, sales, dec!(1000), dec!(1000)), "tester")
        .unwrap();
    store.post(entry.id, "tester").unwrap();

    assert_eq!(store.account(cash).unwrap().balance, dec!(1000));
    assert_eq!(store.account(sales).unwrap().balance, dec!(1000));
    assert!(store.trial_balance().is_balanced);
}

#[test]
fn unbalanced_entry_is_rejected_and_balances_stay_zero() {
    let mut store = open_store();
    let (cash, sales) = scenario_accounts(&mut store);
    let entry = store
        .create_journal_entry(sale_entry(cash, sales, dec!(1000), dec!(900)), "tester")
        .unwrap();

    let err = store.submit_for_approval(entry.id, "tester").unwrap_err();
    assert!(matches!(err, LedgerError::UnbalancedEntry { .. }));
    let err = store.post(entry.id, "tester").unwrap_err();
    assert!(matches!(err, LedgerError::UnbalancedEntry { .. }));

    assert_eq!(store.account(cash).unwrap().balance, Decimal::ZERO);
    assert_eq!(store.account(sales).unwrap().balance, Decimal::ZERO);
    assert_eq!(
        store.journal_entry(entry.id).unwrap().status,
        EntryStatus::Draft
    );
}

#[test]
fn deactivating_a_system_account_fails_with_account_in_use() {
    let mut store = open_store();
    let retained = store.ledger().account_by_code("3101").unwrap().id;
    let err = store.deactivate_account(retained, "tester").unwrap_err();
    assert!(matches!(err, LedgerError::AccountInUse(_)));
    assert!(store.account(retained).unwrap().is_active);
}

#[test]
fn reversal_returns_balances_to_their_pre_entry_values() {
    let mut store = open_store();
    let (cash, sales) = scenario_accounts(&mut store);
    let entry = store
        .create_journal_entry(sale_entry(cash, sales, dec!(1000), dec!(1000)), "tester")
        .unwrap();
    store.post(entry.id, "tester").unwrap();

    let reversal = store
        .reverse(entry.id, "auditor", "customer refund")
        .unwrap();
    assert_eq!(reversal.status, EntryStatus::Posted);
    assert_eq!(store.account(cash).unwrap().balance, Decimal::ZERO);
    assert_eq!(store.account(sales).unwrap().balance, Decimal::ZERO);
    assert_eq!(
        store.journal_entry(entry.id).unwrap().status,
        EntryStatus::Reversed
    );
    assert!(store.trial_balance().is_balanced);
}

#[test]
fn reports_are_idempotent_without_intervening_mutations() {
    let mut store = open_store();
    let (cash, sales) = scenario_accounts(&mut store);
    let entry = store
        .create_journal_entry(sale_entry(cash, sales, dec!(750), dec!(750)), "tester")
        .unwrap();
    store.post(entry.id, "tester").unwrap();

    let first = store.trial_balance();
    let second = store.trial_balance();
    assert_eq!(first.rows, second.rows);
    assert_eq!(first.total_debit, second.total_debit);
    assert_eq!(first.total_credit, second.total_credit);
    assert_eq!(first.is_balanced, second.is_balanced);
}

#[test]
fn update_account_cannot_touch_the_balance() {
    let mut store = open_store();
    let cash = store.ledger().account_by_code("1001").unwrap().id;
    let before = store.account(cash).unwrap().balance;

    // A caller-supplied balance field is not part of the patch shape and is
    // discarded on deserialization.
    let patch: AccountPatch =
        serde_json::from_str(r#"{"name": "Till", "balance": "999999"}"#).unwrap();
    let updated = store.update_account(cash, patch, "tester").unwrap();
    assert_eq!(updated.name, "Till");
    assert_eq!(updated.balance, before);
}

#[test]
fn dashboard_summary_reports_ratios_from_the_seeded_chart() {
    let store = open_store();
    let summary = store.dashboard_summary();
    assert!(summary.trial_balanced);
    assert_eq!(summary.total_assets, dec!(360000));
    assert_eq!(summary.total_liabilities, dec!(50000));
    assert_eq!(summary.total_equity, dec!(310000));
    assert_eq!(summary.current_ratio, dec!(7.2));
    // Seeded revenue is zero, so the margin guard kicks in.
    assert_eq!(summary.profit_margin, Decimal::ZERO);
}
