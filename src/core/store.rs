//! Consumer-facing facade over the ledger engine.
//!
//! The store owns the in-memory [`Ledger`] plus a storage backend and routes
//! every mutation through the services, persisting synchronously before the
//! call returns. The engine assumes a single writer making synchronous
//! calls; adapting it to a multi-writer host requires wrapping the store in
//! a reader/writer lock so posting and entry numbering cannot interleave.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::services::{AccountService, ChangeLogService, EntryService, ReportService};
use crate::domain::{
    Account, AccountCategory, AccountPatch, AccountType, BalanceSheet, ChangeAction,
    ChangeCategory, ChangeFilter, ChangeRecord, DashboardSummary, EntryStatus, IncomeStatement,
    JournalEntry, NewAccount, NewEntry, TrialBalance,
};
use crate::errors::{LedgerError, Result};
use crate::ledger::{Ledger, CURRENT_SCHEMA_VERSION};
use crate::storage::{
    StorageBackend, ACCOUNTS_KEY, CHANGE_LOG_KEY, ENTRIES_KEY, META_KEY,
};

const SEED_ACTOR: &str = "system";

/// Durable metadata persisted next to the entity arrays.
#[derive(Debug, Serialize, Deserialize)]
struct LedgerMeta {
    schema_version: u8,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    entry_sequences: std::collections::HashMap<String, u32>,
}

/// Snapshot produced by [`LedgerStore::export_ledger`].
#[derive(Debug, Serialize, Deserialize)]
pub struct LedgerExport {
    pub schema_version: u8,
    pub exported_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accounts: Option<Vec<Account>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub journal_entries: Option<Vec<JournalEntry>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change_log: Option<Vec<ChangeRecord>>,
}

/// Sections of the ledger included in an export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportCategory {
    Accounts,
    JournalEntries,
    ChangeLog,
}

pub struct LedgerStore {
    ledger: Ledger,
    backend: Box<dyn StorageBackend>,
}

impl LedgerStore {
    /// Loads existing state from the backend, seeding the default chart of
    /// accounts on first run.
    pub fn open(backend: Box<dyn StorageBackend>) -> Result<Self> {
        let ledger = match backend.read(ACCOUNTS_KEY)? {
            Some(_) => Self::load(backend.as_ref())?,
            None => {
                tracing::info!("no persisted ledger found, seeding defaults");
                let ledger = seed_defaults()?;
                persist(backend.as_ref(), &ledger)?;
                ledger
            }
        };
        Ok(Self { ledger, backend })
    }

    fn load(backend: &dyn StorageBackend) -> Result<Ledger> {
        let accounts: Vec<Account> = read_key(backend, ACCOUNTS_KEY)?;
        let entries: Vec<JournalEntry> = read_key(backend, ENTRIES_KEY)?;
        let change_log: Vec<ChangeRecord> = read_key(backend, CHANGE_LOG_KEY)?;
        let meta: LedgerMeta = match backend.read(META_KEY)? {
            Some(payload) => serde_json::from_str(&payload)?,
            None => LedgerMeta {
                schema_version: CURRENT_SCHEMA_VERSION,
                created_at: Utc::now(),
                updated_at: Utc::now(),
                entry_sequences: Default::default(),
            },
        };
        if meta.schema_version > CURRENT_SCHEMA_VERSION {
            return Err(LedgerError::Storage(format!(
                "ledger schema v{} is newer than supported v{}",
                meta.schema_version, CURRENT_SCHEMA_VERSION
            )));
        }
        Ok(Ledger {
            accounts,
            entries,
            change_log,
            entry_sequences: meta.entry_sequences,
            created_at: meta.created_at,
            updated_at: meta.updated_at,
            schema_version: meta.schema_version,
        })
    }

    /// Persists the candidate state and swaps it in only on success, so a
    /// storage failure leaves the observable state matching what is on disk.
    fn commit(&mut self, next: Ledger) -> Result<()> {
        persist(self.backend.as_ref(), &next)?;
        self.ledger = next;
        Ok(())
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    // ----- chart of accounts -----

    pub fn list_accounts(&self) -> Vec<&Account> {
        AccountService::list(&self.ledger)
    }

    pub fn account(&self, id: Uuid) -> Result<&Account> {
        AccountService::get(&self.ledger, id)
    }

    pub fn accounts_by_type(&self, account_type: AccountType) -> Vec<&Account> {
        AccountService::list_by_type(&self.ledger, account_type)
    }

    pub fn create_account(&mut self, spec: NewAccount, actor: &str) -> Result<Account> {
        let mut next = self.ledger.clone();
        let account = AccountService::create(&mut next, spec, actor)?;
        self.commit(next)?;
        Ok(account)
    }

    pub fn update_account(&mut self, id: Uuid, patch: AccountPatch, actor: &str) -> Result<Account> {
        let mut next = self.ledger.clone();
        let account = AccountService::update(&mut next, id, patch, actor)?;
        self.commit(next)?;
        Ok(account)
    }

    pub fn deactivate_account(&mut self, id: Uuid, actor: &str) -> Result<()> {
        let mut next = self.ledger.clone();
        AccountService::deactivate(&mut next, id, actor)?;
        self.commit(next)
    }

    // ----- journal entries -----

    pub fn create_journal_entry(&mut self, spec: NewEntry, actor: &str) -> Result<JournalEntry> {
        let mut next = self.ledger.clone();
        let entry = EntryService::create(&mut next, spec, actor)?;
        self.commit(next)?;
        Ok(entry)
    }

    pub fn submit_for_approval(&mut self, id: Uuid, actor: &str) -> Result<()> {
        let mut next = self.ledger.clone();
        EntryService::submit_for_approval(&mut next, id, actor)?;
        self.commit(next)
    }

    pub fn approve(&mut self, id: Uuid, approver: &str) -> Result<()> {
        let mut next = self.ledger.clone();
        EntryService::approve(&mut next, id, approver)?;
        self.commit(next)
    }

    pub fn post(&mut self, id: Uuid, poster: &str) -> Result<()> {
        let mut next = self.ledger.clone();
        EntryService::post(&mut next, id, poster)?;
        self.commit(next)
    }

    pub fn reverse(&mut self, id: Uuid, actor: &str, reason: &str) -> Result<JournalEntry> {
        let mut next = self.ledger.clone();
        let reversal = EntryService::reverse(&mut next, id, actor, reason)?;
        self.commit(next)?;
        Ok(reversal)
    }

    pub fn journal_entry(&self, id: Uuid) -> Result<&JournalEntry> {
        EntryService::get(&self.ledger, id)
    }

    // ----- reports -----

    pub fn trial_balance(&self) -> TrialBalance {
        ReportService::trial_balance(&self.ledger)
    }

    pub fn income_statement(&self) -> IncomeStatement {
        ReportService::income_statement(&self.ledger)
    }

    pub fn balance_sheet(&self) -> BalanceSheet {
        ReportService::balance_sheet(&self.ledger)
    }

    pub fn dashboard_summary(&self) -> DashboardSummary {
        ReportService::dashboard_summary(&self.ledger)
    }

    // ----- change log -----

    pub fn change_log(&self, filter: &ChangeFilter, limit: usize) -> Vec<&ChangeRecord> {
        ChangeLogService::query(&self.ledger, filter, limit)
    }

    // ----- export / import -----

    /// Produces a JSON snapshot of the selected categories (all when
    /// `categories` is `None`).
    pub fn export_ledger(&self, categories: Option<&[ExportCategory]>) -> Result<String> {
        let wants = |category: ExportCategory| {
            categories.map_or(true, |selected| selected.contains(&category))
        };
        let export = LedgerExport {
            schema_version: self.ledger.schema_version,
            exported_at: Utc::now(),
            accounts: wants(ExportCategory::Accounts).then(|| self.ledger.accounts.clone()),
            journal_entries: wants(ExportCategory::JournalEntries)
                .then(|| self.ledger.entries.clone()),
            change_log: wants(ExportCategory::ChangeLog).then(|| self.ledger.change_log.clone()),
        };
        Ok(serde_json::to_string_pretty(&export)?)
    }

    /// Replays a snapshot through the same validation rules as normal
    /// creation. Accounts upsert by code; entries insert by id (re-imports
    /// are idempotent) and never re-apply balance deltas, since the imported
    /// account balances already reflect their posted history. The import is
    /// rejected wholesale if the resulting trial balance does not balance.
    pub fn import_ledger(&mut self, json: &str, actor: &str) -> Result<()> {
        let snapshot: LedgerExport = serde_json::from_str(json)
            .map_err(|err| LedgerError::Validation(format!("malformed ledger snapshot: {err}")))?;
        if snapshot.schema_version > CURRENT_SCHEMA_VERSION {
            return Err(LedgerError::Validation(format!(
                "snapshot schema v{} is newer than supported v{}",
                snapshot.schema_version, CURRENT_SCHEMA_VERSION
            )));
        }
        let mut next = self.ledger.clone();

        for account in snapshot.accounts.unwrap_or_default() {
            validate_imported_account(&account)?;
            match next.accounts.iter().position(|existing| existing.code == account.code) {
                Some(index) => next.accounts[index] = account,
                None => next.accounts.push(account),
            }
        }

        for entry in snapshot.journal_entries.unwrap_or_default() {
            if next.entry(entry.id).is_some() {
                continue;
            }
            validate_imported_entry(&next, &entry)?;
            bump_sequence(&mut next, &entry);
            next.entries.push(entry);
        }

        for record in snapshot.change_log.unwrap_or_default() {
            if !next.change_log.iter().any(|existing| existing.id == record.id) {
                next.change_log.push(record);
            }
        }

        let trial = ReportService::trial_balance(&next);
        if !trial.is_balanced {
            return Err(LedgerError::Validation(format!(
                "imported ledger does not balance: debits {} != credits {}",
                trial.total_debit, trial.total_credit
            )));
        }

        next.record_change(ChangeRecord::new(
            Uuid::new_v4(),
            ChangeCategory::System,
            ChangeAction::Imported,
            actor,
        ));
        next.touch();
        self.commit(next)?;
        tracing::info!("ledger snapshot imported");
        Ok(())
    }
}

fn read_key<T: serde::de::DeserializeOwned + Default>(
    backend: &dyn StorageBackend,
    key: &str,
) -> Result<T> {
    match backend.read(key)? {
        Some(payload) => Ok(serde_json::from_str(&payload)?),
        None => Ok(T::default()),
    }
}

fn persist(backend: &dyn StorageBackend, ledger: &Ledger) -> Result<()> {
    backend.write(ACCOUNTS_KEY, &serde_json::to_string(&ledger.accounts)?)?;
    backend.write(ENTRIES_KEY, &serde_json::to_string(&ledger.entries)?)?;
    backend.write(CHANGE_LOG_KEY, &serde_json::to_string(&ledger.change_log)?)?;
    let meta = LedgerMeta {
        schema_version: ledger.schema_version,
        created_at: ledger.created_at,
        updated_at: ledger.updated_at,
        entry_sequences: ledger.entry_sequences.clone(),
    };
    backend.write(META_KEY, &serde_json::to_string(&meta)?)?;
    Ok(())
}

fn validate_imported_account(account: &Account) -> Result<()> {
    if account.code.trim().is_empty() {
        return Err(LedgerError::Validation("account code is required".into()));
    }
    if account.name.trim().is_empty() {
        return Err(LedgerError::Validation("account name is required".into()));
    }
    if account.account_type != account.category.account_type() {
        return Err(LedgerError::Validation(format!(
            "account {} category does not match its type",
            account.code
        )));
    }
    Ok(())
}

/// Imported entries get the same structural checks as new ones, except that
/// lines of already-posted history may reference accounts that have since
/// been deactivated or closed for posting.
fn validate_imported_entry(ledger: &Ledger, entry: &JournalEntry) -> Result<()> {
    if entry.lines.len() < 2 {
        return Err(LedgerError::Validation(format!(
            "entry {} requires at least two lines",
            entry.entry_number
        )));
    }
    for (index, line) in entry.lines.iter().enumerate() {
        if line.debit < Decimal::ZERO || line.credit < Decimal::ZERO {
            return Err(LedgerError::InvalidLine(format!(
                "entry {} line {} has a negative amount",
                entry.entry_number,
                index + 1
            )));
        }
        if (line.debit > Decimal::ZERO) == (line.credit > Decimal::ZERO) {
            return Err(LedgerError::InvalidLine(format!(
                "entry {} line {} must carry exactly one of debit or credit",
                entry.entry_number,
                index + 1
            )));
        }
        let account = ledger
            .account(line.account_id)
            .ok_or(LedgerError::AccountNotFound(line.account_id))?;
        if entry.status == EntryStatus::Draft && !(account.is_active && account.allow_posting) {
            return Err(LedgerError::Validation(format!(
                "entry {} references account {} which no longer accepts postings",
                entry.entry_number, account.code
            )));
        }
    }
    let total_debit: Decimal = entry.lines.iter().map(|line| line.debit).sum();
    let total_credit: Decimal = entry.lines.iter().map(|line| line.credit).sum();
    if entry.status != EntryStatus::Draft && total_debit != total_credit {
        return Err(LedgerError::UnbalancedEntry {
            debit: total_debit,
            credit: total_credit,
        });
    }
    Ok(())
}

/// Keeps the per-period counter ahead of imported entry numbers so future
/// allocations cannot collide.
fn bump_sequence(ledger: &mut Ledger, entry: &JournalEntry) {
    let sequence = entry
        .entry_number
        .get(8..)
        .and_then(|tail| tail.parse::<u32>().ok())
        .unwrap_or(0);
    let counter = ledger.entry_sequences.entry(entry.period.key()).or_insert(0);
    if sequence > *counter {
        *counter = sequence;
    }
}

/// Installs the standard e-commerce chart of accounts with opening balances
/// that satisfy the accounting equation.
fn seed_defaults() -> Result<Ledger> {
    use rust_decimal_macros::dec;
    let mut ledger = Ledger::new();
    let seeds = [
        NewAccount::new("1001", "Cash", AccountCategory::CurrentAssets)
            .with_opening_balance(dec!(50000)),
        NewAccount::new("1002", "Bank Deposits", AccountCategory::CurrentAssets)
            .with_opening_balance(dec!(200000)),
        NewAccount::new("1101", "Accounts Receivable", AccountCategory::CurrentAssets)
            .with_opening_balance(dec!(30000)),
        NewAccount::new("1201", "Merchandise Inventory", AccountCategory::CurrentAssets)
            .with_opening_balance(dec!(80000)),
        NewAccount::new("2001", "Accounts Payable", AccountCategory::CurrentLiabilities)
            .with_opening_balance(dec!(40000)),
        NewAccount::new("2101", "Tax Payable", AccountCategory::CurrentLiabilities)
            .with_opening_balance(dec!(10000)),
        NewAccount::new("3001", "Paid-in Capital", AccountCategory::PaidInCapital)
            .with_opening_balance(dec!(250000))
            .as_system(),
        NewAccount::new("3101", "Retained Earnings", AccountCategory::RetainedEarnings)
            .with_opening_balance(dec!(60000))
            .as_system(),
        NewAccount::new("4001", "Sales Revenue", AccountCategory::OperatingRevenue),
        NewAccount::new("4002", "Shipping Revenue", AccountCategory::OperatingRevenue),
        NewAccount::new("5001", "Cost of Goods Sold", AccountCategory::CostOfSales),
        NewAccount::new("6001", "Payroll Expense", AccountCategory::OperatingExpenses),
        NewAccount::new("6002", "Advertising Expense", AccountCategory::OperatingExpenses),
        NewAccount::new("6003", "Card Processing Fees", AccountCategory::FinancialExpenses),
    ];
    for spec in seeds {
        AccountService::create(&mut ledger, spec, SEED_ACTOR)?;
    }
    ledger.record_change(ChangeRecord::new(
        Uuid::new_v4(),
        ChangeCategory::System,
        ChangeAction::Seeded,
        SEED_ACTOR,
    ));
    Ok(ledger)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{EntryLine, SourceType};
    use crate::storage::MemoryStorage;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn open_store() -> LedgerStore {
        LedgerStore::open(Box::new(MemoryStorage::new())).expect("open store")
    }

    #[test]
    fn first_run_seeds_a_balanced_chart() {
        let store = open_store();
        assert_eq!(store.list_accounts().len(), 14);
        let sheet = store.balance_sheet();
        assert!(sheet.is_balanced);
        assert!(store.trial_balance().is_balanced);
        assert_eq!(sheet.total_assets, dec!(360000));
    }

    #[test]
    fn export_then_import_into_fresh_store_is_lossless() {
        let mut source = open_store();
        let cash = source.ledger().account_by_code("1001").unwrap().id;
        let sales = source.ledger().account_by_code("4001").unwrap().id;
        let entry = source
            .create_journal_entry(
                NewEntry::new(
                    NaiveDate::from_ymd_opt(2026, 8, 1).unwrap(),
                    SourceType::Order,
                    "Cash sale",
                    vec![
                        EntryLine::debit(cash, dec!(500)),
                        EntryLine::credit(sales, dec!(500)),
                    ],
                ),
                "tester",
            )
            .unwrap();
        source.post(entry.id, "tester").unwrap();
        let snapshot = source.export_ledger(None).unwrap();

        let mut target = open_store();
        target.import_ledger(&snapshot, "importer").unwrap();
        assert!(target.trial_balance().is_balanced);
        assert_eq!(
            target.ledger().account_by_code("1001").unwrap().balance,
            dec!(50500)
        );
        assert!(target.journal_entry(entry.id).is_ok());

        // Importing the same snapshot twice must not duplicate entries.
        target.import_ledger(&snapshot, "importer").unwrap();
        assert_eq!(
            target
                .ledger()
                .entries
                .iter()
                .filter(|candidate| candidate.id == entry.id)
                .count(),
            1
        );
    }

    #[test]
    fn import_keeps_entry_numbering_collision_free() {
        let mut source = open_store();
        let cash = source.ledger().account_by_code("1001").unwrap().id;
        let sales = source.ledger().account_by_code("4001").unwrap().id;
        let date = NaiveDate::from_ymd_opt(2026, 8, 1).unwrap();
        let spec = NewEntry::new(
            date,
            SourceType::Order,
            "Cash sale",
            vec![
                EntryLine::debit(cash, dec!(500)),
                EntryLine::credit(sales, dec!(500)),
            ],
        );
        source.create_journal_entry(spec.clone(), "tester").unwrap();
        let snapshot = source.export_ledger(None).unwrap();

        let mut target = open_store();
        target.import_ledger(&snapshot, "importer").unwrap();
        let fresh = target.create_journal_entry(spec, "tester").unwrap();
        assert_eq!(fresh.entry_number, "JE2026080002");
    }

    #[test]
    fn malformed_snapshot_is_rejected() {
        let mut store = open_store();
        let err = store.import_ledger("{\"not\": \"a snapshot\"", "importer").unwrap_err();
        assert!(matches!(err, LedgerError::Validation(_)));
    }

    #[test]
    fn partial_export_honours_categories() {
        let store = open_store();
        let snapshot = store
            .export_ledger(Some(&[ExportCategory::Accounts]))
            .unwrap();
        let parsed: LedgerExport = serde_json::from_str(&snapshot).unwrap();
        assert!(parsed.accounts.is_some());
        assert!(parsed.journal_entries.is_none());
        assert!(parsed.change_log.is_none());
    }
}
