use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{Account, ChangeRecord, EntryStatus, JournalEntry, Period};

pub const CURRENT_SCHEMA_VERSION: u8 = 1;

/// In-memory ledger state: the chart of accounts, journal entries, audit
/// trail, and the durable per-period entry-number counters.
///
/// All mutation is routed through the services in [`crate::core`]; the
/// aggregate itself only offers lookups and bookkeeping helpers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ledger {
    #[serde(default)]
    pub accounts: Vec<Account>,
    #[serde(default)]
    pub entries: Vec<JournalEntry>,
    #[serde(default)]
    pub change_log: Vec<ChangeRecord>,
    /// Period key ("YYYY-MM") to last allocated entry sequence.
    #[serde(default)]
    pub entry_sequences: HashMap<String, u32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default = "Ledger::schema_version_default")]
    pub schema_version: u8,
}

impl Ledger {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            accounts: Vec::new(),
            entries: Vec::new(),
            change_log: Vec::new(),
            entry_sequences: HashMap::new(),
            created_at: now,
            updated_at: now,
            schema_version: CURRENT_SCHEMA_VERSION,
        }
    }

    pub fn account(&self, id: Uuid) -> Option<&Account> {
        self.accounts.iter().find(|account| account.id == id)
    }

    pub fn account_mut(&mut self, id: Uuid) -> Option<&mut Account> {
        self.accounts.iter_mut().find(|account| account.id == id)
    }

    pub fn account_by_code(&self, code: &str) -> Option<&Account> {
        self.accounts.iter().find(|account| account.code == code)
    }

    pub fn entry(&self, id: Uuid) -> Option<&JournalEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    pub fn entry_mut(&mut self, id: Uuid) -> Option<&mut JournalEntry> {
        self.entries.iter_mut().find(|entry| entry.id == id)
    }

    /// True when any posted (or later reversed) entry references the account.
    pub fn account_has_posted_lines(&self, id: Uuid) -> bool {
        self.entries
            .iter()
            .filter(|entry| matches!(entry.status, EntryStatus::Posted | EntryStatus::Reversed))
            .any(|entry| entry.lines.iter().any(|line| line.account_id == id))
    }

    /// Allocates the next sequence for the period, persisting the high-water
    /// mark in the snapshot so numbering stays monotonic across restarts.
    pub fn next_sequence(&mut self, period: Period) -> u32 {
        let counter = self.entry_sequences.entry(period.key()).or_insert(0);
        *counter += 1;
        *counter
    }

    pub fn record_change(&mut self, record: ChangeRecord) {
        self.change_log.push(record);
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn schema_version_default() -> u8 {
        CURRENT_SCHEMA_VERSION
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}
