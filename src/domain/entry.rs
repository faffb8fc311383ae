use std::fmt;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Year-month bucket an entry belongs to; scopes the entry-number sequence.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Period {
    pub year: i32,
    pub month: u32,
}

impl Period {
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Stable key used for the persisted sequence counters, e.g. "2026-08".
    pub fn key(&self) -> String {
        format!("{:04}-{:02}", self.year, self.month)
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// A dated, described set of balanced debit/credit lines for one business
/// event.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JournalEntry {
    pub id: Uuid,
    /// Human-readable sequential number, e.g. "JE2026080001".
    pub entry_number: String,
    pub entry_date: NaiveDate,
    pub period: Period,
    pub source_type: SourceType,
    /// Identifier of the originating business event, or of the reversed
    /// entry for reversal entries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_number: Option<String>,
    pub description: String,
    pub lines: Vec<EntryLine>,
    pub total_debit: Decimal,
    pub total_credit: Decimal,
    pub status: EntryStatus,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub posted_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub posted_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_adjustment: bool,
}

impl JournalEntry {
    pub fn is_balanced(&self) -> bool {
        self.total_debit == self.total_credit
    }

    /// Recomputes the stored totals from the current lines.
    pub fn recompute_totals(&mut self) {
        self.total_debit = self.lines.iter().map(|line| line.debit).sum();
        self.total_credit = self.lines.iter().map(|line| line.credit).sum();
    }
}

/// One debit or credit against a single account.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EntryLine {
    pub account_id: Uuid,
    #[serde(default)]
    pub debit: Decimal,
    #[serde(default)]
    pub credit: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl EntryLine {
    pub fn debit(account_id: Uuid, amount: Decimal) -> Self {
        Self {
            account_id,
            debit: amount,
            credit: Decimal::ZERO,
            description: None,
        }
    }

    pub fn credit(account_id: Uuid, amount: Decimal) -> Self {
        Self {
            account_id,
            debit: Decimal::ZERO,
            credit: amount,
            description: None,
        }
    }

    /// Returns the mirror-image line used when reversing a posted entry.
    pub fn swapped(&self) -> Self {
        Self {
            account_id: self.account_id,
            debit: self.credit,
            credit: self.debit,
            description: self.description.clone(),
        }
    }
}

/// Creation request for a journal entry; validated by the entry service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewEntry {
    pub entry_date: NaiveDate,
    pub source_type: SourceType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_number: Option<String>,
    pub description: String,
    pub lines: Vec<EntryLine>,
    #[serde(default)]
    pub is_adjustment: bool,
}

impl NewEntry {
    pub fn new(
        entry_date: NaiveDate,
        source_type: SourceType,
        description: impl Into<String>,
        lines: Vec<EntryLine>,
    ) -> Self {
        Self {
            entry_date,
            source_type,
            source_id: None,
            reference_number: None,
            description: description.into(),
            lines,
            is_adjustment: false,
        }
    }
}

/// Lifecycle of a journal entry. `Pending`/`Approved` are optional
/// checkpoints; `Reversed` is terminal and reachable only from `Posted`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EntryStatus {
    Draft,
    Pending,
    Approved,
    Posted,
    Reversed,
}

impl fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EntryStatus::Draft => "draft",
            EntryStatus::Pending => "pending",
            EntryStatus::Approved => "approved",
            EntryStatus::Posted => "posted",
            EntryStatus::Reversed => "reversed",
        };
        f.write_str(label)
    }
}

/// Business event that produced an entry.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    Manual,
    Order,
    Payment,
    Refund,
    Purchase,
    Inventory,
    Expense,
    Payroll,
    Depreciation,
    Adjustment,
    Closing,
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SourceType::Manual => "manual",
            SourceType::Order => "order",
            SourceType::Payment => "payment",
            SourceType::Refund => "refund",
            SourceType::Purchase => "purchase",
            SourceType::Inventory => "inventory",
            SourceType::Expense => "expense",
            SourceType::Payroll => "payroll",
            SourceType::Depreciation => "depreciation",
            SourceType::Adjustment => "adjustment",
            SourceType::Closing => "closing",
        };
        f.write_str(label)
    }
}

/// Formats an entry number from its period and per-period sequence.
pub fn format_entry_number(period: Period, sequence: u32) -> String {
    format!("JE{:04}{:02}{:04}", period.year, period.month, sequence)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn entry_number_embeds_period_and_sequence() {
        let period = Period { year: 2026, month: 8 };
        assert_eq!(format_entry_number(period, 1), "JE2026080001");
        assert_eq!(format_entry_number(period, 412), "JE2026080412");
    }

    #[test]
    fn swapped_line_mirrors_amounts() {
        let line = EntryLine::debit(Uuid::new_v4(), dec!(99.50));
        let swapped = line.swapped();
        assert_eq!(swapped.debit, Decimal::ZERO);
        assert_eq!(swapped.credit, dec!(99.50));
        assert_eq!(swapped.account_id, line.account_id);
    }

    #[test]
    fn period_key_is_zero_padded() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 5).unwrap();
        assert_eq!(Period::from_date(date).key(), "2026-03");
    }
}
