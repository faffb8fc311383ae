use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::entry::format_entry_number;
use crate::domain::{
    AccountType, BalanceSide, ChangeAction, ChangeCategory, ChangeRecord, EntryLine, EntryStatus,
    JournalEntry, NewEntry, Period, SourceType,
};
use crate::errors::{LedgerError, Result};
use crate::ledger::Ledger;

pub struct EntryService;

impl EntryService {
    /// Creates a draft entry. Lines are shape-checked against the chart of
    /// accounts, but the draft may be unbalanced so entries can be built
    /// incrementally; balance is enforced at submit and post time.
    pub fn create(ledger: &mut Ledger, spec: NewEntry, actor: &str) -> Result<JournalEntry> {
        Self::create_internal(ledger, spec, actor, true)
    }

    fn create_internal(
        ledger: &mut Ledger,
        spec: NewEntry,
        actor: &str,
        require_postable: bool,
    ) -> Result<JournalEntry> {
        Self::validate_lines_with(ledger, &spec.lines, require_postable)?;
        let period = Period::from_date(spec.entry_date);
        let sequence = ledger.next_sequence(period);
        let mut entry = JournalEntry {
            id: Uuid::new_v4(),
            entry_number: format_entry_number(period, sequence),
            entry_date: spec.entry_date,
            period,
            source_type: spec.source_type,
            source_id: spec.source_id,
            reference_number: spec.reference_number,
            description: spec.description,
            lines: spec.lines,
            total_debit: Decimal::ZERO,
            total_credit: Decimal::ZERO,
            status: EntryStatus::Draft,
            created_by: actor.to_string(),
            created_at: Utc::now(),
            posted_by: None,
            posted_at: None,
            is_adjustment: spec.is_adjustment,
        };
        entry.recompute_totals();
        ledger.entries.push(entry.clone());
        ledger.record_change(
            ChangeRecord::new(
                entry.id,
                ChangeCategory::JournalEntry,
                ChangeAction::Created,
                actor,
            )
            .with_values(None, Some(serde_json::to_value(&entry)?)),
        );
        ledger.touch();
        tracing::debug!(entry_number = %entry.entry_number, "journal entry created");
        Ok(entry)
    }

    pub fn get(ledger: &Ledger, id: Uuid) -> Result<&JournalEntry> {
        ledger.entry(id).ok_or(LedgerError::EntryNotFound(id))
    }

    /// `Draft -> Pending`; rejected while the entry does not balance.
    pub fn submit_for_approval(ledger: &mut Ledger, id: Uuid, actor: &str) -> Result<()> {
        let entry = ledger.entry(id).ok_or(LedgerError::EntryNotFound(id))?;
        if entry.status != EntryStatus::Draft {
            return Err(LedgerError::InvalidStateTransition {
                from: entry.status,
                to: EntryStatus::Pending,
            });
        }
        if !entry.is_balanced() {
            return Err(LedgerError::UnbalancedEntry {
                debit: entry.total_debit,
                credit: entry.total_credit,
            });
        }
        Self::set_status(ledger, id, EntryStatus::Pending, actor)
    }

    /// `Pending -> Approved`.
    pub fn approve(ledger: &mut Ledger, id: Uuid, approver: &str) -> Result<()> {
        let entry = ledger.entry(id).ok_or(LedgerError::EntryNotFound(id))?;
        if entry.status != EntryStatus::Pending {
            return Err(LedgerError::InvalidStateTransition {
                from: entry.status,
                to: EntryStatus::Approved,
            });
        }
        Self::set_status(ledger, id, EntryStatus::Approved, approver)
    }

    /// Applies the entry to account balances and makes it immutable.
    ///
    /// Valid from `Draft` (when no approval workflow is configured) or
    /// `Approved`. The balance invariant and every line are re-validated
    /// here regardless of prior state, and all account deltas are computed
    /// before any balance moves, so a failure leaves every balance
    /// untouched.
    pub fn post(ledger: &mut Ledger, id: Uuid, poster: &str) -> Result<()> {
        Self::post_internal(ledger, id, poster, true)
    }

    fn post_internal(
        ledger: &mut Ledger,
        id: Uuid,
        poster: &str,
        require_postable: bool,
    ) -> Result<()> {
        let entry = ledger.entry(id).ok_or(LedgerError::EntryNotFound(id))?.clone();
        if !matches!(entry.status, EntryStatus::Draft | EntryStatus::Approved) {
            return Err(LedgerError::InvalidStateTransition {
                from: entry.status,
                to: EntryStatus::Posted,
            });
        }
        if !entry.is_balanced() {
            return Err(LedgerError::UnbalancedEntry {
                debit: entry.total_debit,
                credit: entry.total_credit,
            });
        }
        Self::validate_lines_with(ledger, &entry.lines, require_postable)?;

        // Validate-then-apply: gather every delta first.
        let mut deltas: Vec<(Uuid, Decimal)> = Vec::with_capacity(entry.lines.len());
        for line in &entry.lines {
            let account = ledger
                .account(line.account_id)
                .ok_or(LedgerError::AccountNotFound(line.account_id))?;
            if account.is_system
                && account.account_type == AccountType::Equity
                && entry.source_type != SourceType::Closing
            {
                return Err(LedgerError::Validation(format!(
                    "account {} accepts closing entries only",
                    account.code
                )));
            }
            let (amount, side) = if line.debit > Decimal::ZERO {
                (line.debit, BalanceSide::Debit)
            } else {
                (line.credit, BalanceSide::Credit)
            };
            let delta = if side == account.balance_side {
                amount
            } else {
                -amount
            };
            deltas.push((account.id, delta));
        }

        for (account_id, delta) in &deltas {
            let account = ledger
                .account_mut(*account_id)
                .ok_or(LedgerError::AccountNotFound(*account_id))?;
            let old_balance = account.balance;
            account.balance += *delta;
            let new_balance = account.balance;
            ledger.record_change(
                ChangeRecord::new(
                    *account_id,
                    ChangeCategory::Account,
                    ChangeAction::BalanceChanged,
                    poster,
                )
                .with_values(
                    Some(serde_json::to_value(old_balance)?),
                    Some(serde_json::to_value(new_balance)?),
                )
                .with_reason(format!("posting {}", entry.entry_number)),
            );
        }

        let target = ledger.entry_mut(id).ok_or(LedgerError::EntryNotFound(id))?;
        target.status = EntryStatus::Posted;
        target.posted_by = Some(poster.to_string());
        target.posted_at = Some(Utc::now());
        ledger.record_change(
            ChangeRecord::new(
                id,
                ChangeCategory::JournalEntry,
                ChangeAction::StatusChanged,
                poster,
            )
            .with_values(
                Some(serde_json::to_value(entry.status)?),
                Some(serde_json::to_value(EntryStatus::Posted)?),
            ),
        );
        ledger.touch();
        tracing::info!(entry_number = %entry.entry_number, "journal entry posted");
        Ok(())
    }

    /// Creates and posts a mirror-image entry, then marks the original
    /// `Reversed`. The original's lines are never touched; history stays
    /// immutable.
    pub fn reverse(
        ledger: &mut Ledger,
        id: Uuid,
        actor: &str,
        reason: &str,
    ) -> Result<JournalEntry> {
        let original = ledger.entry(id).ok_or(LedgerError::EntryNotFound(id))?.clone();
        if original.status != EntryStatus::Posted {
            return Err(LedgerError::InvalidStateTransition {
                from: original.status,
                to: EntryStatus::Reversed,
            });
        }
        let lines: Vec<EntryLine> = original.lines.iter().map(EntryLine::swapped).collect();
        // The reversal keeps the original's source type so closing entries
        // stay reversible against system equity accounts.
        let mut spec = NewEntry::new(
            original.entry_date,
            original.source_type,
            format!("Reversal of {}: {}", original.entry_number, reason),
            lines,
        );
        spec.source_id = Some(original.id.to_string());
        spec.is_adjustment = true;
        // Posted history may reference accounts that were deactivated or
        // closed for posting after the fact; a reversal must still be able
        // to undo it.
        let reversal = Self::create_internal(ledger, spec, actor, false)?;
        Self::post_internal(ledger, reversal.id, actor, false)?;

        let target = ledger.entry_mut(id).ok_or(LedgerError::EntryNotFound(id))?;
        target.status = EntryStatus::Reversed;
        ledger.record_change(
            ChangeRecord::new(
                id,
                ChangeCategory::JournalEntry,
                ChangeAction::StatusChanged,
                actor,
            )
            .with_values(
                Some(serde_json::to_value(EntryStatus::Posted)?),
                Some(serde_json::to_value(EntryStatus::Reversed)?),
            )
            .with_reason(reason),
        );
        ledger.touch();
        let reversal = ledger
            .entry(reversal.id)
            .ok_or(LedgerError::EntryNotFound(reversal.id))?
            .clone();
        Ok(reversal)
    }

    /// Shared line validation for creation, import, and the post-time
    /// re-check.
    pub fn validate_lines(ledger: &Ledger, lines: &[EntryLine]) -> Result<()> {
        Self::validate_lines_with(ledger, lines, true)
    }

    /// `require_postable = false` skips the active/allow-posting checks;
    /// reversals of posted history use it so a since-deactivated account
    /// does not strand its entries.
    fn validate_lines_with(
        ledger: &Ledger,
        lines: &[EntryLine],
        require_postable: bool,
    ) -> Result<()> {
        if lines.len() < 2 {
            return Err(LedgerError::Validation(
                "a journal entry requires at least two lines".into(),
            ));
        }
        for (index, line) in lines.iter().enumerate() {
            if line.debit < Decimal::ZERO || line.credit < Decimal::ZERO {
                return Err(LedgerError::InvalidLine(format!(
                    "line {} has a negative amount",
                    index + 1
                )));
            }
            let has_debit = line.debit > Decimal::ZERO;
            let has_credit = line.credit > Decimal::ZERO;
            if has_debit == has_credit {
                return Err(LedgerError::InvalidLine(format!(
                    "line {} must carry exactly one of debit or credit",
                    index + 1
                )));
            }
            let account = ledger
                .account(line.account_id)
                .ok_or(LedgerError::AccountNotFound(line.account_id))?;
            if require_postable {
                if !account.is_active {
                    return Err(LedgerError::Validation(format!(
                        "account {} is inactive",
                        account.code
                    )));
                }
                if !account.allow_posting {
                    return Err(LedgerError::Validation(format!(
                        "account {} does not accept postings",
                        account.code
                    )));
                }
            }
        }
        Ok(())
    }

    fn set_status(ledger: &mut Ledger, id: Uuid, status: EntryStatus, actor: &str) -> Result<()> {
        let entry = ledger.entry_mut(id).ok_or(LedgerError::EntryNotFound(id))?;
        let previous = entry.status;
        entry.status = status;
        ledger.record_change(
            ChangeRecord::new(
                id,
                ChangeCategory::JournalEntry,
                ChangeAction::StatusChanged,
                actor,
            )
            .with_values(
                Some(serde_json::to_value(previous)?),
                Some(serde_json::to_value(status)?),
            ),
        );
        ledger.touch();
        Ok(())
    }
}
