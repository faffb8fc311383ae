use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::{
    Account, AccountPatch, AccountType, ChangeAction, ChangeCategory, ChangeRecord, NewAccount,
};
use crate::errors::{LedgerError, Result};
use crate::ledger::Ledger;

pub struct AccountService;

impl AccountService {
    /// Validates and installs a new account, logging a `Created` change.
    pub fn create(ledger: &mut Ledger, spec: NewAccount, actor: &str) -> Result<Account> {
        Self::validate_spec(ledger, &spec)?;
        let account = Account::from_spec(spec);
        let snapshot = serde_json::to_value(&account)?;
        ledger.accounts.push(account.clone());
        ledger.record_change(
            ChangeRecord::new(
                account.id,
                ChangeCategory::Account,
                ChangeAction::Created,
                actor,
            )
            .with_values(None, Some(snapshot)),
        );
        ledger.touch();
        tracing::debug!(code = %account.code, "account created");
        Ok(account)
    }

    pub fn get(ledger: &Ledger, id: Uuid) -> Result<&Account> {
        ledger.account(id).ok_or(LedgerError::AccountNotFound(id))
    }

    pub fn list(ledger: &Ledger) -> Vec<&Account> {
        let mut accounts: Vec<&Account> = ledger.accounts.iter().collect();
        accounts.sort_by(|a, b| a.code.cmp(&b.code));
        accounts
    }

    pub fn list_by_type(ledger: &Ledger, account_type: AccountType) -> Vec<&Account> {
        Self::list(ledger)
            .into_iter()
            .filter(|account| account.account_type == account_type)
            .collect()
    }

    /// Applies a field-level patch. Classification changes are rejected once
    /// the account carries posted history, since they would rewrite every
    /// historical report. The balance is untouchable here by construction:
    /// [`AccountPatch`] has no balance field.
    pub fn update(
        ledger: &mut Ledger,
        id: Uuid,
        patch: AccountPatch,
        actor: &str,
    ) -> Result<Account> {
        let has_posted_lines = ledger.account_has_posted_lines(id);
        let account = ledger
            .account(id)
            .ok_or(LedgerError::AccountNotFound(id))?
            .clone();
        let old_snapshot = serde_json::to_value(&account)?;

        if has_posted_lines {
            if let Some(category) = patch.category {
                if category.account_type() != account.account_type {
                    return Err(LedgerError::Validation(format!(
                        "account {} has posted history; its type cannot change",
                        account.code
                    )));
                }
            }
            if patch
                .balance_side
                .is_some_and(|side| side != account.balance_side)
            {
                return Err(LedgerError::Validation(format!(
                    "account {} has posted history; its balance side cannot change",
                    account.code
                )));
            }
        }

        let target = ledger
            .account_mut(id)
            .ok_or(LedgerError::AccountNotFound(id))?;
        if let Some(name) = patch.name {
            target.name = name;
        }
        if let Some(category) = patch.category {
            target.category = category;
            target.account_type = category.account_type();
        }
        if let Some(side) = patch.balance_side {
            target.balance_side = side;
        }
        if let Some(allow_posting) = patch.allow_posting {
            target.allow_posting = allow_posting;
        }
        if let Some(require_department) = patch.require_department {
            target.require_department = require_department;
        }
        if let Some(require_project) = patch.require_project {
            target.require_project = require_project;
        }
        if let Some(is_tax_account) = patch.is_tax_account {
            target.is_tax_account = is_tax_account;
        }
        let updated = target.clone();
        let new_snapshot = serde_json::to_value(&updated)?;
        ledger.record_change(
            ChangeRecord::new(id, ChangeCategory::Account, ChangeAction::Updated, actor)
                .with_values(Some(old_snapshot), Some(new_snapshot)),
        );
        ledger.touch();
        Ok(updated)
    }

    /// Soft-deletes an account. Accounts are never physically removed once
    /// referenced, so historical reports stay reproducible.
    pub fn deactivate(ledger: &mut Ledger, id: Uuid, actor: &str) -> Result<()> {
        let account = ledger.account(id).ok_or(LedgerError::AccountNotFound(id))?;
        if account.is_system {
            return Err(LedgerError::AccountInUse(format!(
                "account {} is a protected system account",
                account.code
            )));
        }
        if account.balance != Decimal::ZERO {
            return Err(LedgerError::AccountInUse(format!(
                "account {} still carries a balance of {}",
                account.code, account.balance
            )));
        }
        let target = ledger
            .account_mut(id)
            .ok_or(LedgerError::AccountNotFound(id))?;
        target.is_active = false;
        let code = target.code.clone();
        ledger.record_change(ChangeRecord::new(
            id,
            ChangeCategory::Account,
            ChangeAction::Deactivated,
            actor,
        ));
        ledger.touch();
        tracing::debug!(code = %code, "account deactivated");
        Ok(())
    }

    /// Shared validation path for creation and import.
    pub fn validate_spec(ledger: &Ledger, spec: &NewAccount) -> Result<()> {
        let code = spec.code.trim();
        if code.is_empty() {
            return Err(LedgerError::Validation("account code is required".into()));
        }
        if spec.name.trim().is_empty() {
            return Err(LedgerError::Validation("account name is required".into()));
        }
        if ledger.account_by_code(code).is_some() {
            return Err(LedgerError::DuplicateAccountCode(code.to_string()));
        }
        if spec
            .opening_balance
            .is_some_and(|balance| balance < Decimal::ZERO)
        {
            return Err(LedgerError::Validation(
                "opening balance must not be negative".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AccountCategory, BalanceSide};
    use rust_decimal_macros::dec;

    fn cash_spec() -> NewAccount {
        NewAccount::new("1001", "Cash", AccountCategory::CurrentAssets)
    }

    #[test]
    fn create_defaults_side_and_balance() {
        let mut ledger = Ledger::new();
        let account = AccountService::create(&mut ledger, cash_spec(), "tester").unwrap();
        assert_eq!(account.balance_side, BalanceSide::Debit);
        assert_eq!(account.balance, Decimal::ZERO);
        assert!(account.is_active);
        assert_eq!(ledger.change_log.len(), 1);
    }

    #[test]
    fn duplicate_codes_are_rejected() {
        let mut ledger = Ledger::new();
        AccountService::create(&mut ledger, cash_spec(), "tester").unwrap();
        let err = AccountService::create(&mut ledger, cash_spec(), "tester")
            .expect_err("duplicate code should fail");
        assert!(matches!(err, LedgerError::DuplicateAccountCode(code) if code == "1001"));
    }

    #[test]
    fn negative_opening_balance_is_rejected() {
        let mut ledger = Ledger::new();
        let spec = cash_spec().with_opening_balance(dec!(-5));
        let err = AccountService::create(&mut ledger, spec, "tester").unwrap_err();
        assert!(matches!(err, LedgerError::Validation(_)));
    }

    #[test]
    fn deactivating_system_account_fails() {
        let mut ledger = Ledger::new();
        let spec = NewAccount::new("3101", "Retained Earnings", AccountCategory::RetainedEarnings)
            .as_system();
        let account = AccountService::create(&mut ledger, spec, "tester").unwrap();
        let err = AccountService::deactivate(&mut ledger, account.id, "tester").unwrap_err();
        assert!(matches!(err, LedgerError::AccountInUse(_)));
    }

    #[test]
    fn deactivating_account_with_balance_fails() {
        let mut ledger = Ledger::new();
        let spec = cash_spec().with_opening_balance(dec!(100));
        let account = AccountService::create(&mut ledger, spec, "tester").unwrap();
        let err = AccountService::deactivate(&mut ledger, account.id, "tester").unwrap_err();
        assert!(matches!(err, LedgerError::AccountInUse(_)));
    }

    #[test]
    fn posted_history_locks_type_and_balance_side() {
        use crate::core::services::EntryService;
        use crate::domain::{EntryLine, NewEntry, SourceType};
        use chrono::NaiveDate;

        let mut ledger = Ledger::new();
        let cash = AccountService::create(&mut ledger, cash_spec(), "tester").unwrap();
        let sales = AccountService::create(
            &mut ledger,
            NewAccount::new("4001", "Sales Revenue", AccountCategory::OperatingRevenue),
            "tester",
        )
        .unwrap();
        let entry = EntryService::create(
            &mut ledger,
            NewEntry::new(
                NaiveDate::from_ymd_opt(2026, 8, 10).unwrap(),
                SourceType::Order,
                "Cash sale",
                vec![
                    EntryLine::debit(cash.id, dec!(100)),
                    EntryLine::credit(sales.id, dec!(100)),
                ],
            ),
            "tester",
        )
        .unwrap();
        EntryService::post(&mut ledger, entry.id, "poster").unwrap();

        // A category patch that would change the account's type is refused.
        let patch = AccountPatch {
            category: Some(AccountCategory::OperatingRevenue),
            ..AccountPatch::default()
        };
        let err = AccountService::update(&mut ledger, cash.id, patch, "tester").unwrap_err();
        assert!(matches!(err, LedgerError::Validation(_)));

        let patch = AccountPatch {
            balance_side: Some(BalanceSide::Credit),
            ..AccountPatch::default()
        };
        let err = AccountService::update(&mut ledger, cash.id, patch, "tester").unwrap_err();
        assert!(matches!(err, LedgerError::Validation(_)));

        let unchanged = AccountService::get(&ledger, cash.id).unwrap();
        assert_eq!(unchanged.account_type, AccountType::Asset);
        assert_eq!(unchanged.balance_side, BalanceSide::Debit);

        // Reclassifying within the same type is still allowed.
        let patch = AccountPatch {
            category: Some(AccountCategory::OtherAssets),
            ..AccountPatch::default()
        };
        let updated = AccountService::update(&mut ledger, cash.id, patch, "tester").unwrap();
        assert_eq!(updated.category, AccountCategory::OtherAssets);
        assert_eq!(updated.account_type, AccountType::Asset);
    }

    #[test]
    fn update_logs_old_and_new_snapshots() {
        let mut ledger = Ledger::new();
        let account = AccountService::create(&mut ledger, cash_spec(), "tester").unwrap();
        let patch = AccountPatch {
            name: Some("Petty Cash".into()),
            ..AccountPatch::default()
        };
        let updated = AccountService::update(&mut ledger, account.id, patch, "tester").unwrap();
        assert_eq!(updated.name, "Petty Cash");
        let record = ledger.change_log.last().unwrap();
        assert_eq!(record.action, ChangeAction::Updated);
        assert!(record.old_value.is_some());
        assert!(record.new_value.is_some());
    }
}
