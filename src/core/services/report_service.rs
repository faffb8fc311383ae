use chrono::Utc;
use rust_decimal::Decimal;

use crate::domain::{
    AccountType, BalanceSheet, BalanceSide, DashboardSummary, IncomeStatement, TrialBalance,
    TrialBalanceRow,
};
use crate::ledger::Ledger;

/// Pure, deterministic report derivations over the current ledger state.
/// Nothing here mutates or persists; every report is reproducible from the
/// accounts and entries alone, and an empty ledger yields zeroed structures.
pub struct ReportService;

impl ReportService {
    /// Buckets every active account's balance onto its normal side and
    /// checks the global debits-equal-credits assertion.
    pub fn trial_balance(ledger: &Ledger) -> TrialBalance {
        let mut rows: Vec<TrialBalanceRow> = ledger
            .accounts
            .iter()
            .filter(|account| account.is_active)
            .map(|account| {
                let (debit_balance, credit_balance) = match account.balance_side {
                    BalanceSide::Debit => (account.balance, Decimal::ZERO),
                    BalanceSide::Credit => (Decimal::ZERO, account.balance),
                };
                TrialBalanceRow {
                    account_id: account.id,
                    code: account.code.clone(),
                    name: account.name.clone(),
                    account_type: account.account_type,
                    balance_side: account.balance_side,
                    debit_balance,
                    credit_balance,
                }
            })
            .collect();
        rows.sort_by(|a, b| a.code.cmp(&b.code));
        let total_debit: Decimal = rows.iter().map(|row| row.debit_balance).sum();
        let total_credit: Decimal = rows.iter().map(|row| row.credit_balance).sum();
        TrialBalance {
            rows,
            total_debit,
            total_credit,
            is_balanced: total_debit == total_credit,
            generated_at: Utc::now(),
        }
    }

    pub fn income_statement(ledger: &Ledger) -> IncomeStatement {
        let total_revenue = Self::sum_by_type(ledger, AccountType::Revenue);
        let total_cost_of_goods = Self::sum_by_type(ledger, AccountType::CostOfGoods);
        let total_expense = Self::sum_by_type(ledger, AccountType::Expense);
        let gross_profit = total_revenue - total_cost_of_goods;
        IncomeStatement {
            total_revenue,
            total_cost_of_goods,
            total_expense,
            gross_profit,
            net_income: gross_profit - total_expense,
            generated_at: Utc::now(),
        }
    }

    /// Equity includes current-period earnings not yet closed into retained
    /// earnings, so the accounting equation holds after every balanced
    /// posting, not only right after a period close.
    pub fn balance_sheet(ledger: &Ledger) -> BalanceSheet {
        let total_assets = Self::sum_by_type(ledger, AccountType::Asset);
        let total_liabilities = Self::sum_by_type(ledger, AccountType::Liability);
        let income = Self::income_statement(ledger);
        let current_earnings = income.net_income;
        let total_equity = Self::sum_by_type(ledger, AccountType::Equity) + current_earnings;
        BalanceSheet {
            total_assets,
            total_liabilities,
            total_equity,
            current_earnings,
            is_balanced: total_assets == total_liabilities + total_equity,
            generated_at: Utc::now(),
        }
    }

    pub fn dashboard_summary(ledger: &Ledger) -> DashboardSummary {
        let trial = Self::trial_balance(ledger);
        let income = Self::income_statement(ledger);
        let sheet = Self::balance_sheet(ledger);
        DashboardSummary {
            total_assets: sheet.total_assets,
            total_liabilities: sheet.total_liabilities,
            total_equity: sheet.total_equity,
            total_revenue: income.total_revenue,
            net_income: income.net_income,
            current_ratio: ratio(sheet.total_assets, sheet.total_liabilities),
            debt_to_equity: ratio(sheet.total_liabilities, sheet.total_equity),
            profit_margin: ratio(income.net_income, income.total_revenue),
            trial_balanced: trial.is_balanced,
            generated_at: Utc::now(),
        }
    }

    fn sum_by_type(ledger: &Ledger, account_type: AccountType) -> Decimal {
        ledger
            .accounts
            .iter()
            .filter(|account| account.is_active && account.account_type == account_type)
            .map(|account| account.balance)
            .sum()
    }
}

/// Division with a zero-denominator guard; dashboards prefer a flat zero
/// over a failure.
fn ratio(numerator: Decimal, denominator: Decimal) -> Decimal {
    if denominator.is_zero() {
        Decimal::ZERO
    } else {
        numerator / denominator
    }
}
