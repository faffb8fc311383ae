use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::account::{AccountType, BalanceSide};

/// One row of the trial balance: an account's balance bucketed onto its
/// normal side.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrialBalanceRow {
    pub account_id: Uuid,
    pub code: String,
    pub name: String,
    pub account_type: AccountType,
    pub balance_side: BalanceSide,
    pub debit_balance: Decimal,
    pub credit_balance: Decimal,
}

/// Listing of all active account balances; the global consistency check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrialBalance {
    pub rows: Vec<TrialBalanceRow>,
    pub total_debit: Decimal,
    pub total_credit: Decimal,
    pub is_balanced: bool,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncomeStatement {
    pub total_revenue: Decimal,
    pub total_cost_of_goods: Decimal,
    pub total_expense: Decimal,
    pub gross_profit: Decimal,
    pub net_income: Decimal,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceSheet {
    pub total_assets: Decimal,
    pub total_liabilities: Decimal,
    /// Equity account balances plus `current_earnings`.
    pub total_equity: Decimal,
    /// Net income not yet closed into retained earnings; disclosed
    /// separately so the equation holds between closing entries.
    pub current_earnings: Decimal,
    /// The fundamental accounting equation: assets == liabilities + equity.
    pub is_balanced: bool,
    pub generated_at: DateTime<Utc>,
}

/// Composite snapshot for dashboard consumers: headline totals plus simple
/// ratios, every division guarded against zero denominators.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub total_assets: Decimal,
    pub total_liabilities: Decimal,
    pub total_equity: Decimal,
    pub total_revenue: Decimal,
    pub net_income: Decimal,
    pub current_ratio: Decimal,
    pub debt_to_equity: Decimal,
    pub profit_margin: Decimal,
    pub trial_balanced: bool,
    pub generated_at: DateTime<Utc>,
}
