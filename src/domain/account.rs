use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A named bucket in the chart of accounts with a running balance on its
/// normal side.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Account {
    pub id: Uuid,
    /// Unique, sortable account code, e.g. "1001".
    pub code: String,
    pub name: String,
    pub account_type: AccountType,
    pub category: AccountCategory,
    /// Side on which increases are recorded. Defaults from the type; stored
    /// explicitly so contra-accounts can override it.
    pub balance_side: BalanceSide,
    /// Running magnitude on the normal side. Mutated only by posting.
    pub balance: Decimal,
    pub is_active: bool,
    /// System accounts cannot be deactivated and only accept closing entries
    /// when they carry equity.
    #[serde(default)]
    pub is_system: bool,
    /// Only leaf accounts accept journal lines.
    #[serde(default = "default_true")]
    pub allow_posting: bool,
    #[serde(default)]
    pub require_department: bool,
    #[serde(default)]
    pub require_project: bool,
    #[serde(default)]
    pub is_tax_account: bool,
}

fn default_true() -> bool {
    true
}

/// Creation request for a new account; validated by the account service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAccount {
    pub code: String,
    pub name: String,
    pub category: AccountCategory,
    /// Overrides the type's normal side when set (contra-accounts).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub balance_side: Option<BalanceSide>,
    /// Opening balance on the normal side; defaults to zero.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opening_balance: Option<Decimal>,
    #[serde(default)]
    pub is_system: bool,
    #[serde(default = "default_true")]
    pub allow_posting: bool,
    #[serde(default)]
    pub require_department: bool,
    #[serde(default)]
    pub require_project: bool,
    #[serde(default)]
    pub is_tax_account: bool,
}

impl NewAccount {
    pub fn new(code: impl Into<String>, name: impl Into<String>, category: AccountCategory) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            category,
            balance_side: None,
            opening_balance: None,
            is_system: false,
            allow_posting: true,
            require_department: false,
            require_project: false,
            is_tax_account: false,
        }
    }

    pub fn with_opening_balance(mut self, balance: Decimal) -> Self {
        self.opening_balance = Some(balance);
        self
    }

    pub fn as_system(mut self) -> Self {
        self.is_system = true;
        self
    }
}

/// Field-level update request. Deliberately carries no `balance` field: only
/// posting may move an account balance.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccountPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<AccountCategory>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub balance_side: Option<BalanceSide>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_posting: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub require_department: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub require_project: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_tax_account: Option<bool>,
}

/// Top-level account classification.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AccountType {
    Asset,
    Liability,
    Equity,
    Revenue,
    Expense,
    CostOfGoods,
}

impl AccountType {
    /// The side on which increases are normally recorded.
    pub fn normal_side(self) -> BalanceSide {
        match self {
            AccountType::Asset | AccountType::Expense | AccountType::CostOfGoods => {
                BalanceSide::Debit
            }
            AccountType::Liability | AccountType::Equity | AccountType::Revenue => {
                BalanceSide::Credit
            }
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AccountType::Asset => "asset",
            AccountType::Liability => "liability",
            AccountType::Equity => "equity",
            AccountType::Revenue => "revenue",
            AccountType::Expense => "expense",
            AccountType::CostOfGoods => "cost_of_goods",
        };
        f.write_str(label)
    }
}

/// Finer-grained classification; each category belongs to exactly one type.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AccountCategory {
    CurrentAssets,
    FixedAssets,
    OtherAssets,
    CurrentLiabilities,
    LongTermLiabilities,
    PaidInCapital,
    RetainedEarnings,
    OperatingRevenue,
    OtherRevenue,
    OperatingExpenses,
    AdministrativeExpenses,
    FinancialExpenses,
    CostOfSales,
}

impl AccountCategory {
    /// The account type this category belongs to.
    pub fn account_type(self) -> AccountType {
        match self {
            AccountCategory::CurrentAssets
            | AccountCategory::FixedAssets
            | AccountCategory::OtherAssets => AccountType::Asset,
            AccountCategory::CurrentLiabilities | AccountCategory::LongTermLiabilities => {
                AccountType::Liability
            }
            AccountCategory::PaidInCapital | AccountCategory::RetainedEarnings => {
                AccountType::Equity
            }
            AccountCategory::OperatingRevenue | AccountCategory::OtherRevenue => {
                AccountType::Revenue
            }
            AccountCategory::OperatingExpenses
            | AccountCategory::AdministrativeExpenses
            | AccountCategory::FinancialExpenses => AccountType::Expense,
            AccountCategory::CostOfSales => AccountType::CostOfGoods,
        }
    }
}

/// Side of the T-account on which increases are recorded.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BalanceSide {
    Debit,
    Credit,
}

impl fmt::Display for BalanceSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BalanceSide::Debit => f.write_str("debit"),
            BalanceSide::Credit => f.write_str("credit"),
        }
    }
}

impl Account {
    /// Builds the stored account from a validated creation request.
    pub fn from_spec(spec: NewAccount) -> Self {
        let account_type = spec.category.account_type();
        Self {
            id: Uuid::new_v4(),
            code: spec.code,
            name: spec.name,
            account_type,
            category: spec.category,
            balance_side: spec.balance_side.unwrap_or_else(|| account_type.normal_side()),
            balance: spec.opening_balance.unwrap_or_default(),
            is_active: true,
            is_system: spec.is_system,
            allow_posting: spec.allow_posting,
            require_department: spec.require_department,
            require_project: spec.require_project,
            is_tax_account: spec.is_tax_account,
        }
    }

    pub fn display_label(&self) -> String {
        format!("{} {}", self.code, self.name)
    }
}
