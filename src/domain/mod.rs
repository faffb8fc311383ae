pub mod account;
pub mod change_log;
pub mod entry;
pub mod reports;

pub use account::{Account, AccountCategory, AccountPatch, AccountType, BalanceSide, NewAccount};
pub use change_log::{ChangeAction, ChangeCategory, ChangeFilter, ChangeRecord};
pub use entry::{EntryLine, EntryStatus, JournalEntry, NewEntry, Period, SourceType};
pub use reports::{BalanceSheet, DashboardSummary, IncomeStatement, TrialBalance, TrialBalanceRow};
