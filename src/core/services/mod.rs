pub mod account_service;
pub mod change_log_service;
pub mod entry_service;
pub mod report_service;

pub use account_service::AccountService;
pub use change_log_service::ChangeLogService;
pub use entry_service::EntryService;
pub use report_service::ReportService;
