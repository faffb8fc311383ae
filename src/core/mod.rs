pub mod services;
pub mod store;
pub mod utils;

pub use store::{ExportCategory, LedgerExport, LedgerStore};
