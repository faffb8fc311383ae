use crate::domain::{ChangeFilter, ChangeRecord};
use crate::ledger::Ledger;

pub struct ChangeLogService;

impl ChangeLogService {
    /// Returns matching records newest-first, capped at `limit`. Recording
    /// happens inside the mutating services so the audit trail shares the
    /// fate of the mutation it describes.
    pub fn query<'a>(
        ledger: &'a Ledger,
        filter: &ChangeFilter,
        limit: usize,
    ) -> Vec<&'a ChangeRecord> {
        ledger
            .change_log
            .iter()
            .rev()
            .filter(|record| filter.matches(record))
            .take(limit)
            .collect()
    }
}
