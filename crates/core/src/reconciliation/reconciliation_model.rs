use serde::{Deserialize, Serialize};

/// Outcome of one reconciliation pass over the import-history ledger.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconciliationReport {
    /// Row total the ledger claims across completed, non-purged records.
    pub total_history_records: i64,
    /// Row total actually persisted.
    pub total_actual_records: i64,
    /// Claimed minus actual; zero when the ledger is truthful.
    pub discrepancy: i64,
    /// Records whose imported count was corrected this pass.
    pub updated_records: usize,
    pub errors: Vec<String>,
}

impl ReconciliationReport {
    pub fn is_consistent(&self) -> bool {
        self.discrepancy == 0 && self.errors.is_empty()
    }
}
