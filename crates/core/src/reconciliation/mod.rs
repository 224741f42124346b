//! Import-ledger reconciliation against persisted rows.

mod reconciliation_model;
mod reconciliation_service;


pub use reconciliation_model::ReconciliationReport;
pub use reconciliation_service::{ReconciliationService, ReconciliationServiceTrait};
