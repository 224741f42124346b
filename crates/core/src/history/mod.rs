//! Import history ledger - models, repository trait and recorder service.

mod history_model;
mod history_service;
mod history_traits;

pub use history_model::{ImportHistoryRecord, ImportStatus, ValidationStatus};
pub use history_service::ImportHistoryService;
pub use history_traits::{ImportHistoryRepositoryTrait, ImportHistoryServiceTrait};
