//! Reports module - grouping records, rows, services and traits.

mod reports_errors;
mod reports_model;
mod reports_service;
mod reports_traits;

#[cfg(test)]
mod reports_service_tests;

pub use reports_errors::ReportError;
pub use reports_model::{
    NewReport, Report, ReportRow, ReportStats, ReportUpdate, SemanticMatch,
};
pub use reports_service::ReportService;
pub use reports_traits::{
    ReportRepositoryTrait, ReportRowRepositoryTrait, ReportServiceTrait,
};
