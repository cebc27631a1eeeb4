// HTTP clients: the quest catalog document and the bug-report webhook
pub mod catalog;
pub mod report;
pub mod retry;

// Re-export common types
pub use catalog::{CatalogClient, CatalogError};
pub use report::{ReportClient, ReportError, ReportPayload};
pub use retry::RetryConfig;
