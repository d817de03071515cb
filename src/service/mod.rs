// SPDX-License-Identifier: MIT OR Apache-2.0

//! Service layer: source loading, resolution, validation, notification and export.
//!
//! [`ConfigManager`] is the entry point; the other types are exposed for callers that
//! want to drive a single stage on its own.

pub mod loader;
pub mod manager;
pub mod notifier;
pub mod report;
pub mod validator;

// Re-export commonly used types
pub use loader::{FileStatus, LoadReport, SourceLoader, SourceStatus, SourceSummary};
pub use manager::{ConfigManager, ConfigManagerBuilder};
pub use notifier::{ChangeNotifier, Subscription};
pub use report::{ConfigReport, EnvironmentReport, ExportFormat, ReportSummary};
pub use validator::{PostureAdvisory, Severity, ValidationFinding, ValidationResult, Validator};
