//! Error types for audit operations.
//!
//! Extraction, scoring and query analysis never fail on bad markup: they
//! degrade to low scores with explanatory evidence. [`AuditError`] covers the
//! few remaining failure modes, such as invalid selectors, a fetch result that
//! should never have reached the core, or a configuration outside its domain.
//!
//! # Example
//!
//! ```rust
//! use aeo_audit_core::{AuditError, Auditor, FetchedPage};
//!
//! let page = FetchedPage::new("<html></html>", "https://example.com/", 404);
//! match Auditor::new().audit(&page, None) {
//!     Err(AuditError::UnexpectedStatus { status }) => assert_eq!(status, 404),
//!     _ => unreachable!(),
//! }
//! ```

use thiserror::Error;

/// Main error type for the audit pipeline.
#[derive(Error, Debug)]
pub enum AuditError {
    /// HTML query errors.
    ///
    /// Returned when a CSS selector cannot be parsed.
    #[error("Failed to parse HTML: {0}")]
    HtmlParseError(String),

    /// The fetcher handed over a non-2xx response.
    ///
    /// Redirects, retries and error pages belong to the fetcher, so the
    /// audit refuses to score them.
    #[error("Refusing to audit response with status {status}")]
    UnexpectedStatus { status: u16 },

    /// A configuration value is outside its valid range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// JSON serialization of a report failed.
    #[error("Failed to serialize report: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for AuditError.
pub type Result<T> = std::result::Result<T, AuditError>;
