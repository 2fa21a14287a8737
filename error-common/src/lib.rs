//! Common error handling for the clinical summarizer
//!
//! Every crate in the workspace reports failures that reach the calling layer
//! through [`SummarizerError`]. Crate-local errors (catalog parsing, capability
//! failures, configuration) convert into it at the crate boundary.
//!
//! # Error Categories
//!
//! - **Validation**: malformed requests rejected before the core runs
//! - **Catalog**: keyword or diagnostic-code catalog could not be loaded
//! - **Configuration**: invalid environment or CLI settings
//! - **CaseFailed**: the opaque per-request failure; carries the case identifier
//! - **Server / Network**: transport-level failures in the HTTP layer
//! - **Internal**: anything else
//!
//! # Example
//!
//! ```rust
//! use error_common::{ErrorContext, SummarizerError};
//!
//! let err = SummarizerError::case_failed("case-42", "similarity worker panicked");
//! let context = ErrorContext::for_case("case-42");
//!
//! assert_eq!(err.case_id(), Some("case-42"));
//! assert_eq!(err.code(), error_common::codes::processing::CASE_FAILED);
//! assert_eq!(context.case_id.as_deref(), Some("case-42"));
//! ```

pub mod codes;
pub mod context;
pub mod types;

pub use context::*;
pub use types::*;
