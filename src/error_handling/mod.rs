//! Error handling: taxonomy, categorization, and session statistics.

mod categorization;
mod stats;
mod types;

pub use categorization::{categorize_resolve_error, resolve_error_from_transport, retry_strategy};
pub(crate) use categorization::categorize_metadata_error;
pub use stats::SessionStats;
pub use types::{ErrorType, InfoType, InitializationError, ResolveError, WarningType};
pub(crate) use types::MetadataError;
