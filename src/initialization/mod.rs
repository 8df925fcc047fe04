//! Initialization of shared resources: HTTP clients and logging.

mod client;
mod logger;

pub use client::{init_metadata_client, init_resolve_client};
pub use logger::init_logger_with;
