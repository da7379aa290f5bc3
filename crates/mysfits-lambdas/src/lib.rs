//! Lambda functions around the mysfits API: clickstream enrichment and the
//! customer questions pipeline.

pub mod api_client;
pub mod config;
pub mod enrich;
pub mod errors;
pub mod intake;
pub mod notifications;
pub mod notify;
pub mod telemetry;
