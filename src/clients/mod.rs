pub mod admin_client;
pub mod processing_client;

pub use admin_client::{AdminClient, DashboardMetric, DashboardSnapshot};
pub use processing_client::{HttpProcessingClient, ProcessingApi, RawResponse};
