pub mod api;

pub use api::{ApiClient, ApiError};
pub use reqwest::StatusCode;
