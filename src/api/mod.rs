pub mod client;
pub mod endpoints;
pub mod envelope;
mod lenient;

pub use client::{ApiClient, ApiRequest, ClientError, ResponseContext, ResponseHook};
pub use envelope::{ApiError, ApiResponse};
pub(crate) use lenient::json_or_encoded;
