//! # HTTP Transport
//!
//! `GET /api/:version/charities` runs one normalized query; `GET /health`
//! answers liveness probes. Version dispatch happens here, before any
//! normalization.

mod errors;
mod response;
mod server;

pub use errors::{ApiError, ApiResult, ErrorResponse};
pub use response::CharitiesResponse;
pub use server::{ApiServer, AppState};
