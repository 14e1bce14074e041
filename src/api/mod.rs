//! HTTP API for the attendance engine.
//!
//! A single endpoint, `POST /reports`, turns raw exports into a monthly
//! report.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{ManualAssignmentRequest, ReportRequest};
pub use response::{ApiError, ApiErrorResponse};
pub use state::AppState;
