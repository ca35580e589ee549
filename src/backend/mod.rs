//! Estimation service integration

pub mod api;
pub mod cancel;
pub mod types;

pub use api::{ApiError, BackendClient};
pub use types::{EvaluationResponse, PropertyResult, RentOnlyResponse, SearchParams};

/// Shown when a failure carries no message of its own
pub const GENERIC_FAILURE: &str = "Something went wrong while contacting the estimation service.";

/// Message a screen shows for a failed call
pub fn user_message(err: &str) -> String {
    let err = err.trim();
    if err.is_empty() {
        GENERIC_FAILURE.to_string()
    } else {
        err.to_string()
    }
}
