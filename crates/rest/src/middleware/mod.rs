//! Axum middleware.
//!
//! - [`request_id`] - Assign and propagate `x-request-id`

pub mod request_id;

pub use request_id::{UuidRequestId, with_request_id};
