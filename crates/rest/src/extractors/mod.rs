//! Axum extractors for consultation requests.
//!
//! - [`ConsultationBody`] - Parse a consultation record from the body
//! - [`Pageable`] - Extract `page`, `size` and `sort` query parameters

mod consultation_body;
mod pageable;

pub use consultation_body::{ConsultationBody, ConsultationBodyRejection};
pub use pageable::Pageable;
