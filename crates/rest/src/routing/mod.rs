//! Route configuration for the consultation REST API.
//!
//! Maps HTTP paths to handlers.

pub mod consultation_routes;

pub use consultation_routes::create_routes;
