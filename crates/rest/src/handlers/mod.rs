//! HTTP request handlers.
//!
//! - [`create`] - Create a consultation
//! - [`update`] - Update a consultation
//! - [`read`] - Read one consultation or a page of them
//! - [`delete`] - Delete a consultation
//! - [`search`] - Full-text search
//! - [`health`] - Health, liveness and readiness probes

pub mod create;
pub mod delete;
pub mod health;
pub mod read;
pub mod search;
pub mod update;

pub use create::create_handler;
pub use delete::delete_handler;
pub use health::{health_handler, liveness_handler, readiness_handler};
pub use read::{get_all_handler, get_one_handler};
pub use search::search_handler;
pub use update::update_handler;
