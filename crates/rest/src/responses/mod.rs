//! Response header generation.
//!
//! - [`headers`] - Alert headers (`X-{app}-alert`, `X-{app}-params`, `X-{app}-error`)
//! - [`pagination`] - `X-Total-Count`, `X-Total-Pages` and `Link`

pub mod headers;
pub mod pagination;

pub use headers::AlertHeaders;
pub use pagination::pagination_headers;
