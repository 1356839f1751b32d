//! Request/response object model of the dispatch layer.
//!
//! Transport is out of scope; [`RestRequest`] and [`RestResponse`] convert
//! from/to the `http` crate types so any server can feed the dispatcher.

pub mod request;
pub mod response;

pub use request::{RestRequest, RouteParams};
pub use response::{HeaderVec, RestResponse, MAX_INLINE_HEADERS};
