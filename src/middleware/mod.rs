//! Request middleware run by [`RestController`](crate::dispatcher::RestController).

mod core;
mod tracing;

pub use core::Middleware;
pub use tracing::TracingMiddleware;
