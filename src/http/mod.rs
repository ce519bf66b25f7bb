//! HTTP request router
//!
//! Routes, parameter coercion, and the mapping from adapter failures to
//! status codes and error bodies.

pub mod error;
pub mod handler;
pub mod params;
pub mod server;

pub use error::{ApiError, ErrorBody};
pub use handler::AppState;
pub use server::{build_router, HttpServer};
