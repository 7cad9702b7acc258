//! HTTP API for the clash-compare voting service

pub mod error;
pub mod routes;
pub mod server;

pub use error::ApiError;
pub use routes::api_router;
pub use server::{HttpServer, HttpServerConfig};
