pub mod errors;
pub mod rate_limit;
pub mod routes;
pub mod server;
pub mod services;
pub mod session;
pub mod state;

pub use server::{ServerConfig, serve};
