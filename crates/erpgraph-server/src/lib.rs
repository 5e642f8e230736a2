pub mod config;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod observability;
pub mod server;
pub mod services;

pub use config::{AppConfig, AuthMode, AuthSettings, LoggingConfig, ServerConfig};
pub use observability::init_tracing;
pub use server::{AppState, ErpGraphServer, ServerBuilder, build_app};
