pub mod config;
pub mod handlers;
pub mod observability;
pub mod server;

pub use config::{AppConfig, LoggingConfig, ServerConfig, SqlDemoConfig};
pub use observability::{init_tracing, shutdown_tracing};
pub use server::{AppState, MedlabServer, ServerBuilder, build_app};
