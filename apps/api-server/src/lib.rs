//! # Fable API Server
//!
//! Actix-web HTTP server for the Fable blog backend.

pub mod config;
pub mod handlers;
pub mod middleware;
pub mod state;
pub mod upload;

pub fn init_tracing() {
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,api_server=debug,fable_infra=debug"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().pretty())
        .init();
}
