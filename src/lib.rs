pub mod api;
pub mod cli;
pub mod config;
pub mod core;
pub mod http_client;
pub mod server;
