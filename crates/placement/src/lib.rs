pub mod client;
pub mod config;
pub mod error;
pub mod pagination;
pub mod session;
pub mod telemetry;
pub mod views;
pub mod wire;
pub mod workflows;
