pub mod config;
pub mod error;
pub mod profile;
pub mod scoring;
pub mod session;
pub mod telemetry;
