pub mod concurrency;
pub mod config;
pub mod models;
pub mod telemetry;
