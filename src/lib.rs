pub mod configuration;
pub mod connectors;
pub mod errors;
pub mod forms;
pub mod models;
pub mod services;
pub mod store;
pub mod telemetry;
