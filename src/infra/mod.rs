pub mod config;
pub mod object_storage;
pub mod telemetry;
