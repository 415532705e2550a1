pub mod config;
pub mod directory;
pub mod error;
pub mod registration;
pub mod telemetry;
pub mod validation;
