pub mod config;
pub mod error;
pub mod output;
pub mod record;
pub mod rules;
pub mod scoring;
pub mod telemetry;

pub use error::EngineError;
