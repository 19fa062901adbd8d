pub mod config;
pub mod document;
pub mod env;

pub use config::{Config, ConfigError, ConfigLoader};
