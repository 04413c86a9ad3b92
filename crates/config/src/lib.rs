//! Configuration management for the bundle relay client
//!
//! This crate handles parsing, validation, and management of configuration
//! from YAML files and environment variables, and sets up logging.

pub mod loader;
pub mod logging;
pub mod schema;
pub mod validation;

pub use loader::ConfigLoader;
pub use logging::init_logging;
pub use schema::*;
pub use validation::*;
