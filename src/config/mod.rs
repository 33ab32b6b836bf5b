//! Configuration module for link-census
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use link_census::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("link-census.toml")).unwrap();
//! println!("Listening on: {}", config.server.bind_address);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, ScraperConfig, ServerConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::validate;
