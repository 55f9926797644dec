//! Configuration module for Page-Archiver
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! The file is optional: [`Config::default`] carries every default.
//!
//! # Example
//!
//! ```no_run
//! use page_archiver::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("archiver.toml")).unwrap();
//! println!("Archives go to: {}", config.output.directory.display());
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, FetchConfig, OutputConfig, RetryConfig};

// Re-export parser functions
pub use parser::{load_config, parse_config};
pub use validation::validate;
