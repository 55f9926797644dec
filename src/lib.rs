//! Page-Archiver: single-file web page archiving
//!
//! This crate downloads a web page and rewrites it into one self-contained HTML
//! document. Stylesheets, images and the assets stylesheets reference are inlined
//! as base64 `data:` URIs, and every remaining relative reference is made absolute.

pub mod archive;
pub mod config;
pub mod dom;
pub mod fetch;
pub mod transform;

use reqwest::StatusCode;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for archiving operations
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("Download failed: {0}")]
    Download(#[from] FetchError),

    #[error("Invalid URL '{input}': {source}")]
    UrlParse {
        input: String,
        source: ::url::ParseError,
    },

    #[error("Missing <{0}> element")]
    MissingElement(String),

    #[error("Unknown extension: {0}")]
    UnknownExtension(String),

    #[error("{stage}: {source}")]
    Stage {
        stage: String,
        source: Box<ArchiveError>,
    },

    #[error("IO error for {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl ArchiveError {
    /// Returns the innermost error, looking through stage wrappers
    pub fn root_cause(&self) -> &ArchiveError {
        match self {
            ArchiveError::Stage { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// Returns the name of the pipeline stage that raised this error, if any
    pub fn stage(&self) -> Option<&str> {
        match self {
            ArchiveError::Stage { stage, .. } => Some(stage),
            _ => None,
        }
    }
}

/// Errors raised while retrieving a resource over HTTP
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("GET {url}: {status}")]
    Status { url: String, status: StatusCode },

    #[error("GET {url}: still rate limited after {attempts} attempts")]
    RateLimited { url: String, attempts: u32 },

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("Failed to build HTTP client: {0}")]
    Client(reqwest::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result type alias for archiving operations
pub type Result<T> = std::result::Result<T, ArchiveError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use archive::{ArchiveOutcome, ArchiveReport, Archiver};
pub use config::Config;
pub use dom::{Document, NodeId, NodeRef};
pub use fetch::{Fetcher, RetryPolicy};
pub use transform::{Pipeline, Stage, TransformContext};
