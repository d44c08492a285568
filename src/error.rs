//! Error types shared across the catalog, propagation and configuration layers

use thiserror::Error;

/// Malformed catalog text
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    /// A `1`/`2` element line appeared before any name line
    #[error("line {line_number}: element line '{kind}' has no preceding name line")]
    OrphanLine { line_number: usize, kind: char },
    /// A named record ended without one of its element lines
    #[error("record '{name}' is missing {missing}")]
    MissingLines { name: String, missing: &'static str },
}

/// Failure to turn elements into a usable state vector
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PropagationError {
    #[error("invalid orbital elements: {reason}")]
    InvalidElements { reason: String },
    #[error("propagator failed: {reason}")]
    Propagator { reason: String },
    #[error("propagation produced a non-finite state")]
    NonFinite,
}

/// Failure to retrieve a catalog group
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {reason}")]
    Transport { url: String, reason: String },
    #[error("{url} answered with HTTP {code}")]
    Status { url: String, code: u16 },
    #[error("could not read response body from {url}: {reason}")]
    Body { url: String, reason: String },
    #[error("unknown catalog group '{0}'")]
    UnknownGroup(String),
    #[error("fetch worker is no longer running")]
    WorkerGone,
}

/// Invalid configuration input
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("could not parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid instant '{0}'")]
    InvalidInstant(String),
}
