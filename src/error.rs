//! Error types for normalization, resolution, parsing and the processing pipeline

use crate::DocumentKind;
use thiserror::Error;

/// Why an identifier could not be normalized
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidReason {
    Empty,
    Unrecognized,
    InvalidLength(usize),
}

impl std::fmt::Display for InvalidReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InvalidReason::Empty => f.write_str("empty input"),
            InvalidReason::Unrecognized => f.write_str("unrecognized format"),
            InvalidReason::InvalidLength(n) => write!(f, "invalid length {}", n),
        }
    }
}

/// Errors produced by the patent number normalizer
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("invalid patent number {input:?}: {reason}")]
    InvalidFormat { input: String, reason: InvalidReason },
}

impl NormalizeError {
    pub fn reason(&self) -> &InvalidReason {
        match self {
            NormalizeError::InvalidFormat { reason, .. } => reason,
        }
    }
}

/// Failure reported by a search collaborator
#[derive(Error, Debug)]
#[error("search failed: {0}")]
pub struct SearchError(pub String);

/// Failure reported by a document fetch collaborator
#[derive(Error, Debug)]
#[error("fetch failed for {url}: {message}")]
pub struct FetchError {
    pub url: String,
    pub message: String,
}

/// Errors produced while resolving a patent number to its application number
#[derive(Error, Debug)]
pub enum ResolutionError {
    #[error("invalid patent number: {0}")]
    InvalidNumber(#[from] NormalizeError),

    /// The search returned no record
    #[error("no application found for {kind} number {number}")]
    NotFound { kind: &'static str, number: String },

    /// A record came back without an application number
    #[error("application number not found in response for {kind} number {number}")]
    MalformedResponse { kind: &'static str, number: String },

    #[error("failed to search for {number}: {source}")]
    Search {
        number: String,
        #[source]
        source: SearchError,
    },

    #[error("resolution cancelled")]
    Cancelled,

    #[error("resolution timed out after {0:?}")]
    TimedOut(std::time::Duration),

    #[error("unknown patent number type for {0}")]
    UnsupportedKind(String),
}

/// Errors produced while decoding patent XML
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("empty document")]
    EmptyDocument,

    #[error("malformed XML: {0}")]
    MalformedXml(String),

    #[error("expected {expected} root element, got {actual}")]
    DocumentTypeMismatch { expected: DocumentKind, actual: String },

    #[error("unrecognized XML document type (expected us-patent-grant or us-patent-application)")]
    UnrecognizedDocumentType,
}

impl From<roxmltree::Error> for ParseError {
    fn from(e: roxmltree::Error) -> Self {
        ParseError::MalformedXml(e.to_string())
    }
}

/// Errors from the resolve, fetch and parse pipeline
#[derive(Error, Debug)]
pub enum ProcessorError {
    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("no XML document URL found for application {0}")]
    NoDocumentUrl(String),
}
