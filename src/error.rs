use std::path::PathBuf;

use thiserror::Error;

// Main Matcher Error Type

#[derive(Error, Debug)]
pub enum MatcherError {
    #[error("Palette Error: {0}")]
    PaletteError(#[from] PaletteError),
    #[error("Model Error: {0}")]
    ModelError(#[from] ModelError),
    #[error("Configuration Error: {0}")]
    ConfigError(#[from] config::ConfigError),
    #[error("Invalid settings: {0}")]
    InvalidSettings(String),
    #[error("Failed to write result document: {0}")]
    OutputError(#[from] serde_json::Error),
    #[error("Result document field '{0}' is not a group")]
    MalformedResult(String),
    #[error("IO Error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Task Error: {0}")]
    TaskError(#[from] tokio::task::JoinError),
}

// Palette Error Type
#[derive(Error, Debug)]
pub enum PaletteError {
    #[error("Failed to read palette file {1}: {0}")]
    ReadError(std::io::Error, PathBuf),
    #[error("Malformed palette entry at line {line}: {reason}")]
    ParseError { line: usize, reason: String },
    #[error("Palette table incomplete: {found} of {expected} bins defined")]
    IncompleteTable { found: usize, expected: usize },
}

// Model Error Type
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Failed to read model file {1}: {0}")]
    ReadError(std::io::Error, PathBuf),
    #[error("Failed to write model file {1}: {0}")]
    WriteError(std::io::Error, PathBuf),
    #[error("Failed to parse model file {1}: {0}")]
    ParseError(serde_yaml::Error, PathBuf),
    #[error("Failed to serialize model '{1}': {0}")]
    SerializeError(serde_yaml::Error, String),
    #[error("Invalid model name '{0}': {1}")]
    InvalidName(String, &'static str),
    #[error("Model '{0}' has no valid color sets")]
    NoValidVariants(String),
    #[error("Failed to read recording {1}: {0}")]
    RecordingError(serde_json::Error, PathBuf),
    #[error("Failed to read recorded image {1}: {0}")]
    ImageError(image::ImageError, PathBuf),
}

/// Reasons a single classification call produces no result.
///
/// All of these are expected conditions: the host entity simply gets no
/// `color_matcher` group for this call.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    #[error("matcher is disabled")]
    Disabled,
    #[error("entity has no measurement")]
    MissingMeasurement,
    #[error("pixel mask is empty")]
    EmptyMask,
    #[error("region of interest is degenerate")]
    DegenerateRegion,
    #[error("no masked pixel could be classified")]
    NoObservation,
}
