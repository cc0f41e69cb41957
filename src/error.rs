use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Unsupported file format: `{0}`")]
    UnsupportedFileFormat(String),
    #[error("{0}")]
    IoError(#[from] std::io::Error),
    #[error("{0}")]
    GenericError(String),
    #[error("{0}")]
    InvalidOption(String),
    #[error("Input file not found: {}", .0.display())]
    InputNotFound(PathBuf),
    #[error("{format} format: not enough lines in the frame starting at line {line} (expected {expected}, got {got})")]
    UnexpectedEof {
        format: String,
        line: usize,
        expected: usize,
        got: usize,
    },
    #[error("{format} format: line {line}: {reason}")]
    InvalidLine {
        format: String,
        line: usize,
        reason: String,
    },
    #[error("Invalid element symbol: {0}")]
    InvalidElement(String),
    #[error("Element symbol cannot be empty.")]
    EmptyElement,
    #[error("frame index {index} is out of range for a trajectory with {size} frames")]
    FrameOutOfRange { index: i64, size: usize },
    #[error("{0}")]
    Csv(String),
    #[error("failed to render '{}': {reason}", path.display())]
    Render { path: PathBuf, reason: String },
    #[error("failed to serialize plot data: {0}")]
    Json(#[from] serde_json::Error),
}
