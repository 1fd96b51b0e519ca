//! Error types for the raypack library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for scene assembly and serialization.
#[derive(Error, Debug)]
pub enum Error {
    /// Scene-file syntax or semantic error at a specific line
    #[error("{}:{}: {}", .path.display(), .line, .msg)]
    Parse {
        path: PathBuf,
        line: usize,
        msg: String,
    },

    /// Scene file is missing a required section or element
    #[error("{}: {}", .path.display(), .msg)]
    SceneFile { path: PathBuf, msg: String },

    /// OBJ/MTL loader failure
    #[error("{}: {}", .path.display(), .msg)]
    Obj { path: PathBuf, msg: String },

    /// No usable geometry after merging all models
    #[error("no faces or vertices found")]
    EmptyGeometry,

    /// Pre-serialized input does not start with the magic number
    #[error("missing magic number")]
    MissingMagic,

    /// Pre-serialized input is not a whole number of 32-bit words
    #[error("input file is not 4-byte aligned")]
    MisalignedInput,

    /// Pre-serialized input is too small to hold the header
    #[error("input file is truncated")]
    TruncatedInput,

    /// Invalid flag or parameter combination
    #[error("{0}")]
    Config(String),

    /// Framebuffer encoding failed
    #[error("image encode failed: {0}")]
    Image(#[from] image::ImageError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a line-numbered scene-file parse error.
    pub fn parse(path: impl Into<PathBuf>, line: usize, msg: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            line,
            msg: msg.into(),
        }
    }

    /// Create a configuration error from a string.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

/// Result type alias for raypack operations.
pub type Result<T> = std::result::Result<T, Error>;
