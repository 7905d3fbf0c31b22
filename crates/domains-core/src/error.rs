use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainsError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image format error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid SER file: {0}")]
    InvalidSer(String),

    #[error("Invalid image dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("Import failed: {0}")]
    Import(String),

    #[error("Average projection needs at least 2 frames, got {frames}")]
    InsufficientFrames { frames: usize },

    #[error("Correction mask unavailable: {0}")]
    AssetMissing(String),

    #[error("Correction mask is {found_width}x{found_height}, image is {width}x{height}")]
    MaskSizeMismatch {
        width: usize,
        height: usize,
        found_width: usize,
        found_height: usize,
    },

    #[error("Cannot derive names from title {title:?}: {reason}")]
    AmbiguousTitle { title: String, reason: String },

    #[error("Domain analysis failed: {0}")]
    Analysis(String),

    #[error("Failed to write {}: {reason}", path.display())]
    Export { path: PathBuf, reason: String },

    #[error("Invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, DomainsError>;
