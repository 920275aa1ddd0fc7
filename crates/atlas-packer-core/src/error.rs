use thiserror::Error;

#[derive(Debug, Error)]
pub enum AtlasError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Input directory '{0}' does not exist")]
    MissingInput(String),

    #[error("No valid images found in '{0}'")]
    NoValidImages(String),

    #[error("Nothing to pack: input list is empty")]
    Empty,

    #[error("Manifest to publish not found at '{0}'")]
    MissingManifest(String),
}

pub type Result<T> = std::result::Result<T, AtlasError>;
