use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("knowledge base at {} contains no entries", .0.display())]
    KnowledgeBaseEmpty(PathBuf),

    #[error("invalid label list: {0}")]
    Labels(String),

    #[error("image could not be decoded: {0}")]
    Image(#[from] image::ImageError),

    #[error("inference failed: {0}")]
    Inference(String),

    #[error("model produced {actual} scores but {expected} labels are configured")]
    ClassCountMismatch { expected: usize, actual: usize },

    #[error("config error: {0}")]
    Config(String),

    #[error("background worker stopped before producing a result")]
    WorkerDisconnected,
}

pub type Result<T> = std::result::Result<T, Error>;
