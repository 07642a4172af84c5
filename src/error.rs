// src/error.rs

use crate::cli::Mode;
use thiserror::Error;

/// Failures talking to the remote API
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Failed to fetch user: {message} ({status})")]
    UserFetch { status: u16, message: String },

    #[error("Failed to fetch repositories: {message} ({status})")]
    RepoListFetch { status: u16, message: String },

    #[error("Failed to fetch languages for {repo} ({status})")]
    LanguageFetch { repo: String, status: u16 },

    #[error("Invalid API base URL {url}: {source}")]
    BaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("API base URL {0} cannot carry a path")]
    OpaqueBaseUrl(String),

    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Unexpected response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors that abort a whole query. Their `Display` is the message shown to the user.
#[derive(Error, Debug)]
pub enum QueryError {
    #[error("Please enter a GitHub username")]
    Validation,

    #[error("{0}")]
    UserFetch(ClientError),

    #[error("{0}")]
    RepoListFetch(ClientError),
}

/// Raster or vector export failures. Never affect the displayed visualization.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Nothing to export: no repositories are loaded")]
    Unavailable,

    #[error("The {0} view has no vector surface; export it as PNG")]
    VectorUnsupported(Mode),

    #[error("Failed to encode image: {0}")]
    Image(#[from] image::ImageError),

    #[error("Failed to write export: {0}")]
    Io(#[from] std::io::Error),
}
