use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Extraction error: {0}")]
    Extraction(String),

    #[error("Decode error: {message}")]
    Decode { message: String, payload: String },

    #[error("Contract error: {0}")]
    Contract(String),

    #[error("Generation error: {0}")]
    Generation(String),

    #[error("CMS error (status {status}): {body}")]
    Cms { status: u16, body: String },

    #[error("Publish step '{step}' failed: {body}")]
    Publish {
        step: &'static str,
        status: Option<u16>,
        body: String,
    },

    #[error(transparent)]
    External(#[from] anyhow::Error),
}

impl Error {
    /// Wraps a CMS transport failure with the orchestration step it happened in.
    pub fn at_step(self, step: &'static str) -> Self {
        match self {
            Error::Cms { status, body } => Error::Publish {
                step,
                status: Some(status),
                body,
            },
            Error::Http(e) => Error::Publish {
                step,
                status: e.status().map(|s| s.as_u16()),
                body: e.to_string(),
            },
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
