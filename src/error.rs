pub type WordscapeResult<T> = Result<T, WordscapeError>;

#[derive(thiserror::Error, Debug)]
pub enum WordscapeError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("export error: {0}")]
    Export(String),

    #[error("composite error: {0}")]
    Composite(String),

    #[error("serialization error: {0}")]
    Serde(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl WordscapeError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn export(msg: impl Into<String>) -> Self {
        Self::Export(msg.into())
    }

    pub fn composite(msg: impl Into<String>) -> Self {
        Self::Composite(msg.into())
    }

    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}
