use thiserror::Error;

pub type DocsealResult<T> = Result<T, DocsealError>;

#[derive(Debug, Error)]
pub enum DocsealError {
    #[error("config error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
