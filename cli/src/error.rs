use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yml::Error),

    #[error("{failed} of {total} inputs could not be identified")]
    Failed { failed: usize, total: usize },
}

pub(crate) type Result<T> = std::result::Result<T, Error>;
