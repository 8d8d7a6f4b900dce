use thiserror::Error;

#[derive(Error, Debug)]
pub enum LunaError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Data format error: {0}")]
    DataFormat(#[from] serde_json::Error),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, LunaError>;
