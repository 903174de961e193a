//! Synthesis error types

use thiserror::Error;

/// Template synthesis errors
#[derive(Error, Debug)]
pub enum CloudError {
    #[error("Construct already exists: {0}")]
    DuplicateConstruct(String),

    #[error("Stack already exists: {0}")]
    DuplicateStack(String),

    #[error("Stack not found: {0}")]
    StackNotFound(String),

    #[error("Invalid logical id: {0}")]
    InvalidLogicalId(String),

    #[error("Unresolved token: {0}")]
    UnresolvedToken(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Cloud assembly error: {0}")]
    AssemblyError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, CloudError>;
