use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ResourceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Resource key '{0}' is ill-formed")]
    MalformedKey(String),

    #[error("Invalid registration name '{0}'")]
    InvalidName(String),

    #[error("Parent object is not registered (child name '{0}')")]
    UnregisteredParent(String),

    #[error("Object is not registered: {0}")]
    UnregisteredObject(String),

    #[error("Config file not found: {0}")]
    ConfigNotFound(PathBuf),

    #[error("Properties parse error at line {line}: {message}")]
    Properties { line: usize, message: String },
}

pub type Result<T> = std::result::Result<T, ResourceError>;

/// Fails with `MalformedKey` unless `key` passes the key grammar.
pub(crate) fn ensure_valid_key(key: &str) -> Result<()> {
    if crate::key::is_valid_key(key) {
        Ok(())
    } else {
        Err(ResourceError::MalformedKey(key.to_string()))
    }
}
