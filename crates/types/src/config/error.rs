/// Error type for the [`crate::config`] module. Captures errors related to
/// loading configuration from the environment or from files.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Error parsing environment variable
    #[error("failed to parse environment variable: {0}")]
    Parse(#[from] std::num::ParseIntError),
    /// Error reading a configuration file
    #[error("failed to read {path}: {source}")]
    Io {
        /// The file we tried to read.
        path: String,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },
    /// Error parsing JSON
    #[error("failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl ConfigError {
    /// File could not be read.
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        ConfigError::Io { path: path.into(), source }
    }
}
