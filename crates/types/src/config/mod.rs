//! Environment-based configuration helpers.

mod env_utils;
pub use env_utils::{load_millis_opt, load_string_opt, load_u64_opt, load_url_opt};

mod error;
pub use error::ConfigError;

/// Node endpoint used to read chain state.
pub const RPC_URL_ENV: &str = "BUNDLESIM_RPC_URL";

/// Wall-clock limit for one simulation, in milliseconds.
pub const TIMEOUT_MS_ENV: &str = "BUNDLESIM_TIMEOUT_MS";

/// Path to a JSON state fixture, for offline simulation.
pub const STATE_FILE_ENV: &str = "BUNDLESIM_STATE_FILE";

/// Read a file, tagging failures with its path.
pub fn read_file(path: impl AsRef<std::path::Path>) -> Result<Vec<u8>, ConfigError> {
    let path = path.as_ref();
    std::fs::read(path).map_err(|e| ConfigError::io(path.display().to_string(), e))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn missing_var() {
        assert!(load_string_opt("BUNDLESIM_TEST_DEFINITELY_UNSET").is_none());
        assert!(load_u64_opt("BUNDLESIM_TEST_DEFINITELY_UNSET").unwrap().is_none());
        assert!(load_millis_opt("BUNDLESIM_TEST_DEFINITELY_UNSET").unwrap().is_none());
    }

    #[test]
    fn read_missing_file() {
        let err = read_file("/nonexistent/bundlesim/state.json").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/bundlesim/state.json"));
    }
}
