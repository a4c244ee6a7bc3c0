use crate::ConfigError;
use std::{borrow::Cow, env, time::Duration};

/// Load a variable from the environment
pub fn load_string_opt(key: &str) -> Option<String> {
    env::var(key).ok()
}

/// Load a variable from the environment. Absent is `Ok(None)`, present but
/// unparseable is an error.
pub fn load_u64_opt(key: &str) -> Result<Option<u64>, ConfigError> {
    load_string_opt(key).map(|val| val.parse::<u64>()).transpose().map_err(Into::into)
}

/// Load a millisecond duration from the environment
pub fn load_millis_opt(key: &str) -> Result<Option<Duration>, ConfigError> {
    load_u64_opt(key).map(|ms| ms.map(Duration::from_millis))
}

/// Load a variable from the environment
pub fn load_url_opt(key: &str) -> Option<Cow<'static, str>> {
    load_string_opt(key).map(Into::into)
}
