use thiserror::Error;

/// Fatal configuration problems.
///
/// These surface at rule-set construction and abort the run for that rule
/// set: a value that cannot be coerced to its declared type is a fixable
/// setup mistake, not a data problem. Everything else that can go wrong
/// during a run (failing rule callbacks, missing oracle capabilities,
/// suppressions naming unknown rules) is recovered locally and reported as a
/// non-fatal notice instead.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("config key `{key}`: expected {expected}, got `{found}`")]
    TypeMismatch {
        key: String,
        expected: &'static str,
        found: String,
    },

    #[error("config key `{key}`: invalid pattern `{pattern}`")]
    InvalidPattern {
        key: String,
        pattern: String,
        #[source]
        source: Box<regex::Error>,
    },

    #[error("config key `{key}`: unknown severity `{value}`")]
    UnknownSeverity { key: String, value: String },
}
