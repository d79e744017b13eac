//! Error types for the test harness

use thiserror::Error;

#[derive(Error, Debug)]
pub enum HarnessError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("Unknown profile: {0}")]
    UnknownProfile(String),

    #[error("Profile dependency cycle involving: {0}")]
    DependencyCycle(String),

    #[error("Browser error: {0}")]
    Browser(String),

    #[error("Element not found: {0}")]
    ElementNotFound(String),

    #[error("Assertion failed: {0}")]
    Assertion(String),

    #[error("Timeout waiting for: {0}")]
    Timeout(String),

    #[error("Case failed after {attempts} attempt(s): {reason}")]
    CaseFailed { attempts: u32, reason: String },

    #[error("Runner error: {0}")]
    Runner(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),
}

impl From<chromiumoxide::error::CdpError> for HarnessError {
    fn from(e: chromiumoxide::error::CdpError) -> Self {
        HarnessError::Browser(e.to_string())
    }
}

pub type HarnessResult<T> = Result<T, HarnessError>;

/// Assert a condition inside a test case body, failing the case (not the
/// process) so the runner can retry and capture artifacts.
#[macro_export]
macro_rules! check {
    ($cond:expr, $($arg:tt)+) => {
        if !$cond {
            return Err($crate::error::HarnessError::Assertion(format!($($arg)+)));
        }
    };
}

/// Assert equality with both sides included in the failure message.
#[macro_export]
macro_rules! check_eq {
    ($left:expr, $right:expr, $($arg:tt)+) => {{
        let (l, r) = (&$left, &$right);
        if l != r {
            return Err($crate::error::HarnessError::Assertion(format!(
                "{} (left: {:?}, right: {:?})",
                format!($($arg)+),
                l,
                r
            )));
        }
    }};
}
