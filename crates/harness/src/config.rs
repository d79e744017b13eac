//! Run configuration, gated on the continuous-integration environment

use std::path::PathBuf;
use std::time::Duration;

/// Report formats emitted at the end of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reporter {
    Html,
    List,
}

/// Options governing a whole run: retries, workers, reporters, timeouts.
///
/// CI runs are stricter: failed cases are retried twice and suites run on a
/// single worker; local runs get no retries and the runner's default worker
/// count, plus a list report alongside the HTML one.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Whether this is a continuous-integration run.
    pub ci: bool,

    /// Retry attempts for a failed case.
    pub retries: u32,

    /// Worker count override (None = runner default).
    pub workers: Option<usize>,

    /// Report formats to emit.
    pub reporters: Vec<Reporter>,

    /// Upper bound on a single test case.
    pub case_timeout: Duration,

    /// Directory for failure artifacts and reports.
    pub artifacts_dir: PathBuf,

    /// Base URL of the users API under test.
    pub api_base_url: String,

    /// Base URL of the storefront page under test.
    pub ui_base_url: String,

    /// Run the browser headless.
    pub headless: bool,
}

impl RunConfig {
    /// Build a config from the process environment.
    pub fn from_env() -> Self {
        let ci = std::env::var("CI").map(|v| !v.is_empty() && v != "0").unwrap_or(false);

        Self {
            ci,
            retries: if ci { 2 } else { 0 },
            workers: if ci { Some(1) } else { None },
            reporters: if ci {
                vec![Reporter::Html]
            } else {
                vec![Reporter::Html, Reporter::List]
            },
            case_timeout: Duration::from_secs(30),
            artifacts_dir: PathBuf::from(
                std::env::var("SHOPCHECK_ARTIFACTS_DIR")
                    .unwrap_or_else(|_| "test-results".to_string()),
            ),
            api_base_url: std::env::var("SHOPCHECK_API_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            ui_base_url: std::env::var("SHOPCHECK_UI_URL")
                .unwrap_or_else(|_| "https://www.saucedemo.com".to_string()),
            headless: std::env::var("SHOPCHECK_HEADED").is_err(),
        }
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            ci: false,
            retries: 0,
            workers: None,
            reporters: vec![Reporter::Html, Reporter::List],
            case_timeout: Duration::from_secs(30),
            artifacts_dir: PathBuf::from("test-results"),
            api_base_url: "http://localhost:3000".to_string(),
            ui_base_url: "https://www.saucedemo.com".to_string(),
            headless: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_run_is_local() {
        let cfg = RunConfig::default();
        assert!(!cfg.ci);
        assert_eq!(cfg.retries, 0);
        assert_eq!(cfg.workers, None);
        assert_eq!(cfg.reporters, vec![Reporter::Html, Reporter::List]);
        assert_eq!(cfg.case_timeout, Duration::from_secs(30));
    }

    #[test]
    fn ci_gating_tightens_retries_and_workers() {
        // Mirror the from_env branches without mutating the process env.
        let ci = true;
        let cfg = RunConfig {
            ci,
            retries: if ci { 2 } else { 0 },
            workers: if ci { Some(1) } else { None },
            reporters: if ci {
                vec![Reporter::Html]
            } else {
                vec![Reporter::Html, Reporter::List]
            },
            ..RunConfig::default()
        };
        assert_eq!(cfg.retries, 2);
        assert_eq!(cfg.workers, Some(1));
        assert_eq!(cfg.reporters, vec![Reporter::Html]);
    }
}
