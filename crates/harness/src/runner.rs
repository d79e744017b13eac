//! Per-case orchestration: fixture lifecycle, timeout, retries, artifacts
//!
//! Each case is self-contained. API cases get a fresh fixture and a
//! best-effort purge of the remote collection before the body runs; UI
//! cases get a browser context of their own, torn down afterwards even on
//! failure. A failed attempt is retried up to the configured count; each
//! failed UI attempt leaves a screenshot and the page's interaction trace
//! in the artifacts directory.

use std::future::Future;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{error, info, warn};

use crate::api::ApiContext;
use crate::browser::{BrowserHandle, BrowserOptions};
use crate::config::RunConfig;
use crate::error::{HarnessError, HarnessResult};
use crate::fixture::User;
use crate::page::Page;

/// Per-case options, usually derived from the run configuration.
#[derive(Debug, Clone)]
pub struct CaseOptions {
    /// Upper bound on one attempt of the case body.
    pub timeout: Duration,

    /// Extra attempts after the first failure.
    pub retries: u32,

    /// Where failure screenshots land.
    pub artifacts_dir: PathBuf,
}

impl From<&RunConfig> for CaseOptions {
    fn from(cfg: &RunConfig) -> Self {
        Self {
            timeout: cfg.case_timeout,
            retries: cfg.retries,
            artifacts_dir: cfg.artifacts_dir.clone(),
        }
    }
}

impl Default for CaseOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            retries: 0,
            artifacts_dir: PathBuf::from("test-results"),
        }
    }
}

/// What happened to one case across all of its attempts.
#[derive(Debug, Clone, Serialize)]
pub struct CaseOutcome {
    pub name: String,
    pub passed: bool,
    pub attempts: u32,
    pub duration_ms: u64,
    /// Last failure message when the case only passed on a retry.
    pub flaky_error: Option<String>,
}

/// Run one API test case.
///
/// Per attempt: construct a fresh fixture, purge the remote collection
/// (failures logged, never fatal), then run the body under the case
/// timeout. The context carries the active profile's headers, so it is
/// built by the caller and handed to each attempt.
pub async fn run_api_case<F, Fut>(
    name: &str,
    options: &CaseOptions,
    ctx: &ApiContext,
    body: F,
) -> HarnessResult<CaseOutcome>
where
    F: Fn(ApiContext, User) -> Fut,
    Fut: Future<Output = HarnessResult<()>>,
{
    let start = Instant::now();
    let mut last_error = String::new();

    for attempt in 1..=options.retries + 1 {
        let ctx = ctx.clone();
        let fixture = User::fixture();
        ctx.purge_all().await;

        match run_attempt(name, options.timeout, body(ctx, fixture)).await {
            Ok(()) => {
                info!("✓ {name} (attempt {attempt})");
                return Ok(outcome(name, attempt, start, (attempt > 1).then(|| last_error.clone())));
            }
            Err(e) => {
                last_error = e.to_string();
                error!("✗ {name} (attempt {attempt}): {last_error}");
            }
        }
    }

    Err(HarnessError::CaseFailed {
        attempts: options.retries + 1,
        reason: format!("{name}: {last_error}"),
    })
}

/// Run one UI test case.
///
/// Per attempt: launch a dedicated browser context, open the base URL,
/// hand the page to the body under the case timeout. On failure a
/// screenshot and the interaction trace are captured before the context
/// is torn down.
pub async fn run_ui_case<F, Fut>(
    name: &str,
    options: &CaseOptions,
    browser_options: &BrowserOptions,
    base_url: &str,
    body: F,
) -> HarnessResult<CaseOutcome>
where
    F: Fn(Page) -> Fut,
    Fut: Future<Output = HarnessResult<()>>,
{
    let start = Instant::now();
    let mut last_error = String::new();

    for attempt in 1..=options.retries + 1 {
        let mut browser = BrowserHandle::launch(browser_options).await?;

        let attempt_result = match browser.new_page(base_url).await {
            Ok(page) => {
                let snapshot = page.clone();
                let result = run_attempt(name, options.timeout, body(page)).await;
                if let Err(e) = &result {
                    capture_failure(&snapshot, options, name, attempt, &e.to_string()).await;
                }
                result
            }
            Err(e) => Err(e),
        };

        if let Err(e) = browser.close().await {
            warn!("{name}: browser teardown failed: {e}");
        }

        match attempt_result {
            Ok(()) => {
                info!("✓ {name} (attempt {attempt})");
                return Ok(outcome(name, attempt, start, (attempt > 1).then(|| last_error.clone())));
            }
            Err(e) => {
                last_error = e.to_string();
                error!("✗ {name} (attempt {attempt}): {last_error}");
            }
        }
    }

    Err(HarnessError::CaseFailed {
        attempts: options.retries + 1,
        reason: format!("{name}: {last_error}"),
    })
}

async fn run_attempt<Fut>(name: &str, timeout: Duration, fut: Fut) -> HarnessResult<()>
where
    Fut: Future<Output = HarnessResult<()>>,
{
    match tokio::time::timeout(timeout, fut).await {
        Ok(result) => result,
        Err(_) => Err(HarnessError::Timeout(format!("case {name} exceeded {timeout:?}"))),
    }
}

/// Capture what a failed attempt leaves behind: a screenshot of the final
/// frame and the page's interaction trace.
async fn capture_failure(page: &Page, options: &CaseOptions, name: &str, attempt: u32, error: &str) {
    let shot = options.artifacts_dir.join(format!("{name}-attempt{attempt}.png"));
    match page.screenshot(&shot).await {
        Ok(()) => info!("failure screenshot: {}", shot.display()),
        Err(e) => warn!("{name}: failed to capture screenshot: {e}"),
    }

    let trace = options.artifacts_dir.join(format!("{name}-attempt{attempt}.trace.log"));
    match page.trace().write(&trace, error) {
        Ok(()) => info!("failure trace: {}", trace.display()),
        Err(e) => warn!("{name}: failed to write trace: {e}"),
    }
}

fn outcome(name: &str, attempts: u32, start: Instant, flaky_error: Option<String>) -> CaseOutcome {
    CaseOutcome {
        name: name.to_string(),
        passed: true,
        attempts,
        duration_ms: start.elapsed().as_millis() as u64,
        flaky_error,
    }
}
