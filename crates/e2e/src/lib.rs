//! Shared support for the shopcheck suites
//!
//! Holds the storefront credentials, the login precondition performed
//! identically by every UI case, and the case wrappers that bind the
//! harness runner to the run configuration and the active execution
//! profile.

use std::future::Future;

use regex::Regex;

use shopcheck_harness::runner::{run_api_case, run_ui_case};
use shopcheck_harness::{
    ApiContext, BrowserOptions, CaseOptions, CaseOutcome, HarnessError, HarnessResult, Page,
    Profile, ProfileSet, RunConfig, User,
};

/// Fixed storefront credentials used by every UI case.
pub const STANDARD_USER: &str = "standard_user";
pub const STANDARD_PASSWORD: &str = "secret_sauce";

/// The shipped profile configuration, embedded so the suites work from any
/// working directory.
const PROFILES_YAML: &str = include_str!("../../../e2e.yaml");

pub fn profiles() -> HarnessResult<ProfileSet> {
    ProfileSet::from_yaml(PROFILES_YAML)
}

/// The active execution profile (`SHOPCHECK_PROFILE`, falling back to the
/// given default when unset).
fn active_profile(set: &ProfileSet, default: &str) -> HarnessResult<Profile> {
    let name = std::env::var("SHOPCHECK_PROFILE").unwrap_or_else(|_| default.to_string());
    set.get(&name).cloned().ok_or(HarnessError::UnknownProfile(name))
}

/// Browser launch options for the active profile (default `chromium`).
pub fn browser_options(cfg: &RunConfig) -> HarnessResult<BrowserOptions> {
    let set = profiles()?;
    let profile = active_profile(&set, "chromium")?;
    BrowserOptions::for_profile(&profile, cfg.headless)
}

/// API client for the active profile (default `api`), carrying the
/// profile's declared headers on every request.
pub fn api_context(cfg: &RunConfig) -> HarnessResult<ApiContext> {
    let set = profiles()?;
    let profile = active_profile(&set, "api")?;
    ApiContext::for_profile(&profile, &cfg.api_base_url)
}

/// Log in as the standard user. Performed at the start of every UI case.
pub async fn login(page: &Page) -> HarnessResult<()> {
    page.fill_placeholder("Username", STANDARD_USER).await?;
    page.fill_placeholder("Password", STANDARD_PASSWORD).await?;
    page.click_button("Login").await?;
    page.wait_for_url(r".*/inventory\.html").await
}

/// Run one users-API case under the configured timeout and retry policy.
pub async fn run_users_case<F, Fut>(name: &str, body: F) -> HarnessResult<CaseOutcome>
where
    F: Fn(ApiContext, User) -> Fut,
    Fut: Future<Output = HarnessResult<()>>,
{
    let cfg = RunConfig::from_env();
    let options = CaseOptions::from(&cfg);
    let ctx = api_context(&cfg)?;
    run_api_case(name, &options, &ctx, body).await
}

/// Run one storefront UI case: fresh browser context, login precondition,
/// then the case body.
pub async fn run_sauce_case<F, Fut>(name: &str, body: F) -> HarnessResult<CaseOutcome>
where
    F: Fn(Page) -> Fut,
    Fut: Future<Output = HarnessResult<()>>,
{
    let cfg = RunConfig::from_env();
    let options = CaseOptions::from(&cfg);
    let browser = browser_options(&cfg)?;

    let body_ref = &body;
    run_ui_case(name, &options, &browser, &cfg.ui_base_url, |page| async move {
        login(&page).await?;
        body_ref(page).await
    })
    .await
}

/// The expected order after sorting product names Z to A.
pub fn sorted_desc(names: &[String]) -> Vec<String> {
    let mut sorted = names.to_vec();
    sorted.sort_by(|a, b| b.cmp(a));
    sorted
}

/// Extract `(passed, failed, ignored)` from libtest output, taking the
/// last summary line so per-test noise earlier in the output is ignored.
pub fn parse_test_counts(output: &str) -> Option<(usize, usize, usize)> {
    let re = Regex::new(r"(\d+) passed; (\d+) failed; (\d+) ignored").ok()?;
    let caps = re.captures_iter(output).last()?;
    Some((caps[1].parse().ok()?, caps[2].parse().ok()?, caps[3].parse().ok()?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shipped_profiles_parse_and_order() {
        let set = profiles().unwrap();
        let order = set.execution_order().unwrap();
        let pos = |name: &str| order.iter().position(|p| p.name == name).unwrap();
        assert!(pos("setup") < pos("chromium"));
        assert!(set.get("api").unwrap().headers.is_some());
    }

    #[test]
    fn api_profile_headers_reach_the_client() {
        let set = profiles().unwrap();
        let profile = set.get("api").unwrap();
        let declared = profile.headers.as_ref().unwrap();
        assert_eq!(declared.get("Accept").map(String::as_str), Some("application/json"));
        assert!(ApiContext::for_profile(profile, "http://localhost:3000").is_ok());
    }

    #[test]
    fn sorted_desc_is_reverse_lexicographic() {
        let names: Vec<String> = ["Backpack", "Bike Light", "Onesie", "Bolt T-Shirt"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let sorted = sorted_desc(&names);
        assert_eq!(sorted, vec!["Onesie", "Bolt T-Shirt", "Bike Light", "Backpack"]);
        assert!(sorted.first() >= sorted.last());
        // Input order untouched.
        assert_eq!(names[0], "Backpack");
    }

    #[test]
    fn parses_libtest_summary() {
        let output = "running 10 tests\n\
                      test creates_a_new_user ... ok\n\
                      test result: ok. 9 passed; 1 failed; 0 ignored; 0 measured; 0 filtered out\n";
        assert_eq!(parse_test_counts(output), Some((9, 1, 0)));
    }

    #[test]
    fn takes_the_last_summary_line() {
        let output = "test result: ok. 1 passed; 0 failed; 0 ignored\n\
                      test result: FAILED. 4 passed; 2 failed; 1 ignored\n";
        assert_eq!(parse_test_counts(output), Some((4, 2, 1)));
    }

    #[test]
    fn missing_summary_is_none() {
        assert_eq!(parse_test_counts("garbage"), None);
    }
}
