//! Shopcheck test harness
//!
//! Orchestration for the end-to-end and API suites: execution profiles
//! mapping test files to client environments, a CDP browser driver with
//! condition-based waits, a JSON client for the users resource, and a
//! per-case runner handling fixture lifecycle, timeouts, retries, and
//! failure artifacts.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                    shopcheck-harness                     │
//! ├──────────────────────────────────────────────────────────┤
//! │  ProfileSet (e2e.yaml)                                   │
//! │    ├── matching(path) -> profiles                        │
//! │    └── execution_order() -> setup before dependents      │
//! │  runner                                                  │
//! │    ├── run_api_case: fixture + purge + timeout + retry   │
//! │    └── run_ui_case:  browser ctx + timeout + screenshot  │
//! │  ApiContext: users CRUD over JSON                        │
//! │  Page: click/fill/select + wait-for-condition            │
//! │  SuiteReport: json / html / list                         │
//! └──────────────────────────────────────────────────────────┘
//! ```

pub mod api;
pub mod browser;
pub mod config;
pub mod error;
pub mod fixture;
pub mod page;
pub mod profile;
pub mod report;
pub mod runner;
pub mod wait;

pub use api::{is_not_found, ApiContext};
pub use browser::{BrowserHandle, BrowserOptions};
pub use config::{Reporter, RunConfig};
pub use error::{HarnessError, HarnessResult};
pub use fixture::{unused_id, User};
pub use page::{Page, TraceLog};
pub use profile::{BrowserKind, Profile, ProfileSet, Viewport};
pub use report::{SuiteEntry, SuiteReport};
pub use runner::{run_api_case, run_ui_case, CaseOptions, CaseOutcome};
