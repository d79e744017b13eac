//! Suite reporting: JSON, HTML, and list output

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{error, info};

use crate::error::HarnessResult;

/// Result of one profile/suite-file pairing.
#[derive(Debug, Clone, Serialize)]
pub struct SuiteEntry {
    pub profile: String,
    pub suite: String,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub duration_ms: u64,
}

/// Aggregated result of a whole run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SuiteReport {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub duration_ms: u64,
    pub entries: Vec<SuiteEntry>,
}

impl SuiteReport {
    pub fn record(&mut self, entry: SuiteEntry) {
        self.total += entry.passed + entry.failed + entry.skipped;
        self.passed += entry.passed;
        self.failed += entry.failed;
        self.skipped += entry.skipped;
        self.duration_ms += entry.duration_ms;
        self.entries.push(entry);
    }

    pub fn ok(&self) -> bool {
        self.failed == 0
    }

    /// Write the machine-readable report.
    pub fn write_json(&self, dir: &Path) -> HarnessResult<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join("test-results.json");
        std::fs::write(&path, serde_json::to_string_pretty(self)?)?;
        Ok(path)
    }

    /// Write a single self-contained HTML report.
    pub fn write_html(&self, dir: &Path) -> HarnessResult<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join("report.html");
        std::fs::write(&path, self.render_html())?;
        Ok(path)
    }

    fn render_html(&self) -> String {
        let mut rows = String::new();
        for e in &self.entries {
            let class = if e.failed > 0 { "failed" } else { "passed" };
            rows.push_str(&format!(
                "<tr class=\"{class}\"><td>{}</td><td>{}</td>\
                 <td>{}</td><td>{}</td><td>{}</td><td>{} ms</td></tr>\n",
                e.profile, e.suite, e.passed, e.failed, e.skipped, e.duration_ms,
            ));
        }

        format!(
            "<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\">\
             <title>shopcheck report</title>\
             <style>\
             body{{font-family:sans-serif;margin:2em}}\
             table{{border-collapse:collapse}}\
             td,th{{border:1px solid #ccc;padding:4px 10px}}\
             tr.passed td:first-child{{border-left:4px solid #2a2}}\
             tr.failed td:first-child{{border-left:4px solid #c22}}\
             </style></head><body>\
             <h1>shopcheck</h1>\
             <p>{} passed, {} failed, {} skipped in {} ms</p>\
             <table><tr><th>Profile</th><th>Suite</th><th>Passed</th>\
             <th>Failed</th><th>Skipped</th><th>Duration</th></tr>\n{rows}</table>\
             </body></html>\n",
            self.passed, self.failed, self.skipped, self.duration_ms,
        )
    }

    /// Emit the per-entry list summary through tracing.
    pub fn print_list(&self) {
        for e in &self.entries {
            if e.failed > 0 {
                error!(
                    "✗ {} / {}: {} passed, {} failed ({} ms)",
                    e.profile, e.suite, e.passed, e.failed, e.duration_ms
                );
            } else {
                info!(
                    "✓ {} / {}: {} passed, {} skipped ({} ms)",
                    e.profile, e.suite, e.passed, e.skipped, e.duration_ms
                );
            }
        }
        info!(
            "Results: {} passed, {} failed, {} skipped ({} ms)",
            self.passed, self.failed, self.skipped, self.duration_ms
        );
    }
}
