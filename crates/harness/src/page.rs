//! Page interactions and DOM-state queries
//!
//! Interactions prefer accessible affordances (button labels, link text,
//! placeholders) over raw structural selectors; CSS selectors are used only
//! where the page offers nothing better.

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use chromiumoxide::page::ScreenshotParams;
use regex::Regex;
use tracing::debug;

use crate::error::{HarnessError, HarnessResult};
use crate::wait::Waiter;

/// Default timeout for element waits.
const ELEMENT_TIMEOUT: Duration = Duration::from_secs(10);

/// Quote a string as a JavaScript literal.
fn js_str(s: &str) -> String {
    serde_json::Value::from(s).to_string()
}

/// Timestamped interaction history for one page, shared across its clones.
///
/// Written out next to the failure screenshot so a failed attempt leaves a
/// replayable record of what the case did, not just its final frame.
#[derive(Clone)]
pub struct TraceLog {
    started: Instant,
    entries: Arc<Mutex<Vec<String>>>,
}

impl TraceLog {
    fn new() -> Self {
        Self { started: Instant::now(), entries: Arc::default() }
    }

    fn record(&self, entry: impl Into<String>) {
        let at = self.started.elapsed();
        if let Ok(mut entries) = self.entries.lock() {
            entries.push(format!("{:>8.3}s  {}", at.as_secs_f64(), entry.into()));
        }
    }

    /// Snapshot of the recorded entries, oldest first.
    pub fn lines(&self) -> Vec<String> {
        self.entries.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// Write the history to a file, ending with the failure that stopped
    /// the attempt.
    pub fn write(&self, path: &Path, failure: &str) -> HarnessResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut out = self.lines().join("\n");
        out.push('\n');
        out.push_str(&format!("FAILED: {failure}\n"));
        std::fs::write(path, out)?;
        Ok(())
    }
}

/// A browser tab under test.
#[derive(Clone)]
pub struct Page {
    inner: chromiumoxide::Page,
    trace: TraceLog,
}

impl Page {
    pub fn new(inner: chromiumoxide::Page) -> Self {
        Self { inner, trace: TraceLog::new() }
    }

    /// The interaction history recorded so far.
    pub fn trace(&self) -> &TraceLog {
        &self.trace
    }

    // ----- navigation -----

    pub async fn goto(&self, url: &str) -> HarnessResult<()> {
        debug!("goto {url}");
        self.trace.record(format!("goto {url}"));
        self.inner.goto(url).await?;
        Ok(())
    }

    pub async fn current_url(&self) -> HarnessResult<String> {
        self.inner
            .url()
            .await?
            .ok_or_else(|| HarnessError::Browser("page has no URL".to_string()))
    }

    /// Wait until the page URL matches the pattern.
    pub async fn wait_for_url(&self, pattern: &str) -> HarnessResult<()> {
        self.trace.record(format!("wait for url matching {pattern}"));
        let re = Regex::new(pattern)?;
        let waiter = Waiter::new(format!("url matching {pattern}"), ELEMENT_TIMEOUT);
        loop {
            if re.is_match(&self.current_url().await?) {
                return Ok(());
            }
            waiter.tick().await?;
        }
    }

    // ----- queries -----

    /// Trimmed text of the first element matching the selector.
    pub async fn text_of(&self, selector: &str) -> HarnessResult<String> {
        let script = format!(
            "(() => {{ const el = document.querySelector({sel}); \
             return el ? el.innerText.trim() : null; }})()",
            sel = js_str(selector),
        );
        let text: Option<String> = self.inner.evaluate(script).await?.into_value()?;
        text.ok_or_else(|| HarnessError::ElementNotFound(selector.to_string()))
    }

    /// Trimmed texts of all matching elements, in DOM order.
    pub async fn texts_of(&self, selector: &str) -> HarnessResult<Vec<String>> {
        let script = format!(
            "Array.from(document.querySelectorAll({sel})).map(el => el.innerText.trim())",
            sel = js_str(selector),
        );
        Ok(self.inner.evaluate(script).await?.into_value()?)
    }

    pub async fn count(&self, selector: &str) -> HarnessResult<usize> {
        let script = format!("document.querySelectorAll({sel}).length", sel = js_str(selector));
        Ok(self.inner.evaluate(script).await?.into_value()?)
    }

    /// Whether an element matching the selector is rendered.
    pub async fn is_visible(&self, selector: &str) -> HarnessResult<bool> {
        let script = format!(
            "(() => {{ const el = document.querySelector({sel}); \
             return !!(el && el.getClientRects().length); }})()",
            sel = js_str(selector),
        );
        Ok(self.inner.evaluate(script).await?.into_value()?)
    }

    /// Whether the given visible text appears anywhere on the page.
    pub async fn has_text(&self, text: &str) -> HarnessResult<bool> {
        let script = format!(
            "document.body.innerText.includes({text})",
            text = js_str(text),
        );
        Ok(self.inner.evaluate(script).await?.into_value()?)
    }

    // ----- interactions -----

    pub async fn click(&self, selector: &str) -> HarnessResult<()> {
        debug!("click {selector}");
        self.trace.record(format!("click {selector}"));
        self.wait_for(selector).await?;
        let el = self
            .inner
            .find_element(selector)
            .await
            .map_err(|_| HarnessError::ElementNotFound(selector.to_string()))?;
        el.click().await?;
        Ok(())
    }

    /// Click a button by its accessible name (text content or submit
    /// value), matched case-insensitively.
    pub async fn click_button(&self, label: &str) -> HarnessResult<()> {
        self.click_labeled("button, input[type=\"submit\"]", label).await
    }

    /// Click a link by its text, matched case-insensitively.
    pub async fn click_link(&self, label: &str) -> HarnessResult<()> {
        self.click_labeled("a", label).await
    }

    async fn click_labeled(&self, role_selector: &str, label: &str) -> HarnessResult<()> {
        debug!("click labeled {label:?}");
        self.trace.record(format!("click element labeled {label:?}"));
        let script = format!(
            "(() => {{ \
               const label = {label}.toLowerCase(); \
               const el = Array.from(document.querySelectorAll({sel})).find(e => \
                 (e.innerText || e.value || '').trim().toLowerCase().includes(label)); \
               if (!el) return false; \
               el.click(); \
               return true; \
             }})()",
            label = js_str(label),
            sel = js_str(role_selector),
        );

        let waiter = Waiter::new(format!("element labeled {label:?}"), ELEMENT_TIMEOUT);
        loop {
            let clicked: bool = self.inner.evaluate(script.clone()).await?.into_value()?;
            if clicked {
                return Ok(());
            }
            waiter.tick().await?;
        }
    }

    pub async fn fill(&self, selector: &str, value: &str) -> HarnessResult<()> {
        debug!("fill {selector}");
        self.trace.record(format!("fill {selector}"));
        self.wait_for(selector).await?;
        let el = self
            .inner
            .find_element(selector)
            .await
            .map_err(|_| HarnessError::ElementNotFound(selector.to_string()))?;
        el.click().await?;
        el.type_str(value).await?;
        Ok(())
    }

    /// Fill an input located by its placeholder text.
    pub async fn fill_placeholder(&self, placeholder: &str, value: &str) -> HarnessResult<()> {
        self.fill(&format!("[placeholder=\"{placeholder}\"]"), value).await
    }

    /// Select an option in a `<select>` by value, dispatching a bubbling
    /// change event so the page reacts as it would to user input.
    pub async fn select_option(&self, selector: &str, value: &str) -> HarnessResult<()> {
        debug!("select {value:?} in {selector}");
        self.trace.record(format!("select {value:?} in {selector}"));
        self.wait_for(selector).await?;
        let script = format!(
            "(() => {{ \
               const el = document.querySelector({sel}); \
               if (!el) return false; \
               el.value = {value}; \
               el.dispatchEvent(new Event('change', {{ bubbles: true }})); \
               return true; \
             }})()",
            sel = js_str(selector),
            value = js_str(value),
        );
        let ok: bool = self.inner.evaluate(script).await?.into_value()?;
        if !ok {
            return Err(HarnessError::ElementNotFound(selector.to_string()));
        }
        Ok(())
    }

    // ----- waiting -----

    /// Wait until an element matching the selector is rendered.
    pub async fn wait_for(&self, selector: &str) -> HarnessResult<()> {
        let waiter = Waiter::new(selector, ELEMENT_TIMEOUT);
        loop {
            if self.is_visible(selector).await? {
                return Ok(());
            }
            waiter.tick().await?;
        }
    }

    /// Wait until the first element's text differs from a previously
    /// observed value. This is how re-renders (e.g. re-sorting) are
    /// awaited instead of sleeping a fixed delay.
    pub async fn wait_for_text_change(&self, selector: &str, old: &str) -> HarnessResult<()> {
        let waiter = Waiter::new(format!("{selector} to change from {old:?}"), ELEMENT_TIMEOUT);
        loop {
            // A briefly absent element means the page is mid-render; keep
            // polling until the deadline.
            if let Ok(text) = self.text_of(selector).await {
                if text != old {
                    return Ok(());
                }
            }
            waiter.tick().await?;
        }
    }

    // ----- artifacts -----

    /// Capture a full-page screenshot to the given path.
    pub async fn screenshot(&self, path: &Path) -> HarnessResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        self.inner
            .save_screenshot(ScreenshotParams::builder().full_page(true).build(), path)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trace_log_records_in_order() {
        let log = TraceLog::new();
        log.record("goto https://example.test");
        log.record("click #login");
        let lines = log.lines();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("goto https://example.test"));
        assert!(lines[1].ends_with("click #login"));
    }

    #[test]
    fn trace_log_is_shared_across_clones() {
        let log = TraceLog::new();
        let clone = log.clone();
        clone.record("fill #user-name");
        assert_eq!(log.lines().len(), 1);
    }

    #[test]
    fn trace_log_writes_history_and_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("artifacts").join("case-attempt1.trace.log");

        let log = TraceLog::new();
        log.record("goto https://example.test");
        log.write(&path, "element not found: #cart").unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("goto https://example.test"));
        assert!(content.ends_with("FAILED: element not found: #cart\n"));
    }

    #[test]
    fn js_str_escapes_quotes_and_backslashes() {
        assert_eq!(js_str("plain"), "\"plain\"");
        assert_eq!(js_str("it's"), "\"it's\"");
        assert_eq!(js_str("say \"hi\""), "\"say \\\"hi\\\"\"");
        assert_eq!(js_str("a\\b"), "\"a\\\\b\"");
    }
}
