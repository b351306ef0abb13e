//! High-level browser actions shared by every test suite
//!
//! Wraps a [`Session`] with the waiting, scrolling and retry behavior the
//! Farm TNF UI needs. Lookup-style operations report absence through their
//! return value; only session-level failures (lost connection, crashed tab)
//! surface as errors.

use anyhow::Result;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::path::Path;
use std::time::{Duration, Instant};

use crate::driver::traits::{Locator, PageElement, Session};

/// Timing knobs for the action layer
#[derive(Debug, Clone)]
pub struct BrowserConfig {
    /// How long explicit waits poll before giving up
    pub wait_timeout: Duration,
    /// How long list lookups poll before accepting an empty result
    pub implicit_wait: Duration,
    pub poll_interval: Duration,
    /// Pause between scrolling an element into view and clicking it
    pub pre_click_delay: Duration,
    /// Pause after a click so the UI can react
    pub post_click_delay: Duration,
    /// Pause after navigation so the SPA can render
    pub settle_delay: Duration,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            wait_timeout: Duration::from_secs(10),
            implicit_wait: Duration::from_secs(5),
            poll_interval: Duration::from_millis(250),
            pre_click_delay: Duration::from_millis(300),
            post_click_delay: Duration::from_millis(500),
            settle_delay: Duration::from_secs(1),
        }
    }
}

/// One captured console message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsoleEntry {
    pub level: String,
    pub message: String,
    pub timestamp: String,
}

/// The browser handle test suites drive
pub struct Browser {
    session: Box<dyn Session>,
    config: BrowserConfig,
}

impl Browser {
    pub fn new(session: Box<dyn Session>) -> Self {
        Self::with_config(session, BrowserConfig::default())
    }

    pub fn with_config(session: Box<dyn Session>, config: BrowserConfig) -> Self {
        Self { session, config }
    }

    /// Open `url` and give the SPA a moment to render
    pub async fn navigate(&self, url: &str) -> Result<()> {
        self.session.goto(url).await?;
        tokio::time::sleep(self.config.settle_delay).await;
        Ok(())
    }

    pub async fn refresh(&self) -> Result<()> {
        self.session.refresh().await?;
        tokio::time::sleep(self.config.settle_delay).await;
        Ok(())
    }

    pub async fn current_url(&self) -> Result<String> {
        self.session.current_url().await
    }

    pub async fn page_source(&self) -> Result<String> {
        self.session.page_source().await
    }

    /// Poll for an element until the default timeout elapses
    ///
    /// # Returns
    /// The first matching element, or `None` if it never appeared.
    pub async fn wait_for_element(&self, locator: &Locator) -> Result<Option<Box<dyn PageElement>>> {
        self.wait_for_element_within(locator, self.config.wait_timeout)
            .await
    }

    /// Poll for an element with an explicit timeout
    pub async fn wait_for_element_within(
        &self,
        locator: &Locator,
        timeout: Duration,
    ) -> Result<Option<Box<dyn PageElement>>> {
        let deadline = Instant::now() + timeout;
        loop {
            let mut found = self.session.find_all(locator).await?;
            if !found.is_empty() {
                return Ok(Some(found.remove(0)));
            }
            if Instant::now() >= deadline {
                debug!("timed out waiting for {}", locator);
                return Ok(None);
            }
            tokio::time::sleep(self.config.poll_interval).await;
        }
    }

    /// Click an element, scrolling it into view first
    ///
    /// Falls back to a script click when the native one is intercepted,
    /// which sticky headers in the Farm TNF layout regularly cause.
    ///
    /// # Returns
    /// `false` if the element never appeared or neither click landed.
    pub async fn click(&self, locator: &Locator) -> Result<bool> {
        let element = match self.wait_for_element(locator).await? {
            Some(element) => element,
            None => {
                warn!("click target {} not found", locator);
                return Ok(false);
            }
        };

        let scroll = format!(
            "var el = {}; if (el) el.scrollIntoView({{block: 'center'}});",
            resolve_snippet(locator)
        );
        let native = match self
            .session
            .execute(&scroll, vec![json!(locator.expression())])
            .await
        {
            Ok(_) => {
                tokio::time::sleep(self.config.pre_click_delay).await;
                element.click().await
            }
            Err(e) => Err(e),
        };

        if let Err(e) = native {
            debug!("native click on {} failed ({}), using script click", locator, e);
            let script = format!(
                "var el = {}; if (el) {{ el.click(); return true; }} return false;",
                resolve_snippet(locator)
            );
            match self
                .session
                .execute(&script, vec![json!(locator.expression())])
                .await
            {
                Ok(value) if value.as_bool().unwrap_or(false) => {}
                Ok(_) => {
                    // The element can vanish between the wait and the fallback
                    warn!("script click on {} found nothing to click", locator);
                    return Ok(false);
                }
                Err(e) => {
                    warn!("script click on {} failed: {}", locator, e);
                    return Ok(false);
                }
            }
        }

        tokio::time::sleep(self.config.post_click_delay).await;
        Ok(true)
    }

    /// Type into a field, optionally clearing its current value first
    ///
    /// # Returns
    /// `false` if the field never appeared.
    pub async fn type_text(&self, locator: &Locator, text: &str, clear: bool) -> Result<bool> {
        let element = match self.wait_for_element(locator).await? {
            Some(element) => element,
            None => {
                warn!("input {} not found", locator);
                return Ok(false);
            }
        };

        if clear {
            element.clear().await?;
        }
        element.send_keys(text).await?;
        Ok(true)
    }

    /// Visible text of an element, or `None` if it never appeared
    pub async fn get_text(&self, locator: &Locator) -> Result<Option<String>> {
        match self.wait_for_element(locator).await? {
            Some(element) => Ok(Some(element.text().await?)),
            None => Ok(None),
        }
    }

    /// All elements matching `locator`
    ///
    /// Keeps polling while the result is empty, up to the implicit wait, so
    /// lists that render a beat after navigation are not read too early.
    pub async fn get_elements(&self, locator: &Locator) -> Result<Vec<Box<dyn PageElement>>> {
        let deadline = Instant::now() + self.config.implicit_wait;
        loop {
            let found = self.session.find_all(locator).await?;
            if !found.is_empty() || Instant::now() >= deadline {
                return Ok(found);
            }
            tokio::time::sleep(self.config.poll_interval).await;
        }
    }

    pub async fn element_exists(&self, locator: &Locator) -> Result<bool> {
        Ok(!self.get_elements(locator).await?.is_empty())
    }

    /// Select a `<select>` option by its exact visible text
    ///
    /// Fires input and change events so the frontend framework notices.
    ///
    /// # Returns
    /// `false` if the select never appeared or has no such option.
    pub async fn select_option(&self, locator: &Locator, option_text: &str) -> Result<bool> {
        if self.wait_for_element(locator).await?.is_none() {
            warn!("select {} not found", locator);
            return Ok(false);
        }

        let script = format!(
            r#"
            var el = {};
            if (!el) return 'no-option';
            var options = el.options;
            for (var i = 0; i < options.length; i++) {{
                if (options[i].text.trim() === arguments[1]) {{
                    el.selectedIndex = i;
                    el.dispatchEvent(new Event('input', {{ bubbles: true }}));
                    el.dispatchEvent(new Event('change', {{ bubbles: true }}));
                    return 'selected';
                }}
            }}
            return 'no-option';
            "#,
            resolve_snippet(locator)
        );

        let outcome = self
            .session
            .execute(&script, vec![json!(locator.expression()), json!(option_text)])
            .await?;

        match outcome.as_str() {
            Some("selected") => Ok(true),
            _ => {
                debug!("select {} has no option '{}'", locator, option_text);
                Ok(false)
            }
        }
    }

    /// Severe console entries captured since the hook was installed
    pub async fn get_console_errors(&self) -> Result<Vec<ConsoleEntry>> {
        let value = self
            .session
            .execute("return window.__farmqa_console_logs || [];", vec![])
            .await?;

        let entries: Vec<ConsoleEntry> = serde_json::from_value(value).unwrap_or_default();
        Ok(entries
            .into_iter()
            .filter(|entry| entry.level == "SEVERE")
            .collect())
    }

    /// Save a PNG of the current viewport
    pub async fn screenshot(&self, path: &Path) -> Result<()> {
        let bytes = self.session.screenshot().await?;
        std::fs::write(path, bytes)?;
        println!("📸 Screenshot saved: {}", path.display());
        Ok(())
    }

    /// Close the session and whatever processes back it
    pub async fn shutdown(&mut self) -> Result<()> {
        self.session.close().await
    }
}

/// JS expression resolving a locator to a DOM node, taking the locator
/// expression as `arguments[0]`. Element handles are never passed into
/// scripts; re-resolving avoids stale references after re-renders.
fn resolve_snippet(locator: &Locator) -> &'static str {
    match locator {
        Locator::Css(_) => "document.querySelector(arguments[0])",
        Locator::XPath(_) => {
            "document.evaluate(arguments[0], document, null, \
             XPathResult.FIRST_ORDERED_NODE_TYPE, null).singleNodeValue"
        }
    }
}
