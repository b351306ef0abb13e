//! Chrome session over the WebDriver protocol
//!
//! Drives a real Chrome via chromedriver using fantoccini. One session is
//! shared by every suite in a run; tests never open their own.

use anyhow::{Context, Result};
use async_trait::async_trait;
use colored::Colorize;
use fantoccini::{Client, ClientBuilder};
use log::{debug, warn};
use serde_json::{json, Value};

use crate::driver::chromedriver::{self, ChromeDriver};
use crate::driver::traits::{Locator, PageElement, Session};

/// Chrome session configuration
#[derive(Debug, Clone)]
pub struct ChromeConfig {
    pub headless: bool,
    /// Attach to an already-running WebDriver server instead of spawning one
    pub webdriver_url: Option<String>,
    pub window_width: u32,
    pub window_height: u32,
}

impl Default for ChromeConfig {
    fn default() -> Self {
        let headless = std::env::var("FARMQA_HEADLESS")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);

        let webdriver_url = std::env::var("FARMQA_WEBDRIVER_URL").ok();

        Self {
            headless,
            webdriver_url,
            window_width: 1920,
            window_height: 1080,
        }
    }
}

/// Console hook installed into every document the session visits
///
/// Navigation wipes window state, so the session re-runs this after each
/// goto/refresh. The guard keeps repeat installs in the same document inert.
const CONSOLE_HOOK: &str = r#"
    (function() {
        if (window.__farmqa_console_capture) return;
        window.__farmqa_console_capture = true;
        window.__farmqa_console_logs = [];

        const originalError = console.error;
        const originalWarn = console.warn;

        function capture(level, args) {
            const message = Array.from(args).map(arg => {
                if (typeof arg === 'object') {
                    try {
                        return JSON.stringify(arg);
                    } catch (e) {
                        return String(arg);
                    }
                }
                return String(arg);
            }).join(' ');

            window.__farmqa_console_logs.push({
                level: level,
                message: message,
                timestamp: new Date().toISOString()
            });

            // Keep only the last 1000 entries
            if (window.__farmqa_console_logs.length > 1000) {
                window.__farmqa_console_logs.shift();
            }
        }

        console.error = function(...args) {
            capture('SEVERE', args);
            originalError.apply(console, args);
        };

        console.warn = function(...args) {
            capture('WARNING', args);
            originalWarn.apply(console, args);
        };

        window.addEventListener('error', function(event) {
            capture('SEVERE', ['Uncaught ' + (event.error || event.message) +
                ' at ' + event.filename + ':' + event.lineno + ':' + event.colno]);
        });

        window.addEventListener('unhandledrejection', function(event) {
            capture('SEVERE', ['Unhandled Promise Rejection: ' + event.reason]);
        });
    })();
"#;

/// A live Chrome session
///
/// Owns the fantoccini client and, when the runner spawned it, the
/// chromedriver process behind it.
pub struct ChromeSession {
    client: Option<Client>,
    driver: Option<ChromeDriver>,
}

impl ChromeSession {
    /// Start Chrome and open a WebDriver session
    ///
    /// Spawns a managed chromedriver unless `config.webdriver_url` points at
    /// a server that is already running.
    pub async fn connect(config: &ChromeConfig) -> Result<Self> {
        let (driver, url) = match &config.webdriver_url {
            Some(url) => {
                println!("{} Attaching to WebDriver at: {}", "🔌".blue(), url);
                (None, url.clone())
            }
            None => {
                let driver = ChromeDriver::start(chromedriver::DEFAULT_PORT).await?;
                let url = driver.url();
                (Some(driver), url)
            }
        };

        let caps = build_capabilities(config);
        debug!("connecting to WebDriver at {}", url);

        let client = ClientBuilder::rustls()
            .capabilities(caps)
            .connect(&url)
            .await
            .with_context(|| format!("Failed to open a Chrome session via {}", url))?;

        if let Err(e) = client
            .set_window_size(config.window_width, config.window_height)
            .await
        {
            debug!("could not set window size: {}", e);
        }

        println!(
            "{} Chrome session started ({})",
            "✅".green(),
            if config.headless { "headless" } else { "headed" }
        );

        let session = Self {
            client: Some(client),
            driver,
        };
        session.install_console_hook().await;
        Ok(session)
    }

    fn client(&self) -> Result<&Client> {
        self.client
            .as_ref()
            .context("Chrome session is already closed")
    }

    /// Best-effort: some documents (e.g. about:blank before the first
    /// navigation) reject script injection.
    async fn install_console_hook(&self) {
        if let Some(client) = &self.client {
            if let Err(e) = client.execute(CONSOLE_HOOK, vec![]).await {
                debug!("console hook install failed: {}", e);
            }
        }
    }

    async fn wait_document_ready(&self) -> Result<()> {
        let client = self.client()?;
        // Max 2 seconds
        for _ in 0..20 {
            match client
                .execute("return document.readyState === 'complete';", vec![])
                .await
            {
                Ok(val) if val.as_bool().unwrap_or(false) => break,
                _ => tokio::time::sleep(std::time::Duration::from_millis(100)).await,
            }
        }
        Ok(())
    }
}

fn build_capabilities(config: &ChromeConfig) -> serde_json::Map<String, Value> {
    let mut args = vec![
        "--no-sandbox".to_string(),
        "--disable-dev-shm-usage".to_string(),
        "--disable-gpu".to_string(),
        format!(
            "--window-size={},{}",
            config.window_width, config.window_height
        ),
    ];

    if config.headless {
        args.push("--headless=new".to_string());
    }

    let mut chrome_opts = serde_json::Map::new();
    chrome_opts.insert("args".to_string(), json!(args));

    let mut caps = serde_json::Map::new();
    caps.insert("goog:chromeOptions".to_string(), json!(chrome_opts));
    caps
}

#[async_trait]
impl Session for ChromeSession {
    async fn goto(&self, url: &str) -> Result<()> {
        debug!("navigating to {}", url);
        self.client()?
            .goto(url)
            .await
            .with_context(|| format!("Failed to navigate to {}", url))?;
        self.wait_document_ready().await?;
        self.install_console_hook().await;
        Ok(())
    }

    async fn refresh(&self) -> Result<()> {
        self.client()?
            .refresh()
            .await
            .context("Failed to refresh the page")?;
        self.wait_document_ready().await?;
        self.install_console_hook().await;
        Ok(())
    }

    async fn current_url(&self) -> Result<String> {
        Ok(self.client()?.current_url().await?.to_string())
    }

    async fn page_source(&self) -> Result<String> {
        Ok(self.client()?.source().await?)
    }

    async fn find_all(&self, locator: &Locator) -> Result<Vec<Box<dyn PageElement>>> {
        let fan = match locator {
            Locator::Css(expr) => fantoccini::Locator::Css(expr),
            Locator::XPath(expr) => fantoccini::Locator::XPath(expr),
        };
        let elements = self.client()?.find_all(fan).await?;
        Ok(elements
            .into_iter()
            .map(|e| Box::new(ChromeElement(e)) as Box<dyn PageElement>)
            .collect())
    }

    async fn execute(&self, script: &str, args: Vec<Value>) -> Result<Value> {
        Ok(self.client()?.execute(script, args).await?)
    }

    async fn screenshot(&self) -> Result<Vec<u8>> {
        Ok(self.client()?.screenshot().await?)
    }

    async fn close(&mut self) -> Result<()> {
        if let Some(client) = self.client.take() {
            if let Err(e) = client.close().await {
                warn!("closing Chrome session: {}", e);
            }
        }
        if let Some(driver) = self.driver.take() {
            driver.stop().await?;
        }
        Ok(())
    }
}

/// An element handle held by a Chrome session
pub struct ChromeElement(fantoccini::elements::Element);

#[async_trait]
impl PageElement for ChromeElement {
    async fn click(&self) -> Result<()> {
        self.0.click().await?;
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        self.0.clear().await?;
        Ok(())
    }

    async fn send_keys(&self, text: &str) -> Result<()> {
        self.0.send_keys(text).await?;
        Ok(())
    }

    async fn text(&self) -> Result<String> {
        Ok(self.0.text().await?)
    }
}
