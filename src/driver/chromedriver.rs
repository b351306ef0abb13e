//! Managed chromedriver process
//!
//! The harness talks WebDriver, so a chromedriver server has to be running
//! somewhere. Unless `FARMQA_WEBDRIVER_URL` points at an existing server,
//! the runner spawns its own chromedriver for the duration of the run and
//! shuts it down with the session.

use anyhow::{Context, Result};
use colored::Colorize;
use log::debug;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::{Child, Command};

/// Default chromedriver listen port
pub const DEFAULT_PORT: u16 = 9515;

const READY_TIMEOUT: Duration = Duration::from_secs(10);
const READY_POLL: Duration = Duration::from_millis(200);

/// Locate the chromedriver binary
///
/// Resolution order: `FARMQA_CHROMEDRIVER` env var, then the system PATH.
pub fn resolve_binary() -> Result<PathBuf> {
    if let Ok(path) = std::env::var("FARMQA_CHROMEDRIVER") {
        let path = PathBuf::from(path);
        if path.exists() {
            return Ok(path);
        }
        anyhow::bail!(
            "FARMQA_CHROMEDRIVER is set to '{}' but no file exists there",
            path.display()
        );
    }

    which::which("chromedriver").context(
        "Could not find 'chromedriver' on PATH. Install it (e.g. apt install \
         chromium-driver, brew install chromedriver) or set FARMQA_CHROMEDRIVER \
         to the binary, or point FARMQA_WEBDRIVER_URL at a running server",
    )
}

/// A chromedriver child process owned by this run
pub struct ChromeDriver {
    child: Child,
    port: u16,
}

impl ChromeDriver {
    /// Spawn chromedriver and wait until its status endpoint answers
    pub async fn start(port: u16) -> Result<Self> {
        let binary = resolve_binary()?;
        debug!("spawning {} on port {}", binary.display(), port);

        let child = Command::new(&binary)
            .arg(format!("--port={}", port))
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("Failed to spawn chromedriver from {}", binary.display()))?;

        let driver = Self { child, port };
        driver.wait_until_ready().await?;
        println!(
            "{} chromedriver ready on port {}",
            "🚗".to_string().blue(),
            port
        );
        Ok(driver)
    }

    /// Base URL of the WebDriver server this process exposes
    pub fn url(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }

    async fn wait_until_ready(&self) -> Result<()> {
        let status_url = format!("{}/status", self.url());
        let start = Instant::now();

        while start.elapsed() < READY_TIMEOUT {
            if let Ok(response) = reqwest::get(&status_url).await {
                if response.status().is_success() {
                    return Ok(());
                }
            }
            tokio::time::sleep(READY_POLL).await;
        }

        anyhow::bail!(
            "chromedriver did not become ready on {} within {:?}",
            status_url,
            READY_TIMEOUT
        )
    }

    /// Stop the child process
    ///
    /// `kill_on_drop` already covers abnormal exits; this is the orderly path.
    pub async fn stop(mut self) -> Result<()> {
        debug!("stopping chromedriver on port {}", self.port);
        self.child.start_kill().ok();
        self.child.wait().await.ok();
        Ok(())
    }
}
