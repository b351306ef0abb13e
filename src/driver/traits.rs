use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::fmt;

/// Element locator for the current page
///
/// A locator is a strategy plus an expression. The two strategies the app's
/// test suites need are CSS selectors and XPath; anything else stays out of
/// the enum so an unsupported strategy cannot exist at runtime.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Locator {
    /// Select by CSS selector
    Css(String),
    /// Select by XPath expression
    XPath(String),
}

impl Locator {
    pub fn css(expr: impl Into<String>) -> Self {
        Locator::Css(expr.into())
    }

    pub fn xpath(expr: impl Into<String>) -> Self {
        Locator::XPath(expr.into())
    }

    /// The raw selector expression, regardless of strategy
    pub fn expression(&self) -> &str {
        match self {
            Locator::Css(expr) => expr,
            Locator::XPath(expr) => expr,
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::Css(expr) => write!(f, "css `{}`", expr),
            Locator::XPath(expr) => write!(f, "xpath `{}`", expr),
        }
    }
}

/// A handle to one element found in the page
///
/// Handles stay valid only as long as the page they were found in; a
/// navigation or re-render can stale them, which surfaces as an `Err` from
/// the individual operations.
#[async_trait]
pub trait PageElement: Send + Sync {
    /// Click the element through the driver's native click
    async fn click(&self) -> Result<()>;

    /// Clear the element's current value (inputs and textareas)
    async fn clear(&self) -> Result<()>;

    /// Send keystrokes to the element
    async fn send_keys(&self, text: &str) -> Result<()>;

    /// The element's rendered text content
    async fn text(&self) -> Result<String>;
}

/// One live browser session
///
/// This is the seam between the action layer and the actual browser: the
/// production implementation speaks WebDriver to Chrome, tests substitute an
/// in-memory double. All methods return `Err` only for session-level faults
/// (lost connection, rejected command); "nothing matched" is an empty result.
#[async_trait]
pub trait Session: Send + Sync {
    /// Navigate to a URL and wait for the document to be ready
    async fn goto(&self, url: &str) -> Result<()>;

    /// Reload the current page
    async fn refresh(&self) -> Result<()>;

    /// The URL the session is currently on
    async fn current_url(&self) -> Result<String>;

    /// Full HTML source of the current page
    async fn page_source(&self) -> Result<String>;

    /// All elements matching the locator, in document order
    ///
    /// # Returns
    /// An empty vector when nothing matches; `Err` only if the underlying
    /// find command itself fails (e.g. an invalid selector expression).
    async fn find_all(&self, locator: &Locator) -> Result<Vec<Box<dyn PageElement>>>;

    /// Execute JavaScript in the page and return its JSON result
    ///
    /// # Arguments
    /// * `script` - function body; positional arguments are `arguments[n]`
    /// * `args` - JSON values bound to `arguments`
    async fn execute(&self, script: &str, args: Vec<Value>) -> Result<Value>;

    /// Capture the current viewport as PNG bytes
    async fn screenshot(&self) -> Result<Vec<u8>>;

    /// End the session; further calls are invalid
    async fn close(&mut self) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locator_expression() {
        assert_eq!(Locator::css("div.card").expression(), "div.card");
        assert_eq!(
            Locator::xpath("//a[text()='x']").expression(),
            "//a[text()='x']"
        );
    }

    #[test]
    fn test_locator_display_names_strategy() {
        assert_eq!(Locator::css("#root").to_string(), "css `#root`");
        assert_eq!(Locator::xpath("//body").to_string(), "xpath `//body`");
    }
}
