//! Sidebar navigation and page-load checks

use serde_json::json;
use std::time::Duration;

use super::{TestFn, TestFuture, TestOutcome};
use crate::browser::Browser;
use crate::driver::traits::Locator;

pub fn tests() -> Vec<(&'static str, TestFn)> {
    vec![
        ("page_loads", page_loads),
        ("sidebar_links", sidebar_links),
        ("dashboard_navigation", dashboard_navigation),
        ("expenses_navigation", expenses_navigation),
    ]
}

/// The app shell mounts with body content and a React root
fn page_loads(browser: &Browser) -> TestFuture<'_> {
    Box::pin(async move {
        let has_content = browser.element_exists(&Locator::css("body")).await?;

        let has_nav = browser.element_exists(&Locator::css("nav")).await?
            || browser.element_exists(&Locator::css("aside")).await?
            || browser
                .element_exists(&Locator::css("[class*='sidebar']"))
                .await?;

        let has_app = browser.element_exists(&Locator::css("#root")).await?
            || browser
                .element_exists(&Locator::css("[data-reactroot]"))
                .await?;

        Ok(TestOutcome {
            passed: has_content && has_app,
            error: None,
            details: json!({
                "has_content": has_content,
                "has_navigation": has_nav,
                "has_react_app": has_app,
            }),
        })
    })
}

/// At least two of the expected sidebar entries are present
fn sidebar_links(browser: &Browser) -> TestFuture<'_> {
    Box::pin(async move {
        let expected = ["Dashboard", "Livestock", "Expenses", "Employees"];
        let mut found = Vec::new();

        for link in expected {
            let locator = Locator::xpath(format!(
                "//a[contains(text(),'{}')] | //button[contains(text(),'{}')]",
                link, link
            ));
            if browser.element_exists(&locator).await? {
                found.push(link);
            }
        }

        Ok(TestOutcome {
            passed: found.len() >= 2,
            error: None,
            details: json!({
                "expected": expected,
                "found": found,
            }),
        })
    })
}

fn dashboard_navigation(browser: &Browser) -> TestFuture<'_> {
    Box::pin(async move {
        let clicked = browser
            .click(&Locator::xpath("//a[contains(text(),'Dashboard')]"))
            .await?;
        tokio::time::sleep(Duration::from_secs(1)).await;

        let has_dashboard = browser
            .element_exists(&Locator::css("[class*='dashboard']"))
            .await?;

        Ok(TestOutcome {
            passed: clicked || has_dashboard,
            error: None,
            details: json!({ "clicked": clicked, "page_found": has_dashboard }),
        })
    })
}

fn expenses_navigation(browser: &Browser) -> TestFuture<'_> {
    Box::pin(async move {
        let clicked = browser
            .click(&Locator::xpath("//a[contains(text(),'Expenses')]"))
            .await?;
        tokio::time::sleep(Duration::from_secs(1)).await;

        let page = browser.page_source().await?.to_lowercase();
        let has_expenses = page.contains("expense");

        Ok(TestOutcome {
            passed: clicked || has_expenses,
            error: None,
            details: json!({ "clicked": clicked, "page_found": has_expenses }),
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::BrowserConfig;
    use crate::driver::mock::{MockElement, MockSession};

    fn fast_browser(session: &MockSession) -> Browser {
        Browser::with_config(
            Box::new(session.clone()),
            BrowserConfig {
                wait_timeout: Duration::from_millis(20),
                implicit_wait: Duration::from_millis(20),
                poll_interval: Duration::from_millis(5),
                pre_click_delay: Duration::ZERO,
                post_click_delay: Duration::ZERO,
                settle_delay: Duration::ZERO,
            },
        )
    }

    #[tokio::test]
    async fn test_page_loads_passes_with_mounted_app() {
        let session = MockSession::new();
        session.add_element(&Locator::css("body"), MockElement::new());
        session.add_element(&Locator::css("nav"), MockElement::new());
        session.add_element(&Locator::css("#root"), MockElement::new());
        let browser = fast_browser(&session);

        let outcome = page_loads(&browser).await.unwrap();

        assert!(outcome.passed);
        assert_eq!(outcome.details["has_navigation"], json!(true));
        assert_eq!(outcome.details["has_react_app"], json!(true));
    }

    #[tokio::test]
    async fn test_page_loads_fails_without_react_root() {
        let session = MockSession::new();
        session.add_element(&Locator::css("body"), MockElement::new());
        let browser = fast_browser(&session);

        let outcome = page_loads(&browser).await.unwrap();

        assert!(!outcome.passed);
        assert_eq!(outcome.details["has_content"], json!(true));
        assert_eq!(outcome.details["has_react_app"], json!(false));
    }

    #[tokio::test]
    async fn test_sidebar_links_needs_at_least_two() {
        let session = MockSession::new();
        for link in ["Dashboard", "Livestock"] {
            let locator = Locator::xpath(format!(
                "//a[contains(text(),'{}')] | //button[contains(text(),'{}')]",
                link, link
            ));
            session.add_element(&locator, MockElement::new());
        }
        let browser = fast_browser(&session);

        let outcome = sidebar_links(&browser).await.unwrap();

        assert!(outcome.passed);
        assert_eq!(outcome.details["found"], json!(["Dashboard", "Livestock"]));
    }

    #[tokio::test]
    async fn test_sidebar_links_fails_with_one_link() {
        let session = MockSession::new();
        let locator = Locator::xpath(
            "//a[contains(text(),'Dashboard')] | //button[contains(text(),'Dashboard')]",
        );
        session.add_element(&locator, MockElement::new());
        let browser = fast_browser(&session);

        let outcome = sidebar_links(&browser).await.unwrap();

        assert!(!outcome.passed);
    }
}
