//! Test suites for the Farm TNF UI
//!
//! Order inside a suite is load-bearing: later tests may rely on state left
//! behind by earlier ones (create_batch_goat seeds the batch that
//! add_animals_to_batch opens). There is no per-test isolation.

use anyhow::Result;
use serde_json::{json, Value};
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

use crate::browser::Browser;

pub mod livestock;
pub mod navigation;

/// Outcome a test case hands back to the executor
#[derive(Debug, Clone)]
pub struct TestOutcome {
    pub passed: bool,
    pub error: Option<String>,
    /// Free-form diagnostic payload, serialized into the report as-is
    pub details: Value,
}

impl TestOutcome {
    /// Failure with an explanation and no details
    pub fn fail(error: impl Into<String>) -> Self {
        Self {
            passed: false,
            error: Some(error.into()),
            details: json!({}),
        }
    }
}

pub type TestFuture<'a> = Pin<Box<dyn Future<Output = Result<TestOutcome>> + Send + 'a>>;

/// A single test case; borrows the shared browser for its own invocation only
pub type TestFn = fn(&Browser) -> TestFuture<'_>;

/// An ordered, named group of test cases
#[derive(Debug)]
pub struct Suite {
    pub name: &'static str,
    pub tests: Vec<(&'static str, TestFn)>,
}

#[derive(Debug, Error)]
pub enum SuiteError {
    #[error("unknown suite '{name}'. Available suites: {available}")]
    Unknown { name: String, available: String },
}

/// All suites, in the order `--suite all` runs them
pub fn registry() -> Vec<Suite> {
    vec![
        Suite {
            name: "livestock",
            tests: livestock::tests(),
        },
        Suite {
            name: "navigation",
            tests: navigation::tests(),
        },
    ]
}

/// Resolve a `--suite` selection against the registry
pub fn select(selection: &str) -> Result<Vec<Suite>, SuiteError> {
    let all = registry();
    if selection == "all" {
        return Ok(all);
    }

    let available = all
        .iter()
        .map(|suite| suite.name)
        .collect::<Vec<_>>()
        .join(", ");

    let found: Vec<Suite> = all
        .into_iter()
        .filter(|suite| suite.name == selection)
        .collect();

    if found.is_empty() {
        return Err(SuiteError::Unknown {
            name: selection.to_string(),
            available,
        });
    }
    Ok(found)
}
