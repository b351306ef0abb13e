//! Runs one test case and normalizes whatever happens into a result record

use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Instant;

use crate::browser::Browser;
use crate::suites::TestFn;

/// Normalized record of one test case invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestResult {
    pub name: String,
    pub passed: bool,
    pub error: Option<String>,
    /// Wall-clock seconds, rounded to hundredths
    pub duration: f64,
    pub details: Value,
}

/// Invoke one test case, catching anything it throws
///
/// This is the isolation boundary: a broken test case produces a failed
/// result, never an aborted run. Failed results always carry an error
/// message; passing ones never do.
pub async fn run_test(name: &str, test: TestFn, browser: &Browser) -> TestResult {
    let start = Instant::now();

    let (passed, error, details) = match test(browser).await {
        Ok(outcome) => {
            let error = if outcome.passed {
                None
            } else {
                outcome.error.or_else(|| Some("Test failed".to_string()))
            };
            (outcome.passed, error, outcome.details)
        }
        Err(e) => {
            debug!("test {} raised: {:#}", name, e);
            (false, Some(format!("{:#}", e)), json!({}))
        }
    };

    let duration = (start.elapsed().as_secs_f64() * 100.0).round() / 100.0;

    TestResult {
        name: name.to_string(),
        passed,
        error,
        duration,
        details,
    }
}
