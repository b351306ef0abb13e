use serde::{Deserialize, Serialize};

use crate::runner::executor::TestResult;

/// Aggregate counts for one run
///
/// `pass_rate` is a preformatted percentage string, or "N/A" when no tests
/// ran, so the artifact is directly presentable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Summary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub pass_rate: String,
}

/// The serialized report artifact, one per run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub timestamp: String,
    pub summary: Summary,
    pub tests: Vec<TestResult>,
}
