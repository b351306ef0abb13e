//! JSON artifact writer

use anyhow::{Context, Result};
use chrono::Local;
use std::path::{Path, PathBuf};

use super::build;
use crate::runner::executor::TestResult;

/// Write a run's report to `<output_dir>/qa_report_<YYYYMMDD_HHMMSS>.json`
///
/// One file per run; runs within the same second would collide, which is
/// acceptable for a tool invoked interactively or once per CI job.
pub fn write_report(results: &[TestResult], output_dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(output_dir).with_context(|| {
        format!(
            "Failed to create output directory {}",
            output_dir.display()
        )
    })?;

    let stamp = Local::now().format("%Y%m%d_%H%M%S");
    let path = output_dir.join(format!("qa_report_{}.json", stamp));

    let report = build(results);
    let json = serde_json::to_string_pretty(&report)?;
    std::fs::write(&path, json)
        .with_context(|| format!("Failed to write report to {}", path.display()))?;

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::Report;
    use serde_json::json;

    fn result(name: &str, passed: bool) -> TestResult {
        TestResult {
            name: name.to_string(),
            passed,
            error: if passed { None } else { Some("boom".to_string()) },
            duration: 0.42,
            details: json!({}),
        }
    }

    #[test]
    fn test_artifact_name_and_round_trip() {
        let dir = std::env::temp_dir().join(format!("farm-qa-report-{}", std::process::id()));
        let results = vec![result("navigation.page_loads", true), result("livestock.x", false)];

        let path = write_report(&results, &dir).unwrap();

        let file_name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(file_name.starts_with("qa_report_"));
        assert!(file_name.ends_with(".json"));

        let raw = std::fs::read_to_string(&path).unwrap();
        let parsed: Report = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed.summary.total, 2);
        assert_eq!(parsed.summary.passed, 1);
        assert_eq!(parsed.tests[0].name, "navigation.page_loads");

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_write_fails_when_output_dir_is_a_file() {
        let blocker = std::env::temp_dir().join(format!("farm-qa-blocker-{}", std::process::id()));
        std::fs::write(&blocker, b"not a directory").unwrap();

        let result = write_report(&[], &blocker);

        assert!(result.is_err());
        std::fs::remove_file(&blocker).unwrap();
    }
}
