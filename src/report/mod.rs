//! Report aggregation and output
//!
//! A report is a pure function of the result sequence: same results in,
//! same report out, timestamp aside.

pub mod json;
pub mod types;

pub use json::write_report;
pub use types::{Report, Summary};

use chrono::Local;
use colored::Colorize;

use crate::runner::executor::TestResult;

/// Aggregate an ordered result sequence into a report
pub fn build(results: &[TestResult]) -> Report {
    let passed = results.iter().filter(|result| result.passed).count();
    let failed = results.len() - passed;

    let pass_rate = if results.is_empty() {
        "N/A".to_string()
    } else {
        format!("{:.1}%", passed as f64 / results.len() as f64 * 100.0)
    };

    Report {
        timestamp: Local::now().to_rfc3339(),
        summary: Summary {
            total: results.len(),
            passed,
            failed,
            pass_rate,
        },
        tests: results.to_vec(),
    }
}

/// Console summary: totals, then every failed test with its error
pub fn print_summary(results: &[TestResult]) {
    let passed = results.iter().filter(|result| result.passed).count();
    let failed = results.len() - passed;

    println!("\n{}", "=".repeat(50));
    println!("TEST SUMMARY");
    println!("{}", "=".repeat(50));
    println!("  Total:  {}", results.len());
    println!("  Passed: {} {}", passed, "✅".green());
    println!("  Failed: {} {}", failed, "❌".red());
    if !results.is_empty() {
        println!(
            "  Pass Rate: {:.1}%",
            passed as f64 / results.len() as f64 * 100.0
        );
    }

    if failed > 0 {
        println!("\n  Failed Tests:");
        for result in results.iter().filter(|result| !result.passed) {
            println!(
                "    - {}: {}",
                result.name.red(),
                result.error.as_deref().unwrap_or("Test failed")
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn result(name: &str, passed: bool) -> TestResult {
        TestResult {
            name: name.to_string(),
            passed,
            error: if passed { None } else { Some("boom".to_string()) },
            duration: 1.0,
            details: json!({}),
        }
    }

    #[test]
    fn test_summary_counts_always_reconcile() {
        let results = vec![
            result("a.one", true),
            result("a.two", false),
            result("b.three", true),
        ];

        let report = build(&results);

        assert_eq!(report.summary.total, 3);
        assert_eq!(
            report.summary.total,
            report.summary.passed + report.summary.failed
        );
        assert_eq!(report.summary.total, report.tests.len());
    }

    #[test]
    fn test_empty_run_reports_sentinel_pass_rate() {
        let report = build(&[]);

        assert_eq!(report.summary.total, 0);
        assert_eq!(report.summary.pass_rate, "N/A");
    }

    #[test]
    fn test_all_passing_is_one_hundred_point_zero() {
        let results = vec![result("a.one", true), result("a.two", true)];
        assert_eq!(build(&results).summary.pass_rate, "100.0%");
    }

    #[test]
    fn test_pass_rate_keeps_one_decimal() {
        let results = vec![
            result("a.one", true),
            result("a.two", true),
            result("a.three", false),
        ];
        assert_eq!(build(&results).summary.pass_rate, "66.7%");
    }

    #[test]
    fn test_result_order_is_preserved() {
        let results = vec![
            result("livestock.navigate_to_livestock", true),
            result("livestock.create_batch_goat", true),
            result("navigation.page_loads", false),
        ];

        let report = build(&results);
        let names: Vec<&str> = report.tests.iter().map(|t| t.name.as_str()).collect();

        assert_eq!(
            names,
            vec![
                "livestock.navigate_to_livestock",
                "livestock.create_batch_goat",
                "navigation.page_loads",
            ]
        );
    }

    #[test]
    fn test_rebuild_is_identical_except_timestamp() {
        let results = vec![result("a.one", true), result("a.two", false)];

        let first = build(&results);
        let second = build(&results);

        let mut first_json = serde_json::to_value(&first).unwrap();
        let mut second_json = serde_json::to_value(&second).unwrap();
        first_json["timestamp"] = json!(null);
        second_json["timestamp"] = json!(null);
        assert_eq!(first_json, second_json);
    }
}
