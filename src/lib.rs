pub mod browser;
pub mod driver;
pub mod fixtures;
pub mod report;
pub mod runner;
pub mod suites;

// Re-export common items
pub use browser::Browser;
pub use report::write_report;
pub use runner::{run, RunOptions};
