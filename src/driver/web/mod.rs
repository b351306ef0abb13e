pub mod driver;

pub use driver::{ChromeConfig, ChromeSession};
