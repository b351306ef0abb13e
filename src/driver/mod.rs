pub mod chromedriver;
pub mod traits;
pub mod web;

#[cfg(test)]
pub mod mock;

pub use traits::{Locator, PageElement, Session};
pub use web::{ChromeConfig, ChromeSession};
