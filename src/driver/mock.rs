//! In-memory session double for exercising the action layer without Chrome

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::driver::traits::{Locator, PageElement, Session};

#[derive(Default)]
struct MockState {
    visited: Vec<String>,
    refreshes: usize,
    current_url: String,
    source: String,
    closed: bool,
    elements: HashMap<String, Vec<Arc<MockElement>>>,
    /// Number of find_all calls a locator stays empty before its elements show up
    appear_after: HashMap<String, usize>,
    find_calls: HashMap<String, usize>,
    scripts: Vec<String>,
    script_args: Vec<Vec<Value>>,
    /// (substring of script, canned response)
    script_responses: Vec<(String, Value)>,
    /// Substrings of scripts that should error instead of answering
    script_failures: Vec<String>,
    fail_screenshot: bool,
}

/// Scriptable stand-in for a Chrome session
#[derive(Clone, Default)]
pub struct MockSession {
    state: Arc<Mutex<MockState>>,
}

impl MockSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_element(&self, locator: &Locator, element: Arc<MockElement>) {
        let mut state = self.state.lock().unwrap();
        state
            .elements
            .entry(locator.to_string())
            .or_default()
            .push(element);
    }

    /// Keep `locator` empty for the first `calls` lookups
    pub fn appear_after(&self, locator: &Locator, calls: usize) {
        self.state
            .lock()
            .unwrap()
            .appear_after
            .insert(locator.to_string(), calls);
    }

    /// Answer any executed script containing `needle` with `response`
    pub fn set_script_response(&self, needle: &str, response: Value) {
        self.state
            .lock()
            .unwrap()
            .script_responses
            .push((needle.to_string(), response));
    }

    /// Make any executed script containing `needle` fail
    pub fn fail_script(&self, needle: &str) {
        self.state
            .lock()
            .unwrap()
            .script_failures
            .push(needle.to_string());
    }

    /// Make screenshot captures fail
    pub fn fail_screenshot(&self) {
        self.state.lock().unwrap().fail_screenshot = true;
    }

    pub fn set_current_url(&self, url: &str) {
        self.state.lock().unwrap().current_url = url.to_string();
    }

    pub fn set_source(&self, html: &str) {
        self.state.lock().unwrap().source = html.to_string();
    }

    pub fn visited(&self) -> Vec<String> {
        self.state.lock().unwrap().visited.clone()
    }

    pub fn refreshes(&self) -> usize {
        self.state.lock().unwrap().refreshes
    }

    pub fn scripts(&self) -> Vec<String> {
        self.state.lock().unwrap().scripts.clone()
    }

    pub fn script_args(&self) -> Vec<Vec<Value>> {
        self.state.lock().unwrap().script_args.clone()
    }

    pub fn find_calls(&self, locator: &Locator) -> usize {
        self.state
            .lock()
            .unwrap()
            .find_calls
            .get(&locator.to_string())
            .copied()
            .unwrap_or(0)
    }

    pub fn closed(&self) -> bool {
        self.state.lock().unwrap().closed
    }
}

#[async_trait]
impl Session for MockSession {
    async fn goto(&self, url: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.visited.push(url.to_string());
        state.current_url = url.to_string();
        Ok(())
    }

    async fn refresh(&self) -> Result<()> {
        self.state.lock().unwrap().refreshes += 1;
        Ok(())
    }

    async fn current_url(&self) -> Result<String> {
        Ok(self.state.lock().unwrap().current_url.clone())
    }

    async fn page_source(&self) -> Result<String> {
        Ok(self.state.lock().unwrap().source.clone())
    }

    async fn find_all(&self, locator: &Locator) -> Result<Vec<Box<dyn PageElement>>> {
        let key = locator.to_string();
        let mut state = self.state.lock().unwrap();
        let calls = state.find_calls.entry(key.clone()).or_insert(0);
        *calls += 1;
        let seen = *calls;

        if seen <= state.appear_after.get(&key).copied().unwrap_or(0) {
            return Ok(Vec::new());
        }

        Ok(state
            .elements
            .get(&key)
            .map(|elements| {
                elements
                    .iter()
                    .map(|e| Box::new(MockHandle(e.clone())) as Box<dyn PageElement>)
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn execute(&self, script: &str, args: Vec<Value>) -> Result<Value> {
        let mut state = self.state.lock().unwrap();
        state.scripts.push(script.to_string());
        state.script_args.push(args);

        if let Some(needle) = state
            .script_failures
            .iter()
            .find(|needle| script.contains(needle.as_str()))
        {
            anyhow::bail!("script matching '{}' rejected", needle);
        }

        let response = state
            .script_responses
            .iter()
            .find(|(needle, _)| script.contains(needle))
            .map(|(_, value)| value.clone())
            .unwrap_or(Value::Null);
        Ok(response)
    }

    async fn screenshot(&self) -> Result<Vec<u8>> {
        if self.state.lock().unwrap().fail_screenshot {
            anyhow::bail!("screenshot capture rejected");
        }
        Ok(vec![0x89, b'P', b'N', b'G'])
    }

    async fn close(&mut self) -> Result<()> {
        self.state.lock().unwrap().closed = true;
        Ok(())
    }
}

/// Scriptable element backing a [`MockSession`] locator
#[derive(Default)]
pub struct MockElement {
    text: String,
    fail_click: bool,
    clicks: AtomicUsize,
    clears: AtomicUsize,
    typed: Mutex<Vec<String>>,
}

impl MockElement {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_text(text: &str) -> Arc<Self> {
        Arc::new(Self {
            text: text.to_string(),
            ..Self::default()
        })
    }

    /// Native clicks on this element error, as an overlapped element's would
    pub fn failing_click() -> Arc<Self> {
        Arc::new(Self {
            fail_click: true,
            ..Self::default()
        })
    }

    pub fn clicks(&self) -> usize {
        self.clicks.load(Ordering::SeqCst)
    }

    pub fn clears(&self) -> usize {
        self.clears.load(Ordering::SeqCst)
    }

    pub fn typed(&self) -> Vec<String> {
        self.typed.lock().unwrap().clone()
    }
}

struct MockHandle(Arc<MockElement>);

#[async_trait]
impl PageElement for MockHandle {
    async fn click(&self) -> Result<()> {
        if self.0.fail_click {
            anyhow::bail!("element click intercepted");
        }
        self.0.clicks.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        self.0.clears.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn send_keys(&self, text: &str) -> Result<()> {
        self.0.typed.lock().unwrap().push(text.to_string());
        Ok(())
    }

    async fn text(&self) -> Result<String> {
        Ok(self.0.text.clone())
    }
}
