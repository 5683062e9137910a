//! Browser automation boundary
//!
//! The pipeline only talks to [`Browser`]; any driver that can navigate,
//! wait on a selector with a bound, poke element values, and hand back
//! markup satisfies it. [`HeadlessBrowser`] is the production
//! implementation on top of headless Chrome.

use std::ffi::OsStr;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use headless_chrome::{Browser as ChromeBrowser, LaunchOptions, Tab};
use thiserror::Error;

const URL_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Failure at the automation boundary.
#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("timed out waiting for `{0}`")]
    Timeout(String),
    #[error("element not found: `{0}`")]
    NotFound(String),
    #[error("driver error: {0}")]
    Driver(String),
}

pub type BrowserResult<T> = Result<T, BrowserError>;

/// Everything the automator needs from an automation driver.
///
/// Calls are selector-addressed and blocking; each one suspends the caller
/// until it completes or its bound elapses.
pub trait Browser {
    /// Navigate and block until the page has loaded.
    fn navigate(&self, url: &str) -> BrowserResult<()>;

    /// Bounded wait for an element matching `selector` to appear.
    fn wait_for(&self, selector: &str, timeout: Duration) -> BrowserResult<()>;

    /// Whether the element is currently rendered (present and displayed).
    fn is_visible(&self, selector: &str) -> BrowserResult<bool>;

    /// Type `value` into the element.
    fn set_value(&self, selector: &str, value: &str) -> BrowserResult<()>;

    fn click(&self, selector: &str) -> BrowserResult<()>;

    /// Select the option with `value` in a `<select>` control.
    /// Returns `Ok(false)` when the control has no such option.
    fn select_value(&self, selector: &str, value: &str) -> BrowserResult<bool>;

    /// Inner markup of the first element matching `selector`, verbatim.
    fn inner_html(&self, selector: &str) -> BrowserResult<String>;

    /// Full markup of the current page.
    fn page_source(&self) -> BrowserResult<String>;

    fn current_url(&self) -> String;

    /// Bounded poll until the current URL contains `fragment`.
    fn wait_for_url_contains(&self, fragment: &str, timeout: Duration) -> BrowserResult<()>;
}

/// Headless Chrome session driving one tab.
pub struct HeadlessBrowser {
    // Keeps the Chrome process alive for as long as the session exists.
    _browser: ChromeBrowser,
    tab: Arc<Tab>,
}

impl HeadlessBrowser {
    /// Launch Chrome and open the tab all commands go through.
    pub fn launch(headless: bool, page_load_timeout: Duration) -> BrowserResult<Self> {
        let options = LaunchOptions::default_builder()
            .headless(headless)
            .window_size(Some((1920, 1080)))
            .args(vec![
                OsStr::new("--disable-blink-features=AutomationControlled"),
                OsStr::new("--no-sandbox"),
                OsStr::new("--disable-dev-shm-usage"),
            ])
            .build()
            .map_err(|e| BrowserError::Driver(e.to_string()))?;

        let browser = ChromeBrowser::new(options).map_err(driver)?;
        let tab = browser.new_tab().map_err(driver)?;
        tab.set_default_timeout(page_load_timeout);

        Ok(Self { _browser: browser, tab })
    }

    /// Evaluate a JS expression and return its primitive result.
    fn evaluate(&self, expression: &str) -> BrowserResult<serde_json::Value> {
        let object = self.tab.evaluate(expression, false).map_err(driver)?;
        Ok(object.value.unwrap_or(serde_json::Value::Null))
    }
}

impl Browser for HeadlessBrowser {
    fn navigate(&self, url: &str) -> BrowserResult<()> {
        self.tab.navigate_to(url).map_err(driver)?;
        self.tab.wait_until_navigated().map_err(driver)?;
        Ok(())
    }

    fn wait_for(&self, selector: &str, timeout: Duration) -> BrowserResult<()> {
        self.tab
            .wait_for_element_with_custom_timeout(selector, timeout)
            .map(|_| ())
            .map_err(|_| BrowserError::Timeout(selector.to_string()))
    }

    fn is_visible(&self, selector: &str) -> BrowserResult<bool> {
        let script = format!(
            "(() => {{ const el = document.querySelector({}); return !!el && el.offsetParent !== null; }})()",
            js_string(selector)
        );
        Ok(self.evaluate(&script)?.as_bool().unwrap_or(false))
    }

    fn set_value(&self, selector: &str, value: &str) -> BrowserResult<()> {
        let element = self
            .tab
            .find_element(selector)
            .map_err(|_| BrowserError::NotFound(selector.to_string()))?;
        element.type_into(value).map_err(driver)?;
        Ok(())
    }

    fn click(&self, selector: &str) -> BrowserResult<()> {
        let element = self
            .tab
            .find_element(selector)
            .map_err(|_| BrowserError::NotFound(selector.to_string()))?;
        element.click().map_err(driver)?;
        Ok(())
    }

    fn select_value(&self, selector: &str, value: &str) -> BrowserResult<bool> {
        let script = format!(
            "(() => {{ \
               const el = document.querySelector({sel}); \
               if (!el) return 'missing'; \
               const opt = Array.from(el.options || []).find(o => o.value === {val}); \
               if (!opt) return 'no-option'; \
               el.value = {val}; \
               el.dispatchEvent(new Event('change', {{ bubbles: true }})); \
               return 'ok'; \
             }})()",
            sel = js_string(selector),
            val = js_string(value),
        );
        match self.evaluate(&script)?.as_str() {
            Some("ok") => Ok(true),
            Some("no-option") => Ok(false),
            _ => Err(BrowserError::NotFound(selector.to_string())),
        }
    }

    fn inner_html(&self, selector: &str) -> BrowserResult<String> {
        let script = format!(
            "(() => {{ const el = document.querySelector({}); return el ? el.innerHTML : null; }})()",
            js_string(selector)
        );
        match self.evaluate(&script)? {
            serde_json::Value::String(html) => Ok(html),
            _ => Err(BrowserError::NotFound(selector.to_string())),
        }
    }

    fn page_source(&self) -> BrowserResult<String> {
        self.tab.get_content().map_err(driver)
    }

    fn current_url(&self) -> String {
        self.tab.get_url()
    }

    fn wait_for_url_contains(&self, fragment: &str, timeout: Duration) -> BrowserResult<()> {
        let deadline = Instant::now() + timeout;
        loop {
            if self.tab.get_url().contains(fragment) {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(BrowserError::Timeout(format!("url containing `{}`", fragment)));
            }
            thread::sleep(URL_POLL_INTERVAL);
        }
    }
}

fn driver(e: anyhow::Error) -> BrowserError {
    BrowserError::Driver(e.to_string())
}

/// JSON-escape a string for embedding in an evaluated JS expression
fn js_string(s: &str) -> String {
    serde_json::to_string(s).unwrap_or_else(|_| "\"\"".to_string())
}
