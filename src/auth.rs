//! Login and logout against the site

use std::time::Duration;

use crate::browser::{Browser, BrowserError};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::log::{log_error, log_info};
use crate::selectors::LoginSelectors;

/// Drives login/logout for one browser session.
///
/// Each call is a fresh attempt; there is no retry loop here, callers
/// decide whether to retry.
pub struct Authenticator<'a, B: Browser> {
    browser: &'a B,
    selectors: &'a LoginSelectors,
    login_url: &'a str,
    logout_url: &'a str,
    timeout: Duration,
}

impl<'a, B: Browser> Authenticator<'a, B> {
    pub fn new(browser: &'a B, selectors: &'a LoginSelectors, config: &'a Config) -> Self {
        Self {
            browser,
            selectors,
            login_url: &config.login_url,
            logout_url: &config.logout_url,
            timeout: config.wait_timeout,
        }
    }

    /// Log in with the given credentials.
    ///
    /// Returns `Ok(false)` (after logging the cause) when the site does not
    /// reach the logged-in state within the wait timeout. Surfaces an
    /// [`Error::Authentication`] when the site shows a login-error message,
    /// which means the credentials were rejected rather than the page being
    /// slow.
    pub fn connect(&self, username: &str, password: &str) -> Result<bool> {
        self.browser
            .navigate(self.login_url)
            .map_err(|e| Error::Connection(format!("cannot reach login page `{}`: {}", self.login_url, e)))?;
        log_info("auth", "login page opened");

        match self.submit_credentials(username, password) {
            Ok(()) => {}
            Err(BrowserError::Timeout(what)) | Err(BrowserError::NotFound(what)) => {
                if self.browser.is_visible(&self.selectors.login_error).unwrap_or(false) {
                    return Err(Error::Authentication(format!(
                        "login rejected at `{}`",
                        self.login_url
                    )));
                }
                log_error("auth", &format!("login did not complete: {}", what));
                return Ok(false);
            }
            Err(e) => return Err(Error::Connection(e.to_string())),
        }

        // Cookie banner may or may not be shown; absence is fine.
        if self.browser.click(&self.selectors.cookie_button).is_ok() {
            log_info("auth", "cookie banner dismissed");
        }

        log_info("auth", "logged in");
        Ok(true)
    }

    fn submit_credentials(&self, username: &str, password: &str) -> std::result::Result<(), BrowserError> {
        self.browser.wait_for(&self.selectors.username_input, self.timeout)?;
        self.browser.set_value(&self.selectors.username_input, username)?;
        self.browser.wait_for(&self.selectors.password_input, self.timeout)?;
        self.browser.set_value(&self.selectors.password_input, password)?;
        self.browser.wait_for(&self.selectors.login_button, self.timeout)?;
        self.browser.click(&self.selectors.login_button)?;
        self.browser.wait_for(&self.selectors.post_login_marker, self.timeout)
    }

    /// Log out by navigating to the logout endpoint.
    ///
    /// Returns `Ok(false)` when the browser is not redirected back to the
    /// login page within the wait timeout.
    pub fn disconnect(&self) -> Result<bool> {
        self.browser
            .navigate(self.logout_url)
            .map_err(|e| Error::Connection(format!("cannot reach logout page `{}`: {}", self.logout_url, e)))?;

        match self.browser.wait_for_url_contains(self.login_url, self.timeout) {
            Ok(()) => {
                log_info("auth", "logged out");
                Ok(true)
            }
            Err(BrowserError::Timeout(_)) => {
                log_error("auth", "logout did not land on the login page");
                Ok(false)
            }
            Err(e) => Err(Error::Connection(e.to_string())),
        }
    }
}
