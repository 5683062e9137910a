//! Search form driving and result retrieval

use std::collections::BTreeSet;
use std::time::Duration;

use crate::browser::{Browser, BrowserError};
use crate::config::Config;
use crate::criteria::SearchCriteria;
use crate::error::{Error, Result};
use crate::listing::parse_listing;
use crate::log::log_info;
use crate::selectors::{ListingSelectors, SearchFormSelectors};
use crate::torrent::TorrentRecord;

/// Fills the search form from criteria and retrieves one page of results.
pub struct SearchPipeline<'a, B: Browser> {
    browser: &'a B,
    form: &'a SearchFormSelectors,
    listing: &'a ListingSelectors,
    search_url: &'a str,
    timeout: Duration,
    ignore_parsing_errors: bool,
}

impl<'a, B: Browser> SearchPipeline<'a, B> {
    pub fn new(
        browser: &'a B,
        form: &'a SearchFormSelectors,
        listing: &'a ListingSelectors,
        config: &'a Config,
        ignore_parsing_errors: bool,
    ) -> Self {
        Self {
            browser,
            form,
            listing,
            search_url: &config.torrents_url,
            timeout: config.wait_timeout,
            ignore_parsing_errors,
        }
    }

    /// Navigate to the search page and fill the form from `criteria`.
    ///
    /// Only criteria that are present touch the form: text fields are typed
    /// into, and every selected filter label is toggled. No assumption is
    /// made about the controls' initial state.
    pub fn fill_search_form(&self, criteria: &SearchCriteria) -> Result<()> {
        self.browser
            .navigate(self.search_url)
            .map_err(|e| Error::Search(format!("cannot reach search page `{}`: {}", self.search_url, e)))?;
        self.browser
            .wait_for(&self.form.form, self.timeout)
            .map_err(|e| Error::Search(format!("search form not available: {}", e)))?;
        if !self
            .browser
            .is_visible(&self.form.form)
            .map_err(|e| Error::Search(e.to_string()))?
        {
            return Err(Error::Search("search form not available: form is hidden".to_string()));
        }

        self.set_text("query", &self.form.query, criteria.query.as_deref())?;
        self.set_text("description", &self.form.description, criteria.description.as_deref())?;
        self.set_text("uploader", &self.form.uploader, criteria.uploader.as_deref())?;
        self.set_text("tags", &self.form.tags, criteria.tags.as_deref())?;

        self.toggle_all(&criteria.categories)?;
        self.toggle_all(&criteria.subcategories)?;
        self.toggle_all(&criteria.languages)?;
        self.toggle_all(&criteria.types)?;
        Ok(())
    }

    fn set_text(&self, field: &str, locator: &str, value: Option<&str>) -> Result<()> {
        let Some(value) = value else { return Ok(()) };
        self.browser.set_value(locator, value).map_err(|e| match e {
            BrowserError::NotFound(_) => Error::Search(format!("search input not found: {}", field)),
            other => Error::Search(other.to_string()),
        })
    }

    fn toggle_all(&self, labels: &BTreeSet<String>) -> Result<()> {
        for label in labels {
            let locator = self.form.checkbox(label);
            self.browser.click(&locator).map_err(|e| match e {
                BrowserError::NotFound(_) => Error::Search(format!("filter control not found: {}", label)),
                other => Error::Search(other.to_string()),
            })?;
        }
        Ok(())
    }

    /// Apply sort key, direction, and page-size filters if set.
    ///
    /// The criteria's typed enums already constrain the values, but a page
    /// whose control lacks the requested option still surfaces an error
    /// rather than being silently ignored.
    pub fn apply_filters(&self, criteria: &SearchCriteria) -> Result<()> {
        if let Some(sorting) = criteria.sorting {
            self.select("sorting", &self.form.sorting, sorting.as_value())?;
        }
        if let Some(direction) = criteria.direction {
            self.select("direction", &self.form.direction, direction.as_value())?;
        }
        if let Some(quantity) = criteria.quantity {
            self.select("quantity", &self.form.quantity, quantity.as_value())?;
        }
        Ok(())
    }

    fn select(&self, field: &str, locator: &str, value: &str) -> Result<()> {
        match self.browser.select_value(locator, value) {
            Ok(true) => Ok(()),
            Ok(false) => Err(Error::Search(format!("{} control has no option `{}`", field, value))),
            Err(BrowserError::NotFound(_)) => Err(Error::Search(format!("{} control not found", field))),
            Err(e) => Err(Error::Search(e.to_string())),
        }
    }

    /// Inner markup of the results container, verbatim.
    pub fn raw_results(&self) -> Result<String> {
        self.browser
            .wait_for(&self.form.results_container, self.timeout)
            .map_err(|e| Error::Search(format!("results did not load: {}", e)))?;
        self.browser
            .inner_html(&self.form.results_container)
            .map_err(|e| Error::Search(e.to_string()))
    }

    /// Fill the form, apply filters, and return one page of parsed records.
    pub fn search(&self, criteria: &SearchCriteria) -> Result<Vec<TorrentRecord>> {
        self.fill_search_form(criteria)?;
        self.apply_filters(criteria)?;

        // Results load dynamically; no form submit is needed.
        let markup = self.raw_results()?;
        let records = parse_listing(&markup, self.listing, self.ignore_parsing_errors)?;
        log_info("search", &format!("{} results", records.len()));
        Ok(records)
    }
}
