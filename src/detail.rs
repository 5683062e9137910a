//! Detail-page scraper
//!
//! Extraction is table-driven: one routine walks the detail selector table
//! and writes each field onto the record. Unlike listing parsing, a field
//! that cannot be found is fatal for the call, since a missing detail field
//! usually means the site layout changed.

use std::time::Duration;

use regex::Regex;
use scraper::Html;

use crate::browser::Browser;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::listing::clean_text;
use crate::log::{log_error, log_info};
use crate::selectors::{compile, DetailField, DetailSelectors, Extract};
use crate::torrent::TorrentRecord;

/// Scrapes a torrent's detail page onto an existing record.
pub struct DetailScraper<'a, B: Browser> {
    browser: &'a B,
    selectors: &'a DetailSelectors,
    timeout: Duration,
}

impl<'a, B: Browser> DetailScraper<'a, B> {
    pub fn new(browser: &'a B, selectors: &'a DetailSelectors, config: &'a Config) -> Self {
        Self {
            browser,
            selectors,
            timeout: config.wait_timeout,
        }
    }

    /// Navigate to the record's page and populate every detail field.
    ///
    /// The record is enriched in place; fields outside the selector table
    /// are never touched.
    pub fn scrape(&self, record: &mut TorrentRecord) -> Result<()> {
        let url = record
            .url
            .clone()
            .ok_or_else(|| Error::Parsing("record has no url to scrape".to_string()))?;

        self.browser
            .navigate(&url)
            .map_err(|e| Error::Connection(format!("cannot reach `{}`: {}", url, e)))?;

        let title_locator = self
            .selectors
            .locator(DetailField::Title)
            .ok_or_else(|| Error::Configuration("detail selector table has no title entry".to_string()))?;
        self.browser
            .wait_for(title_locator, self.timeout)
            .map_err(|e| Error::Parsing(format!("detail page `{}` did not load: {}", url, e)))?;

        let source = self
            .browser
            .page_source()
            .map_err(|e| Error::Parsing(e.to_string()))?;
        extract_fields(&source, self.selectors, record)?;
        log_info("detail", &format!("scraped `{}`", url));
        Ok(())
    }
}

/// Apply every selector-table entry to `markup`, writing onto `record`.
pub fn extract_fields(markup: &str, selectors: &DetailSelectors, record: &mut TorrentRecord) -> Result<()> {
    let document = Html::parse_document(markup);

    for entry in selectors.entries() {
        let selector = compile("detail", &entry.locator)?;
        let element = document
            .select(&selector)
            .next()
            .ok_or_else(|| Error::Parsing(format!("detail element not found: {}", entry.field.name())))?;

        let value = match entry.extract {
            Extract::Text => clean_text(&element.text().collect::<String>()),
            Extract::Href => element
                .value()
                .attr("href")
                .ok_or_else(|| Error::Parsing(format!("detail element has no href: {}", entry.field.name())))?
                .to_string(),
        };
        assign(record, entry.field, value)?;
    }
    Ok(())
}

fn assign(record: &mut TorrentRecord, field: DetailField, value: String) -> Result<()> {
    match field {
        DetailField::Title => record.title = Some(value),
        DetailField::Description => record.description = Some(value),
        DetailField::Discounts => record.discounts = Some(value),
        DetailField::FastlineCredit => record.fastline_credit_url = Some(value),
        DetailField::Uploader => record.uploader = Some(value),
        DetailField::UploaderProfile => record.uploader_profile = Some(value),
        DetailField::Age => record.age = Some(value),
        DetailField::Size => record.size = Some(value),
        DetailField::Ratio => record.ratio = Some(value),
        DetailField::Category => record.category = Some(value),
        DetailField::Subcategory => record.subcategory = Some(value),
        DetailField::Tags => record.tags = Some(value),
        DetailField::Languages => record.languages = Some(value),
        DetailField::Resolution => record.resolution = Some(value),
        DetailField::ThreeD => record.three_d = Some(parse_flag(&value)),
        DetailField::Hash => {
            if !looks_like_info_hash(&value) {
                log_error("detail", &format!("hash does not look like an info hash: `{}`", value));
            }
            record.hash = Some(value);
        }
        DetailField::Seeders => record.seeders = Some(parse_count(field, &value)?),
        DetailField::Leechers => record.leechers = Some(parse_count(field, &value)?),
        DetailField::Completed => record.completed = Some(parse_count(field, &value)?),
        DetailField::DownloadLink => record.download_link = Some(value),
    }
    Ok(())
}

fn parse_count(field: DetailField, value: &str) -> Result<u32> {
    value
        .trim()
        .replace(',', "")
        .parse()
        .map_err(|_| Error::Parsing(format!("{}: expected a count, got `{}`", field.name(), value)))
}

fn parse_flag(value: &str) -> bool {
    matches!(value.trim().to_lowercase().as_str(), "oui" | "yes" | "true" | "1")
}

fn looks_like_info_hash(value: &str) -> bool {
    Regex::new(r"^[a-fA-F0-9]{40}$")
        .map(|re| re.is_match(value.trim()))
        .unwrap_or(false)
}
