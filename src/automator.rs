//! Top-level facade owning the browser session

use crate::auth::Authenticator;
use crate::browser::HeadlessBrowser;
use crate::config::Config;
use crate::criteria::SearchCriteria;
use crate::detail::DetailScraper;
use crate::error::{Error, Result};
use crate::search::SearchPipeline;
use crate::selectors::{DetailSelectors, ListingSelectors, LoginSelectors, SearchFormSelectors};
use crate::torrent::{create_client, TorrentRecord};

/// Automates interactions with ShareWood.tv.
///
/// Owns the one browser session; all operations are blocking and run one
/// at a time.
pub struct Automator {
    browser: HeadlessBrowser,
    config: Config,
    client: reqwest::blocking::Client,
    login_selectors: LoginSelectors,
    form_selectors: SearchFormSelectors,
    listing_selectors: ListingSelectors,
    detail_selectors: DetailSelectors,
    ignore_parsing_errors: bool,
}

impl Automator {
    /// Launch a browser session using the default selector tables.
    pub fn new(config: Config) -> Result<Self> {
        Self::with_selectors(
            config,
            LoginSelectors::default(),
            SearchFormSelectors::default(),
            ListingSelectors::default(),
            DetailSelectors::default(),
        )
    }

    /// Launch a browser session with custom selector tables, for site
    /// layouts that have drifted from the defaults.
    pub fn with_selectors(
        config: Config,
        login_selectors: LoginSelectors,
        form_selectors: SearchFormSelectors,
        listing_selectors: ListingSelectors,
        detail_selectors: DetailSelectors,
    ) -> Result<Self> {
        login_selectors.validate()?;
        form_selectors.validate()?;
        listing_selectors.validate()?;
        detail_selectors.validate()?;

        let browser = HeadlessBrowser::launch(config.headless, config.browser_timeout)
            .map_err(|e| Error::Connection(format!("cannot launch browser: {}", e)))?;
        let client = create_client()?;

        Ok(Self {
            browser,
            config,
            client,
            login_selectors,
            form_selectors,
            listing_selectors,
            detail_selectors,
            ignore_parsing_errors: false,
        })
    }

    /// Tolerate listing rows whose url cannot be extracted.
    pub fn ignore_parsing_errors(&mut self, ignore: bool) {
        self.ignore_parsing_errors = ignore;
    }

    /// Log in with the configured credentials.
    pub fn connect(&self) -> Result<bool> {
        Authenticator::new(&self.browser, &self.login_selectors, &self.config)
            .connect(&self.config.username, &self.config.password)
    }

    /// Log out of the current session.
    pub fn disconnect(&self) -> Result<bool> {
        Authenticator::new(&self.browser, &self.login_selectors, &self.config).disconnect()
    }

    /// Run one search and return one page of parsed records.
    pub fn search(&self, criteria: &SearchCriteria) -> Result<Vec<TorrentRecord>> {
        SearchPipeline::new(
            &self.browser,
            &self.form_selectors,
            &self.listing_selectors,
            &self.config,
            self.ignore_parsing_errors,
        )
        .search(criteria)
    }

    /// Enrich a record in place from its detail page.
    pub fn scrape(&self, record: &mut TorrentRecord) -> Result<()> {
        DetailScraper::new(&self.browser, &self.detail_selectors, &self.config).scrape(record)
    }

    /// Scrape a torrent's detail page and download its `.torrent` file
    /// into the configured download directory.
    pub fn download(&self, url: &str) -> Result<TorrentRecord> {
        let mut record = TorrentRecord::from_url(url);
        self.scrape(&mut record)?;
        record.download(&self.client, &self.config.download_dir)?;
        Ok(record)
    }
}
