//! Pipeline tests against a scripted mock browser
//!
//! Exercises the authenticator, the form-fill/filter pipeline, and the
//! detail scraper without a real browser: the mock records every command
//! and can be scripted to time out, hide elements, or serve canned markup.

use std::cell::RefCell;
use std::collections::HashSet;
use std::time::Duration;

use sharewood_automator::auth::Authenticator;
use sharewood_automator::browser::{Browser, BrowserError, BrowserResult};
use sharewood_automator::config::Config;
use sharewood_automator::criteria::{PageSize, SearchCriteria, SortDirection, SortKey};
use sharewood_automator::detail::DetailScraper;
use sharewood_automator::error::Error;
use sharewood_automator::search::SearchPipeline;
use sharewood_automator::selectors::{
    DetailSelectors, ListingSelectors, LoginSelectors, SearchFormSelectors,
};
use sharewood_automator::torrent::TorrentRecord;

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Navigate(String),
    WaitFor(String),
    SetValue(String, String),
    Click(String),
    Select(String, String),
    InnerHtml(String),
}

/// Scripted stand-in for the automation driver.
#[derive(Default)]
struct MockBrowser {
    calls: RefCell<Vec<Call>>,
    /// Selectors whose bounded waits time out.
    timeout_on: HashSet<String>,
    /// Selectors reported as present but not displayed.
    hidden: HashSet<String>,
    /// Selectors that cannot be found for set-value/click.
    missing: HashSet<String>,
    /// (select locator, value) pairs reported as absent options.
    missing_options: HashSet<(String, String)>,
    /// Navigations that the site redirects, target -> final url.
    redirects: Vec<(String, String)>,
    results_html: String,
    page_html: String,
    url: RefCell<String>,
}

impl MockBrowser {
    fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    fn clicks(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Click(locator) => Some(locator),
                _ => None,
            })
            .collect()
    }
}

impl Browser for MockBrowser {
    fn navigate(&self, url: &str) -> BrowserResult<()> {
        self.calls.borrow_mut().push(Call::Navigate(url.to_string()));
        let landed = self
            .redirects
            .iter()
            .find(|(from, _)| from == url)
            .map(|(_, to)| to.clone())
            .unwrap_or_else(|| url.to_string());
        *self.url.borrow_mut() = landed;
        Ok(())
    }

    fn wait_for(&self, selector: &str, _timeout: Duration) -> BrowserResult<()> {
        self.calls.borrow_mut().push(Call::WaitFor(selector.to_string()));
        if self.timeout_on.contains(selector) {
            return Err(BrowserError::Timeout(selector.to_string()));
        }
        Ok(())
    }

    fn is_visible(&self, selector: &str) -> BrowserResult<bool> {
        Ok(!self.hidden.contains(selector) && !self.missing.contains(selector))
    }

    fn set_value(&self, selector: &str, value: &str) -> BrowserResult<()> {
        if self.missing.contains(selector) {
            return Err(BrowserError::NotFound(selector.to_string()));
        }
        self.calls
            .borrow_mut()
            .push(Call::SetValue(selector.to_string(), value.to_string()));
        Ok(())
    }

    fn click(&self, selector: &str) -> BrowserResult<()> {
        if self.missing.contains(selector) {
            return Err(BrowserError::NotFound(selector.to_string()));
        }
        self.calls.borrow_mut().push(Call::Click(selector.to_string()));
        Ok(())
    }

    fn select_value(&self, selector: &str, value: &str) -> BrowserResult<bool> {
        self.calls
            .borrow_mut()
            .push(Call::Select(selector.to_string(), value.to_string()));
        Ok(!self
            .missing_options
            .contains(&(selector.to_string(), value.to_string())))
    }

    fn inner_html(&self, selector: &str) -> BrowserResult<String> {
        self.calls.borrow_mut().push(Call::InnerHtml(selector.to_string()));
        Ok(self.results_html.clone())
    }

    fn page_source(&self) -> BrowserResult<String> {
        Ok(self.page_html.clone())
    }

    fn current_url(&self) -> String {
        self.url.borrow().clone()
    }

    fn wait_for_url_contains(&self, fragment: &str, _timeout: Duration) -> BrowserResult<()> {
        if self.url.borrow().contains(fragment) {
            Ok(())
        } else {
            Err(BrowserError::Timeout(format!("url containing `{}`", fragment)))
        }
    }
}

fn test_config() -> Config {
    Config {
        base_url: "https://sharewood.test".to_string(),
        login_url: "https://sharewood.test/login".to_string(),
        logout_url: "https://sharewood.test/logout".to_string(),
        torrents_url: "https://sharewood.test/torrents".to_string(),
        username: "user".to_string(),
        password: "pass".to_string(),
        download_dir: std::env::temp_dir(),
        browser_timeout: Duration::from_secs(1),
        wait_timeout: Duration::from_millis(50),
        headless: true,
    }
}

fn listing_fixture() -> String {
    let row = |title: &str, href: &str, seeders: &str| {
        format!(
            "<div class=\"row table-responsive-line\">\
               <a name=\"torrent\" href=\"{}\">{}</a>\
               <span class=\"age\">1 hour</span><span class=\"seeders\">{}</span>\
             </div>",
            href, title, seeders
        )
    };
    format!(
        "{}{}",
        row("Test Torrent 1", "/torrents/test-1", "10"),
        row("Test Torrent 2", "/torrents/test-2", "20"),
    )
}

#[test]
fn fill_toggles_exactly_the_selected_labels() {
    let browser = MockBrowser::default();
    let config = test_config();
    let form = SearchFormSelectors::default();
    let listing = ListingSelectors::default();
    let pipeline = SearchPipeline::new(&browser, &form, &listing, &config, false);

    let mut criteria = SearchCriteria::for_query("ubuntu");
    criteria.categories.insert("Vidéos".to_string());
    criteria.languages.insert("Français".to_string());

    pipeline.fill_search_form(&criteria).unwrap();

    let clicks = browser.clicks();
    assert_eq!(clicks.len(), 2);
    assert!(clicks.contains(&"input[name='Vidéos']".to_string()));
    assert!(clicks.contains(&"input[name='Français']".to_string()));
}

#[test]
fn filling_twice_toggles_twice() {
    let browser = MockBrowser::default();
    let config = test_config();
    let form = SearchFormSelectors::default();
    let listing = ListingSelectors::default();
    let pipeline = SearchPipeline::new(&browser, &form, &listing, &config, false);

    let mut criteria = SearchCriteria::default();
    criteria.types.insert("freeleech".to_string());

    pipeline.fill_search_form(&criteria).unwrap();
    pipeline.fill_search_form(&criteria).unwrap();

    assert_eq!(browser.clicks().len(), 2);
}

#[test]
fn absent_text_criteria_never_touch_the_form() {
    let browser = MockBrowser::default();
    let config = test_config();
    let form = SearchFormSelectors::default();
    let listing = ListingSelectors::default();
    let pipeline = SearchPipeline::new(&browser, &form, &listing, &config, false);

    pipeline.fill_search_form(&SearchCriteria::default()).unwrap();

    let set_values = browser
        .calls()
        .into_iter()
        .filter(|call| matches!(call, Call::SetValue(_, _)))
        .count();
    assert_eq!(set_values, 0);
    assert!(browser.clicks().is_empty());
}

#[test]
fn unavailable_form_is_a_search_error() {
    let mut browser = MockBrowser::default();
    browser.timeout_on.insert(SearchFormSelectors::default().form.clone());
    let config = test_config();
    let form = SearchFormSelectors::default();
    let listing = ListingSelectors::default();
    let pipeline = SearchPipeline::new(&browser, &form, &listing, &config, false);

    match pipeline.fill_search_form(&SearchCriteria::default()) {
        Err(Error::Search(msg)) => assert!(msg.contains("not available"), "unexpected message: {}", msg),
        other => panic!("expected search error, got {:?}", other),
    }
}

#[test]
fn hidden_form_is_a_search_error() {
    let mut browser = MockBrowser::default();
    browser.hidden.insert(SearchFormSelectors::default().form.clone());
    let config = test_config();
    let form = SearchFormSelectors::default();
    let listing = ListingSelectors::default();
    let pipeline = SearchPipeline::new(&browser, &form, &listing, &config, false);

    assert!(matches!(
        pipeline.fill_search_form(&SearchCriteria::default()),
        Err(Error::Search(_))
    ));
}

#[test]
fn missing_search_input_names_the_field() {
    let mut browser = MockBrowser::default();
    browser.missing.insert(SearchFormSelectors::default().uploader.clone());
    let config = test_config();
    let form = SearchFormSelectors::default();
    let listing = ListingSelectors::default();
    let pipeline = SearchPipeline::new(&browser, &form, &listing, &config, false);

    let mut criteria = SearchCriteria::default();
    criteria.uploader = Some("bob".to_string());

    match pipeline.fill_search_form(&criteria) {
        Err(Error::Search(msg)) => assert!(msg.contains("uploader"), "unexpected message: {}", msg),
        other => panic!("expected search error, got {:?}", other),
    }
}

#[test]
fn unknown_select_option_is_a_search_error() {
    let mut browser = MockBrowser::default();
    let form = SearchFormSelectors::default();
    browser
        .missing_options
        .insert((form.sorting.clone(), "seeders".to_string()));
    let config = test_config();
    let listing = ListingSelectors::default();
    let pipeline = SearchPipeline::new(&browser, &form, &listing, &config, false);

    let mut criteria = SearchCriteria::default();
    criteria.sorting = Some(SortKey::Seeders);

    match pipeline.apply_filters(&criteria) {
        Err(Error::Search(msg)) => assert!(msg.contains("no option"), "unexpected message: {}", msg),
        other => panic!("expected search error, got {:?}", other),
    }
}

#[test]
fn filters_select_the_criteria_values() {
    let browser = MockBrowser::default();
    let config = test_config();
    let form = SearchFormSelectors::default();
    let listing = ListingSelectors::default();
    let pipeline = SearchPipeline::new(&browser, &form, &listing, &config, false);

    let mut criteria = SearchCriteria::default();
    criteria.sorting = Some(SortKey::CreatedAt);
    criteria.direction = Some(SortDirection::Desc);
    criteria.quantity = Some(PageSize::Fifty);

    pipeline.apply_filters(&criteria).unwrap();

    let calls = browser.calls();
    assert!(calls.contains(&Call::Select(form.sorting.clone(), "created_at".to_string())));
    assert!(calls.contains(&Call::Select(form.direction.clone(), "desc".to_string())));
    assert!(calls.contains(&Call::Select(form.quantity.clone(), "50".to_string())));
}

#[test]
fn search_returns_parsed_records_in_row_order() {
    let mut browser = MockBrowser::default();
    browser.results_html = listing_fixture();
    let config = test_config();
    let form = SearchFormSelectors::default();
    let listing = ListingSelectors::default();
    let pipeline = SearchPipeline::new(&browser, &form, &listing, &config, false);

    let criteria = SearchCriteria::for_query("test");
    let records = pipeline.search(&criteria).unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].title.as_deref(), Some("Test Torrent 1"));
    assert_eq!(records[0].seeders, Some(10));
    assert_eq!(records[1].title.as_deref(), Some("Test Torrent 2"));
    assert_eq!(records[1].seeders, Some(20));
    // Fields whose selectors match nothing in the fixture stay unset.
    assert_eq!(records[0].size, None);
    assert_eq!(records[0].leechers, None);

    // The query was typed into the search input before results were read.
    let calls = browser.calls();
    assert!(calls.contains(&Call::SetValue(form.query.clone(), "test".to_string())));
    assert!(calls.contains(&Call::InnerHtml(form.results_container.clone())));
}

#[test]
fn connect_fills_credentials_and_reports_success() {
    let browser = MockBrowser::default();
    let config = test_config();
    let selectors = LoginSelectors::default();
    let auth = Authenticator::new(&browser, &selectors, &config);

    assert!(auth.connect("user", "pass").unwrap());

    let calls = browser.calls();
    assert_eq!(calls[0], Call::Navigate("https://sharewood.test/login".to_string()));
    assert!(calls.contains(&Call::SetValue(selectors.username_input.clone(), "user".to_string())));
    assert!(calls.contains(&Call::SetValue(selectors.password_input.clone(), "pass".to_string())));
    assert!(browser.clicks().contains(&selectors.login_button));
}

#[test]
fn connect_returns_false_when_the_post_login_marker_never_appears() {
    let mut browser = MockBrowser::default();
    let selectors = LoginSelectors::default();
    browser.timeout_on.insert(selectors.post_login_marker.clone());
    browser.missing.insert(selectors.login_error.clone());
    let config = test_config();
    let auth = Authenticator::new(&browser, &selectors, &config);

    assert!(!auth.connect("user", "pass").unwrap());
    // The session stays wherever the last navigation landed.
    assert_eq!(browser.current_url(), "https://sharewood.test/login");
}

#[test]
fn connect_distinguishes_rejected_credentials() {
    let mut browser = MockBrowser::default();
    let selectors = LoginSelectors::default();
    browser.timeout_on.insert(selectors.post_login_marker.clone());
    let config = test_config();
    let auth = Authenticator::new(&browser, &selectors, &config);

    // The login-error message is visible, so this is a rejection, not a
    // slow page.
    assert!(matches!(auth.connect("user", "wrong"), Err(Error::Authentication(_))));
}

#[test]
fn connect_tolerates_a_missing_cookie_banner() {
    let mut browser = MockBrowser::default();
    let selectors = LoginSelectors::default();
    browser.missing.insert(selectors.cookie_button.clone());
    browser.missing.insert(selectors.login_error.clone());
    let config = test_config();
    let auth = Authenticator::new(&browser, &selectors, &config);

    assert!(auth.connect("user", "pass").unwrap());
}

#[test]
fn disconnect_reports_whether_the_login_page_was_reached() {
    let config = test_config();
    let selectors = LoginSelectors::default();

    let mut browser = MockBrowser::default();
    browser.redirects.push((
        "https://sharewood.test/logout".to_string(),
        "https://sharewood.test/login".to_string(),
    ));
    let auth = Authenticator::new(&browser, &selectors, &config);
    assert!(auth.disconnect().unwrap());

    let browser = MockBrowser::default();
    let auth = Authenticator::new(&browser, &selectors, &config);
    assert!(!auth.disconnect().unwrap());
}

#[test]
fn detail_scrape_requires_a_url() {
    let browser = MockBrowser::default();
    let config = test_config();
    let selectors = DetailSelectors::default();
    let scraper = DetailScraper::new(&browser, &selectors, &config);

    let mut record = TorrentRecord::default();
    assert!(matches!(scraper.scrape(&mut record), Err(Error::Parsing(_))));
}

#[test]
fn detail_scrape_fails_when_the_page_never_loads() {
    let mut browser = MockBrowser::default();
    let selectors = DetailSelectors::default();
    browser
        .timeout_on
        .insert(selectors.locator(sharewood_automator::selectors::DetailField::Title).unwrap().to_string());
    let config = test_config();
    let scraper = DetailScraper::new(&browser, &selectors, &config);

    let mut record = TorrentRecord::from_url("https://sharewood.test/torrents/9");
    match scraper.scrape(&mut record) {
        Err(Error::Parsing(msg)) => assert!(msg.contains("did not load"), "unexpected message: {}", msg),
        other => panic!("expected parsing error, got {:?}", other),
    }
}
