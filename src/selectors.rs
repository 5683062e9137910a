//! CSS selector tables for ShareWood.tv page structures
//!
//! Every locator the automator uses lives here, keyed by logical field, so
//! a site layout change is a configuration edit rather than a code change.
//! All tables are injected into the components that use them; the defaults
//! match the current site.

use scraper::Selector;

use crate::error::{Error, Result};

/// Compile a locator, mapping a malformed one to a configuration error.
pub(crate) fn compile(context: &str, locator: &str) -> Result<Selector> {
    Selector::parse(locator)
        .map_err(|_| Error::Configuration(format!("invalid {} selector `{}`", context, locator)))
}

fn validate_all<'a>(context: &str, locators: impl IntoIterator<Item = &'a str>) -> Result<()> {
    for locator in locators {
        compile(context, locator)?;
    }
    Ok(())
}

/// Locators for the login page.
#[derive(Debug, Clone)]
pub struct LoginSelectors {
    pub username_input: String,
    pub password_input: String,
    pub login_button: String,
    /// Element that only exists once the session is authenticated.
    pub post_login_marker: String,
    /// Message shown when the credentials are rejected.
    pub login_error: String,
    /// Cookie-consent control; may legitimately be absent.
    pub cookie_button: String,
}

impl Default for LoginSelectors {
    fn default() -> Self {
        Self {
            username_input: "input[name='username']".to_string(),
            password_input: "input[name='password']".to_string(),
            login_button: "#login-button".to_string(),
            post_login_marker: "#frame > .content > .messages".to_string(),
            login_error: ".alert-danger".to_string(),
            cookie_button: "#cookie-consent .btn-accept".to_string(),
        }
    }
}

impl LoginSelectors {
    pub fn validate(&self) -> Result<()> {
        validate_all(
            "login",
            [
                self.username_input.as_str(),
                self.password_input.as_str(),
                self.login_button.as_str(),
                self.post_login_marker.as_str(),
                self.login_error.as_str(),
                self.cookie_button.as_str(),
            ],
        )
    }
}

/// Locators for the search form and its results container.
#[derive(Debug, Clone)]
pub struct SearchFormSelectors {
    pub form: String,
    pub query: String,
    pub description: String,
    pub uploader: String,
    pub tags: String,
    pub sorting: String,
    pub direction: String,
    pub quantity: String,
    pub results_container: String,
    /// Template for filter checkboxes, with `{}` standing for the label.
    pub checkbox_template: String,
}

impl Default for SearchFormSelectors {
    fn default() -> Self {
        Self {
            form: "form[action='TorrentController@torrents']".to_string(),
            query: "input[name='research']".to_string(),
            description: "input[name='description']".to_string(),
            uploader: "input[name='uploader']".to_string(),
            tags: "input[name='tags']".to_string(),
            sorting: "select[name='sort']".to_string(),
            direction: "select[name='direction']".to_string(),
            quantity: "select[name='qty']".to_string(),
            results_container: "#result".to_string(),
            checkbox_template: "input[name='{}']".to_string(),
        }
    }
}

impl SearchFormSelectors {
    /// Locator for the filter checkbox carrying `label`.
    pub fn checkbox(&self, label: &str) -> String {
        self.checkbox_template.replace("{}", label)
    }

    pub fn validate(&self) -> Result<()> {
        validate_all(
            "search form",
            [
                self.form.as_str(),
                self.query.as_str(),
                self.description.as_str(),
                self.uploader.as_str(),
                self.tags.as_str(),
                self.sorting.as_str(),
                self.direction.as_str(),
                self.quantity.as_str(),
                self.results_container.as_str(),
            ],
        )
    }
}

/// Locators for one result row of the listing, scoped to the row element.
#[derive(Debug, Clone)]
pub struct ListingSelectors {
    pub row: String,
    pub url: String,
    pub title: String,
    pub age: String,
    pub size: String,
    pub comments: String,
    pub seeders: String,
    pub leechers: String,
    pub completed: String,
}

impl Default for ListingSelectors {
    fn default() -> Self {
        Self {
            row: "div.row.table-responsive-line".to_string(),
            url: "a[name='torrent']".to_string(),
            title: "a[name='torrent']".to_string(),
            age: "span.age".to_string(),
            size: "span.size".to_string(),
            comments: "span.comments".to_string(),
            seeders: "span.seeders".to_string(),
            leechers: "span.leechers".to_string(),
            completed: "span.downloads".to_string(),
        }
    }
}

impl ListingSelectors {
    pub fn validate(&self) -> Result<()> {
        validate_all(
            "listing",
            [
                self.row.as_str(),
                self.url.as_str(),
                self.title.as_str(),
                self.age.as_str(),
                self.size.as_str(),
                self.comments.as_str(),
                self.seeders.as_str(),
                self.leechers.as_str(),
                self.completed.as_str(),
            ],
        )
    }
}

/// Logical fields extracted from a torrent detail page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailField {
    Title,
    Description,
    Discounts,
    FastlineCredit,
    Uploader,
    UploaderProfile,
    Age,
    Size,
    Ratio,
    Category,
    Subcategory,
    Tags,
    Languages,
    Resolution,
    ThreeD,
    Hash,
    Seeders,
    Leechers,
    Completed,
    DownloadLink,
}

impl DetailField {
    pub fn name(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Description => "description",
            Self::Discounts => "discounts",
            Self::FastlineCredit => "fastline_credit_url",
            Self::Uploader => "uploader",
            Self::UploaderProfile => "uploader_profile",
            Self::Age => "age",
            Self::Size => "size",
            Self::Ratio => "ratio",
            Self::Category => "category",
            Self::Subcategory => "subcategory",
            Self::Tags => "tags",
            Self::Languages => "languages",
            Self::Resolution => "resolution",
            Self::ThreeD => "three_d",
            Self::Hash => "hash",
            Self::Seeders => "seeders",
            Self::Leechers => "leechers",
            Self::Completed => "completed",
            Self::DownloadLink => "download_link",
        }
    }
}

/// How a detail field's value is read from its element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extract {
    /// Trimmed text content.
    Text,
    /// The `href` attribute.
    Href,
}

/// One entry of the detail-page selector table.
#[derive(Debug, Clone)]
pub struct DetailEntry {
    pub field: DetailField,
    pub locator: String,
    pub extract: Extract,
}

/// Ordered field→locator table driving detail-page extraction.
#[derive(Debug, Clone)]
pub struct DetailSelectors {
    entries: Vec<DetailEntry>,
}

const DETAIL_TABLE: &str = "#app > div.row > div > div:nth-child(1) > table > tbody";

impl Default for DetailSelectors {
    fn default() -> Self {
        let row = |n: u8, tail: &str| format!("{} > tr:nth-child({}) > td:nth-child(2){}", DETAIL_TABLE, n, tail);
        let entry = |field, locator: String, extract| DetailEntry { field, locator, extract };
        Self {
            entries: vec![
                entry(DetailField::Title, "#app h1".to_string(), Extract::Text),
                entry(DetailField::Description, "#app .torrent-description".to_string(), Extract::Text),
                entry(DetailField::Discounts, row(1, " > span > i"), Extract::Text),
                entry(DetailField::FastlineCredit, row(2, " > a"), Extract::Href),
                entry(DetailField::Uploader, row(3, " > a"), Extract::Text),
                entry(DetailField::UploaderProfile, row(3, " > a"), Extract::Href),
                entry(DetailField::Age, row(4, ""), Extract::Text),
                entry(DetailField::Size, row(5, ""), Extract::Text),
                entry(DetailField::Ratio, row(6, ""), Extract::Text),
                entry(DetailField::Category, row(7, ""), Extract::Text),
                entry(DetailField::Subcategory, row(8, ""), Extract::Text),
                entry(DetailField::Tags, row(9, ""), Extract::Text),
                entry(DetailField::Languages, row(10, ""), Extract::Text),
                entry(DetailField::Resolution, row(11, ""), Extract::Text),
                entry(DetailField::ThreeD, row(12, ""), Extract::Text),
                entry(DetailField::Hash, row(13, ""), Extract::Text),
                entry(DetailField::Seeders, row(14, " > span.badge-extra.text-green"), Extract::Text),
                entry(DetailField::Leechers, row(15, " > span.badge-extra.text-red"), Extract::Text),
                entry(DetailField::Completed, row(16, " > span.badge-extra.text-info"), Extract::Text),
                entry(DetailField::DownloadLink, "a[href*='/download/']".to_string(), Extract::Href),
            ],
        }
    }
}

impl DetailSelectors {
    pub fn new(entries: Vec<DetailEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[DetailEntry] {
        &self.entries
    }

    /// Locator for a single field, if the table carries one.
    pub fn locator(&self, field: DetailField) -> Option<&str> {
        self.entries
            .iter()
            .find(|entry| entry.field == field)
            .map(|entry| entry.locator.as_str())
    }

    pub fn validate(&self) -> Result<()> {
        validate_all("detail", self.entries.iter().map(|entry| entry.locator.as_str()))
    }
}
