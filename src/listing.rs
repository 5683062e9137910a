//! Listing-page parser
//!
//! Pure markup-to-records parsing; the search pipeline hands in the results
//! container's inner HTML and gets back records in row order.

use scraper::{ElementRef, Html, Selector};

use crate::error::{Error, Result};
use crate::selectors::{compile, ListingSelectors};
use crate::torrent::TorrentRecord;

/// Clean and trim extracted text
pub(crate) fn clean_text(text: &str) -> String {
    text.trim().to_string()
}

/// Parse results markup into torrent records, preserving row order.
///
/// A field whose selector matches nothing in a row is left unset. A row
/// with no extractable url is a parsing error naming the row index, unless
/// `ignore_parsing_errors` is set, in which case the partial record is kept.
pub fn parse_listing(
    markup: &str,
    selectors: &ListingSelectors,
    ignore_parsing_errors: bool,
) -> Result<Vec<TorrentRecord>> {
    let row_sel = compile("listing", &selectors.row)?;
    let url_sel = compile("listing", &selectors.url)?;
    let title_sel = compile("listing", &selectors.title)?;
    let age_sel = compile("listing", &selectors.age)?;
    let size_sel = compile("listing", &selectors.size)?;
    let comments_sel = compile("listing", &selectors.comments)?;
    let seeders_sel = compile("listing", &selectors.seeders)?;
    let leechers_sel = compile("listing", &selectors.leechers)?;
    let completed_sel = compile("listing", &selectors.completed)?;

    let document = Html::parse_fragment(markup);
    let mut records = Vec::new();

    for (index, row) in document.select(&row_sel).enumerate() {
        let record = TorrentRecord {
            url: select_attr(row, &url_sel, "href"),
            title: select_text(row, &title_sel),
            age: select_text(row, &age_sel),
            size: select_text(row, &size_sel),
            comments: select_count(row, &comments_sel),
            seeders: select_count(row, &seeders_sel),
            leechers: select_count(row, &leechers_sel),
            completed: select_count(row, &completed_sel),
            ..TorrentRecord::default()
        };

        if record.url.is_none() && !ignore_parsing_errors {
            return Err(Error::Parsing(format!("listing row {}: no torrent url", index)));
        }
        records.push(record);
    }

    Ok(records)
}

fn select_text(row: ElementRef<'_>, selector: &Selector) -> Option<String> {
    row.select(selector)
        .next()
        .map(|el| clean_text(&el.text().collect::<String>()))
}

fn select_attr(row: ElementRef<'_>, selector: &Selector, attr: &str) -> Option<String> {
    row.select(selector)
        .next()
        .and_then(|el| el.value().attr(attr))
        .map(String::from)
}

fn select_count(row: ElementRef<'_>, selector: &Selector) -> Option<u32> {
    row.select(selector)
        .next()
        .and_then(|el| el.text().collect::<String>().trim().replace(',', "").parse().ok())
}
