//! Headless-browser automation for ShareWood.tv
//!
//! Logs in, fills the torrent search form from typed criteria, parses the
//! result listing into [`TorrentRecord`]s, scrapes detail pages, and
//! downloads `.torrent` files. One blocking browser session processes one
//! task at a time; every wait is bounded and surfaces a typed failure
//! instead of hanging.

pub mod auth;
pub mod automator;
pub mod browser;
pub mod config;
pub mod criteria;
pub mod detail;
pub mod error;
pub mod listing;
pub mod log;
pub mod search;
pub mod selectors;
pub mod torrent;

pub use automator::Automator;
pub use config::Config;
pub use criteria::{PageSize, SearchCriteria, SortDirection, SortKey};
pub use error::{Error, Result};
pub use torrent::TorrentRecord;
