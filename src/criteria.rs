//! Search criteria and the enumerated filter values

use std::collections::BTreeSet;

use serde::Serialize;

use crate::error::{Error, Result};

/// Category labels known to the search form.
pub const CATEGORIES: &[&str] = &["Vidéos", "Audios", "Applications", "Ebooks", "Jeux-Vidéos", "Formations"];

/// Subcategory labels known to the search form.
pub const SUBCATEGORIES: &[&str] = &[
    "Application Linux",
    "Application Mac",
    "Application Smartphone/Tablette",
    "Application Windows",
    "GPS",
];

/// Language labels known to the search form.
pub const LANGUAGES: &[&str] = &[
    "Français",
    "Anglais",
    "Québécois",
    "Espagnol",
    "Japonais",
    "Italien",
    "Allemand",
    "Autre",
];

/// Type labels known to the search form.
pub const TYPES: &[&str] = &["stream", "sd", "freeleech", "doubleupload", "internal", "downloaded"];

/// Sort keys accepted by the search form's sort control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    CreatedAt,
    Name,
    Seeders,
    Leechers,
    TimesCompleted,
    Size,
}

impl SortKey {
    /// Option value used by the site's sort control.
    pub fn as_value(self) -> &'static str {
        match self {
            Self::CreatedAt => "created_at",
            Self::Name => "name",
            Self::Seeders => "seeders",
            Self::Leechers => "leechers",
            Self::TimesCompleted => "times_Completed",
            Self::Size => "Size",
        }
    }

    /// Parse a control value, rejecting anything outside the enumerated set.
    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "created_at" => Ok(Self::CreatedAt),
            "name" => Ok(Self::Name),
            "seeders" => Ok(Self::Seeders),
            "leechers" => Ok(Self::Leechers),
            "times_Completed" => Ok(Self::TimesCompleted),
            "Size" => Ok(Self::Size),
            other => Err(Error::Configuration(format!("unknown sort key `{}`", other))),
        }
    }
}

/// Sort direction accepted by the search form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_value(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            other => Err(Error::Configuration(format!("unknown sort direction `{}`", other))),
        }
    }
}

/// Results-per-page values accepted by the search form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PageSize {
    TwentyFive,
    Fifty,
    Hundred,
}

impl PageSize {
    pub fn as_value(self) -> &'static str {
        match self {
            Self::TwentyFive => "25",
            Self::Fifty => "50",
            Self::Hundred => "100",
        }
    }

    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "25" => Ok(Self::TwentyFive),
            "50" => Ok(Self::Fifty),
            "100" => Ok(Self::Hundred),
            other => Err(Error::Configuration(format!("unknown page size `{}`", other))),
        }
    }
}

/// Filters and sort/paging parameters for one search invocation.
///
/// Filter groups hold the labels to toggle; labels not present are left
/// untouched on the form. Sort key, direction, and page size are typed, so
/// a constructed criteria can only carry in-set values.
#[derive(Debug, Clone, Default)]
pub struct SearchCriteria {
    pub query: Option<String>,
    pub description: Option<String>,
    pub uploader: Option<String>,
    pub tags: Option<String>,
    pub categories: BTreeSet<String>,
    pub subcategories: BTreeSet<String>,
    pub languages: BTreeSet<String>,
    pub types: BTreeSet<String>,
    pub sorting: Option<SortKey>,
    pub direction: Option<SortDirection>,
    pub quantity: Option<PageSize>,
}

impl SearchCriteria {
    /// Criteria carrying just a free-text query.
    pub fn for_query(query: impl Into<String>) -> Self {
        Self {
            query: Some(query.into()),
            ..Self::default()
        }
    }
}
