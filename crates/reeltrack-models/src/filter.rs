use serde::{Deserialize, Serialize};

/// How a displayed title collection is ordered.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SortMode {
    /// Descending vote count
    Popularity,
    /// Descending average rating
    Rating,
    /// Ascending primary title
    Alphabetical,
    /// Descending start year
    ReleaseDate,
    /// Non-reproducible shuffle, unsuitable for pagination
    Random,
}

/// User-held display configuration. Held in memory only, never persisted.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FilterConfig {
    /// Keep titles sharing at least one of these genres (case-insensitive).
    /// `None` or an empty list keeps everything.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genres: Option<Vec<String>>,
    /// Keep titles whose truncated average rating is at least this value.
    /// Titles without a rating are dropped when a threshold is set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_rating: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year_from: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year_to: Option<i32>,
    /// `None` leaves the incoming order untouched.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<SortMode>,
}
