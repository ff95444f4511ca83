// Core structs: ListedBook, BookRecord, Rating and per-layer errors
use chrono::NaiveDate;
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Star rating as encoded in the catalog markup (`star-rating Three`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Rating {
    One,
    Two,
    Three,
    Four,
    Five,
}

impl Rating {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rating::One => "One",
            Rating::Two => "Two",
            Rating::Three => "Three",
            Rating::Four => "Four",
            Rating::Five => "Five",
        }
    }
}

impl FromStr for Rating {
    type Err = ParserError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        match token {
            "One" => Ok(Rating::One),
            "Two" => Ok(Rating::Two),
            "Three" => Ok(Rating::Three),
            "Four" => Ok(Rating::Four),
            "Five" => Ok(Rating::Five),
            other => Err(ParserError::InvalidField {
                field: "rating",
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One catalog entry exactly as it appears on a page.
#[derive(Debug, Clone, PartialEq)]
pub struct ListedBook {
    pub title: String,
    pub price: f64,
    pub stock: String,
    pub rating: Rating,
}

impl ListedBook {
    pub fn stamp(self, capture_date: NaiveDate) -> BookRecord {
        BookRecord {
            title: self.title,
            price: self.price,
            stock: self.stock,
            rating: self.rating,
            date: capture_date,
        }
    }
}

/// A snapshot row of the historical store. Field order is the column order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookRecord {
    pub title: String,
    #[serde(serialize_with = "serialize_price")]
    pub price: f64,
    pub stock: String,
    pub rating: Rating,
    #[serde(serialize_with = "serialize_date")]
    pub date: NaiveDate,
}

fn serialize_price<S: Serializer>(price: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format!("{:.2}", price))
}

fn serialize_date<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&date.format("%Y-%m-%d").to_string())
}

/// A row read back from the store. Price and date stay optional so that
/// malformed rows can be filtered out by the reporting side.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryRow {
    pub title: String,
    pub price: Option<f64>,
    pub date: Option<String>,
}

/// Aggregate numbers over the prices of one run.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceStats {
    pub count: usize,
    pub avg_price: f64,
    pub min_price: f64,
    pub max_price: f64,
    pub std_dev: f64,
}

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("failed to build http client: {0}")]
    Client(String),
    #[error("page index must be >= 1, got {0}")]
    InvalidPage(u32),
    #[error("request timed out")]
    Timeout,
    #[error("http error: {0}")]
    Http(String),
    #[error("unexpected status {0}")]
    UnexpectedStatus(u16),
}

#[derive(Debug, Error)]
pub enum ParserError {
    #[error("invalid selector: {0}")]
    Selector(String),
    #[error("missing field `{0}`")]
    MissingField(&'static str),
    #[error("invalid value for `{field}`: {value:?}")]
    InvalidField { field: &'static str, value: String },
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("store io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("store csv error: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("fetching page {page} failed: {source}")]
    Fetch {
        page: u32,
        #[source]
        source: ScraperError,
    },
    #[error("parsing page {page} failed: {source}")]
    Parse {
        page: u32,
        #[source]
        source: ParserError,
    },
    #[error(transparent)]
    Storage(#[from] StorageError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rating_tokens_are_case_sensitive() {
        assert_eq!("Four".parse::<Rating>().unwrap(), Rating::Four);
        assert!("four".parse::<Rating>().is_err());
        assert!("Zero".parse::<Rating>().is_err());
    }

    #[test]
    fn stamping_keeps_fields_and_sets_date() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        let record = ListedBook {
            title: "Sharp Objects".into(),
            price: 47.82,
            stock: "In stock".into(),
            rating: Rating::Four,
        }
        .stamp(date);

        assert_eq!(record.title, "Sharp Objects");
        assert_eq!(record.rating, Rating::Four);
        assert_eq!(record.date, date);
    }
}
