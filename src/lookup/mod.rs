//! External board-game lookup.
//!
//! Two operations against the remote game database: search-by-title and
//! fetch-details-by-id. Search results are post-filtered with a fuzzy
//! (punctuation-stripped, case-folded) substring comparison so that OCR'd
//! titles like "CATAN!" still land on the right candidates.

mod bgg;
pub use bgg::{BggClient, DEFAULT_BASE_URL};

use crate::catalog::GameRecord;
use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Lightweight search hit, prior to full detail fetch.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: String,
    pub title: String,
    pub year: Option<i32>,
}

#[derive(Debug, Error)]
pub enum LookupError {
    #[error("connection error: {0}")]
    Connection(String),
    #[error("request timed out")]
    Timeout,
    #[error("lookup API error (status {status})")]
    Api { status: u16 },
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

#[async_trait]
pub trait GameLookup: Send + Sync {
    /// Candidates whose display title matches `title`; may be empty.
    async fn search(&self, title: &str) -> Result<Vec<Candidate>, LookupError>;

    /// Full field set for a candidate id; `None` when the id is unknown.
    async fn details(&self, id: &str) -> Result<Option<GameRecord>, LookupError>;
}

lazy_static! {
    static ref NON_ALPHANUMERIC: Regex = Regex::new(r"[^a-z0-9 ]+").unwrap();
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
}

/// Punctuation-stripped, case-folded form of a title, used for fuzzy
/// comparison and in-flight dedup.
pub fn fold_title(title: &str) -> String {
    let lowered = title.to_lowercase();
    let stripped = NON_ALPHANUMERIC.replace_all(&lowered, "");
    WHITESPACE.replace_all(stripped.trim(), " ").into_owned()
}

/// True when the folded query is contained in the folded candidate title.
pub fn titles_match(query: &str, candidate_title: &str) -> bool {
    let folded_query = fold_title(query);
    if folded_query.is_empty() {
        return false;
    }
    fold_title(candidate_title).contains(&folded_query)
}
