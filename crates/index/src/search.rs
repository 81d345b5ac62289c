//! Search trait and metadata filters for the vector index.

use crate::types::Document;
use chrono::NaiveDate;
use paperchat_core::AppResult;
use serde::{Deserialize, Serialize};

/// Metadata filter applied server-side during a similarity query.
///
/// Currently the only supported condition is a lower bound on the
/// publication date, which the retriever builds from an extracted year.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchFilter {
    /// Only match papers published on or after this date
    pub published_on_or_after: Option<NaiveDate>,
}

impl SearchFilter {
    /// Create an empty filter (matches everything).
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `published >= <year>-01-01`.
    ///
    /// Returns `None` for years `chrono` cannot represent.
    pub fn from_year(year: i32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, 1, 1).map(|date| Self {
            published_on_or_after: Some(date),
        })
    }

    /// Check whether any condition is set.
    pub fn is_empty(&self) -> bool {
        self.published_on_or_after.is_none()
    }

    /// Render the filter as an index `where` clause, or `None` when empty.
    ///
    /// Shape: `{"published": {"$gte": "<date>"}}`, matching how the
    /// ingestion process stores `published` as an ISO-8601 string.
    pub fn to_where_clause(&self) -> Option<serde_json::Value> {
        self.published_on_or_after.map(|date| {
            serde_json::json!({
                "published": { "$gte": date.format("%Y-%m-%d").to_string() }
            })
        })
    }
}

/// Trait for vector search backends.
///
/// The index is a standing collection populated by an external ingestion
/// process and queried read-only here. Implementations embed the query text
/// server-side, so callers pass plain text.
#[async_trait::async_trait]
pub trait SearchIndex: Send + Sync {
    /// Run one similarity query for `text`, returning up to `top_k`
    /// candidates ordered by ascending distance.
    ///
    /// Zero results is a valid outcome, not an error.
    async fn query(
        &self,
        text: &str,
        top_k: usize,
        filter: Option<&SearchFilter>,
    ) -> AppResult<Vec<Document>>;
}
