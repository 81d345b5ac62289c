//! Document types returned by the vector index.

use serde::{Deserialize, Serialize};

/// A paper retrieved from the vector index.
///
/// Immutable once constructed. `content` is the indexed text, which the
/// ingestion process builds by concatenating a paper's title and abstract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Indexed text (title + abstract)
    pub content: String,

    /// Paper metadata as stored alongside the embedding
    pub metadata: PaperMetadata,

    /// Similarity distance from the vector index (lower = more similar).
    /// Absent for sources where no distance was computed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance: Option<f32>,
}

/// Metadata stored with each indexed paper.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaperMetadata {
    /// Paper title
    #[serde(default)]
    pub title: String,

    /// Link to the paper (e.g., an arXiv abstract page)
    #[serde(default)]
    pub url: String,

    /// Publication date as an ISO-8601 date string
    #[serde(default)]
    pub published: String,

    /// Author names, comma-joined by the ingestion process
    #[serde(default)]
    pub authors: String,

    /// Subject categories, comma-joined by the ingestion process
    #[serde(default)]
    pub categories: String,
}

/// Front-end projection of a document: the fields callers render in answer
/// output, without content or scores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentSummary {
    pub title: String,
    pub url: String,
    pub published: String,
    pub authors: String,
}

impl Document {
    /// Project this document to its front-end summary.
    pub fn summary(&self) -> DocumentSummary {
        DocumentSummary {
            title: self.metadata.title.clone(),
            url: self.metadata.url.clone(),
            published: self.metadata.published.clone(),
            authors: self.metadata.authors.clone(),
        }
    }
}
