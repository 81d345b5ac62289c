//! Chroma vector index client.
//!
//! Talks to a Chroma HTTP server whose collection an external ingestion
//! process keeps populated with paper embeddings. The collection carries a
//! server-side embedding function, so queries are plain text.

use crate::search::{SearchFilter, SearchIndex};
use crate::types::{Document, PaperMetadata};
use paperchat_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default base URL for a local Chroma server.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Collection lookup response.
#[derive(Debug, Deserialize)]
struct CollectionInfo {
    id: String,
}

/// Similarity query request body.
#[derive(Debug, Serialize)]
struct QueryRequest<'a> {
    query_texts: Vec<&'a str>,
    n_results: usize,
    #[serde(rename = "where", skip_serializing_if = "Option::is_none")]
    where_clause: Option<serde_json::Value>,
    include: Vec<&'static str>,
}

/// Similarity query response body.
///
/// Chroma nests results one row per query text; we always send exactly one
/// query text, so only the first row is meaningful.
#[derive(Debug, Default, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    documents: Option<Vec<Vec<Option<String>>>>,
    #[serde(default)]
    metadatas: Option<Vec<Vec<Option<PaperMetadata>>>>,
    #[serde(default)]
    distances: Option<Vec<Vec<Option<f32>>>>,
}

/// Chroma HTTP client bound to one collection.
pub struct ChromaIndex {
    base_url: String,
    collection_id: String,
    client: reqwest::Client,
}

impl ChromaIndex {
    /// Connect to a Chroma server and resolve the collection by name.
    ///
    /// Fails if the server is unreachable or the collection does not exist —
    /// an unpopulated index is a deployment error, caught at startup rather
    /// than on the first question.
    pub async fn connect(
        base_url: impl Into<String>,
        collection: &str,
        timeout: Option<Duration>,
    ) -> AppResult<Self> {
        let base_url = base_url.into();
        let timeout =
            timeout.unwrap_or(Duration::from_secs(paperchat_core::config::DEFAULT_TIMEOUT_SECS));

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Index(format!("Failed to build HTTP client: {}", e)))?;

        let url = format!("{}/api/v1/collections/{}", base_url, collection);
        let response = client
            .get(&url)
            .send()
            .await
            .map_err(|e| AppError::Index(format!("Failed to reach index at {}: {}", base_url, e)))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(AppError::Index(format!(
                "Collection '{}' lookup failed ({})",
                collection, status
            )));
        }

        let info: CollectionInfo = response
            .json()
            .await
            .map_err(|e| AppError::Index(format!("Failed to parse collection info: {}", e)))?;

        tracing::info!("Connected to index collection '{}' ({})", collection, info.id);

        Ok(Self {
            base_url,
            collection_id: info.id,
            client,
        })
    }

    /// Flatten the nested response into documents.
    fn to_documents(response: QueryResponse) -> Vec<Document> {
        let contents = response
            .documents
            .and_then(|mut rows| rows.drain(..).next())
            .unwrap_or_default();
        let mut metadatas = response
            .metadatas
            .and_then(|mut rows| rows.drain(..).next())
            .unwrap_or_default();
        let mut distances = response
            .distances
            .and_then(|mut rows| rows.drain(..).next())
            .unwrap_or_default();

        contents
            .into_iter()
            .enumerate()
            .map(|(i, content)| Document {
                content: content.unwrap_or_default(),
                metadata: metadatas
                    .get_mut(i)
                    .and_then(|m| m.take())
                    .unwrap_or_default(),
                distance: distances.get_mut(i).and_then(|d| d.take()),
            })
            .collect()
    }
}

#[async_trait::async_trait]
impl SearchIndex for ChromaIndex {
    async fn query(
        &self,
        text: &str,
        top_k: usize,
        filter: Option<&SearchFilter>,
    ) -> AppResult<Vec<Document>> {
        let request = QueryRequest {
            query_texts: vec![text],
            n_results: top_k,
            where_clause: filter.and_then(SearchFilter::to_where_clause),
            include: vec!["documents", "metadatas", "distances"],
        };

        let url = format!(
            "{}/api/v1/collections/{}/query",
            self.base_url, self.collection_id
        );

        tracing::debug!("Index query: '{}' (top_k={})", text, top_k);

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::Index(format!("Index query failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::Index(format!(
                "Index query error ({}): {}",
                status, error_text
            )));
        }

        let query_response: QueryResponse = response
            .json()
            .await
            .map_err(|e| AppError::Index(format!("Failed to parse index response: {}", e)))?;

        let documents = Self::to_documents(query_response);
        tracing::debug!("Index returned {} candidates", documents.len());

        Ok(documents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_mapping() {
        let body = r#"{
            "ids": [["p1", "p2"]],
            "documents": [["Paper one text", "Paper two text"]],
            "metadatas": [[
                {"title": "Paper One", "url": "http://arxiv.org/abs/1", "published": "2023-03-01", "authors": "A. Author", "categories": "cs.CL"},
                {"title": "Paper Two", "url": "http://arxiv.org/abs/2", "published": "2023-05-01", "authors": "B. Author", "categories": "cs.CL"}
            ]],
            "distances": [[0.11, 0.42]]
        }"#;

        let parsed: QueryResponse = serde_json::from_str(body).unwrap();
        let documents = ChromaIndex::to_documents(parsed);

        assert_eq!(documents.len(), 2);
        assert_eq!(documents[0].metadata.title, "Paper One");
        assert_eq!(documents[0].distance, Some(0.11));
        assert_eq!(documents[1].content, "Paper two text");
    }

    #[test]
    fn test_response_mapping_handles_missing_sections() {
        let body = r#"{"ids": [["p1"]], "documents": [["Only text"]]}"#;

        let parsed: QueryResponse = serde_json::from_str(body).unwrap();
        let documents = ChromaIndex::to_documents(parsed);

        assert_eq!(documents.len(), 1);
        assert_eq!(documents[0].content, "Only text");
        assert!(documents[0].distance.is_none());
        assert!(documents[0].metadata.title.is_empty());
    }

    #[test]
    fn test_empty_result_is_valid() {
        let body = r#"{"ids": [[]], "documents": [[]], "metadatas": [[]], "distances": [[]]}"#;

        let parsed: QueryResponse = serde_json::from_str(body).unwrap();
        assert!(ChromaIndex::to_documents(parsed).is_empty());
    }

    #[test]
    fn test_where_clause_serialization() {
        let filter = SearchFilter::from_year(2023).unwrap();
        let request = QueryRequest {
            query_texts: vec!["transformer architectures"],
            n_results: 20,
            where_clause: filter.to_where_clause(),
            include: vec!["documents", "metadatas", "distances"],
        };

        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body["where"]["published"]["$gte"], "2023-01-01");
        assert_eq!(body["n_results"], 20);
    }
}
