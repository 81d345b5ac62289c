//! Workflow state threaded through all stages.

use paperchat_index::{Document, DocumentSummary};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Routing decision made once by the router stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Route {
    /// The question needs a literature search
    Retrieve,
    /// The question is conversational
    Chat,
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::Retrieve => write!(f, "retrieve"),
            Route::Chat => write!(f, "chat"),
        }
    }
}

/// State record for one workflow run.
///
/// Each run owns its state exclusively; stages take it by value and return
/// the updated record. Invariants:
/// - `question` is immutable after creation
/// - `route` is set once, by the router
/// - `steps` is append-only, exactly one entry per executed stage
/// - `generation` is written exactly once, by the generator or chat stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowState {
    /// The user's raw question
    pub question: String,

    /// Routing decision; `None` until the router runs
    pub route: Option<Route>,

    /// Informational filters extracted by the retriever (e.g. `year`)
    pub filters: HashMap<String, String>,

    /// Candidate documents; replaced wholesale by retriever and reranker,
    /// most relevant first after the reranker
    pub documents: Vec<Document>,

    /// The final natural-language answer
    pub generation: String,

    /// Audit trail, one human-readable entry per stage
    pub steps: Vec<String>,
}

impl WorkflowState {
    /// Create the initial state for a question.
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            route: None,
            filters: HashMap::new(),
            documents: Vec::new(),
            generation: String::new(),
            steps: Vec::new(),
        }
    }

    /// Front-end projection of the retained documents.
    pub fn document_summaries(&self) -> Vec<DocumentSummary> {
        self.documents.iter().map(Document::summary).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let state = WorkflowState::new("What is attention?");

        assert_eq!(state.question, "What is attention?");
        assert!(state.route.is_none());
        assert!(state.filters.is_empty());
        assert!(state.documents.is_empty());
        assert!(state.generation.is_empty());
        assert!(state.steps.is_empty());
    }

    #[test]
    fn test_route_display() {
        assert_eq!(Route::Retrieve.to_string(), "retrieve");
        assert_eq!(Route::Chat.to_string(), "chat");
    }

    #[test]
    fn test_route_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&Route::Retrieve).unwrap(),
            r#""retrieve""#
        );
    }
}
