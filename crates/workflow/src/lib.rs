//! Question-answering workflow over an academic paper corpus.
//!
//! Each question runs through a small finite-state machine: a router decides
//! whether the question needs a literature search, then either the retrieval
//! pipeline (retrieve -> rerank -> generate) or a plain conversational stage
//! produces the answer. All stages thread one [`state::WorkflowState`] value
//! and call at most two external services: the vector index and the
//! completion service, both injected at construction.
//!
//! # Example
//! ```no_run
//! use paperchat_workflow::{Workflow, WorkflowOptions};
//! # async fn example(
//! #     llm: std::sync::Arc<dyn paperchat_llm::LlmClient>,
//! #     index: std::sync::Arc<dyn paperchat_index::SearchIndex>,
//! # ) -> paperchat_core::AppResult<()> {
//! let workflow = Workflow::new(llm, index, WorkflowOptions::default());
//! let state = workflow.run("What transformer papers came out in 2023?").await?;
//! println!("{}", state.generation);
//! # Ok(())
//! # }
//! ```

pub mod engine;
pub mod extract;
pub mod prompts;
pub mod stages;
pub mod state;

#[cfg(test)]
mod tests;

// Re-export the workflow surface
pub use engine::{Stage, StageUpdate, Workflow, WorkflowOptions};
pub use state::{Route, WorkflowState};
