//! Workflow orchestration: a fixed finite-state machine over the stages.
//!
//! The shape is small and static — a conditional branch after the router,
//! then a strict linear chain — so it is written as a plain transition
//! function over a [`Stage`] enum rather than a general graph engine. The
//! blocking and streaming entry points share one stepper, so they cannot
//! diverge in stage order or terminal state.

use crate::stages;
use crate::state::{Route, WorkflowState};
use futures::Stream;
use paperchat_core::AppResult;
use paperchat_index::SearchIndex;
use paperchat_llm::LlmClient;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// Tunables for one workflow instance.
#[derive(Debug, Clone)]
pub struct WorkflowOptions {
    /// Completion model identifier passed to every generation call
    pub model: String,

    /// Candidate count requested from the vector index
    pub top_k: usize,

    /// Documents retained by the reranker
    pub keep: usize,

    /// Sampling temperature for answer-producing stages (control stages
    /// always run at 0.0)
    pub answer_temperature: f32,
}

impl Default for WorkflowOptions {
    fn default() -> Self {
        Self {
            model: "llama3.2".to_string(),
            top_k: 20,
            keep: 5,
            answer_temperature: 0.3,
        }
    }
}

/// Injected dependencies and options shared by all stages of a run.
pub(crate) struct StageContext {
    pub(crate) llm: Arc<dyn LlmClient>,
    pub(crate) index: Arc<dyn SearchIndex>,
    pub(crate) options: WorkflowOptions,
}

/// The named stages of the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Router,
    Retrieve,
    Rerank,
    Generate,
    Chat,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Router => "router",
            Stage::Retrieve => "retrieve",
            Stage::Rerank => "rerank",
            Stage::Generate => "generate",
            Stage::Chat => "chat",
        };
        write!(f, "{}", name)
    }
}

/// One update from the streaming entry point: the stage that just completed
/// and the state as of its completion.
#[derive(Debug, Clone, Serialize)]
pub struct StageUpdate {
    pub stage: Stage,
    pub state: WorkflowState,
}

/// Select the stage after `stage`, or `None` at a terminal.
///
/// The branch is chosen exactly once, from the route the router recorded;
/// both branches are strict linear sequences with no retries or re-entry.
fn transition(stage: Stage, state: &WorkflowState) -> Option<Stage> {
    match stage {
        Stage::Router => match state.route {
            Some(Route::Retrieve) => Some(Stage::Retrieve),
            // The router always records a route, defaulting to chat; a
            // missing route takes the chat branch for the same reason.
            Some(Route::Chat) | None => Some(Stage::Chat),
        },
        Stage::Retrieve => Some(Stage::Rerank),
        Stage::Rerank => Some(Stage::Generate),
        Stage::Generate | Stage::Chat => None,
    }
}

/// The question-answering workflow.
///
/// Holds the two injected service clients; one instance serves any number
/// of concurrent runs, each owning its own state.
pub struct Workflow {
    ctx: StageContext,
}

impl Workflow {
    /// Create a workflow over the given service clients.
    pub fn new(
        llm: Arc<dyn LlmClient>,
        index: Arc<dyn SearchIndex>,
        options: WorkflowOptions,
    ) -> Self {
        Self {
            ctx: StageContext { llm, index, options },
        }
    }

    /// Run the full sequence for a question and return the terminal state.
    pub async fn run(&self, question: impl Into<String>) -> AppResult<WorkflowState> {
        let mut state = WorkflowState::new(question);
        let mut next = Some(Stage::Router);

        while let Some(stage) = next {
            state = self.execute(stage, state).await?;
            next = transition(stage, &state);
        }

        Ok(state)
    }

    /// Run the same sequence, yielding the state after each completed stage.
    ///
    /// Stages execute in the same order as [`Workflow::run`] and the final
    /// yielded state equals its return value for the same service responses.
    pub fn stream(
        &self,
        question: impl Into<String>,
    ) -> impl Stream<Item = AppResult<StageUpdate>> + '_ {
        futures::stream::try_unfold(
            (WorkflowState::new(question), Some(Stage::Router)),
            move |(state, next)| async move {
                let Some(stage) = next else {
                    return Ok(None);
                };

                let state = self.execute(stage, state).await?;
                let next = transition(stage, &state);

                Ok(Some((
                    StageUpdate {
                        stage,
                        state: state.clone(),
                    },
                    (state, next),
                )))
            },
        )
    }

    /// Execute a single stage against the shared context.
    async fn execute(&self, stage: Stage, state: WorkflowState) -> AppResult<WorkflowState> {
        tracing::debug!("Executing stage '{}'", stage);

        match stage {
            Stage::Router => stages::router::run(&self.ctx, state).await,
            Stage::Retrieve => stages::retriever::run(&self.ctx, state).await,
            Stage::Rerank => stages::reranker::run(&self.ctx, state).await,
            Stage::Generate => stages::generator::run(&self.ctx, state).await,
            Stage::Chat => stages::chat::run(&self.ctx, state).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transition_branches_on_route() {
        let mut state = WorkflowState::new("q");

        state.route = Some(Route::Retrieve);
        assert_eq!(transition(Stage::Router, &state), Some(Stage::Retrieve));

        state.route = Some(Route::Chat);
        assert_eq!(transition(Stage::Router, &state), Some(Stage::Chat));
    }

    #[test]
    fn test_missing_route_takes_chat_branch() {
        let state = WorkflowState::new("q");
        assert_eq!(transition(Stage::Router, &state), Some(Stage::Chat));
    }

    #[test]
    fn test_retrieve_branch_is_linear() {
        let state = WorkflowState::new("q");
        assert_eq!(transition(Stage::Retrieve, &state), Some(Stage::Rerank));
        assert_eq!(transition(Stage::Rerank, &state), Some(Stage::Generate));
        assert_eq!(transition(Stage::Generate, &state), None);
    }

    #[test]
    fn test_chat_is_terminal() {
        let state = WorkflowState::new("q");
        assert_eq!(transition(Stage::Chat, &state), None);
    }
}
