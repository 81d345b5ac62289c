//! Router stage: decide between the retrieval and chat branches.

use crate::engine::StageContext;
use crate::state::{Route, WorkflowState};
use crate::{extract, prompts};
use paperchat_core::AppResult;
use paperchat_llm::LlmRequest;

/// Classify the question and set the route.
///
/// If the completion call fails, the route defaults to `chat`: a degraded
/// conversational reply beats failing the run before it starts, and the chat
/// branch makes no further external calls beyond its own completion.
pub(crate) async fn run(ctx: &StageContext, mut state: WorkflowState) -> AppResult<WorkflowState> {
    let request = LlmRequest::new(prompts::router(&state.question), &ctx.options.model)
        .with_temperature(0.0);

    let route = match ctx.llm.complete(&request).await {
        Ok(response) => extract::route_from_response(&response.content),
        Err(e) => {
            tracing::warn!("Router completion failed, defaulting to chat: {}", e);
            Route::Chat
        }
    };

    tracing::info!("Routed question to '{}'", route);

    state.route = Some(route);
    state.steps.push(format!("Router: {}", route));

    Ok(state)
}
