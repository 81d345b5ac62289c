//! Chat stage: conversational reply when no retrieval is needed.

use crate::engine::StageContext;
use crate::prompts;
use crate::state::WorkflowState;
use paperchat_core::AppResult;
use paperchat_llm::LlmRequest;

/// Produce a conversational response to the question.
pub(crate) async fn run(ctx: &StageContext, mut state: WorkflowState) -> AppResult<WorkflowState> {
    let request = LlmRequest::new(state.question.clone(), &ctx.options.model)
        .with_system(prompts::chat_system())
        .with_temperature(ctx.options.answer_temperature);

    let response = ctx.llm.complete(&request).await?;

    state.generation = response.content;
    state.steps.push("Chat: conversational reply".to_string());

    Ok(state)
}
