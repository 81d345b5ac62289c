//! Generator stage: produce the final cited answer.

use crate::engine::StageContext;
use crate::state::WorkflowState;
use crate::stages::excerpt;
use crate::prompts;
use paperchat_core::AppResult;
use paperchat_llm::LlmRequest;

/// Character budget for each paper's content in the context block.
const CONTEXT_EXCERPT_CHARS: usize = 500;

/// Answer returned when the retrieval branch ends with no documents.
pub(crate) const NO_RESULTS_MESSAGE: &str =
    "No relevant papers were found. Try rephrasing your question with different keywords.";

/// Synthesize a cited answer grounded in the selected documents.
///
/// With no documents the stage emits a fixed message and skips the
/// completion call entirely — there is no source material to cite, and an
/// unconstrained completion would invent some.
pub(crate) async fn run(ctx: &StageContext, mut state: WorkflowState) -> AppResult<WorkflowState> {
    if state.documents.is_empty() {
        state.generation = NO_RESULTS_MESSAGE.to_string();
        state.steps.push("Generator: no documents".to_string());
        return Ok(state);
    }

    let context = state
        .documents
        .iter()
        .enumerate()
        .map(|(i, doc)| {
            let meta = &doc.metadata;
            format!(
                "[{}] Title: {}\n    Authors: {}\n    Published: {}\n    Link: {}\n    Abstract: {}",
                i + 1,
                meta.title,
                meta.authors,
                meta.published,
                meta.url,
                excerpt(&doc.content, CONTEXT_EXCERPT_CHARS)
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    let request = LlmRequest::new(
        prompts::generator_user(&state.question, &context),
        &ctx.options.model,
    )
    .with_system(prompts::generator_system())
    .with_temperature(ctx.options.answer_temperature);

    let response = ctx.llm.complete(&request).await?;

    tracing::info!("Generated answer from {} papers", state.documents.len());

    state.generation = response.content;
    state.steps.push("Generator: answer generated".to_string());

    Ok(state)
}
