//! Reranker stage: narrow the candidate set to the most relevant papers.

use crate::engine::StageContext;
use crate::state::WorkflowState;
use crate::stages::excerpt;
use crate::{extract, prompts};
use paperchat_core::AppResult;
use paperchat_llm::LlmRequest;

/// Maximum candidates included in the ranking digest.
const DIGEST_LIMIT: usize = 20;

/// Character budget per digest entry.
const DIGEST_EXCERPT_CHARS: usize = 300;

/// Select the top candidates in model-assigned rank order.
///
/// With no candidates this is a no-op and the completion service is not
/// called. If the ranking response yields no valid indices, the first
/// `keep` candidates in original distance order are retained instead —
/// a deterministic degradation, not a failure.
pub(crate) async fn run(ctx: &StageContext, mut state: WorkflowState) -> AppResult<WorkflowState> {
    if state.documents.is_empty() {
        state.steps.push("Reranker: no search results".to_string());
        return Ok(state);
    }

    let digest = state
        .documents
        .iter()
        .take(DIGEST_LIMIT)
        .enumerate()
        .map(|(i, doc)| {
            format!(
                "[{}] {}\n{}",
                i,
                doc.metadata.title,
                excerpt(&doc.content, DIGEST_EXCERPT_CHARS)
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    let request = LlmRequest::new(prompts::rerank(&state.question, &digest), &ctx.options.model)
        .with_temperature(0.0);

    let response = ctx.llm.complete(&request).await?;
    let rationale = response.content.trim().to_string();

    let picks = extract::bracket_indices(&rationale, state.documents.len());

    let keep = ctx.options.keep;
    let selected: Vec<_> = if picks.is_empty() {
        tracing::warn!("Rerank response had no usable indices, keeping distance order");
        state.documents.iter().take(keep).cloned().collect()
    } else {
        picks
            .into_iter()
            .take(keep)
            .map(|i| state.documents[i].clone())
            .collect()
    };

    tracing::info!(
        "Reranked {} candidates down to {}",
        state.documents.len(),
        selected.len()
    );

    state.steps.push(format!(
        "Reranker: selected {} papers\n{}",
        selected.len(),
        rationale
    ));
    state.documents = selected;

    Ok(state)
}
