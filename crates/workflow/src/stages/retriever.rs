//! Retriever stage: extract a search query and fetch candidates.

use crate::engine::StageContext;
use crate::state::WorkflowState;
use crate::{extract, prompts};
use paperchat_core::AppResult;
use paperchat_index::SearchFilter;
use paperchat_llm::LlmRequest;

/// Translate the question into a search query plus optional year filter,
/// then run one similarity query against the index.
///
/// Query extraction is an optimization, not a prerequisite: if the
/// completion call fails or its output parses to nothing, the raw question
/// is used verbatim with no filter. An index failure, by contrast,
/// propagates — there is nothing to answer from without candidates.
pub(crate) async fn run(ctx: &StageContext, mut state: WorkflowState) -> AppResult<WorkflowState> {
    let request = LlmRequest::new(prompts::query_extraction(&state.question), &ctx.options.model)
        .with_temperature(0.0);

    let extraction = match ctx.llm.complete(&request).await {
        Ok(response) => extract::parse_query_extraction(&response.content, &state.question),
        Err(e) => {
            tracing::warn!("Query extraction failed, using raw question: {}", e);
            extract::QueryExtraction {
                query: state.question.clone(),
                year: None,
            }
        }
    };

    let filter = extraction
        .year
        .as_deref()
        .and_then(|year| year.parse::<i32>().ok())
        .and_then(SearchFilter::from_year);

    if let Some(year) = &extraction.year {
        state.filters.insert("year".to_string(), year.clone());
    }

    tracing::info!(
        "Retrieving candidates for '{}' (year filter: {:?})",
        extraction.query,
        extraction.year
    );

    let documents = ctx
        .index
        .query(&extraction.query, ctx.options.top_k, filter.as_ref())
        .await?;

    state.steps.push(format!(
        "Retriever: '{}' -> {} candidates",
        extraction.query,
        documents.len()
    ));
    state.documents = documents;

    Ok(state)
}
