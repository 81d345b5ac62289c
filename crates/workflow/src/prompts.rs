//! Prompt builders for the workflow stages.
//!
//! All prompts instruct the model toward a parseable shape; the matching
//! parsers (with their fallbacks) live in [`crate::extract`].

use crate::extract::{QUERY_PREFIX, YEAR_PREFIX};

/// Classification prompt for the router.
pub fn router(question: &str) -> String {
    format!(
        "Decide whether the user's question requires searching an academic paper corpus.\n\
         \n\
         Question: {question}\n\
         \n\
         - Output \"retrieve\" if the question asks about papers, research topics, methods, or results.\n\
         - Output \"chat\" if it is a greeting or general conversation.\n\
         \n\
         Output exactly one of \"retrieve\" or \"chat\" and nothing else."
    )
}

/// Query-extraction prompt for the retriever.
pub fn query_extraction(question: &str) -> String {
    format!(
        "Extract the information needed to search an academic paper index from the question below.\n\
         \n\
         Question: {question}\n\
         \n\
         Respond with exactly two lines in this format:\n\
         {QUERY_PREFIX} <an English search query for the vector index>\n\
         {YEAR_PREFIX} <a year if the question mentions one, otherwise \"none\">"
    )
}

/// Ranking prompt for the reranker. `digest` is the numbered candidate list.
pub fn rerank(question: &str, digest: &str) -> String {
    format!(
        "From the retrieved papers below, pick the 5 most relevant to the question, best first.\n\
         \n\
         Question: {question}\n\
         \n\
         Papers:\n\
         {digest}\n\
         \n\
         Respond with one line per pick, in this format:\n\
         rank 1: [index] - one-line justification\n\
         rank 2: [index] - one-line justification\n\
         rank 3: [index] - one-line justification\n\
         rank 4: [index] - one-line justification\n\
         rank 5: [index] - one-line justification"
    )
}

/// System prompt for the generator.
pub fn generator_system() -> String {
    "You are an academic research assistant. Answer the user's question using only the retrieved papers provided.\n\
     \n\
     Instructions:\n\
     - Synthesize an answer from the papers' content.\n\
     - Cite each paper inline with its bracketed number, e.g. [1].\n\
     - End with a reference list that includes each cited paper's link.\n\
     - Answer in the same language as the question."
        .to_string()
}

/// User prompt for the generator. `context` is the numbered context block.
pub fn generator_user(question: &str, context: &str) -> String {
    format!(
        "Question: {question}\n\
         \n\
         Retrieved papers:\n\
         {context}"
    )
}

/// System prompt for the conversational stage.
pub fn chat_system() -> String {
    "You are a friendly assistant for an academic paper search service.\n\
     Respond naturally to greetings and general conversation.\n\
     If the user wants information from the literature, invite them to ask about papers so a search can be run.\n\
     Answer in the same language as the user's message."
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_router_prompt_contains_tokens() {
        let prompt = router("hello");
        assert!(prompt.contains("hello"));
        assert!(prompt.contains("\"retrieve\""));
        assert!(prompt.contains("\"chat\""));
    }

    #[test]
    fn test_extraction_prompt_uses_parser_prefixes() {
        let prompt = query_extraction("q");
        assert!(prompt.contains(QUERY_PREFIX));
        assert!(prompt.contains(YEAR_PREFIX));
    }

    #[test]
    fn test_rerank_prompt_embeds_digest() {
        let prompt = rerank("q", "[0] Paper A\nexcerpt");
        assert!(prompt.contains("[0] Paper A"));
        assert!(prompt.contains("rank 1: [index]"));
    }
}
