//! End-to-end pipeline tests over both branches of the state machine.

use crate::engine::{Stage, Workflow, WorkflowOptions};
use crate::stages::generator::NO_RESULTS_MESSAGE;
use crate::state::Route;
use crate::tests::doubles::{paper, ScriptedLlm, StaticIndex};
use futures::TryStreamExt;
use paperchat_index::SearchFilter;
use std::sync::Arc;

fn workflow(llm: Arc<ScriptedLlm>, index: Arc<StaticIndex>) -> Workflow {
    Workflow::new(llm, index, WorkflowOptions::default())
}

#[tokio::test]
async fn chat_branch_runs_two_stages() {
    let llm = Arc::new(ScriptedLlm::new(vec![
        Ok("chat"),
        Ok("안녕하세요! 논문에 대해 궁금한 점을 물어보세요."),
    ]));
    let index = Arc::new(StaticIndex::new(vec![]));

    let state = workflow(llm.clone(), index.clone())
        .run("안녕하세요")
        .await
        .unwrap();

    assert_eq!(state.route, Some(Route::Chat));
    assert_eq!(state.steps.len(), 2);
    assert_eq!(state.steps[0], "Router: chat");
    assert_eq!(state.steps[1], "Chat: conversational reply");
    assert!(!state.generation.is_empty());
    assert!(state.documents.is_empty());
    assert!(state.filters.is_empty());

    // One completion per stage, and the index was never touched.
    assert_eq!(llm.calls(), 2);
    assert!(index.queries().is_empty());
}

#[tokio::test]
async fn retrieve_branch_end_to_end() {
    let candidates = vec![
        paper(0, "Efficient Attention Variants", "2023-02-10"),
        paper(1, "Scaling Transformer Architectures", "2023-06-01"),
        paper(2, "A Survey of Decoding Strategies", "2023-09-15"),
    ];

    let llm = Arc::new(ScriptedLlm::new(vec![
        Ok("retrieve"),
        Ok("search query: transformer architectures\nyear filter: 2023"),
        Ok("rank 1: [1] - directly about transformer scaling\nrank 2: [0] - attention is the core mechanism"),
        Ok("2023년 트랜스포머 연구는 스케일링 [1]과 효율적인 어텐션 [2]에 집중되었습니다.\n\n참고 논문:\n[1] http://arxiv.org/abs/2301.00001"),
    ]));
    let index = Arc::new(StaticIndex::new(candidates.clone()));

    let state = workflow(llm.clone(), index.clone())
        .run("2023년 발표된 논문 중 transformer 관련 연구는?")
        .await
        .unwrap();

    assert_eq!(state.route, Some(Route::Retrieve));
    assert_eq!(state.steps.len(), 4);
    assert_eq!(state.steps[0], "Router: retrieve");
    assert!(state.steps[1].contains("'transformer architectures' -> 3 candidates"));
    assert!(state.steps[2].starts_with("Reranker: selected 2 papers"));
    assert_eq!(state.steps[3], "Generator: answer generated");

    // The extracted year reached both the informational filters and the
    // server-side query filter.
    assert_eq!(state.filters.get("year").map(String::as_str), Some("2023"));
    let queries = index.queries();
    assert_eq!(queries.len(), 1);
    assert_eq!(queries[0].text, "transformer architectures");
    assert_eq!(queries[0].top_k, 20);
    assert_eq!(queries[0].filter, SearchFilter::from_year(2023));

    // Documents are the reranker's picks, in model-assigned order.
    assert_eq!(state.documents.len(), 2);
    assert_eq!(state.documents[0], candidates[1]);
    assert_eq!(state.documents[1], candidates[0]);

    // The answer is non-empty and carries a citation into the reranked set.
    assert!(state.generation.contains("[1]"));
    assert_eq!(llm.calls(), 4);
}

#[tokio::test]
async fn empty_results_skip_rerank_and_generation_calls() {
    let llm = Arc::new(ScriptedLlm::new(vec![
        Ok("retrieve"),
        Ok("search query: quantum basket weaving\nyear filter: none"),
    ]));
    let index = Arc::new(StaticIndex::new(vec![]));

    let state = workflow(llm.clone(), index.clone())
        .run("Papers on quantum basket weaving?")
        .await
        .unwrap();

    // Router + extraction only; reranker and generator must not call out.
    assert_eq!(llm.calls(), 2);

    assert_eq!(state.steps.len(), 4);
    assert_eq!(state.steps[2], "Reranker: no search results");
    assert_eq!(state.steps[3], "Generator: no documents");
    assert!(state.documents.is_empty());
    assert!(state.filters.is_empty());
    assert_eq!(state.generation, NO_RESULTS_MESSAGE);
}

#[tokio::test]
async fn rerank_parse_failure_falls_back_to_distance_order() {
    let candidates: Vec<_> = (0..7)
        .map(|n| paper(n, &format!("Candidate {}", n), "2022-01-01"))
        .collect();

    let llm = Arc::new(ScriptedLlm::new(vec![
        Ok("retrieve"),
        Ok("search query: candidates\nyear filter: none"),
        Ok("These all look excellent to me."),
        Ok("An answer citing [1]."),
    ]));
    let index = Arc::new(StaticIndex::new(candidates.clone()));

    let state = workflow(llm, index).run("question").await.unwrap();

    assert_eq!(state.documents, candidates[..5].to_vec());
}

#[tokio::test]
async fn rerank_output_is_capped_at_keep() {
    let candidates: Vec<_> = (0..8)
        .map(|n| paper(n, &format!("Candidate {}", n), "2022-01-01"))
        .collect();

    let llm = Arc::new(ScriptedLlm::new(vec![
        Ok("retrieve"),
        Ok("search query: candidates\nyear filter: none"),
        // Seven picks, one duplicated; only the first five unique survive.
        Ok("rank 1: [6]\nrank 2: [2]\nrank 3: [2]\nrank 4: [0]\nrank 5: [5]\nrank 6: [1]\nrank 7: [3]"),
        Ok("An answer citing [1]."),
    ]));
    let index = Arc::new(StaticIndex::new(candidates.clone()));

    let state = workflow(llm, index).run("question").await.unwrap();

    let picked: Vec<_> = [6usize, 2, 0, 5, 1]
        .iter()
        .map(|&n| candidates[n].clone())
        .collect();
    assert_eq!(state.documents, picked);
}

#[tokio::test]
async fn router_failure_defaults_to_chat() {
    let llm = Arc::new(ScriptedLlm::new(vec![
        Err("connection refused"),
        Ok("Hello! Ask me about papers."),
    ]));
    let index = Arc::new(StaticIndex::new(vec![paper(0, "Unused", "2020-01-01")]));

    let state = workflow(llm, index.clone()).run("hello").await.unwrap();

    assert_eq!(state.route, Some(Route::Chat));
    assert_eq!(state.steps[0], "Router: chat");
    assert!(!state.generation.is_empty());
    assert!(index.queries().is_empty());
}

#[tokio::test]
async fn extraction_failure_falls_back_to_raw_question() {
    let llm = Arc::new(ScriptedLlm::new(vec![
        Ok("retrieve"),
        Err("timed out"),
        Ok("rank 1: [0]"),
        Ok("An answer citing [1]."),
    ]));
    let index = Arc::new(StaticIndex::new(vec![paper(0, "Only Paper", "2021-01-01")]));

    let state = workflow(llm, index.clone())
        .run("raw question text")
        .await
        .unwrap();

    let queries = index.queries();
    assert_eq!(queries[0].text, "raw question text");
    assert_eq!(queries[0].filter, None);
    assert!(state.filters.is_empty());
    assert_eq!(state.steps.len(), 4);
}

#[tokio::test]
async fn generator_failure_propagates() {
    let llm = Arc::new(ScriptedLlm::new(vec![
        Ok("retrieve"),
        Ok("search query: q\nyear filter: none"),
        Ok("rank 1: [0]"),
        Err("service unavailable"),
    ]));
    let index = Arc::new(StaticIndex::new(vec![paper(0, "Paper", "2021-01-01")]));

    let result = workflow(llm, index).run("question").await;
    assert!(result.is_err());
}

#[tokio::test]
async fn stream_yields_stages_in_order_and_matches_run() {
    let script = || {
        vec![
            Ok("retrieve"),
            Ok("search query: transformer architectures\nyear filter: 2023"),
            Ok("rank 1: [1]\nrank 2: [0]"),
            Ok("An answer citing [1]."),
        ]
    };
    let candidates = vec![
        paper(0, "Paper Zero", "2023-01-01"),
        paper(1, "Paper One", "2023-02-01"),
    ];

    let blocking = workflow(
        Arc::new(ScriptedLlm::new(script())),
        Arc::new(StaticIndex::new(candidates.clone())),
    );
    let streaming = workflow(
        Arc::new(ScriptedLlm::new(script())),
        Arc::new(StaticIndex::new(candidates)),
    );

    let final_state = blocking.run("question").await.unwrap();
    let updates: Vec<_> = streaming.stream("question").try_collect().await.unwrap();

    let stages: Vec<_> = updates.iter().map(|u| u.stage).collect();
    assert_eq!(
        stages,
        vec![Stage::Router, Stage::Retrieve, Stage::Rerank, Stage::Generate]
    );

    // Each update appends exactly one step, and the last update equals the
    // blocking terminal state.
    for (n, update) in updates.iter().enumerate() {
        assert_eq!(update.state.steps.len(), n + 1);
    }
    assert_eq!(updates.last().unwrap().state, final_state);
}

#[tokio::test]
async fn stream_chat_branch_yields_two_updates() {
    let llm = Arc::new(ScriptedLlm::new(vec![Ok("chat"), Ok("Hi!")]));
    let index = Arc::new(StaticIndex::new(vec![]));

    let updates: Vec<_> = workflow(llm, index)
        .stream("hello")
        .try_collect()
        .await
        .unwrap();

    let stages: Vec<_> = updates.iter().map(|u| u.stage).collect();
    assert_eq!(stages, vec![Stage::Router, Stage::Chat]);
    assert!(!updates.last().unwrap().state.generation.is_empty());
}

#[tokio::test]
async fn control_stages_run_deterministic() {
    let llm = Arc::new(ScriptedLlm::new(vec![
        Ok("retrieve"),
        Ok("search query: q\nyear filter: none"),
        Ok("rank 1: [0]"),
        Ok("Answer [1]."),
    ]));
    let index = Arc::new(StaticIndex::new(vec![paper(0, "Paper", "2021-01-01")]));

    workflow(llm.clone(), index).run("question").await.unwrap();

    // Router, extraction and rerank requests all pin temperature to 0.0.
    let requests = llm.requests();
    assert_eq!(requests[0].temperature, Some(0.0));
    assert_eq!(requests[1].temperature, Some(0.0));
    assert_eq!(requests[2].temperature, Some(0.0));
}
