//! Ask command handler.
//!
//! Runs the question-answering workflow, either one-shot or as an
//! interactive loop, printing stage progress as each stage completes.

use clap::Args;
use futures::TryStreamExt;
use paperchat_core::{AppConfig, AppError, AppResult};
use paperchat_index::ChromaIndex;
use paperchat_llm::create_client;
use paperchat_workflow::{Workflow, WorkflowOptions, WorkflowState};
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

/// Ask a question about the paper corpus
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask; omit to enter the interactive loop
    pub question: Option<String>,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,

    /// Candidates requested from the index
    #[arg(long, default_value_t = 20)]
    pub top_k: usize,

    /// Papers kept by the reranker
    #[arg(long, default_value_t = 5)]
    pub keep: usize,
}

impl AskCommand {
    /// Execute the ask command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        let timeout = Some(Duration::from_secs(config.timeout_secs));

        let llm = create_client(
            &config.provider,
            config.llm_endpoint.as_deref(),
            config.resolve_api_key().as_deref(),
            timeout,
        )?;

        let index =
            ChromaIndex::connect(&config.index_endpoint, &config.collection, timeout).await?;

        let options = WorkflowOptions {
            model: config.model.clone(),
            top_k: self.top_k,
            keep: self.keep,
            ..Default::default()
        };

        let workflow = Workflow::new(llm, Arc::new(index), options);

        match &self.question {
            Some(question) => self.answer_one(&workflow, question).await,
            None => self.interactive(&workflow).await,
        }
    }

    /// Answer a single question and print the result.
    async fn answer_one(&self, workflow: &Workflow, question: &str) -> AppResult<()> {
        if self.json {
            let state = workflow.run(question).await?;
            println!("{}", serde_json::to_string_pretty(&answer_payload(&state))?);
            return Ok(());
        }

        let state = run_with_progress(workflow, question).await?;
        println!();
        println!("{}", state.generation);

        Ok(())
    }

    /// Read questions from stdin until the user quits.
    async fn interactive(&self, workflow: &Workflow) -> AppResult<()> {
        println!("paperchat - ask about the paper corpus ('quit' to exit)");

        loop {
            print!("\nquestion: ");
            std::io::stdout().flush()?;

            let mut line = String::new();
            if std::io::stdin().read_line(&mut line)? == 0 {
                // EOF
                break;
            }

            let question = line.trim();
            if question.is_empty() {
                continue;
            }
            if matches!(question.to_lowercase().as_str(), "quit" | "exit" | "q") {
                break;
            }

            match run_with_progress(workflow, question).await {
                Ok(state) => {
                    println!();
                    println!("{}", state.generation);
                }
                Err(e) => eprintln!("error: {}", e),
            }
        }

        Ok(())
    }
}

/// Run the streaming mode, echoing each stage's latest step to stderr.
async fn run_with_progress(workflow: &Workflow, question: &str) -> AppResult<WorkflowState> {
    let mut stream = Box::pin(workflow.stream(question));
    let mut terminal = None;

    while let Some(update) = stream.try_next().await? {
        if let Some(step) = update.state.steps.last() {
            eprintln!("[{}] {}", update.stage, step);
        }
        terminal = Some(update.state);
    }

    terminal.ok_or_else(|| AppError::Other("Workflow completed without stages".to_string()))
}

/// JSON answer shape consumed by front ends.
fn answer_payload(state: &WorkflowState) -> serde_json::Value {
    serde_json::json!({
        "generation": state.generation,
        "steps": state.steps,
        "documents": state.document_summaries(),
    })
}
