//! Generation service integration for paperchat.
//!
//! This crate provides a provider-agnostic abstraction for the text
//! completion service the workflow consumes. Every call is single-turn: one
//! prompt in, one free-text completion out, with no context retained between
//! calls.
//!
//! # Providers
//! - **Ollama**: Local LLM runtime (default)
//! - **OpenAI**: OpenAI-compatible chat completion endpoints
//!
//! # Example
//! ```no_run
//! use paperchat_llm::{LlmClient, LlmRequest, providers::OllamaClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = OllamaClient::new()?;
//! let request = LlmRequest::new("Hello, world!", "llama3.2");
//! let response = client.complete(&request).await?;
//! println!("{}", response.content);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod factory;
pub mod providers;

// Re-export main types
pub use client::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
pub use factory::create_client;
pub use providers::{OllamaClient, OpenAiClient};
