//! LLM provider clients
//!
//! A thin layer over OpenAI-compatible chat-completions endpoints:
//! - [`LLMClient`] - the trait the AI gateway talks to
//! - [`Provider`] - runtime provider selection from configuration
//! - [`with_retry`] - bounded backoff for rate-limited calls
//!
//! # Example
//!
//! ```ignore
//! use wayfarer::llm::{GenerationOptions, Provider};
//!
//! let client = provider.create_client()?;
//! let text = client
//!     .generate_with_system("You are a guide.", "Where to go?", GenerationOptions::default())
//!     .await?;
//! ```

/// Core LLM client trait and provider enum.
pub mod client;
pub mod openai;
pub mod retry;

pub use client::{GenerationOptions, LLMClient, Provider, ResponseSchema};
pub use retry::{with_retry, RetryPolicy};
