//! `generative` is a Rust client library providing a unified abstraction over
//! generative AI provider HTTP APIs: chat completion, streaming completion,
//! text embedding, and audio (speech synthesis, transcription, translation).
//!
//! # High-level features
//! - A provider-agnostic [Conversation](crate::conversation::Conversation) and
//!   [Message](crate::message::Message) model, including function calls and
//!   function results
//! - Per-provider clients (e.g. OpenAI, Gemini) exposing the same capability
//!   surface: `complete`, `complete_stream`, `embed`
//! - Incremental streaming with lazily yielded text fragments and
//!   function-call deltas, assembled into a final assistant message
//!
//! # Simple example:
//! ```ignore
//! use generative::conversation::Conversation;
//! use generative::providers::openai;
//!
//! #[tokio::main]
//! async fn main() {
//!     // This requires the `OPENAI_API_KEY` environment variable to be set.
//!     let client = openai::Client::from_env();
//!
//!     let mut conversation = Conversation::new();
//!     conversation.push_user("Who are you?");
//!
//!     let reply = client
//!         .complete(&mut conversation, None)
//!         .await
//!         .expect("Failed to complete conversation");
//!
//!     println!("Assistant: {}", reply.content.unwrap_or_default());
//! }
//! ```
//!
//! # Core concepts
//! ## Conversations
//! A [Conversation](crate::conversation::Conversation) is an ordered,
//! append-only sequence of turns. The library only ever appends to it: a
//! successful completion appends exactly one assistant turn. Callers that need
//! to bound history length do so explicitly with
//! [Conversation::trim](crate::conversation::Conversation::trim).
//!
//! ## Streaming
//! [complete_stream](crate::client::CompletionClient::complete_stream) returns
//! a [CompletionStream](crate::streaming::CompletionStream): a lazy,
//! single-pass stream of text fragments. Function-call deltas are accumulated
//! internally, and once the provider signals termination the full assistant
//! message (text and assembled function calls) is appended to the
//! conversation. Cancelling or dropping the stream early leaves the
//! conversation untouched.
//!
//! ## Providers
//! Each provider lives under [providers](crate::providers) and implements the
//! capability traits in [client](crate::client) independently. Credentials are
//! bound when the client is constructed and never mutated afterwards.

pub mod audio;
pub mod client;
pub mod completion;
pub mod conversation;
pub mod embeddings;
pub mod json_utils;
pub mod message;
pub mod providers;
pub mod streaming;

pub use client::{CompletionClient, EmbeddingsClient};
pub use completion::{ChatCompletionOptions, CompletionError, FunctionDeclaration};
pub use conversation::{Conversation, TrimBudget};
pub use message::{FunctionCall, FunctionResult, Message, Role};
pub use streaming::{CompletionStream, StreamChunk};
