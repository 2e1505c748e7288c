//! OpenAI API client: chat completions, embeddings, speech, transcription,
//! translation.
//!
//! # Example
//! ```
//! use generative::providers::openai;
//!
//! let client = openai::Client::new("YOUR_API_KEY");
//! ```

pub mod audio;
pub mod client;
pub mod completion;
pub mod embedding;
pub mod streaming;

pub use client::{Client, ClientBuilder};

/// `gpt-4o` model.
pub const GPT_4O: &str = "gpt-4o";
/// `gpt-4o-mini` model.
pub const GPT_4O_MINI: &str = "gpt-4o-mini";
/// `gpt-4-turbo` model.
pub const GPT_4_TURBO: &str = "gpt-4-turbo";
/// `gpt-3.5-turbo` model.
pub const GPT_35_TURBO: &str = "gpt-3.5-turbo";

/// `text-embedding-3-large` embedding model.
pub const TEXT_EMBEDDING_3_LARGE: &str = "text-embedding-3-large";
/// `text-embedding-3-small` embedding model.
pub const TEXT_EMBEDDING_3_SMALL: &str = "text-embedding-3-small";

/// `tts-1` speech model.
pub const TTS_1: &str = "tts-1";
/// `whisper-1` transcription/translation model.
pub const WHISPER_1: &str = "whisper-1";
