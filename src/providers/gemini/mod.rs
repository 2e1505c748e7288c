//! Google Gemini API client: chat completions and embeddings.
//!
//! # Example
//! ```
//! use generative::providers::gemini;
//!
//! let client = gemini::Client::new("YOUR_API_KEY");
//! ```

pub mod client;
pub mod completion;
pub mod embedding;
pub mod streaming;

pub use client::{Client, ClientBuilder};

/// `gemini-1.5-pro` model.
pub const GEMINI_1_5_PRO: &str = "gemini-1.5-pro";
/// `gemini-1.5-flash` model.
pub const GEMINI_1_5_FLASH: &str = "gemini-1.5-flash";
/// `gemini-2.0-flash` model.
pub const GEMINI_2_0_FLASH: &str = "gemini-2.0-flash";

/// `text-embedding-004` embedding model.
pub const TEXT_EMBEDDING_004: &str = "text-embedding-004";
