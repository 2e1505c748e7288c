//! Provider client implementations.
//!
//! Each submodule contains a complete client for one provider's HTTP API:
//! wire types, request formatting, streaming decoding, and the capability
//! trait implementations.

pub mod gemini;
pub mod openai;
