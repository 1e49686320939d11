//! OpenAI-compatible chat completions client.
//!
//! Works against any API following the chat completions format: OpenAI
//! itself, or a local server exposing the same endpoints.

mod client;
mod conversions;
mod dto;

pub use client::OpenAICompatibleClient;
pub use dto::{ChatMessage, ChatRequest, ChatResponse};
