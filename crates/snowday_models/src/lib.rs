//! Service clients for Snowday.
//!
//! Each client implements one of the collaborator traits from
//! `snowday_interface`:
//!
//! - [`OpenAICompatibleClient`]: chat completions for every text task
//! - [`OpenAISpeechClient`]: text-to-speech
//! - [`HttpAlignmentClient`]: forced alignment over HTTP
//! - [`GcsObjectStore`] and [`LocalObjectStore`]: narration audio storage

#![warn(missing_docs)]

mod alignment;
mod config;
mod http;
mod openai_compat;
mod speech;
mod storage;

pub use alignment::{AlignRequest, AlignResponse, HttpAlignmentClient};
pub use config::{
    AlignerConfig, AlignerConfigBuilder, GcsConfig, GcsConfigBuilder, OpenAIConfig,
    OpenAIConfigBuilder,
};
pub use openai_compat::{ChatMessage, ChatRequest, ChatResponse, OpenAICompatibleClient};
pub use speech::{OpenAISpeechClient, SpeechRequest};
pub use storage::{GcsObjectStore, LocalObjectStore};
