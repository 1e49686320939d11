//! Live API tests. Run with `cargo test -p snowday_models --features api -- --ignored`.

#![cfg(feature = "api")]

use snowday_core::{GenerateRequest, GenerationTask};
use snowday_interface::{SpeechSynthesizer, TextGenerator};
use snowday_models::{OpenAICompatibleClient, OpenAIConfig, OpenAISpeechClient};

#[tokio::test]
#[ignore] // Requires OPENAI_API_KEY
async fn test_chat_completion() {
    dotenvy::dotenv().ok();
    let client = OpenAICompatibleClient::new(
        OpenAIConfig::from_env().unwrap(),
        "gpt-4o-mini".to_string(),
        "openai",
    )
    .unwrap();

    let text = client
        .generate(&GenerateRequest::prompt(
            GenerationTask::ComprehensionQuestion,
            "Ask one question about: The brave whale sang.",
        ))
        .await
        .unwrap();
    assert!(!text.is_empty());
}

#[tokio::test]
#[ignore] // Requires OPENAI_API_KEY
async fn test_speech() {
    dotenvy::dotenv().ok();
    let client = OpenAISpeechClient::new(OpenAIConfig::from_env().unwrap(), "tts-1", "sage").unwrap();
    let audio = client.synthesize("The cat sat.").await.unwrap();
    assert!(!audio.is_empty());
}
