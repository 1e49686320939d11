//! Conversions between Snowday requests and the OpenAI wire format.

use crate::openai_compat::{ChatMessage, ChatRequest, ChatResponse};
use snowday_core::GenerateRequest;
use snowday_error::{ConfigError, GenerationError, GenerationErrorKind, SnowdayResult};

/// Build a chat request, using `default_model` unless the request names one.
pub fn to_chat_request(req: &GenerateRequest, default_model: &str) -> SnowdayResult<ChatRequest> {
    let messages: Vec<ChatMessage> = req
        .messages()
        .iter()
        .map(|msg| ChatMessage {
            role: msg.role.to_string(),
            content: msg.content.clone(),
        })
        .collect();

    let model = req.model().clone().unwrap_or_else(|| default_model.to_string());

    let mut builder = ChatRequest::builder();
    builder.model(model).messages(messages);

    if let Some(max_tokens) = req.max_tokens() {
        builder.max_tokens(*max_tokens);
    }

    if let Some(temp) = req.temperature() {
        builder.temperature(*temp);
    }

    Ok(builder
        .build()
        .map_err(|e| ConfigError::new(format!("Failed to build chat request: {}", e)))?)
}

/// Text of the first choice.
pub fn from_chat_response(response: &ChatResponse, task: &str) -> SnowdayResult<String> {
    let choice = response.choices.first().ok_or_else(|| {
        GenerationError::new(GenerationErrorKind::MalformedResponse(
            "No choices in response".to_string(),
        ))
    })?;
    match choice.message.content.as_deref().map(str::trim) {
        Some(text) if !text.is_empty() => Ok(text.to_string()),
        _ => Err(GenerationError::new(GenerationErrorKind::Empty(task.to_string())).into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use snowday_core::{GenerationTask, Message};

    #[test]
    fn test_request_uses_override_model_and_roles() {
        let req = GenerateRequest::new(
            GenerationTask::Chapter,
            vec![Message::system("You write chapters."), Message::user("Write one.")],
        )
        .with_model(Some("gpt-4o".to_string()))
        .with_temperature(Some(1.0));

        let chat = to_chat_request(&req, "gpt-4o-mini").unwrap();
        assert_eq!(chat.model(), "gpt-4o");
        assert_eq!(chat.messages()[0].role, "system");
        assert_eq!(chat.messages()[1].role, "user");
        assert_eq!(*chat.temperature(), Some(1.0));

        let json = serde_json::to_value(&chat).unwrap();
        assert!(json.get("max_tokens").is_none());
    }

    #[test]
    fn test_request_falls_back_to_default_model() {
        let req = GenerateRequest::prompt(GenerationTask::Rewrite, "Rewrite this.");
        assert_eq!(to_chat_request(&req, "gpt-4o-mini").unwrap().model(), "gpt-4o-mini");
    }

    #[test]
    fn test_response_text_and_empty() {
        let ok: ChatResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"role":"assistant","content":"  A whale.  "},"finish_reason":"stop"}]}"#,
        )
        .unwrap();
        assert_eq!(from_chat_response(&ok, "draft").unwrap(), "A whale.");

        let refused: ChatResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"role":"assistant","content":null}}]}"#).unwrap();
        let err = from_chat_response(&refused, "draft").unwrap_err();
        assert!(err.is_retryable());

        let none: ChatResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert!(from_chat_response(&none, "draft").is_err());
    }
}
