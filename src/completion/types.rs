use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::context::Message;
use crate::error::ChatError;

/// Body of a chat completion call.
#[derive(Debug, Clone, Serialize)]
pub struct CompletionRequest<'a> {
    pub model: &'a str,
    pub messages: &'a [Message],
}

/// Reply of a chat completion call.
///
/// Both fields are optional on the wire; [`CompletionResponse::validate`]
/// decides whether the reply is usable.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompletionResponse {
    #[serde(default)]
    pub choices: Option<Vec<Choice>>,
    #[serde(default)]
    pub usage: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Choice {
    #[serde(default)]
    pub message: Option<Message>,
}

/// A reply that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidResponse {
    pub messages: Vec<Message>,
    pub usage: Vec<(String, u64)>,
}

impl CompletionResponse {
    /// Builds a well-formed reply carrying one message.
    pub fn single(message: Message, usage: &[(&str, u64)]) -> Self {
        Self {
            choices: Some(vec![Choice {
                message: Some(message),
            }]),
            usage: Some(
                usage
                    .iter()
                    .map(|(name, value)| ((*name).to_string(), Value::from(*value)))
                    .collect(),
            ),
        }
    }

    /// Returns `true` when both `choices` and `usage` are present.
    pub const fn is_complete(&self) -> bool {
        self.choices.is_some() && self.usage.is_some()
    }

    /// Checks the reply shape and extracts the messages and integer counters.
    ///
    /// Non-integer usage entries (nested detail objects) are skipped.
    pub fn validate(self) -> Result<ValidResponse, ChatError> {
        let choices = self
            .choices
            .ok_or_else(|| ChatError::MalformedResponse("missing 'choices' field".into()))?;
        let usage = self
            .usage
            .ok_or_else(|| ChatError::MalformedResponse("missing 'usage' field".into()))?;

        let messages: Vec<Message> = choices.into_iter().filter_map(|c| c.message).collect();
        if messages.is_empty() {
            return Err(ChatError::MalformedResponse(
                "no choice carries a message".into(),
            ));
        }

        let usage = usage
            .into_iter()
            .filter_map(|(name, value)| value.as_u64().map(|v| (name, v)))
            .collect();

        Ok(ValidResponse { messages, usage })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn parse(json: &str) -> CompletionResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_validate_openai_reply() {
        let response = parse(
            r#"{
                "id": "chatcmpl-1",
                "choices": [{"index": 0, "message": {"role": "assistant", "content": "hello"}, "finish_reason": "stop"}],
                "usage": {"completion_tokens": 1, "prompt_tokens": 1, "total_tokens": 2,
                          "prompt_tokens_details": {"cached_tokens": 0}}
            }"#,
        );
        assert!(response.is_complete());

        let valid = response.validate().unwrap();
        assert_eq!(valid.messages, vec![Message::new("assistant", "hello")]);
        assert_eq!(valid.usage.len(), 3);
        assert!(valid.usage.contains(&("total_tokens".to_string(), 2)));
    }

    #[test]
    fn test_validate_missing_usage() {
        let response = parse(r#"{"choices": [{"message": {"role": "assistant", "content": "x"}}]}"#);
        assert!(!response.is_complete());
        let err = response.validate().unwrap_err();
        assert!(err.to_string().contains("usage"));
    }

    #[test]
    fn test_validate_missing_choices() {
        let response = parse(r#"{"usage": {"total_tokens": 2}}"#);
        let err = response.validate().unwrap_err();
        assert!(err.to_string().contains("choices"));
    }

    #[test]
    fn test_validate_choices_without_messages() {
        let response = parse(r#"{"choices": [{"index": 0}], "usage": {"total_tokens": 2}}"#);
        assert!(response.is_complete());
        assert!(matches!(
            response.validate(),
            Err(ChatError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_request_serializes_model_and_messages() {
        let messages = vec![Message::user("hi")];
        let request = CompletionRequest {
            model: "gpt-3.5-turbo",
            messages: &messages,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "gpt-3.5-turbo");
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"], "hi");
    }
}
