//! AnthropicModel -- concrete [`ChatModel`] implementation for Anthropic
//! Claude.
//!
//! Sends requests to the Anthropic Messages API (`/v1/messages`) with
//! proper authentication headers. System messages in the transcript are
//! lifted into the API's top-level `system` field; tool results ride in
//! user-role messages as the API requires.
//!
//! The API key is wrapped in [`secrecy::SecretString`] and is never logged
//! or included in `Debug` output.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};

use intake_core::llm::ChatModel;
use intake_types::llm::{ChatRequest, ChatResponse, LlmError, StopReason, Usage};
use intake_types::message::{ToolCall, TranscriptMessage};

use super::types::{
    AnthropicContent, AnthropicContentBlock, AnthropicErrorBody, AnthropicMessage,
    AnthropicRequest, AnthropicResponse, AnthropicTool,
};

/// Anthropic Claude chat model.
///
/// Implements [`ChatModel`] for the Anthropic Messages API.
///
/// # API Key Security
///
/// The API key is stored as a [`SecretString`] and is only exposed when
/// constructing HTTP request headers. It never appears in Debug output,
/// Display output, or tracing logs.
pub struct AnthropicModel {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
}

impl AnthropicModel {
    /// The Anthropic API version header value.
    const API_VERSION: &'static str = "2023-06-01";

    /// Create a new Anthropic chat model.
    pub fn new(api_key: SecretString) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(300))
            .build()
            .expect("failed to create reqwest client");

        Self {
            client,
            api_key,
            base_url: "https://api.anthropic.com".to_string(),
        }
    }

    /// Override the base URL (useful for testing or proxies).
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    /// Build the full API URL for a given path.
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

// AnthropicModel intentionally does NOT derive Debug so the internal state
// never reaches logs. The SecretString field would redact itself, but the
// struct stays opaque as well.

impl ChatModel for AnthropicModel {
    fn name(&self) -> &str {
        "anthropic"
    }

    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, LlmError> {
        let body = to_wire_request(request);
        let url = self.url("/v1/messages");

        let response = self
            .client
            .post(&url)
            .header("x-api-key", self.api_key.expose_secret())
            .header("anthropic-version", Self::API_VERSION)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::Transport(format!("HTTP request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let retry_after_ms = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.trim().parse::<u64>().ok())
                .map(|secs| secs.saturating_mul(1_000));
            let error_body = response.text().await.unwrap_or_default();
            let message = error_message(&error_body);

            return Err(match status.as_u16() {
                400 => LlmError::InvalidRequest(message),
                401 => LlmError::AuthenticationFailed,
                429 => LlmError::RateLimited { retry_after_ms },
                529 => LlmError::Overloaded(message),
                _ => LlmError::Provider {
                    message: format!("HTTP {status}: {message}"),
                },
            });
        }

        let wire: AnthropicResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Deserialization(format!("failed to parse response: {e}")))?;

        Ok(from_wire(wire))
    }
}

// ---------------------------------------------------------------------------
// Wire mapping
// ---------------------------------------------------------------------------

/// Convert a generic [`ChatRequest`] into an [`AnthropicRequest`].
///
/// System messages are collected into the top-level `system` field. An
/// assistant message carrying a tool call becomes a block list; a tool
/// result becomes a user-role message with a `tool_result` block.
fn to_wire_request(request: &ChatRequest) -> AnthropicRequest {
    let mut system_parts: Vec<&str> = Vec::new();
    let mut messages = Vec::new();

    for message in &request.messages {
        match message {
            TranscriptMessage::System { content } => system_parts.push(content),
            TranscriptMessage::User { content } => messages.push(AnthropicMessage {
                role: "user".to_string(),
                content: AnthropicContent::Text(content.clone()),
            }),
            TranscriptMessage::Assistant { content, tool_call } => match tool_call {
                Some(call) => {
                    let mut blocks = Vec::new();
                    if !content.is_empty() {
                        blocks.push(AnthropicContentBlock::Text {
                            text: content.clone(),
                        });
                    }
                    blocks.push(AnthropicContentBlock::ToolUse {
                        id: call.id.clone(),
                        name: call.name.clone(),
                        input: call.arguments.clone(),
                    });
                    messages.push(AnthropicMessage {
                        role: "assistant".to_string(),
                        content: AnthropicContent::Blocks(blocks),
                    });
                }
                None => messages.push(AnthropicMessage {
                    role: "assistant".to_string(),
                    content: AnthropicContent::Text(content.clone()),
                }),
            },
            TranscriptMessage::ToolResult {
                call_id,
                content,
                is_error,
            } => {
                messages.push(AnthropicMessage {
                    role: "user".to_string(),
                    content: AnthropicContent::Blocks(vec![AnthropicContentBlock::ToolResult {
                        tool_use_id: call_id.clone(),
                        content: content.clone(),
                        is_error: *is_error,
                    }]),
                });
            }
        }
    }

    let system = (!system_parts.is_empty()).then(|| system_parts.join("\n\n"));

    let tools = request.tool.as_ref().map(|tool| {
        vec![AnthropicTool {
            name: tool.name.clone(),
            description: tool.description.clone(),
            input_schema: tool.input_schema.clone(),
        }]
    });

    AnthropicRequest {
        model: request.model.clone(),
        max_tokens: request.max_tokens,
        messages,
        system,
        temperature: request.temperature,
        tools,
    }
}

/// Convert an [`AnthropicResponse`] into a generic [`ChatResponse`].
///
/// Text blocks are joined; the first `tool_use` block (the API sends at
/// most one per tool) becomes the tool call.
fn from_wire(response: AnthropicResponse) -> ChatResponse {
    let text = response
        .content
        .iter()
        .filter_map(|block| match block {
            AnthropicContentBlock::Text { text } => Some(text.as_str()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("");

    let tool_call = response.content.iter().find_map(|block| match block {
        AnthropicContentBlock::ToolUse { id, name, input } => Some(ToolCall {
            id: id.clone(),
            name: name.clone(),
            arguments: input.clone(),
        }),
        _ => None,
    });

    let stop_reason = response
        .stop_reason
        .as_deref()
        .and_then(|s| s.parse().ok())
        .unwrap_or(StopReason::EndTurn);

    ChatResponse {
        text,
        tool_call,
        stop_reason,
        usage: Usage {
            input_tokens: response.usage.input_tokens,
            output_tokens: response.usage.output_tokens,
        },
    }
}

/// Best-effort extraction of the human-readable message from an API error
/// body. Falls back to the raw body when it is not the standard envelope.
fn error_message(body: &str) -> String {
    match serde_json::from_str::<AnthropicErrorBody>(body) {
        Ok(envelope) => envelope.error.message,
        Err(_) => body.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::anthropic::types::AnthropicUsage;
    use serde_json::json;

    fn make_model() -> AnthropicModel {
        AnthropicModel::new(SecretString::from("test-key-not-real"))
    }

    fn make_request(messages: Vec<TranscriptMessage>) -> ChatRequest {
        ChatRequest {
            model: "claude-sonnet-4-20250514".to_string(),
            messages,
            max_tokens: 1024,
            temperature: None,
            tool: None,
        }
    }

    #[test]
    fn test_model_name() {
        assert_eq!(make_model().name(), "anthropic");
    }

    #[test]
    fn test_base_url_override() {
        let model = make_model().with_base_url("http://localhost:8080".to_string());
        assert_eq!(
            model.url("/v1/messages"),
            "http://localhost:8080/v1/messages"
        );
    }

    #[test]
    fn test_system_messages_lift_to_top_level() {
        let request = make_request(vec![
            TranscriptMessage::system("Collect the fields."),
            TranscriptMessage::user("hi"),
        ]);

        let wire = to_wire_request(&request);
        assert_eq!(wire.system.as_deref(), Some("Collect the fields."));
        assert_eq!(wire.messages.len(), 1);
        assert_eq!(wire.messages[0].role, "user");
        assert!(wire.tools.is_none());
    }

    #[test]
    fn test_assistant_tool_call_becomes_block_list() {
        let request = make_request(vec![TranscriptMessage::Assistant {
            content: "Recording that.".to_string(),
            tool_call: Some(ToolCall {
                id: "tc_1".to_string(),
                name: "update_Contact".to_string(),
                arguments: json!({"name": {"value": "Jane"}}),
            }),
        }]);

        let wire = to_wire_request(&request);
        let value = serde_json::to_value(&wire.messages[0]).unwrap();
        assert_eq!(value["role"], "assistant");
        assert_eq!(value["content"][0]["type"], "text");
        assert_eq!(value["content"][0]["text"], "Recording that.");
        assert_eq!(value["content"][1]["type"], "tool_use");
        assert_eq!(value["content"][1]["id"], "tc_1");
        assert_eq!(value["content"][1]["input"]["name"]["value"], "Jane");
    }

    #[test]
    fn test_silent_tool_call_omits_text_block() {
        let request = make_request(vec![TranscriptMessage::Assistant {
            content: String::new(),
            tool_call: Some(ToolCall {
                id: "tc_1".to_string(),
                name: "update_Contact".to_string(),
                arguments: json!({}),
            }),
        }]);

        let wire = to_wire_request(&request);
        let value = serde_json::to_value(&wire.messages[0]).unwrap();
        assert_eq!(value["content"].as_array().unwrap().len(), 1);
        assert_eq!(value["content"][0]["type"], "tool_use");
    }

    #[test]
    fn test_tool_result_rides_in_user_message() {
        let request = make_request(vec![TranscriptMessage::tool_error(
            "tc_1",
            "cast 'as_int' expects integer, got string",
        )]);

        let wire = to_wire_request(&request);
        let value = serde_json::to_value(&wire.messages[0]).unwrap();
        assert_eq!(value["role"], "user");
        assert_eq!(value["content"][0]["type"], "tool_result");
        assert_eq!(value["content"][0]["tool_use_id"], "tc_1");
        assert_eq!(value["content"][0]["is_error"], true);
    }

    #[test]
    fn test_tool_spec_included_when_present() {
        let mut request = make_request(vec![TranscriptMessage::user("hi")]);
        request.tool = Some(intake_types::llm::ToolSpec {
            name: "update_Contact".to_string(),
            description: "Record fields".to_string(),
            input_schema: json!({"type": "object", "properties": {}}),
        });

        let wire = to_wire_request(&request);
        let tools = wire.tools.unwrap();
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0].name, "update_Contact");
        assert_eq!(tools[0].input_schema["type"], "object");
    }

    #[test]
    fn test_from_wire_joins_text_blocks() {
        let response = AnthropicResponse {
            content: vec![
                AnthropicContentBlock::Text {
                    text: "Hello ".to_string(),
                },
                AnthropicContentBlock::Text {
                    text: "there!".to_string(),
                },
            ],
            stop_reason: Some("end_turn".to_string()),
            usage: AnthropicUsage {
                input_tokens: 10,
                output_tokens: 4,
            },
        };

        let chat = from_wire(response);
        assert_eq!(chat.text, "Hello there!");
        assert!(chat.tool_call.is_none());
        assert_eq!(chat.stop_reason, StopReason::EndTurn);
        assert_eq!(chat.usage.input_tokens, 10);
    }

    #[test]
    fn test_from_wire_extracts_tool_call() {
        let response = AnthropicResponse {
            content: vec![
                AnthropicContentBlock::Text {
                    text: "On it.".to_string(),
                },
                AnthropicContentBlock::ToolUse {
                    id: "tc_9".to_string(),
                    name: "update_Contact".to_string(),
                    input: json!({"name": {"value": "Jane"}}),
                },
            ],
            stop_reason: Some("tool_use".to_string()),
            usage: Default::default(),
        };

        let chat = from_wire(response);
        assert_eq!(chat.text, "On it.");
        let call = chat.tool_call.unwrap();
        assert_eq!(call.id, "tc_9");
        assert_eq!(call.arguments["name"]["value"], "Jane");
        assert_eq!(chat.stop_reason, StopReason::ToolUse);
    }

    #[test]
    fn test_from_wire_unknown_stop_reason_defaults_to_end_turn() {
        let response = AnthropicResponse {
            content: vec![],
            stop_reason: Some("pause_turn".to_string()),
            usage: Default::default(),
        };

        assert_eq!(from_wire(response).stop_reason, StopReason::EndTurn);
    }

    #[test]
    fn test_error_message_unwraps_envelope() {
        let body = r#"{"type": "error", "error": {"type": "overloaded_error", "message": "Server busy"}}"#;
        assert_eq!(error_message(body), "Server busy");
        assert_eq!(error_message("plain failure\n"), "plain failure");
    }
}
