//! Outbound completion payloads for the guided endpoint
//!
//! The persona message is fixed at compile time so every guided request
//! carries the same behavioural constraints.

use crate::forwarder::types::{ForwardError, ForwardResult, Prompt, MAX_COMPLETION_TOKENS};
use serde::{Deserialize, Serialize};

/// System message that shapes every guided conversation
pub const PERSONA_PROMPT: &str = concat!(
    "You are Milo, a friendly and caring AI buddy who talks to children. ",
    "Use simple words, short sentences, and a playful, kind tone. ",
    "Always encourage the child to share their thoughts and feelings, but never give medical or harmful advice. ",
    "If a child shares something serious, respond gently and suggest they talk to a parent, teacher, or trusted adult. ",
    "Never use scary, violent, or inappropriate words. ",
    "Do not use any emojis, emoticons, or special symbols in your responses - only use regular text and words. ",
    "Speak as if you are a supportive friend about the same age as the child, but always remain respectful and safe.",
);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

#[derive(Clone, Debug, Serialize)]
pub struct ChatMessage<'a> {
    pub role: Role,
    pub content: &'a str,
}

/// Chat completions request body sent for a guided prompt
#[derive(Clone, Debug, Serialize)]
pub struct CompletionRequest<'a> {
    pub messages: [ChatMessage<'a>; 2],
    pub max_tokens: u32,
}

impl<'a> CompletionRequest<'a> {
    pub fn guided(prompt: &'a Prompt) -> Self {
        Self {
            messages: [
                ChatMessage {
                    role: Role::System,
                    content: PERSONA_PROMPT,
                },
                ChatMessage {
                    role: Role::User,
                    content: prompt.as_ref(),
                },
            ],
            max_tokens: MAX_COMPLETION_TOKENS,
        }
    }
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: String,
}

/// Pull the first candidate's text out of a chat completions payload
pub fn extract_reply(body: &[u8]) -> ForwardResult<String> {
    let response: CompletionResponse = serde_json::from_slice(body)
        .map_err(|e| ForwardError::UpstreamProtocol(e.to_string()))?;

    response
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message.content)
        .ok_or_else(|| ForwardError::UpstreamProtocol("completion has no choices".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_guided_request_shape() {
        let prompt = Prompt::try_new("Hello Milo".to_string()).unwrap();
        let body = serde_json::to_value(CompletionRequest::guided(&prompt)).unwrap();

        assert_eq!(
            body,
            json!({
                "messages": [
                    { "role": "system", "content": PERSONA_PROMPT },
                    { "role": "user", "content": "Hello Milo" }
                ],
                "max_tokens": 200
            })
        );
    }

    #[test]
    fn test_persona_forbids_symbols_and_redirects_to_adults() {
        assert!(PERSONA_PROMPT.contains("trusted adult"));
        assert!(PERSONA_PROMPT.contains("emojis"));
        assert!(PERSONA_PROMPT.contains("never give medical or harmful advice"));
    }

    #[test]
    fn test_extract_reply_takes_first_choice() {
        let body = json!({
            "choices": [
                { "message": { "role": "assistant", "content": "first" } },
                { "message": { "role": "assistant", "content": "second" } }
            ]
        });

        let reply = extract_reply(body.to_string().as_bytes()).unwrap();
        assert_eq!(reply, "first");
    }

    #[test]
    fn test_extract_reply_rejects_malformed_payloads() {
        let cases = [
            json!({}),
            json!({ "choices": [] }),
            json!({ "choices": [{}] }),
            json!({ "choices": [{ "message": { "content": null } }] }),
        ];

        for case in cases {
            let result = extract_reply(case.to_string().as_bytes());
            assert!(
                matches!(result, Err(ForwardError::UpstreamProtocol(_))),
                "expected protocol error for {case}"
            );
        }

        assert!(matches!(
            extract_reply(b"not json"),
            Err(ForwardError::UpstreamProtocol(_))
        ));
    }
}
