//! Client for the hosted vision model that reads free-space counts off
//! camera images.
//!
//! Speaks the OpenAI-compatible chat-completions protocol: one user message
//! holding a fixed instruction plus the image as a base64 data URL. The
//! model is instructed to answer with a bare integer, or `Null` when the
//! image cannot be read.

use std::{io, path::Path, time::Duration};

use base64::Engine;
use serde::{Deserialize, Serialize};

const RECOGNITION_PROMPT: &str = "Count the free parking spaces visible in this image and reply \
     with that single integer only. If the count cannot be determined, reply Null.";

/// Errors from the vision layer.
#[derive(Debug, thiserror::Error)]
pub enum VisionError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The endpoint returned a non-2xx status code.
    #[error("vision API error ({status}): {body}")]
    Api { status: u16, body: String },

    /// The endpoint answered without any choices.
    #[error("vision API returned no choices")]
    EmptyReply,

    /// The model's reply was neither an integer nor `Null`.
    #[error("unreadable model reply: {0:?}")]
    UnreadableReply(String),
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: [ContentPart<'a>; 2],
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart<'a> {
    Text { text: &'a str },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    content: String,
}

/// Read an API key from a local file, trimming surrounding whitespace.
pub fn read_api_key(path: &Path) -> io::Result<String> {
    let contents = std::fs::read_to_string(path)?;
    Ok(contents.trim().to_string())
}

pub struct VisionClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
    max_tokens: u32,
}

impl VisionClient {
    /// Build a client for a chat-completions endpoint. The request timeout
    /// bounds how long one hosted-model call may stall the polling loop.
    pub fn new(
        endpoint: String,
        api_key: String,
        model: String,
        max_tokens: u32,
        request_timeout: Duration,
    ) -> Result<Self, VisionError> {
        let http = reqwest::Client::builder().timeout(request_timeout).build()?;
        Ok(Self {
            http,
            endpoint,
            api_key,
            model,
            max_tokens,
        })
    }

    /// Ask the model how many free spaces the image shows.
    ///
    /// `Ok(None)` means the model answered `Null`: the image was delivered
    /// but no count could be determined from it.
    pub async fn recognize_free_spaces(&self, jpeg: &[u8]) -> Result<Option<u32>, VisionError> {
        let encoded = base64::engine::general_purpose::STANDARD.encode(jpeg);
        let request = ChatRequest {
            model: &self.model,
            messages: [ChatMessage {
                role: "user",
                content: [
                    ContentPart::Text {
                        text: RECOGNITION_PROMPT,
                    },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl {
                            url: format!("data:image/jpeg;base64,{encoded}"),
                        },
                    },
                ],
            }],
            max_tokens: self.max_tokens,
        };

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(VisionError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = response.json().await?;
        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or(VisionError::EmptyReply)?;
        parse_reply(&choice.message.content)
    }
}

/// Coerce the model's textual reply into a space count.
fn parse_reply(reply: &str) -> Result<Option<u32>, VisionError> {
    let trimmed = reply.trim().trim_end_matches('.');
    if trimmed.eq_ignore_ascii_case("null") {
        return Ok(None);
    }
    trimmed
        .parse::<u32>()
        .map(Some)
        .map_err(|_| VisionError::UnreadableReply(reply.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_replies_parse() {
        assert_eq!(parse_reply("42").expect("integer"), Some(42));
        assert_eq!(parse_reply("  17\n").expect("padded integer"), Some(17));
        assert_eq!(parse_reply("0").expect("zero"), Some(0));
        assert_eq!(parse_reply("12.").expect("trailing period"), Some(12));
    }

    #[test]
    fn null_replies_mean_unreadable_image() {
        assert_eq!(parse_reply("Null").expect("null"), None);
        assert_eq!(parse_reply("null").expect("lowercase null"), None);
        assert_eq!(parse_reply(" NULL ").expect("padded null"), None);
    }

    #[test]
    fn prose_replies_are_rejected() {
        let res = parse_reply("There are about 12 free spaces.");
        assert!(matches!(res, Err(VisionError::UnreadableReply(_))));

        let res = parse_reply("-3");
        assert!(matches!(res, Err(VisionError::UnreadableReply(_))));
    }

    #[test]
    fn request_body_matches_chat_completions_shape() {
        let request = ChatRequest {
            model: "gpt-4o-mini",
            messages: [ChatMessage {
                role: "user",
                content: [
                    ContentPart::Text { text: "prompt" },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl {
                            url: "data:image/jpeg;base64,QUJD".to_string(),
                        },
                    },
                ],
            }],
            max_tokens: 150,
        };

        let value = serde_json::to_value(&request).expect("serializable");
        assert_eq!(value["model"], "gpt-4o-mini");
        assert_eq!(value["max_tokens"], 150);
        assert_eq!(value["messages"][0]["role"], "user");
        assert_eq!(value["messages"][0]["content"][0]["type"], "text");
        assert_eq!(value["messages"][0]["content"][1]["type"], "image_url");
        assert_eq!(
            value["messages"][0]["content"][1]["image_url"]["url"],
            "data:image/jpeg;base64,QUJD"
        );
    }

    #[test]
    fn response_body_parses_down_to_content() {
        let json = r#"{
            "id": "chatcmpl-1",
            "choices": [{"index": 0, "message": {"role": "assistant", "content": "23"}}]
        }"#;

        let parsed: ChatResponse = serde_json::from_str(json).expect("valid response");
        assert_eq!(parsed.choices[0].message.content, "23");
    }
}
