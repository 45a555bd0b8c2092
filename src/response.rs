//! Turning a raw completion response into the string shown to the user.
//!
//! Two response shapes are in the wild: the legacy `completions` endpoint puts
//! the generated text in `choices[i].text`, the `chat/completions` endpoint in
//! `choices[i].message.content`. Both deserialize into [`Choice`].

use serde::{Deserialize, Deserializer, Serialize};

/// Suffix appended to replies cut off by the token budget.
pub const TRUNCATION_SUFFIX: &str = "...";
/// `finish_reason` reported when generation hit `max_tokens`.
pub const FINISH_LENGTH: &str = "length";

/// Filler tokens the model sometimes emits before the actual answer.
const LEADING_MARKERS: [&str; 3] = ["?", "any", ","];

/// A `message` object inside a chat choice
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

/// Where a choice keeps its generated text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChoiceBody {
    /// `chat/completions`: `{"message": {"content": ...}}`
    Chat { message: MessageBody },
    /// `completions`: `{"text": ...}`, also the fallback when neither field is usable
    Legacy {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        text: Option<String>,
    },
}

impl ChoiceBody {
    /// The generated text, chat shape first.
    pub fn text(&self) -> Option<&str> {
        match self {
            ChoiceBody::Chat { message } => message.content.as_deref(),
            ChoiceBody::Legacy { text } => text.as_deref(),
        }
    }
}

/// One candidate completion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    #[serde(flatten)]
    pub body: ChoiceBody,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

impl Choice {
    /// A chat-shaped choice.
    pub fn chat(content: impl Into<String>, finish_reason: &str) -> Self {
        Choice {
            body: ChoiceBody::Chat {
                message: MessageBody {
                    role: Some("assistant".to_string()),
                    content: Some(content.into()),
                },
            },
            finish_reason: Some(finish_reason.to_string()),
        }
    }

    /// A legacy completions-shaped choice.
    pub fn legacy(text: impl Into<String>, finish_reason: &str) -> Self {
        Choice {
            body: ChoiceBody::Legacy {
                text: Some(text.into()),
            },
            finish_reason: Some(finish_reason.to_string()),
        }
    }

    pub fn text(&self) -> Option<&str> {
        self.body.text()
    }

    /// Generation stopped because it ran out of tokens.
    pub fn is_truncated(&self) -> bool {
        self.finish_reason.as_deref() == Some(FINISH_LENGTH)
    }
}

/// Token accounting reported by the API
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
    #[serde(default)]
    pub total_tokens: u32,
}

/// A `completions` or `chat/completions` response body
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    /// Seconds since epoch, as reported by the API.
    #[serde(default)]
    pub created: Option<i64>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub choices: Vec<Choice>,
    #[serde(default)]
    pub usage: Option<Usage>,
}

/// Read `null` as an empty list, the same as a missing field.
pub(crate) fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

impl ApiResponse {
    pub fn from_choices(choices: Vec<Choice>) -> Self {
        ApiResponse {
            choices,
            ..Default::default()
        }
    }
}

/// Format the first choice of `response` for display.
///
/// Never fails: a missing response, an empty `choices` array or a choice
/// without text all produce an empty body. A `"length"` finish reason appends
/// [`TRUNCATION_SUFFIX`] even when the body is empty.
pub fn normalize(response: Option<&ApiResponse>) -> String {
    let Some(choice) = response.and_then(|r| r.choices.first()) else {
        return String::new();
    };
    let body = strip_leading_marker(choice.text().unwrap_or_default().trim_start()).trim();
    if choice.is_truncated() {
        format!("{body}{TRUNCATION_SUFFIX}")
    } else {
        body.to_string()
    }
}

/// Remove one leading marker, if any. Stacked markers are left alone after the first.
fn strip_leading_marker(text: &str) -> &str {
    LEADING_MARKERS
        .iter()
        .find_map(|marker| text.strip_prefix(marker))
        .unwrap_or(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chat(content: &str, finish_reason: &str) -> ApiResponse {
        ApiResponse::from_choices(vec![Choice::chat(content, finish_reason)])
    }

    #[test]
    fn valid_chat_response() {
        let response = chat("This is a valid response", "stop");
        assert_eq!(normalize(Some(&response)), "This is a valid response");
    }

    #[test]
    fn empty_choices_is_empty() {
        assert_eq!(normalize(Some(&ApiResponse::default())), "");
        assert_eq!(normalize(None), "");
    }

    #[test]
    fn truncated_response_gets_ellipsis() {
        let long = "a".repeat(24);
        let response = chat(&long, "length");
        assert_eq!(normalize(Some(&response)), format!("{long}..."));
    }

    #[test]
    fn truncated_empty_body_still_gets_ellipsis() {
        let response = chat("  ", "length");
        assert_eq!(normalize(Some(&response)), "...");
    }

    #[test]
    fn null_content_is_empty() {
        let response: ApiResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"content":null},"finish_reason":"stop"}]}"#,
        )
        .unwrap();
        assert_eq!(normalize(Some(&response)), "");
    }

    #[test]
    fn unknown_finish_reason_has_no_suffix() {
        let response = chat("This is a valid response", "invalid");
        assert_eq!(normalize(Some(&response)), "This is a valid response");
    }

    #[test]
    fn leading_question_mark_is_stripped() {
        let response = chat("? Perfect Answer", "stop");
        assert_eq!(normalize(Some(&response)), "Perfect Answer");
    }

    #[test]
    fn each_marker_is_stripped() {
        for (raw, expected) in [
            ("\n\nany Rust is great", "Rust is great"),
            (", of course", "of course"),
            ("?", ""),
            ("any", ""),
        ] {
            assert_eq!(normalize(Some(&chat(raw, "stop"))), expected, "{raw:?}");
        }
    }

    #[test]
    fn only_one_marker_is_stripped() {
        let response = chat("?,any answer", "stop");
        assert_eq!(normalize(Some(&response)), ",any answer");
    }

    #[test]
    fn marker_in_the_middle_is_kept() {
        let response = chat("Why? Because.", "stop");
        assert_eq!(normalize(Some(&response)), "Why? Because.");
    }

    #[test]
    fn normalizing_output_again_is_stable() {
        let once = normalize(Some(&chat("? Perfect Answer ", "stop")));
        let twice = normalize(Some(&chat(&once, "stop")));
        assert_eq!(once, twice);
    }

    #[test]
    fn only_first_choice_is_used() {
        let response = ApiResponse::from_choices(vec![
            Choice::chat("first", "stop"),
            Choice::chat("second", "length"),
        ]);
        assert_eq!(normalize(Some(&response)), "first");
    }

    #[test]
    fn legacy_text_shape() {
        let response: ApiResponse = serde_json::from_str(
            r#"{"id":"cmpl-1","object":"text_completion","created":1700000000,
                "choices":[{"text":"\n\nHello there","index":0,"logprobs":null,
                            "finish_reason":"length"}]}"#,
        )
        .unwrap();
        assert_eq!(response.created, Some(1_700_000_000));
        assert_eq!(normalize(Some(&response)), "Hello there...");
    }

    #[test]
    fn chat_shape_wins_over_text() {
        let response: ApiResponse = serde_json::from_str(
            r#"{"choices":[{"text":"legacy",
                            "message":{"role":"assistant","content":"chat"},
                            "finish_reason":"stop"}]}"#,
        )
        .unwrap();
        assert_eq!(normalize(Some(&response)), "chat");
    }

    #[test]
    fn choice_without_any_text_is_empty() {
        let response: ApiResponse =
            serde_json::from_str(r#"{"choices":[{"finish_reason":"stop"}]}"#).unwrap();
        assert_eq!(normalize(Some(&response)), "");
    }

    #[test]
    fn null_choices_is_empty() {
        let response: ApiResponse =
            serde_json::from_str(r#"{"id":"x","choices":null}"#).unwrap();
        assert!(response.choices.is_empty());
        assert_eq!(normalize(Some(&response)), "");
    }

    #[test]
    fn missing_choices_field_is_empty() {
        let response: ApiResponse = serde_json::from_str(r#"{"id":"x"}"#).unwrap();
        assert!(response.choices.is_empty());
        assert_eq!(normalize(Some(&response)), "");
    }
}
