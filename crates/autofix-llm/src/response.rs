use regex::Regex;
use serde::Deserialize;
use std::sync::LazyLock;

/// First fenced block: optional language tag, then the body up to the closing fence
static CODE_FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"```(?:\w+)?\n([\s\S]+?)\n```").expect("code fence regex")
});

#[derive(Debug, Deserialize)]
pub(crate) struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatChoice {
    pub message: Option<ChatMessage>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatMessage {
    pub content: Option<String>,
}

impl ChatCompletionResponse {
    /// Content of the first choice, if the service produced one
    pub fn first_content(self) -> Option<String> {
        self.choices.into_iter().next()?.message?.content
    }
}

/// Pull the file body out of a model reply.
///
/// If the reply contains a fenced block, the interior of the first one is
/// the file; otherwise the reply is used as-is.
pub fn extract_file_content(reply: &str) -> String {
    if reply.contains("```") {
        if let Some(caps) = CODE_FENCE.captures(reply) {
            return caps[1].to_string();
        }
    }
    reply.to_string()
}

/// Give `content` a final newline when `original` had one.
///
/// Fence extraction drops the newline before the closing fence.
pub fn keep_final_newline(mut content: String, original: &str) -> String {
    if original.ends_with('\n') && !content.is_empty() && !content.ends_with('\n') {
        content.push('\n');
    }
    content
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fenced_reply_with_language() {
        let reply = "Here you go:\n```python\ndef multiply(a, b):\n    return a * b\n```\nDone.";
        assert_eq!(
            extract_file_content(reply),
            "def multiply(a, b):\n    return a * b"
        );
    }

    #[test]
    fn test_first_fence_wins() {
        let reply = "```\nfirst\n```\n\n```\nsecond\n```";
        assert_eq!(extract_file_content(reply), "first");
    }

    #[test]
    fn test_plain_reply_untouched() {
        let reply = "def add(a, b):\n    return a + b\n";
        assert_eq!(extract_file_content(reply), reply);
    }

    #[test]
    fn test_final_newline_follows_original() {
        let original = "def add(a, b):\n    return a - b\n";
        let fixed = extract_file_content("```python\ndef add(a, b):\n    return a + b\n```");
        assert_eq!(
            keep_final_newline(fixed.clone(), original),
            "def add(a, b):\n    return a + b\n"
        );
        // No newline added when the original had none
        assert_eq!(keep_final_newline(fixed, "x = 1"), "def add(a, b):\n    return a + b");
        // Empty replies stay empty so they still count as no change
        assert_eq!(keep_final_newline(String::new(), original), "");
        assert_eq!(keep_final_newline("a\n".into(), original), "a\n");
    }

    #[test]
    fn test_unterminated_fence_untouched() {
        let reply = "```python\nprint('hi')";
        assert_eq!(extract_file_content(reply), reply);
    }

    #[test]
    fn test_first_content() {
        let response: ChatCompletionResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"role":"assistant","content":"x = 1"}}]}"#,
        )
        .unwrap();
        assert_eq!(response.first_content().as_deref(), Some("x = 1"));

        let empty: ChatCompletionResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert!(empty.first_content().is_none());

        let no_message: ChatCompletionResponse =
            serde_json::from_str(r#"{"choices":[{"finish_reason":"length"}]}"#).unwrap();
        assert!(no_message.first_content().is_none());
    }
}
