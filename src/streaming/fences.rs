//! Markdown code-fence stripping for completion text

use regex::Regex;
use std::sync::LazyLock;

static OPENING_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^```(?:json)?\s*\n?").expect("opening fence pattern compiles"));

static CLOSING_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n?```\s*$").expect("closing fence pattern compiles"));

/// Remove a leading ```` ``` ```` or ```` ```json ```` fence and a trailing
/// ```` ``` ```` fence, then trim. Text without fences is only trimmed.
pub fn strip_code_fences(text: &str) -> String {
    let text = OPENING_FENCE.replace(text.trim(), "");
    let text = CLOSING_FENCE.replace(&text, "");
    text.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("```json\n{\"a\":1}\n```", "{\"a\":1}")]
    #[case("```\n{\"a\":1}\n```", "{\"a\":1}")]
    #[case("  {\"a\":1}  ", "{\"a\":1}")]
    #[case("```json{\"a\":1}```", "{\"a\":1}")]
    #[case("\n```json\n[1, 2]\n```\n\n", "[1, 2]")]
    fn strips_fences(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(strip_code_fences(input), expected);
    }

    #[test]
    fn fenced_completion_parses_as_json() {
        let cleaned = strip_code_fences("```json\n{\"a\":1}\n```");
        let value: serde_json::Value = serde_json::from_str(&cleaned).unwrap();
        assert_eq!(value, serde_json::json!({"a": 1}));
    }

    #[test]
    fn inner_backticks_are_kept() {
        let input = "```json\n{\"cmd\": \"```\"}\n```";
        assert_eq!(strip_code_fences(input), "{\"cmd\": \"```\"}");
    }
}
