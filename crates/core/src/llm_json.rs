//! Recovery of JSON objects embedded in free-form model output.

use regex::Regex;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::OnceLock;

fn fenced_block() -> Option<&'static Regex> {
    static FENCED: OnceLock<Option<Regex>> = OnceLock::new();
    FENCED
        .get_or_init(|| Regex::new(r"(?s)```(?:json)?\s*(.*?)```").ok())
        .as_ref()
}

fn brace_object() -> Option<&'static Regex> {
    static BRACES: OnceLock<Option<Regex>> = OnceLock::new();
    BRACES.get_or_init(|| Regex::new(r"(?s)(\{.*\})").ok()).as_ref()
}

pub fn json_candidates(text: &str) -> Vec<&str> {
    let mut candidates = Vec::with_capacity(3);

    if let Some(found) = fenced_block()
        .and_then(|pattern| pattern.captures(text))
        .and_then(|capture| capture.get(1))
    {
        candidates.push(found.as_str());
    }
    if let Some(found) = brace_object()
        .and_then(|pattern| pattern.captures(text))
        .and_then(|capture| capture.get(1))
    {
        candidates.push(found.as_str());
    }
    candidates.push(text);

    candidates
}

pub fn extract_json<T: DeserializeOwned>(text: &str) -> Option<T> {
    json_candidates(text).into_iter().find_map(|candidate| {
        match serde_json::from_str::<Value>(candidate.trim()) {
            Ok(value @ Value::Object(_)) => serde_json::from_value(value).ok(),
            _ => None,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Map;

    fn extract_json_object(text: &str) -> Option<Map<String, Value>> {
        extract_json(text)
    }

    #[test]
    fn fenced_block_wins_over_surrounding_text() {
        let text = "Here you go:\n```json\n{\"a\": 1}\n```\nAnything else? {\"b\": 2}";
        let object = extract_json_object(text).expect("fenced json");
        assert_eq!(object.get("a"), Some(&Value::from(1)));
    }

    #[test]
    fn untagged_fence_is_accepted() {
        let object = extract_json_object("```\n{\"a\": true}\n```").expect("fenced json");
        assert_eq!(object.get("a"), Some(&Value::Bool(true)));
    }

    #[test]
    fn bare_object_inside_prose_is_found() {
        let text = "The analysis is {\"topic\": \"rust\"} as requested.";
        let object = extract_json_object(text).expect("brace json");
        assert_eq!(object.get("topic"), Some(&Value::from("rust")));
    }

    #[test]
    fn broken_fence_falls_through_to_braces() {
        let text = "```json\nnot json\n``` then {\"ok\": 1}";
        let object = extract_json_object(text).expect("brace fallback");
        assert_eq!(object.get("ok"), Some(&Value::from(1)));
    }

    #[test]
    fn arrays_and_prose_are_rejected() {
        assert!(extract_json_object("[1, 2, 3]").is_none());
        assert!(extract_json_object("no json at all").is_none());
        assert!(extract_json_object("").is_none());
    }
}
