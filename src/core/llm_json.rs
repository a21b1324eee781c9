use crate::utils::error::{PaljaError, Result};
use serde_json::{Map, Value};

fn json_error(message: impl Into<String>, raw: &str) -> PaljaError {
    PaljaError::LlmJson {
        message: message.into(),
        raw: raw.to_string(),
    }
}

/// Recovers the JSON object from a model reply that may be wrapped in prose
/// or code fences: direct parse first, then the span from the first `{` to the last `}`.
pub fn parse_llm_json(text: &str) -> Result<Map<String, Value>> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(json_error("empty response from model", text));
    }

    let value = match serde_json::from_str::<Value>(trimmed) {
        Ok(value) => value,
        Err(_) => {
            let (Some(start), Some(end)) = (trimmed.find('{'), trimmed.rfind('}')) else {
                return Err(json_error("no JSON object found in response", text));
            };
            if end < start {
                return Err(json_error("no JSON object found in response", text));
            }
            serde_json::from_str::<Value>(&trimmed[start..=end])
                .map_err(|e| json_error(format!("failed to parse JSON object: {}", e), text))?
        }
    };

    match value {
        Value::Object(map) => Ok(map),
        other => Err(json_error(
            format!("expected a JSON object, got {}", kind(&other)),
            text,
        )),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_direct_object() {
        let map = parse_llm_json(r#"  {"summary": "ok"}  "#).unwrap();
        assert_eq!(map["summary"], "ok");
    }

    #[test]
    fn test_extracts_embedded_object() {
        let map = parse_llm_json("Explanation text {\"a\":1} trailing").unwrap();
        assert_eq!(Value::Object(map), json!({"a": 1}));
    }

    #[test]
    fn test_code_fence() {
        let text = "```json\n{\"traits\": [\"calm\"], \"nested\": {\"x\": 2}}\n```";
        let map = parse_llm_json(text).unwrap();
        assert_eq!(map["nested"]["x"], 2);
    }

    #[test]
    fn test_no_braces_is_error() {
        let err = parse_llm_json("I cannot help with that.").unwrap_err();
        match err {
            PaljaError::LlmJson { raw, .. } => assert_eq!(raw, "I cannot help with that."),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_rejects_empty_and_non_objects() {
        assert!(parse_llm_json("   ").is_err());
        assert!(parse_llm_json("[1, 2]").is_err());
        assert!(parse_llm_json("} backwards {").is_err());
        assert!(parse_llm_json("prefix {not json} suffix").is_err());
    }
}
