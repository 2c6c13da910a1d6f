//! Defensive decoding of externally-sourced structured data
//!
//! Upstream model output is best-effort JSON at most. Every field read from
//! it goes through one of these decode-with-defaults helpers so a malformed
//! field degrades to a usable value instead of failing the whole decode.

use regex::Regex;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Coerce an untrusted value into an integer score in [0, 100].
///
/// Accepts integers, floats (rounded), and numeric strings; anything else
/// yields `default`.
pub fn coerce_score(value: Option<&Value>, default: u8) -> u8 {
    let parsed = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    match parsed {
        Some(n) if n.is_finite() => n.round().clamp(0.0, 100.0) as u8,
        _ => default,
    }
}

/// Serde adapter applying [`coerce_score`] to a field of untrusted JSON.
pub fn lenient_score<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(coerce_score(Some(&value), 50))
}

/// Coerce an untrusted value into a confidence in [0, 1].
pub fn coerce_unit(value: Option<&Value>, default: f64) -> f64 {
    let parsed = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    match parsed {
        Some(n) if n.is_finite() => n.clamp(0.0, 1.0),
        _ => default,
    }
}

/// Coerce an untrusted value into a non-blank string, falling back to
/// `default` when missing, blank, or not a string.
pub fn coerce_string(value: Option<&Value>, default: &str) -> String {
    match value {
        Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
        _ => default.to_string(),
    }
}

/// Extract the first JSON object embedded in free-form model output.
///
/// Strips markdown code fences first, then takes the outermost brace span.
pub fn extract_json_object(text: &str) -> Option<Value> {
    let stripped = strip_code_fences(text);

    let start = stripped.find('{')?;
    let end = stripped.rfind('}')?;
    if end <= start {
        return None;
    }

    serde_json::from_str(&stripped[start..=end]).ok()
}

/// Reduce raw model output to readable prose by dropping JSON artifacts.
///
/// If the output parses as a JSON object, the human-readable fields are
/// pulled out and joined; otherwise braces, brackets, keys, and leftover
/// punctuation are scrubbed from the text.
pub fn clean_model_text(text: &str) -> String {
    const READABLE_KEYS: &[&str] = &[
        "summary",
        "detailed_analysis",
        "analysis",
        "explanation",
        "description",
    ];

    let stripped = strip_code_fences(text);

    if let Some(Value::Object(map)) = extract_json_object(&stripped) {
        let mut parts: Vec<String> = Vec::new();
        for key in READABLE_KEYS {
            if let Some(Value::String(s)) = map.get(*key) {
                if !s.trim().is_empty() {
                    parts.push(s.trim().to_string());
                }
            }
        }
        if let Some(Value::Array(points)) = map.get("key_evidence_points") {
            let evidence: Vec<&str> = points
                .iter()
                .filter_map(|v| v.as_str())
                .filter(|s| !s.trim().is_empty())
                .collect();
            if !evidence.is_empty() {
                parts.push(format!("Evidence: {}", evidence.join(", ")));
            }
        }
        if !parts.is_empty() {
            return parts.join(". ");
        }
    }

    let mut cleaned = stripped.into_owned();
    for pattern in [r#""[^"]*"\s*:"#, r"[{}\[\]\x22]"] {
        if let Ok(re) = Regex::new(pattern) {
            cleaned = re.replace_all(&cleaned, " ").into_owned();
        }
    }
    cleaned = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");

    cleaned.trim().to_string()
}

fn strip_code_fences(text: &str) -> std::borrow::Cow<'_, str> {
    if !text.contains("```") {
        return std::borrow::Cow::Borrowed(text);
    }
    std::borrow::Cow::Owned(text.replace("```json", " ").replace("```", " "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_coerce_score_accepts_numeric_string() {
        assert_eq!(coerce_score(Some(&json!("85")), 50), 85);
    }

    #[test]
    fn test_coerce_score_rounds_floats() {
        assert_eq!(coerce_score(Some(&json!(85.7)), 50), 86);
    }

    #[test]
    fn test_coerce_score_defaults_on_garbage() {
        assert_eq!(coerce_score(Some(&json!("not a number")), 50), 50);
        assert_eq!(coerce_score(None, 50), 50);
        assert_eq!(coerce_score(Some(&json!({"nested": true})), 50), 50);
    }

    #[test]
    fn test_coerce_score_clamps_range() {
        assert_eq!(coerce_score(Some(&json!(250)), 50), 100);
        assert_eq!(coerce_score(Some(&json!(-4)), 50), 0);
    }

    #[test]
    fn test_coerce_unit() {
        assert_eq!(coerce_unit(Some(&json!(0.75)), 0.5), 0.75);
        assert_eq!(coerce_unit(Some(&json!("0.9")), 0.5), 0.9);
        assert_eq!(coerce_unit(Some(&json!(3.0)), 0.5), 1.0);
        assert_eq!(coerce_unit(Some(&json!("high")), 0.5), 0.5);
    }

    #[test]
    fn test_coerce_string() {
        assert_eq!(coerce_string(Some(&json!("  ok ")), "d"), "ok");
        assert_eq!(coerce_string(Some(&json!("   ")), "d"), "d");
        assert_eq!(coerce_string(Some(&json!(42)), "d"), "d");
        assert_eq!(coerce_string(None, "d"), "d");
    }

    #[test]
    fn test_extract_json_object_from_fenced_output() {
        let text = "Here you go:\n```json\n{\"verdict\": \"Supported\", \"confidence\": 0.8}\n```";
        let value = extract_json_object(text).unwrap();
        assert_eq!(value["verdict"], "Supported");
    }

    #[test]
    fn test_extract_json_object_rejects_plain_prose() {
        assert!(extract_json_object("no structure here").is_none());
    }

    #[test]
    fn test_clean_model_text_pulls_readable_fields() {
        let text = r#"{"verdict": "Supported", "detailed_analysis": "Backed by multiple sources.", "key_evidence_points": ["NASA data", "peer review"]}"#;
        let cleaned = clean_model_text(text);
        assert!(cleaned.contains("Backed by multiple sources."));
        assert!(cleaned.contains("Evidence: NASA data, peer review"));
        assert!(!cleaned.contains('{'));
    }

    #[test]
    fn test_clean_model_text_scrubs_artifacts() {
        let cleaned = clean_model_text("\"verdict\": partially {unclear} [data]");
        assert!(!cleaned.contains('{'));
        assert!(!cleaned.contains('['));
        assert!(cleaned.contains("partially"));
    }
}
