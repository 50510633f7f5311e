// Text extraction from loosely-shaped interaction payloads
//
// The interactions API has changed its response shape more than once, so
// extraction pattern-matches an explicit set of known shapes instead of
// probing attributes dynamically. Unknown shapes degrade to a logged dump
// of the raw value; this function never fails.

use serde_json::Value;

/// The shapes of payload this crate knows how to read text out of
enum TextShape<'a> {
    /// A bare string, or an object carrying a direct `text` field
    Direct(&'a str),
    /// A list of text-bearing parts
    Parts(&'a [Value]),
    /// An interaction object carrying an `outputs` part list
    Outputs(&'a [Value]),
    /// Nested `content` -> `parts` -> `text`
    Nested(&'a [Value]),
    /// Anything else
    Unknown,
}

fn classify(value: &Value) -> TextShape<'_> {
    if let Some(s) = value.as_str() {
        return TextShape::Direct(s);
    }
    if let Some(parts) = value.as_array() {
        return TextShape::Parts(parts);
    }
    if let Some(obj) = value.as_object() {
        if let Some(s) = obj.get("text").and_then(Value::as_str) {
            return TextShape::Direct(s);
        }
        if let Some(parts) = obj.get("outputs").and_then(Value::as_array) {
            return TextShape::Outputs(parts);
        }
        if let Some(parts) = obj
            .get("content")
            .and_then(|c| c.get("parts"))
            .and_then(Value::as_array)
        {
            return TextShape::Nested(parts);
        }
    }
    TextShape::Unknown
}

/// Produce a single newline-joined string from an interaction payload.
///
/// `None`, JSON null and empty part lists all yield an empty string. A
/// payload that matches none of the recognized shapes falls back to its
/// string coercion so callers always get something displayable.
pub fn extract_text(value: Option<&Value>) -> String {
    let Some(value) = value else {
        return String::new();
    };
    if value.is_null() {
        return String::new();
    }

    match classify(value) {
        TextShape::Direct(s) => s.to_string(),
        TextShape::Parts(parts) | TextShape::Outputs(parts) | TextShape::Nested(parts) => {
            join_parts(parts)
        }
        TextShape::Unknown => {
            log::debug!("Unrecognized interaction payload shape: {}", value);
            value.to_string()
        }
    }
}

/// Join the text of every recognized part, skipping parts with no text
fn join_parts(parts: &[Value]) -> String {
    let mut collected = Vec::new();

    for part in parts {
        let text = match classify(part) {
            TextShape::Direct(s) => s.to_string(),
            TextShape::Parts(inner) | TextShape::Outputs(inner) | TextShape::Nested(inner) => {
                join_parts(inner)
            }
            TextShape::Unknown => continue,
        };
        if !text.is_empty() {
            collected.push(text);
        }
    }

    collected.join("\n")
}
