use serde_json::Value;

use crate::ServiceError;

/// Flattens a completion payload into its text.
///
/// Objects must carry either a string `text` field or a Gemini
/// `candidates[0].content.parts[*].text` body. A bare JSON string is
/// unwrapped. Anything else is treated as raw text and returned untouched.
pub fn normalize_completion(body: &str) -> Result<String, ServiceError> {
    let value: Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(_) => return Ok(body.to_string()),
    };

    match value {
        Value::String(text) => Ok(text),
        Value::Object(ref map) => {
            if let Some(text) = map.get("text").and_then(Value::as_str) {
                return Ok(text.to_string());
            }
            if map.contains_key("candidates") {
                return candidate_text(&value);
            }
            Err(ServiceError::MalformedResponse(
                "response object has neither `text` nor `candidates`".into(),
            ))
        }
        _ => Ok(body.to_string()),
    }
}

fn candidate_text(value: &Value) -> Result<String, ServiceError> {
    let candidate = value
        .get("candidates")
        .and_then(|c| c.get(0))
        .ok_or_else(|| ServiceError::MalformedResponse("response has no candidates".into()))?;

    let parts = candidate
        .get("content")
        .and_then(|c| c.get("parts"))
        .and_then(Value::as_array);

    let text: String = parts
        .into_iter()
        .flatten()
        .filter_map(|part| part.get("text").and_then(Value::as_str))
        .collect();

    if text.is_empty() {
        let reason = candidate
            .get("finishReason")
            .and_then(Value::as_str)
            .unwrap_or("unknown");
        return Err(ServiceError::MalformedResponse(format!(
            "candidate carried no text (finish reason: {reason})"
        )));
    }
    Ok(text)
}
