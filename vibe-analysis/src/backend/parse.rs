//! Reply parsing for both model contracts.
//!
//! Model output is untrusted text. Nothing here panics or fails; every
//! outcome is a [`ParseOutcome`].

use serde_json::{Map, Value};

use crate::types::{ApiStatus, CandidateResult, EnrichedResult, ParseOutcome};

/// Remove a surrounding Markdown code fence (with or without a language
/// tag) and trim. Text without a fence is only trimmed.
pub fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(open) = trimmed.find("```") else {
        return trimmed;
    };

    let after_open = &trimmed[open + 3..];
    // Skip the language tag up to the end of the fence line.
    let body_start = match after_open.find('\n') {
        Some(newline) if !after_open[..newline].contains('{') => newline + 1,
        _ => after_open
            .find(|c: char| !c.is_ascii_alphanumeric())
            .unwrap_or(after_open.len()),
    };
    let body = &after_open[body_start..];

    match body.find("```") {
        Some(close) => body[..close].trim(),
        None => body.trim(),
    }
}

/// Locate the outermost JSON object in free text (after fence removal).
pub fn extract_json_object(raw: &str) -> Option<&str> {
    let text = strip_code_fences(raw);
    let start = text.find('{')?;

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in text[start..].char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + i + 1]);
                }
            }
            _ => {}
        }
    }

    None
}

/// Validate a reply against the strict five-field contract.
///
/// Invalid when the body is not a JSON object, `sentiment` is missing or
/// empty, `sentiment_score` is not a number, or `topics` is not an array.
pub fn parse_strict(raw: &str) -> ParseOutcome {
    let body = strip_code_fences(raw);
    let map = match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => map,
        Ok(_) => return ParseOutcome::invalid("reply is not a JSON object"),
        Err(e) => return ParseOutcome::invalid(format!("reply is not JSON: {}", e)),
    };

    let Some(sentiment) = non_empty_str(&map, "sentiment") else {
        return ParseOutcome::invalid("missing sentiment");
    };
    let Some(sentiment_score) = map.get("sentiment_score").and_then(Value::as_f64) else {
        return ParseOutcome::invalid("sentiment_score is not numeric");
    };
    let Some(topics) = map.get("topics").and_then(Value::as_array) else {
        return ParseOutcome::invalid("topics is not an array");
    };

    ParseOutcome::Valid(CandidateResult {
        sentiment: Some(sentiment.to_string()),
        sentiment_score: Some(sentiment_score),
        topics: topics.clone(),
        content_warnings: map
            .get("content_warnings")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default(),
        summary: map.get("summary").cloned(),
        api_status: ApiStatus::Success,
    })
}

/// Merge a best-effort reply over the local result.
///
/// The reply must contain a JSON object with a string `sentiment`. Every
/// other field of the reply is used only when well-typed; otherwise the
/// local field is kept.
pub fn parse_merge(raw: &str, local: &EnrichedResult) -> ParseOutcome {
    let Some(body) = extract_json_object(raw) else {
        return ParseOutcome::invalid("no JSON object in reply");
    };
    let map = match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => map,
        Ok(_) => return ParseOutcome::invalid("reply is not a JSON object"),
        Err(e) => return ParseOutcome::invalid(format!("reply is not JSON: {}", e)),
    };

    let Some(sentiment) = map.get("sentiment").and_then(Value::as_str) else {
        return ParseOutcome::invalid("sentiment is not a string");
    };

    let local = CandidateResult::from(local.clone());

    ParseOutcome::Valid(CandidateResult {
        sentiment: Some(sentiment.to_string()),
        sentiment_score: map
            .get("sentiment_score")
            .and_then(Value::as_f64)
            .or(local.sentiment_score),
        topics: string_entries(&map, "topics").unwrap_or(local.topics),
        content_warnings: string_entries(&map, "content_warnings")
            .unwrap_or(local.content_warnings),
        summary: match map.get("summary") {
            Some(summary @ Value::String(_)) => Some(summary.clone()),
            _ => local.summary,
        },
        api_status: ApiStatus::Success,
    })
}

fn non_empty_str<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    map.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// String entries of an array field, or `None` when the field is not an array.
fn string_entries(map: &Map<String, Value>, key: &str) -> Option<Vec<Value>> {
    map.get(key).and_then(Value::as_array).map(|items| {
        items
            .iter()
            .filter(|item| item.is_string())
            .cloned()
            .collect()
    })
}
