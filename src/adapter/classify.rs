//! Maps backend failures onto [`GenerationError`].
//!
//! Structured signals win: 401 and 429 first, then a machine-readable code
//! from the error envelope. Substring matching on the message runs last and is
//! best-effort only; vendors change their wording without notice. A 403 is
//! only an authentication failure once neither the code nor the message says
//! otherwise: fal.ai answers an exhausted balance with 403.

use crate::error::GenerationError;
use serde_json::Value;

const MAX_DETAIL_CHARS: usize = 300;

const AUTH_CODES: &[&str] = &[
    "invalid_api_key",
    "invalid_authentication",
    "authentication_error",
    "unauthenticated",
    "permission_denied",
    "accessdeniedexception",
    "unrecognizedclientexception",
    "expiredtokenexception",
];

const RATE_CODES: &[&str] = &[
    "rate_limit_exceeded",
    "insufficient_quota",
    "billing_hard_limit_reached",
    "too_many_requests",
    "resource_exhausted",
    "throttlingexception",
    "servicequotaexceededexception",
];

const POLICY_CODES: &[&str] = &[
    "content_policy_violation",
    "moderation_blocked",
    "content_filter",
    "safety",
];

/// Classifies a non-2xx HTTP response.
pub fn classify_http_failure(status: u16, body: &str) -> GenerationError {
    let envelope: Option<Value> = serde_json::from_str(body).ok();
    let detail = envelope
        .as_ref()
        .and_then(error_message)
        .unwrap_or_else(|| truncate(body.trim()));

    if let Some(err) = classify_status(status, &detail) {
        return err;
    }
    if let Some(err) = envelope
        .as_ref()
        .and_then(|envelope| classify_envelope_codes(envelope, &detail))
    {
        return err;
    }
    if status == 403 {
        return match classify_message(&detail) {
            err @ (GenerationError::RateLimited(_) | GenerationError::ContentPolicy(_)) => err,
            _ => GenerationError::Authentication(detail),
        };
    }
    classify_message(&format!("API error {}: {}", status, detail))
}

pub fn classify_status(status: u16, detail: &str) -> Option<GenerationError> {
    match status {
        401 => Some(GenerationError::Authentication(detail.to_string())),
        429 => Some(GenerationError::RateLimited(detail.to_string())),
        _ => None,
    }
}

/// Looks a vendor error code up in the known tables, case-insensitively.
pub fn classify_code(code: &str, detail: &str) -> Option<GenerationError> {
    let code = code.trim().to_ascii_lowercase();
    let detail = if detail.is_empty() { code.clone() } else { detail.to_string() };

    if AUTH_CODES.contains(&code.as_str()) {
        Some(GenerationError::Authentication(detail))
    } else if RATE_CODES.contains(&code.as_str()) {
        Some(GenerationError::RateLimited(detail))
    } else if POLICY_CODES.contains(&code.as_str()) {
        Some(GenerationError::ContentPolicy(detail))
    } else {
        None
    }
}

/// Last-resort classification on free text.
pub fn classify_message(message: &str) -> GenerationError {
    let lower = message.to_ascii_lowercase();
    let has = |needles: &[&str]| needles.iter().any(|n| lower.contains(n));

    if has(&["401", "unauthorized", "auth", "api key", "api_key"]) {
        GenerationError::Authentication(message.to_string())
    } else if has(&[
        "429",
        "quota",
        "rate limit",
        "too many requests",
        "throttl",
        "balance",
        "exhausted",
    ]) {
        GenerationError::RateLimited(message.to_string())
    } else if has(&["safety", "content policy", "content filter", "nsfw", "moderation"]) {
        GenerationError::ContentPolicy(message.to_string())
    } else {
        GenerationError::Unknown(message.to_string())
    }
}

/// First known value among `error.code`, `error.status`, `error.type` and the
/// same keys at the top level.
fn classify_envelope_codes(envelope: &Value, detail: &str) -> Option<GenerationError> {
    let scopes = [envelope.get("error"), Some(envelope)];
    scopes
        .into_iter()
        .flatten()
        .flat_map(|scope| ["code", "status", "type"].map(|key| scope.get(key)))
        .flatten()
        .filter_map(Value::as_str)
        .find_map(|code| classify_code(code, detail))
}

fn error_message(envelope: &Value) -> Option<String> {
    let message = envelope
        .get("error")
        .and_then(|error| error.get("message").or(Some(error)))
        .and_then(Value::as_str)
        .or_else(|| envelope.get("detail").and_then(Value::as_str))
        .or_else(|| envelope.get("message").and_then(Value::as_str))
        .map(str::to_string)
        .or_else(|| {
            // fal.ai validation errors carry a list of {msg, loc}
            envelope
                .get("detail")
                .and_then(Value::as_array)
                .and_then(|items| items.first())
                .and_then(|item| item.get("msg"))
                .and_then(Value::as_str)
                .map(str::to_string)
        })?;
    Some(truncate(&message))
}

fn truncate(text: &str) -> String {
    if text.chars().count() <= MAX_DETAIL_CHARS {
        text.to_string()
    } else {
        let cut: String = text.chars().take(MAX_DETAIL_CHARS).collect();
        format!("{}...", cut)
    }
}
