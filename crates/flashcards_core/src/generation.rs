//! crates/flashcards_core/src/generation.rs
//!
//! Decoding of generation responses. Both the LLM output and the body of
//! `POST /api/generate` must be a JSON array of `{front, back}` objects.

use serde_json::Value;

use crate::domain::Card;
use crate::ports::{PortError, PortResult};

/// The result of decoding a generation response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationOutcome {
    Cards(Vec<Card>),
    Malformed(String),
}

impl GenerationOutcome {
    /// Converts the outcome into a port result, mapping `Malformed` to an error.
    pub fn into_result(self) -> PortResult<Vec<Card>> {
        match self {
            GenerationOutcome::Cards(cards) => Ok(cards),
            GenerationOutcome::Malformed(reason) => Err(PortError::MalformedResponse(reason)),
        }
    }
}

/// Decodes a response body into cards.
pub fn decode_cards(body: &str) -> GenerationOutcome {
    let value: Value = match serde_json::from_str(body) {
        Ok(v) => v,
        Err(e) => return GenerationOutcome::Malformed(format!("not JSON: {}", e)),
    };

    let items = match value {
        Value::Array(items) => items,
        Value::Object(_) => return GenerationOutcome::Malformed("expected an array, got an object".into()),
        _ => return GenerationOutcome::Malformed("expected an array".into()),
    };

    let mut cards = Vec::with_capacity(items.len());
    for (i, item) in items.into_iter().enumerate() {
        match serde_json::from_value::<Card>(item) {
            Ok(card) => cards.push(card),
            Err(e) => return GenerationOutcome::Malformed(format!("card {}: {}", i, e)),
        }
    }
    GenerationOutcome::Cards(cards)
}

/// Strips a surrounding Markdown code fence (```json ... ```), if any.
pub fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string ("json") on the opening line.
    let body = match rest.find('\n') {
        Some(pos) => &rest[pos + 1..],
        None => rest,
    };
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}
