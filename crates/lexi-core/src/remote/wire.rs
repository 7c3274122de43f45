//! Response decoding for the remote endpoint

use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use super::RemoteError;
use crate::models::WordEntry;

const SUCCESS: &str = "success";

fn parse_body(body: &str) -> Result<Value, RemoteError> {
    serde_json::from_str(body).map_err(|e| RemoteError::InvalidResponse(e.to_string()))
}

/// Fail unless the body carries `"result": "success"`
fn ensure_success(value: &Value) -> Result<(), RemoteError> {
    if value.get("result").and_then(Value::as_str) == Some(SUCCESS) {
        return Ok(());
    }

    let message = value
        .get("message")
        .and_then(Value::as_str)
        .map(String::from);
    Err(RemoteError::Rejected(message))
}

/// Decode the body of a successful `GET`
///
/// Rows without a word, or that are not objects, are skipped.
pub fn parse_fetch_response(body: &str) -> Result<Vec<WordEntry>, RemoteError> {
    let value = parse_body(body)?;
    ensure_success(&value)?;

    let rows = value
        .get("words")
        .and_then(Value::as_array)
        .ok_or_else(|| RemoteError::InvalidResponse("missing \"words\" array".to_string()))?;

    let words = rows
        .iter()
        .filter_map(|row| match WordEntry::deserialize(row) {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!("Skipping unreadable word row: {}", e);
                None
            }
        })
        .map(|mut entry| {
            entry.word = entry.word.trim().to_string();
            entry
        })
        .filter(|entry| !entry.word.is_empty())
        .collect();

    Ok(words)
}

/// Decode the body of a `POST`
pub fn parse_write_response(body: &str) -> Result<(), RemoteError> {
    ensure_success(&parse_body(body)?)
}
