use serde_json::Value;
use thiserror::Error;

use super::{NOT_SCANNED_MSG, SCANNED_MSG};

const SCANNER_MODULE: &str = "ScannerModule";

/// What the threat feed says about a submission's scan.
#[derive(Debug, Clone, PartialEq)]
pub enum ScanOutcome {
    Scanned,
    NotScanned,
    /// The body decoded but did not carry a recognisable scanner entry.
    Unrecognized(Value),
}

/// The success body was not JSON. Carries the raw text for display.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("response body is not valid JSON")]
pub struct ParseError {
    pub raw: String,
}

impl ScanOutcome {
    pub fn message(&self) -> String {
        match self {
            Self::Scanned => SCANNED_MSG.to_string(),
            Self::NotScanned => NOT_SCANNED_MSG.to_string(),
            Self::Unrecognized(value) => fenced_json(value),
        }
    }
}

/// Interpret a threat-feed response body.
///
/// Only the first `ScannerModule` entry in `metadata` is considered. A result
/// numerically equal to `1` (or `true`) means scanned; `0`, `false`, `null` or
/// a missing result means not scanned.
/// Anything else degrades to [`ScanOutcome::Unrecognized`].
pub fn interpret(body: &str) -> Result<ScanOutcome, ParseError> {
    let value: Value = serde_json::from_str(body).map_err(|_| ParseError {
        raw: body.to_string(),
    })?;
    Ok(classify(value))
}

fn classify(value: Value) -> ScanOutcome {
    let scanner = value
        .get("metadata")
        .and_then(Value::as_array)
        .and_then(|entries| {
            entries
                .iter()
                .find(|entry| entry.get("type").and_then(Value::as_str) == Some(SCANNER_MODULE))
        });

    let Some(scanner) = scanner else {
        return ScanOutcome::Unrecognized(value);
    };

    match scanner.get("result") {
        None | Some(Value::Null) => ScanOutcome::NotScanned,
        Some(result) => match scan_flag(result) {
            Some(true) => ScanOutcome::Scanned,
            Some(false) => ScanOutcome::NotScanned,
            None => ScanOutcome::Unrecognized(value),
        },
    }
}

/// `1`/`0` compared numerically, so `1.0` and `true` count as scanned.
fn scan_flag(result: &Value) -> Option<bool> {
    match result {
        Value::Bool(flag) => Some(*flag),
        Value::Number(n) => match n.as_f64() {
            Some(x) if x == 1.0 => Some(true),
            Some(x) if x == 0.0 => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// Pretty-print JSON (two-space indent) inside a ```json fence.
pub fn fenced_json(value: &Value) -> String {
    let pretty = serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
    format!("```json\n{}\n```", pretty)
}
