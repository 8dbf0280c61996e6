//! Remote API gateway.
//!
//! Every remote write resolves to exactly one [`PushOutcome`]; the gateway
//! never returns an error. Callers decide what a rejection or an unreachable
//! server means for their records.

mod http;
mod requests;

pub use http::*;
pub use requests::*;

use async_trait::async_trait;
use serde_json::Value;
use tracing::warn;

/// Fields of interest from a successful API response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerData {
    /// Identifier assigned by the server (vitals only, in practice)
    pub id: Option<i64>,
    pub message: Option<String>,
}

/// Result of one push to the remote API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushOutcome {
    /// The server accepted the write.
    Ok(ServerData),
    /// The server answered but did not accept the write.
    Rejected(String),
    /// The request did not complete (connect, DNS, timeout).
    Unreachable(String),
}

impl PushOutcome {
    pub fn is_ok(&self) -> bool {
        matches!(self, PushOutcome::Ok(_))
    }

    /// Failure message, if the push did not succeed.
    pub fn failure_message(&self) -> Option<String> {
        match self {
            PushOutcome::Ok(_) => None,
            PushOutcome::Rejected(reason) => Some(format!("rejected: {}", reason)),
            PushOutcome::Unreachable(error) => Some(format!("unreachable: {}", error)),
        }
    }
}

/// The remote patient API.
#[async_trait]
pub trait RemoteGateway: Send + Sync {
    async fn register_patient(&self, request: &RegisterPatientRequest) -> PushOutcome;

    async fn add_vitals(&self, request: &VitalsRequest) -> PushOutcome;

    async fn add_visit(&self, request: &VisitRequest) -> PushOutcome;
}

/// Classify an HTTP response.
///
/// Success requires a 2xx status and a body of the form
/// `{"success": true, "data": {...}}`. `data.id` may be a number or a
/// numeric string.
pub fn interpret_response(status: u16, body: &str) -> PushOutcome {
    let parsed: Option<Value> = serde_json::from_str(body).ok();

    if !(200..300).contains(&status) {
        let detail = parsed
            .as_ref()
            .and_then(|v| v.get("message"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| truncate(body, 200));
        return PushOutcome::Rejected(format!("HTTP {}: {}", status, detail));
    }

    let Some(envelope) = parsed else {
        return PushOutcome::Rejected(format!("malformed response body: {}", truncate(body, 200)));
    };

    match envelope.get("success").and_then(Value::as_bool) {
        Some(true) => {}
        Some(false) => {
            let message = envelope
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("server reported failure");
            return PushOutcome::Rejected(message.to_string());
        }
        None => return PushOutcome::Rejected("response missing success flag".to_string()),
    }

    let Some(data) = envelope.get("data").and_then(Value::as_object) else {
        return PushOutcome::Rejected("response missing data object".to_string());
    };

    let id = match data.get("id") {
        None | Some(Value::Null) => None,
        Some(raw) => {
            let parsed = parse_id(raw);
            if parsed.is_none() {
                warn!(id = %raw, "Server returned an id that is not an integer");
            }
            parsed
        }
    };
    let message = data
        .get("message")
        .and_then(Value::as_str)
        .map(str::to_string);

    PushOutcome::Ok(ServerData { id, message })
}

/// Integer ids arrive as numbers or numeric strings.
pub(crate) fn parse_id(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let mut cut: String = text.chars().take(max_chars).collect();
        cut.push_str("...");
        cut
    }
}
