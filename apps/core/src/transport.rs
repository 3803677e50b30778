use serde::{Deserialize, Serialize};

use crate::contract::{SessionEvent, SessionRequest, SessionResponse, SessionState};
use crate::resolver::Resolver;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    InvalidJson,
    Internal,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    pub code: ErrorCode,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TransportResponse {
    Ok { response: SessionResponse },
    Err { error: ErrorResponse },
}

/// Applies one gesture and reports the resulting events plus a state snapshot.
pub fn handle_request(resolver: &mut Resolver, request: SessionRequest) -> SessionResponse {
    let events = match request {
        SessionRequest::TextChanged { text } => resolver.text_changed(&text),
        SessionRequest::Commit => resolver.commit(),
        SessionRequest::Complete => resolver.complete(),
        SessionRequest::MoveUp => resolver.move_up(),
        SessionRequest::MoveDown => resolver.move_down(),
        SessionRequest::ItemSelected(entry) => resolver.item_selected(&entry.into()),
        SessionRequest::Reset => resolver.reset(),
        SessionRequest::State => Vec::new(),
    };

    SessionResponse {
        events: events.into_iter().map(SessionEvent::from).collect(),
        state: SessionState::capture(resolver),
    }
}

pub fn handle_json(resolver: &mut Resolver, payload: &str) -> String {
    let response = match serde_json::from_str::<SessionRequest>(payload) {
        Ok(request) => TransportResponse::Ok {
            response: handle_request(resolver, request),
        },
        Err(error) => TransportResponse::Err {
            error: ErrorResponse {
                code: ErrorCode::InvalidJson,
                message: error.to_string(),
            },
        },
    };

    serde_json::to_string(&response).unwrap_or_else(|error| {
        tracing::error!(%error, "transport response failed to serialize");
        format!(
            r#"{{"status":"err","error":{{"code":"internal","message":{}}}}}"#,
            serde_json::Value::String(error.to_string())
        )
    })
}
