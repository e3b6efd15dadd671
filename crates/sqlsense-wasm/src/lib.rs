//! JSON-in/JSON-out bindings for browser editors.
//!
//! Every function accepts a JSON request and returns a JSON response. None of
//! them throw: a malformed request yields a response whose `error` field says
//! why, with the payload left empty.

pub mod encoding;

use serde::{Deserialize, Serialize};
use sqlsense_core::{
    AssistConfig, BufferSnapshot, Catalog, Documentation, Position, Range, SqlAssistant,
    StatementSpan, Suggestion,
};
use wasm_bindgen::prelude::*;

use crate::encoding::{position_to_core, range_from_core, Encoding};

const SERIALIZE_FALLBACK: &str = r#"{"error":"Failed to serialize response"}"#;

/// Request for completions or hover at a position.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionRequest {
    pub sql: String,
    pub position: Position,
    #[serde(default)]
    pub catalog: Catalog,
    #[serde(default)]
    pub config: AssistConfig,
    #[serde(default)]
    pub encoding: Encoding,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpanRequest {
    pub sql: String,
    pub line: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartsRequest {
    pub sql: String,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionResponse {
    pub items: Vec<Suggestion>,
    /// Range the accepted item replaces, in the request's encoding.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replace_range: Option<Range>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HoverResponse {
    pub documentation: Option<Documentation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpanResponse {
    pub span: Option<StatementSpan>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartsResponse {
    pub starts: Vec<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Installs the panic hook (and the tracing layer when built with `tracing`).
#[wasm_bindgen]
pub fn init() {
    console_error_panic_hook::set_once();
    #[cfg(feature = "tracing")]
    tracing_wasm::set_as_global_default();
}

/// Completion candidates at `position`.
#[wasm_bindgen]
pub fn completions_json(request_json: &str) -> String {
    let request: PositionRequest = match serde_json::from_str(request_json) {
        Ok(request) => request,
        Err(e) => {
            return to_json(&CompletionResponse {
                error: Some(format!("Invalid request format: {e}")),
                ..Default::default()
            })
        }
    };

    let buffer = BufferSnapshot::new(request.sql);
    let assistant = SqlAssistant::new(&request.catalog, request.config);
    let cursor = position_to_core(&buffer, request.position, request.encoding);

    let completions = assistant.complete(&buffer, cursor);

    to_json(&CompletionResponse {
        items: completions.items,
        replace_range: Some(range_from_core(
            &buffer,
            completions.replace_range,
            request.encoding,
        )),
        error: None,
    })
}

/// Hover documentation for the word at `position`.
#[wasm_bindgen]
pub fn hover_json(request_json: &str) -> String {
    let request: PositionRequest = match serde_json::from_str(request_json) {
        Ok(request) => request,
        Err(e) => {
            return to_json(&HoverResponse {
                error: Some(format!("Invalid request format: {e}")),
                ..Default::default()
            })
        }
    };

    let buffer = BufferSnapshot::new(request.sql);
    let assistant = SqlAssistant::new(&request.catalog, request.config);
    let pointer = position_to_core(&buffer, request.position, request.encoding);

    let documentation = assistant.get_hover(&buffer, pointer).map(|mut doc| {
        doc.range = range_from_core(&buffer, doc.range, request.encoding);
        doc
    });

    to_json(&HoverResponse {
        documentation,
        error: None,
    })
}

/// Line span of the statement containing `line`.
#[wasm_bindgen]
pub fn statement_span_json(request_json: &str) -> String {
    match serde_json::from_str::<SpanRequest>(request_json) {
        Ok(request) => {
            let buffer = BufferSnapshot::new(request.sql);
            to_json(&SpanResponse {
                span: Some(sqlsense_core::statement_span(&buffer, request.line)),
                error: None,
            })
        }
        Err(e) => to_json(&SpanResponse {
            span: None,
            error: Some(format!("Invalid request format: {e}")),
        }),
    }
}

/// Lines where top-level statements begin.
#[wasm_bindgen]
pub fn statement_starts_json(request_json: &str) -> String {
    match serde_json::from_str::<StartsRequest>(request_json) {
        Ok(request) => {
            let buffer = BufferSnapshot::new(request.sql);
            to_json(&StartsResponse {
                starts: sqlsense_core::statement_starts(&buffer),
                error: None,
            })
        }
        Err(e) => to_json(&StartsResponse {
            starts: Vec::new(),
            error: Some(format!("Invalid request format: {e}")),
        }),
    }
}

/// Get version information
#[wasm_bindgen]
pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn to_json<T: Serialize>(response: &T) -> String {
    serde_json::to_string(response).unwrap_or_else(|_| SERIALIZE_FALLBACK.to_string())
}
