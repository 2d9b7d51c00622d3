use axum::extract::Query;
use axum::http::{header, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use percent_encoding::percent_decode_str;
use serde::de::DeserializeOwned;

use crate::server::api::{self, ApiError};
use crate::server::AppState;

#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status_code: u16,
    pub status_text: &'static str,
    pub content_type: &'static str,
    pub body: String,
}

impl HttpResponse {
    fn ok(body: String) -> Self {
        Self {
            status_code: 200,
            status_text: "OK",
            content_type: "application/json",
            body,
        }
    }
}

impl IntoResponse for HttpResponse {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, [(header::CONTENT_TYPE, self.content_type)], self.body).into_response()
    }
}

fn respond(result: Result<String, ApiError>) -> HttpResponse {
    match result {
        Ok(payload) => HttpResponse::ok(payload),
        Err(ApiError::Validation(validation)) => {
            validation_error_response(400, "Bad Request", validation)
        }
        Err(err) => {
            let (status_code, status_text) = err.status();
            if status_code >= 500 {
                tracing::error!(error = %err, "request failed");
            }
            error_response(status_code, status_text, &err.to_string())
        }
    }
}

fn query<T: DeserializeOwned + Default>(uri: &Uri) -> Result<T, ApiError> {
    if uri.query().is_none() {
        return Ok(T::default());
    }
    Query::<T>::try_from_uri(uri)
        .map(|Query(value)| value)
        .map_err(|rejection| ApiError::Query(rejection.body_text()))
}

/// Percent-decode one path segment. Escapes that do not form UTF-8 are
/// rejected.
pub fn decode_segment(segment: &str) -> Result<String, ApiError> {
    percent_decode_str(segment)
        .decode_utf8()
        .map(|decoded| decoded.into_owned())
        .map_err(|err| ApiError::Path(format!("'{segment}': {err}")))
}

/// Dispatch one API request. `target` is the request path with its query string.
pub fn route_request(state: &AppState, method: &str, target: &str, body: &str) -> HttpResponse {
    let uri: Uri = match target.parse() {
        Ok(uri) => uri,
        Err(err) => return error_response(400, "Bad Request", &format!("Invalid request target: {err}")),
    };
    let segments: Vec<&str> = uri
        .path()
        .trim_matches('/')
        .split('/')
        .filter(|s| !s.is_empty())
        .collect();

    match (method, segments.as_slice()) {
        ("GET", ["api", "health"]) => respond(api::health_payload(state)),
        ("GET", ["api", "ships"]) => respond(query(&uri).and_then(|q| api::ships_payload(state, &q))),
        ("GET", ["api", "ships", name]) => {
            respond(decode_segment(name).and_then(|name| api::ship_payload(state, &name)))
        },
        ("GET", ["api", "auxiliary"]) => {
            respond(query(&uri).and_then(|q| api::auxiliary_payload(state, &q)))
        }
        ("GET", ["api", "augments"]) => {
            respond(query(&uri).and_then(|q| api::augments_payload(state, &q)))
        }
        ("GET", ["api", "rankings"]) => {
            respond(query(&uri).and_then(|q| api::rankings_payload(state, &q)))
        }
        ("POST", ["api", "ehp"]) => respond(api::ehp_payload(state, body)),
        ("POST", ["api", "fleet"]) => respond(api::fleet_payload(state, body)),
        ("POST", ["api", "sessions"]) => respond(api::create_session_payload(state)),
        ("DELETE", ["api", "sessions", id]) => respond(api::delete_session_payload(state, id)),
        ("GET", ["api", "sessions", id, "pins"]) => respond(api::pins_payload(state, id)),
        ("POST", ["api", "sessions", id, "pins"]) => respond(api::pin_payload(state, id, body)),
        ("POST", ["api", "sessions", id, "pins", "toggle"]) => {
            respond(api::toggle_payload(state, id, body))
        }
        ("POST", ["api", "sessions", id, "pins", "unpin"]) => {
            respond(api::unpin_payload(state, id, body))
        }
        ("POST", ["api", "sessions", id, "pins", "prune"]) => respond(api::prune_payload(state, id)),
        ("POST", ["api", "catalog", "reload"]) => respond(api::reload_catalog_payload(state)),
        _ => error_response(404, "Not Found", "Route not found"),
    }
}

pub fn validation_error_response(
    status_code: u16,
    status_text: &'static str,
    payload: api::ValidationErrorResponse,
) -> HttpResponse {
    let fallback =
        "{\n  \"status\": \"error\",\n  \"message\": \"Validation failed\"\n}".to_string();

    HttpResponse {
        status_code,
        status_text,
        content_type: "application/json",
        body: serde_json::to_string_pretty(&payload).unwrap_or(fallback),
    }
}

pub fn error_response(status_code: u16, status_text: &'static str, message: &str) -> HttpResponse {
    HttpResponse {
        status_code,
        status_text,
        content_type: "application/json",
        body: format!(
            "{{\n  \"status\": \"error\",\n  \"message\": {}\n}}",
            serde_json::to_string(message).unwrap_or_else(|_| "\"Unknown error\"".to_string())
        ),
    }
}
