use crate::AppState;
use axum::{
    Json,
    body::{Body, Bytes},
    extract::{State, rejection::JsonRejection},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use futures::StreamExt;
use lexrelay_core::ChatRequest;
use lexrelay_core::error::truncate_error_body;
use serde_json::json;

/// `POST /api/ai/chat`: forward a conversation and relay the reply stream.
pub async fn chat_handler(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            return error_response(
                StatusCode::BAD_REQUEST,
                format!("Invalid chat request: {}", rejection.body_text()),
            );
        }
    };

    if request.messages.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "Chat request has no messages");
    }

    let model = request.model_or(&state.default_model).to_string();
    let messages = request.rendered_messages();
    tracing::info!(model = %model, turns = messages.len(), "Relaying chat request");

    let response = match state.upstream.open(&model, &messages).await {
        Ok(response) => response,
        Err(err) => {
            tracing::warn!(
                error = %err,
                upstream = %state.upstream.url(),
                "Model provider unreachable"
            );
            return error_response(
                StatusCode::BAD_GATEWAY,
                format!("Failed to reach model provider: {}", err),
            );
        }
    };

    let status = response.status();
    if !status.is_success() {
        let body = truncate_error_body(response.text().await.unwrap_or_default());
        tracing::warn!(status = status.as_u16(), body = %body, "Model provider rejected request");
        return error_response(
            StatusCode::BAD_GATEWAY,
            format!("Model provider returned HTTP {}: {}", status.as_u16(), body),
        );
    }

    build_stream_response(response)
}

fn build_stream_response(response: reqwest::Response) -> Response {
    let headers = relay_headers(response.headers());

    let mut upstream = response.bytes_stream();
    let stream = async_stream::stream! {
        let mut relayed = 0usize;
        while let Some(chunk) = upstream.next().await {
            match chunk {
                Ok(bytes) => {
                    relayed += bytes.len();
                    yield Ok::<Bytes, std::io::Error>(bytes);
                }
                Err(err) => {
                    tracing::warn!(
                        error = %err,
                        relayed,
                        "Model provider stream failed, closing relay stream"
                    );
                    yield Err(std::io::Error::other(err));
                    return;
                }
            }
        }
        tracing::debug!(relayed, "Model provider stream finished");
    };

    let mut downstream = Body::from_stream(stream).into_response();
    *downstream.headers_mut() = headers;
    downstream
}

fn relay_headers(upstream: &reqwest::header::HeaderMap) -> HeaderMap {
    let mut headers = HeaderMap::new();
    for (name, value) in upstream.iter() {
        if is_hop_by_hop(name.as_str()) || name == header::CONTENT_LENGTH {
            continue;
        }
        headers.append(name.clone(), value.clone());
    }
    if !headers.contains_key(header::CONTENT_TYPE) {
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("text/event-stream"),
        );
    }
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers
}

pub(crate) fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(json!({ "error": message.into() }))).into_response()
}

fn is_hop_by_hop(name: &str) -> bool {
    matches!(
        name.to_ascii_lowercase().as_str(),
        "connection"
            | "keep-alive"
            | "proxy-authenticate"
            | "proxy-authorization"
            | "te"
            | "trailers"
            | "transfer-encoding"
            | "upgrade"
    )
}
