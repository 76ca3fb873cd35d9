use axum::{
    Json,
    extract::Request,
    http::{HeaderValue, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::Deserialize;
use serde_json::json;
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct Claims {
    sub: Option<String>,
    exp: Option<usize>,
}

/// Configured caller keys, held only as SHA-256 digests.
#[derive(Debug, Default)]
pub struct ApiKeyManager {
    key_hashes: HashSet<String>,
}

impl ApiKeyManager {
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let key_hashes = keys
            .into_iter()
            .map(|key| key.as_ref().trim().to_string())
            .filter(|key| !key.is_empty())
            .map(|key| hash_key(&key))
            .collect();
        Self { key_hashes }
    }

    pub fn is_empty(&self) -> bool {
        self.key_hashes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.key_hashes.len()
    }

    pub fn validate_key(&self, key: &str) -> bool {
        self.key_hashes.contains(&hash_key(key))
    }
}

/// Decides whether a caller may reach `/api/*`.
#[derive(Debug, Default)]
pub struct CallerGate {
    keys: ApiKeyManager,
    jwt_secret: Option<String>,
}

impl CallerGate {
    pub fn new(keys: ApiKeyManager, jwt_secret: Option<String>) -> Self {
        Self {
            keys,
            jwt_secret: jwt_secret.filter(|secret| !secret.trim().is_empty()),
        }
    }

    /// No keys and no secret: identity is left to a fronting proxy.
    pub fn is_open(&self) -> bool {
        self.keys.is_empty() && self.jwt_secret.is_none()
    }

    pub fn admits(&self, token: &str) -> bool {
        if self.keys.validate_key(token) {
            return true;
        }

        if let Some(secret) = &self.jwt_secret {
            let validation = Validation::new(Algorithm::HS256);
            let key = DecodingKey::from_secret(secret.as_bytes());
            return decode::<Claims>(token, &key, &validation).is_ok();
        }

        false
    }
}

fn hash_key(value: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(value.as_bytes());
    let digest = hasher.finalize();
    hex::encode(digest)
}

pub async fn auth_middleware(req: Request, next: Next) -> Response {
    if !req.uri().path().starts_with("/api") {
        return next.run(req).await;
    }

    let Some(gate) = req.extensions().get::<Arc<CallerGate>>().cloned() else {
        return next.run(req).await;
    };

    if gate.is_open() {
        return next.run(req).await;
    }

    let token = match extract_bearer(req.headers().get(header::AUTHORIZATION)) {
        Some(token) => token,
        None => return unauthorized(),
    };

    if gate.admits(&token) {
        return next.run(req).await;
    }

    tracing::debug!(path = %req.uri().path(), "Rejected caller credentials");
    unauthorized()
}

fn extract_bearer(header: Option<&HeaderValue>) -> Option<String> {
    let value = header?.to_str().ok()?;
    value
        .strip_prefix("Bearer ")
        .or_else(|| value.strip_prefix("bearer "))
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"error": "Unauthorized"})),
    )
        .into_response()
}
