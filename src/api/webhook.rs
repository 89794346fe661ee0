//! Inbound webhook from the external auth provider.
//!
//! Events are signed svix-style: HMAC-SHA256 over `{id}.{timestamp}.{body}`
//! keyed with the shared secret, base64-encoded, delivered in the
//! `webhook-signature` header as space-separated `v1,<sig>` entries. The
//! signature is checked over the raw body bytes before any JSON parsing.

use axum::{
    body::Bytes,
    extract::State,
    http::HeaderMap,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;

use super::{ok, ApiResult};
use crate::auth::constant_time_compare;
use crate::errors::AppError;
use crate::models::CreateUserRequest;
use crate::AppState;

const ID_HEADER: &str = "webhook-id";
const TIMESTAMP_HEADER: &str = "webhook-timestamp";
const SIGNATURE_HEADER: &str = "webhook-signature";

/// Envelope of an auth provider event.
#[derive(Debug, Deserialize)]
struct WebhookEvent {
    #[serde(rename = "type")]
    event_type: String,
    data: serde_json::Value,
}

/// Payload of a `user.created` event.
#[derive(Debug, Deserialize)]
struct UserCreatedData {
    id: String,
    #[serde(default)]
    first_name: Option<String>,
    #[serde(default)]
    last_name: Option<String>,
    #[serde(default)]
    username: Option<String>,
}

/// POST /api/webhooks/auth - Receive external auth provider events.
pub async fn auth_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<serde_json::Value> {
    let Some(secret) = state.config.webhook_secret.as_deref() else {
        tracing::error!("Webhook received but BUILDHUB_WEBHOOK_SECRET is not configured");
        return Err(AppError::Internal(
            "Webhook secret is not configured".to_string(),
        ));
    };

    verify_signature(secret, &headers, &body)?;

    let event: WebhookEvent = serde_json::from_slice(&body)
        .map_err(|e| AppError::BadRequest(format!("Invalid webhook payload: {}", e)))?;

    match event.event_type.as_str() {
        "user.created" => {
            let data: UserCreatedData = serde_json::from_value(event.data)
                .map_err(|e| AppError::BadRequest(format!("Invalid user.created data: {}", e)))?;

            let display_name = display_name_from(&data);
            let request = CreateUserRequest {
                clerk_id: data.id,
                display_name,
                team_id: None,
                employee_id: None,
                permissions: Vec::new(),
            };

            let user = state.repo.create_user(&request).await?;
            tracing::info!("Provisioned user {} from webhook", user.id);

            if let Err(e) = state.search.index_user(&user).await {
                tracing::warn!("Failed to index user: {}", e);
            }

            ok(serde_json::json!({ "userId": user.id }))
        }
        other => {
            tracing::debug!("Ignoring webhook event type {}", other);
            ok(serde_json::json!({ "ignored": other }))
        }
    }
}

fn display_name_from(data: &UserCreatedData) -> String {
    let full = match (data.first_name.as_deref(), data.last_name.as_deref()) {
        (Some(first), Some(last)) => format!("{} {}", first, last),
        (Some(first), None) => first.to_string(),
        (None, Some(last)) => last.to_string(),
        (None, None) => String::new(),
    };

    if !full.trim().is_empty() {
        full.trim().to_string()
    } else if let Some(username) = data.username.as_deref() {
        username.to_string()
    } else {
        "Unknown".to_string()
    }
}

/// Check the svix-style signature headers against the raw body.
fn verify_signature(secret: &str, headers: &HeaderMap, body: &[u8]) -> Result<(), AppError> {
    let msg_id = header_value(headers, ID_HEADER)?;
    let timestamp = header_value(headers, TIMESTAMP_HEADER)?;
    let signatures = header_value(headers, SIGNATURE_HEADER)?;

    let expected = compute_signature(secret, msg_id, timestamp, body)?;

    // The header may carry several versioned signatures during key rotation.
    let valid = signatures
        .split_whitespace()
        .filter_map(|entry| entry.strip_prefix("v1,"))
        .any(|candidate| constant_time_compare(candidate, &expected));

    if valid {
        Ok(())
    } else {
        Err(AppError::Unauthorized(
            "Invalid webhook signature".to_string(),
        ))
    }
}

fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Result<&'a str, AppError> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized(format!("Missing {} header", name)))
}

/// HMAC-SHA256 over `{id}.{timestamp}.{body}`, base64-encoded.
fn compute_signature(
    secret: &str,
    msg_id: &str,
    timestamp: &str,
    body: &[u8],
) -> Result<String, AppError> {
    // Secrets are distributed as `whsec_<base64 key>`; accept both forms.
    let trimmed = secret.strip_prefix("whsec_").unwrap_or(secret);
    let key = BASE64
        .decode(trimmed)
        .map_err(|_| AppError::Internal("Webhook secret is not valid base64".to_string()))?;

    let mut mac = Hmac::<Sha256>::new_from_slice(&key)
        .map_err(|_| AppError::Internal("Webhook secret has invalid length".to_string()))?;
    mac.update(msg_id.as_bytes());
    mac.update(b".");
    mac.update(timestamp.as_bytes());
    mac.update(b".");
    mac.update(body);

    Ok(BASE64.encode(mac.finalize().into_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    const TEST_SECRET: &str = "whsec_dGVzdC1zZWNyZXQta2V5";

    fn signed_headers(msg_id: &str, timestamp: &str, body: &[u8]) -> HeaderMap {
        let sig = compute_signature(TEST_SECRET, msg_id, timestamp, body).unwrap();
        let mut headers = HeaderMap::new();
        headers.insert(ID_HEADER, HeaderValue::from_str(msg_id).unwrap());
        headers.insert(TIMESTAMP_HEADER, HeaderValue::from_str(timestamp).unwrap());
        headers.insert(
            SIGNATURE_HEADER,
            HeaderValue::from_str(&format!("v1,{}", sig)).unwrap(),
        );
        headers
    }

    #[test]
    fn test_valid_signature_accepted() {
        let body = br#"{"type":"user.created","data":{"id":"clerk_1"}}"#;
        let headers = signed_headers("msg_1", "1700000000", body);

        assert!(verify_signature(TEST_SECRET, &headers, body).is_ok());
    }

    #[test]
    fn test_tampered_body_rejected() {
        let body = br#"{"type":"user.created","data":{"id":"clerk_1"}}"#;
        let headers = signed_headers("msg_1", "1700000000", body);

        let tampered = br#"{"type":"user.created","data":{"id":"clerk_2"}}"#;
        assert!(verify_signature(TEST_SECRET, &headers, tampered).is_err());
    }

    #[test]
    fn test_missing_headers_rejected() {
        let body = b"{}";
        let headers = HeaderMap::new();

        assert!(verify_signature(TEST_SECRET, &headers, body).is_err());
    }

    #[test]
    fn test_multiple_signature_entries() {
        let body = br#"{"type":"user.deleted","data":{}}"#;
        let sig = compute_signature(TEST_SECRET, "msg_2", "1700000001", body).unwrap();

        let mut headers = HeaderMap::new();
        headers.insert(ID_HEADER, HeaderValue::from_static("msg_2"));
        headers.insert(TIMESTAMP_HEADER, HeaderValue::from_static("1700000001"));
        headers.insert(
            SIGNATURE_HEADER,
            HeaderValue::from_str(&format!("v1,bm90LXZhbGlk v1,{}", sig)).unwrap(),
        );

        assert!(verify_signature(TEST_SECRET, &headers, body).is_ok());
    }

    #[test]
    fn test_unprefixed_secret_accepted() {
        let body = b"payload";
        let sig = compute_signature("dGVzdC1zZWNyZXQta2V5", "msg_3", "1700000002", body).unwrap();
        let expected = compute_signature(TEST_SECRET, "msg_3", "1700000002", body).unwrap();
        assert_eq!(sig, expected);
    }

    #[test]
    fn test_display_name_fallbacks() {
        let full = UserCreatedData {
            id: "c1".into(),
            first_name: Some("Ada".into()),
            last_name: Some("Lovelace".into()),
            username: Some("ada".into()),
        };
        assert_eq!(display_name_from(&full), "Ada Lovelace");

        let username_only = UserCreatedData {
            id: "c2".into(),
            first_name: None,
            last_name: None,
            username: Some("builder42".into()),
        };
        assert_eq!(display_name_from(&username_only), "builder42");

        let nothing = UserCreatedData {
            id: "c3".into(),
            first_name: None,
            last_name: None,
            username: None,
        };
        assert_eq!(display_name_from(&nothing), "Unknown");
    }
}
