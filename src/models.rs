// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Request and response bodies for the contact configuration endpoints,
//! plus the two pure helpers every handler relies on: phone validation and
//! the store → environment → default fallback chain.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

// =============================================================================
// Contact Config
// =============================================================================

/// The resolved contact configuration used to build a click-to-chat link.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct ContactConfig {
    /// Destination phone number, digits only.
    #[schema(example = "5491157552283")]
    pub phone: String,
    /// URL-encoded message template appended to the chat link.
    pub message: String,
}

/// Body of an update request.
///
/// Fields are kept as raw JSON values so that a wrongly typed field is
/// reported like a wrong value: a non-string password fails authorization
/// and a non-string phone fails validation, instead of rejecting the body.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateContactRequest {
    /// New phone number. Whitespace is ignored; the rest must be digits.
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub phone: Option<Value>,
    /// New message template. Ignored by `/api/phone`.
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub message: Option<Value>,
    /// Admin secret.
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub password: Option<Value>,
}

impl UpdateContactRequest {
    pub fn phone(&self) -> Option<&str> {
        self.phone.as_ref().and_then(Value::as_str)
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_ref().and_then(Value::as_str)
    }

    pub fn password(&self) -> Option<&str> {
        self.password.as_ref().and_then(Value::as_str)
    }
}

/// Body of a successful update.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct UpdateContactResponse {
    pub success: bool,
    /// Human-readable confirmation.
    pub message: String,
}

impl UpdateContactResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// Strip whitespace from `raw` and return the result if it is a non-empty
/// string of ASCII digits.
pub fn normalize_phone(raw: &str) -> Option<String> {
    let digits: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) {
        Some(digits)
    } else {
        None
    }
}

/// First non-empty value wins: store, then environment, then `default`.
pub fn resolve_value(
    stored: Option<String>,
    environment: Option<&str>,
    default: &str,
) -> String {
    stored
        .filter(|value| !value.is_empty())
        .or_else(|| {
            environment
                .filter(|value| !value.is_empty())
                .map(str::to_string)
        })
        .unwrap_or_else(|| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_phone_strips_whitespace() {
        assert_eq!(normalize_phone("54 9 11 5755 2283").as_deref(), Some("5491157552283"));
        assert_eq!(normalize_phone("\t123\n").as_deref(), Some("123"));
    }

    #[test]
    fn normalize_phone_rejects_non_digits() {
        assert_eq!(normalize_phone(""), None);
        assert_eq!(normalize_phone("   "), None);
        assert_eq!(normalize_phone("+5491157552283"), None);
        assert_eq!(normalize_phone("54-911"), None);
        assert_eq!(normalize_phone("12a4"), None);
        // Non-ASCII digits are not accepted.
        assert_eq!(normalize_phone("١٢٣"), None);
    }

    #[test]
    fn resolve_value_prefers_store_then_env_then_default() {
        assert_eq!(
            resolve_value(Some("111".into()), Some("222"), "333"),
            "111"
        );
        assert_eq!(resolve_value(None, Some("222"), "333"), "222");
        assert_eq!(resolve_value(None, None, "333"), "333");
    }

    #[test]
    fn resolve_value_skips_empty_values() {
        assert_eq!(resolve_value(Some(String::new()), Some("222"), "333"), "222");
        assert_eq!(resolve_value(Some(String::new()), Some(""), "333"), "333");
    }

    #[test]
    fn update_request_accepts_partial_bodies() {
        let request: UpdateContactRequest = serde_json::from_str(r#"{"phone":"123"}"#).unwrap();
        assert_eq!(request.phone(), Some("123"));
        assert!(request.message().is_none());
        assert!(request.password().is_none());
    }

    #[test]
    fn update_request_tolerates_wrongly_typed_fields() {
        let request: UpdateContactRequest =
            serde_json::from_str(r#"{"phone":123,"message":true,"password":123}"#).unwrap();
        assert!(request.phone.is_some());
        assert_eq!(request.phone(), None);
        assert_eq!(request.message(), None);
        assert_eq!(request.password(), None);
    }

    #[test]
    fn contact_config_serializes_expected_shape() {
        let config = ContactConfig {
            phone: "123".into(),
            message: "hola".into(),
        };
        assert_eq!(
            serde_json::to_string(&config).unwrap(),
            r#"{"phone":"123","message":"hola"}"#
        );
    }
}
