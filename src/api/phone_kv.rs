// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Contact configuration backed by the managed KV store.
//!
//! Both the phone number and the message template are persisted under
//! global keys. When the store is missing or failing, reads fall back to the
//! environment and writes still succeed after validation, with a message
//! saying nothing was persisted.

use axum::{
    body::Bytes,
    extract::State,
    http::Method,
    response::{IntoResponse, Response},
    Json,
};

use crate::{
    config::{DEFAULT_PHONE_NUMBER, DEFAULT_WHATSAPP_MESSAGE},
    error::ApiError,
    models::{resolve_value, ContactConfig, UpdateContactResponse},
    state::AppState,
    store::{KeyValueStore, StoreResult, PHONE_NUMBER_KEY, WHATSAPP_MESSAGE_KEY},
};

use super::{authorize_update, parse_update_request, preflight};

pub const UPDATED_MESSAGE: &str = "Número actualizado correctamente en Vercel KV";
pub const DEGRADED_MESSAGE: &str =
    "Validación exitosa. Configura Vercel KV para persistencia permanente.";

/// Route entry point: dispatches on the request method.
pub async fn handle(method: Method, State(state): State<AppState>, body: Bytes) -> Response {
    if method == Method::OPTIONS {
        preflight()
    } else if method == Method::GET {
        get_contact(State(state)).await.into_response()
    } else if method == Method::POST {
        update_contact(State(state), body).await.into_response()
    } else {
        ApiError::method_not_allowed().into_response()
    }
}

/// Read the contact configuration.
///
/// Store values win over `PHONE_NUMBER` / `WHATSAPP_MESSAGE`, which win over
/// the built-in defaults. Store failures are logged and ignored.
#[utoipa::path(
    get,
    path = "/api/phone-kv",
    tag = "Contact (KV)",
    operation_id = "get_contact_kv",
    responses(
        (status = 200, description = "Resolved contact configuration", body = ContactConfig),
        (status = 500, description = "Unexpected error", body = crate::error::ErrorBody)
    )
)]
pub async fn get_contact(State(state): State<AppState>) -> Json<ContactConfig> {
    let (stored_phone, stored_message) = match &state.kv {
        Some(kv) => (
            fetch_stored(kv.as_ref(), PHONE_NUMBER_KEY).await,
            fetch_stored(kv.as_ref(), WHATSAPP_MESSAGE_KEY).await,
        ),
        None => (None, None),
    };

    let settings = &state.settings;
    Json(ContactConfig {
        phone: resolve_value(
            stored_phone,
            settings.phone_number.as_deref(),
            DEFAULT_PHONE_NUMBER,
        ),
        message: resolve_value(
            stored_message,
            settings.whatsapp_message.as_deref(),
            DEFAULT_WHATSAPP_MESSAGE,
        ),
    })
}

/// Each key is resolved on its own, so one failed read does not discard
/// the other.
async fn fetch_stored(kv: &dyn KeyValueStore, key: &str) -> Option<String> {
    match kv.get(key).await {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(key, error = %e, "KV read failed, using environment value");
            None
        }
    }
}

/// Update the phone number and, when present, the message template.
#[utoipa::path(
    post,
    path = "/api/phone-kv",
    tag = "Contact (KV)",
    operation_id = "update_contact_kv",
    request_body = crate::models::UpdateContactRequest,
    responses(
        (status = 200, description = "Updated, or validated without persistence", body = UpdateContactResponse),
        (status = 400, description = "Invalid phone number", body = crate::error::ErrorBody),
        (status = 401, description = "Wrong admin password", body = crate::error::ErrorBody),
        (status = 500, description = "Unexpected error", body = crate::error::ErrorBody)
    )
)]
pub async fn update_contact(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<UpdateContactResponse>, ApiError> {
    let request = parse_update_request(&body)?;
    let phone = authorize_update(&state.settings, &request)?;

    let Some(kv) = &state.kv else {
        tracing::info!("KV store not configured, update validated but not persisted");
        return Ok(Json(UpdateContactResponse::ok(DEGRADED_MESSAGE)));
    };

    let message = request.message().filter(|m| !m.is_empty());
    match persist(kv.as_ref(), &phone, message).await {
        Ok(()) => {
            tracing::info!(
                key = PHONE_NUMBER_KEY,
                message_updated = message.is_some(),
                "Contact updated in KV store"
            );
            Ok(Json(UpdateContactResponse::ok(UPDATED_MESSAGE)))
        }
        Err(e) => {
            tracing::warn!(error = %e, "KV store unavailable, update validated but not persisted");
            Ok(Json(UpdateContactResponse::ok(DEGRADED_MESSAGE)))
        }
    }
}

async fn persist(kv: &dyn KeyValueStore, phone: &str, message: Option<&str>) -> StoreResult<()> {
    kv.set(PHONE_NUMBER_KEY, phone).await?;
    if let Some(message) = message {
        kv.set(WHATSAPP_MESSAGE_KEY, message).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::http::StatusCode;

    use crate::{
        api::test_support::{FailingKeyStore, FailingStore},
        config::Settings,
        store::MemoryStore,
    };

    fn state_with(settings: Settings, kv: Option<Arc<dyn KeyValueStore>>) -> AppState {
        AppState::new(settings, kv, None)
    }

    fn body(json: &str) -> Bytes {
        Bytes::from(json.to_string())
    }

    #[tokio::test]
    async fn get_without_store_or_env_returns_defaults() {
        let Json(config) = get_contact(State(AppState::default())).await;
        assert_eq!(config.phone, "5491157552283");
        assert_eq!(
            config.message,
            "¡Buen4s!%20Me%20gust4rí4%20cre4r%20un%20usu4rio.%20Mi%20nombre%20es:"
        );
    }

    #[tokio::test]
    async fn get_prefers_store_over_environment() {
        let kv = Arc::new(MemoryStore::new());
        kv.set(PHONE_NUMBER_KEY, "111").await.unwrap();
        kv.set(WHATSAPP_MESSAGE_KEY, "Hola").await.unwrap();
        let settings = Settings {
            phone_number: Some("222".into()),
            whatsapp_message: Some("Chau".into()),
            ..Settings::default()
        };

        let Json(config) = get_contact(State(state_with(settings, Some(kv)))).await;
        assert_eq!(config.phone, "111");
        assert_eq!(config.message, "Hola");
    }

    #[tokio::test]
    async fn get_with_failing_store_uses_environment() {
        let settings = Settings {
            phone_number: Some("222".into()),
            ..Settings::default()
        };
        let state = state_with(settings, Some(Arc::new(FailingStore)));

        let Json(config) = get_contact(State(state)).await;
        assert_eq!(config.phone, "222");
        assert_eq!(config.message, DEFAULT_WHATSAPP_MESSAGE);
    }

    #[tokio::test]
    async fn get_keeps_stored_phone_when_message_read_fails() {
        let kv = Arc::new(FailingKeyStore::new(WHATSAPP_MESSAGE_KEY));
        kv.inner.set(PHONE_NUMBER_KEY, "111").await.unwrap();
        let settings = Settings {
            phone_number: Some("222".into()),
            whatsapp_message: Some("Chau".into()),
            ..Settings::default()
        };

        let Json(config) = get_contact(State(state_with(settings, Some(kv)))).await;
        assert_eq!(config.phone, "111");
        assert_eq!(config.message, "Chau");
    }

    #[tokio::test]
    async fn wrongly_typed_message_is_not_persisted() {
        let kv = Arc::new(MemoryStore::new());
        let state = state_with(Settings::default(), Some(kv.clone()));

        let Json(response) = update_contact(
            State(state),
            body(r#"{"phone":"123","message":42,"password":"admin123"}"#),
        )
        .await
        .expect("update succeeds");
        assert_eq!(response.message, UPDATED_MESSAGE);
        assert_eq!(kv.keys().await, vec![PHONE_NUMBER_KEY.to_string()]);
    }

    #[tokio::test]
    async fn update_persists_phone_and_message() {
        let kv = Arc::new(MemoryStore::new());
        let state = state_with(Settings::default(), Some(kv.clone()));

        let Json(response) = update_contact(
            State(state.clone()),
            body(r#"{"phone":"54 911 5555 0000","message":"Hola%20!","password":"admin123"}"#),
        )
        .await
        .expect("update succeeds");
        assert_eq!(response, UpdateContactResponse::ok(UPDATED_MESSAGE));

        let Json(config) = get_contact(State(state)).await;
        assert_eq!(config.phone, "5491155550000");
        assert_eq!(config.message, "Hola%20!");
    }

    #[tokio::test]
    async fn update_without_message_keeps_previous_message() {
        let kv = Arc::new(MemoryStore::new());
        kv.set(WHATSAPP_MESSAGE_KEY, "previo").await.unwrap();
        let state = state_with(Settings::default(), Some(kv.clone()));

        update_contact(
            State(state),
            body(r#"{"phone":"123","message":"","password":"admin123"}"#),
        )
        .await
        .expect("update succeeds");

        assert_eq!(kv.get(PHONE_NUMBER_KEY).await.unwrap().as_deref(), Some("123"));
        assert_eq!(kv.get(WHATSAPP_MESSAGE_KEY).await.unwrap().as_deref(), Some("previo"));
    }

    #[tokio::test]
    async fn wrong_password_is_rejected_without_mutation() {
        let kv = Arc::new(MemoryStore::new());
        kv.set(PHONE_NUMBER_KEY, "111").await.unwrap();
        let state = state_with(Settings::default(), Some(kv.clone()));

        let err = update_contact(
            State(state.clone()),
            body(r#"{"phone":"999","password":"guess"}"#),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
        assert_eq!(err.message, "Contraseña incorrecta");

        let Json(config) = get_contact(State(state)).await;
        assert_eq!(config.phone, "111");
    }

    #[tokio::test]
    async fn configured_password_replaces_default() {
        let settings = Settings {
            admin_password: Some("s3cret".into()),
            ..Settings::default()
        };
        let state = state_with(settings, Some(Arc::new(MemoryStore::new())));

        let err = update_contact(
            State(state.clone()),
            body(r#"{"phone":"123","password":"admin123"}"#),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);

        update_contact(State(state), body(r#"{"phone":"123","password":"s3cret"}"#))
            .await
            .expect("configured password is accepted");
    }

    #[tokio::test]
    async fn invalid_phone_is_rejected_without_mutation() {
        let kv = Arc::new(MemoryStore::new());
        let state = state_with(Settings::default(), Some(kv.clone()));

        for phone in [r#""+54 911""#, r#""abc""#, r#""   ""#, "null"] {
            let err = update_contact(
                State(state.clone()),
                body(&format!(r#"{{"phone":{phone},"password":"admin123"}}"#)),
            )
            .await
            .unwrap_err();
            assert_eq!(err.status, StatusCode::BAD_REQUEST, "phone {phone}");
            assert_eq!(err.message, "Número de teléfono inválido");
        }

        assert!(kv.keys().await.is_empty());
    }

    #[tokio::test]
    async fn update_without_store_degrades_to_validation_only() {
        let Json(response) = update_contact(
            State(AppState::default()),
            body(r#"{"phone":"123","password":"admin123"}"#),
        )
        .await
        .expect("validation succeeds");
        assert!(response.success);
        assert_eq!(response.message, DEGRADED_MESSAGE);
    }

    #[tokio::test]
    async fn update_with_failing_store_degrades_to_validation_only() {
        let state = state_with(Settings::default(), Some(Arc::new(FailingStore)));
        let Json(response) = update_contact(
            State(state),
            body(r#"{"phone":"123","password":"admin123"}"#),
        )
        .await
        .expect("validation succeeds");
        assert!(response.success);
        assert_eq!(response.message, DEGRADED_MESSAGE);
    }

    #[tokio::test]
    async fn malformed_body_is_an_internal_error() {
        let err = update_contact(State(AppState::default()), body("not json"))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message, "Error al actualizar el número de teléfono");
    }
}
