// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Contact configuration backed by Redis, namespaced per deployment.
//!
//! Only the phone number lives in Redis, under `{namespace}:phone_number`.
//! The message template always comes from `WHATSAPP_MESSAGE` (or the
//! default), even when an update request carries one. Unlike the KV
//! endpoint, a missing or failing store makes updates fail with 500.

use axum::{
    body::Bytes,
    extract::State,
    http::{header::HOST, HeaderMap, Method, Uri},
    response::{IntoResponse, Response},
    Json,
};

use crate::{
    config::{Settings, DEFAULT_PHONE_NUMBER, DEFAULT_WHATSAPP_MESSAGE},
    error::ApiError,
    models::{resolve_value, ContactConfig, UpdateContactResponse},
    state::AppState,
    store::{KeyValueStore, PHONE_NUMBER_KEY},
};

use super::{authorize_update, parse_update_request, preflight};

pub const DEFAULT_NAMESPACE: &str = "default";

pub const UPDATED_MESSAGE: &str = "¡Número actualizado correctamente en Redis!";

pub const REDIS_INIT_FAILED_MESSAGE: &str = "Redis está configurado pero no se pudo inicializar. \
Verifica que REDIS_URL tenga el formato correcto (redis://...). \
Revisa los logs de Vercel para más detalles.";

pub const REDIS_NOT_CONFIGURED_MESSAGE: &str = "Redis no está configurado. \
Ve a Vercel → Storage → Create Database → Redis, y conéctalo a tu proyecto. \
La variable REDIS_URL se configurará automáticamente.";

/// Route entry point: dispatches on the request method.
pub async fn handle(
    method: Method,
    State(state): State<AppState>,
    headers: HeaderMap,
    uri: Uri,
    body: Bytes,
) -> Response {
    if method == Method::OPTIONS {
        preflight()
    } else if method == Method::GET {
        get_contact(State(state), headers, uri).await.into_response()
    } else if method == Method::POST {
        update_contact(State(state), headers, uri, body)
            .await
            .into_response()
    } else {
        ApiError::method_not_allowed().into_response()
    }
}

/// Key prefix isolating this deployment's data in a shared Redis.
///
/// `REDIS_NAMESPACE` wins; otherwise the request host is used as
/// `host:{host}`; otherwise [`DEFAULT_NAMESPACE`]. The host comes from the
/// `Host` header, or from the URI authority for HTTP/2 requests.
pub fn resolve_namespace(settings: &Settings, headers: &HeaderMap, uri: &Uri) -> String {
    if let Some(namespace) = settings
        .redis_namespace
        .as_deref()
        .map(str::trim)
        .filter(|ns| !ns.is_empty())
    {
        return namespace.to_string();
    }

    headers
        .get(HOST)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|host| !host.is_empty())
        .or_else(|| uri.authority().map(|authority| authority.as_str().trim()))
        .filter(|host| !host.is_empty())
        .map(|host| format!("host:{host}"))
        .unwrap_or_else(|| DEFAULT_NAMESPACE.to_string())
}

pub fn phone_key(namespace: &str) -> String {
    format!("{namespace}:{PHONE_NUMBER_KEY}")
}

/// Read the contact configuration.
///
/// The phone number comes from Redis when available, then `PHONE_NUMBER`,
/// then the default. The message never comes from Redis.
#[utoipa::path(
    get,
    path = "/api/phone",
    tag = "Contact (Redis)",
    operation_id = "get_contact_redis",
    responses(
        (status = 200, description = "Resolved contact configuration", body = ContactConfig),
        (status = 500, description = "Unexpected error", body = crate::error::ErrorBody)
    )
)]
pub async fn get_contact(
    State(state): State<AppState>,
    headers: HeaderMap,
    uri: Uri,
) -> Json<ContactConfig> {
    let mut stored_phone = None;
    if let Some(redis) = &state.redis {
        let key = phone_key(&resolve_namespace(&state.settings, &headers, &uri));
        match redis.get(&key).await {
            Ok(value) => stored_phone = value,
            Err(e) => {
                tracing::warn!(error = %e, key = %key, "Redis read failed, using environment values");
            }
        }
    }

    let settings = &state.settings;
    Json(ContactConfig {
        phone: resolve_value(
            stored_phone,
            settings.phone_number.as_deref(),
            DEFAULT_PHONE_NUMBER,
        ),
        message: resolve_value(
            None,
            settings.whatsapp_message.as_deref(),
            DEFAULT_WHATSAPP_MESSAGE,
        ),
    })
}

/// Update the phone number. Any `message` in the body is ignored.
#[utoipa::path(
    post,
    path = "/api/phone",
    tag = "Contact (Redis)",
    operation_id = "update_contact_redis",
    request_body = crate::models::UpdateContactRequest,
    responses(
        (status = 200, description = "Phone number stored", body = UpdateContactResponse),
        (status = 400, description = "Invalid phone number", body = crate::error::ErrorBody),
        (status = 401, description = "Wrong admin password", body = crate::error::ErrorBody),
        (status = 500, description = "Redis unavailable or misconfigured", body = crate::error::ErrorBody)
    )
)]
pub async fn update_contact(
    State(state): State<AppState>,
    headers: HeaderMap,
    uri: Uri,
    body: Bytes,
) -> Result<Json<UpdateContactResponse>, ApiError> {
    let request = parse_update_request(&body)?;
    let phone = authorize_update(&state.settings, &request)?;

    tracing::info!(
        redis_available = state.redis.is_some(),
        redis_url_present = state.settings.redis_url.is_some(),
        "Saving contact phone"
    );

    let Some(redis) = &state.redis else {
        let message = if state.settings.redis_url.is_some() {
            REDIS_INIT_FAILED_MESSAGE
        } else {
            REDIS_NOT_CONFIGURED_MESSAGE
        };
        return Err(ApiError::internal(message));
    };

    let key = phone_key(&resolve_namespace(&state.settings, &headers, &uri));
    match redis.set(&key, &phone).await {
        Ok(()) => {
            tracing::info!(key = %key, "Contact phone updated in Redis");
            Ok(Json(UpdateContactResponse::ok(UPDATED_MESSAGE)))
        }
        Err(e) => {
            tracing::error!(error = %e, key = %key, "Failed to save contact phone to Redis");
            Err(ApiError::internal(format!(
                "Error al guardar en Redis: {e}. Verifica que REDIS_URL esté correctamente configurada."
            )))
        }
    }
}
