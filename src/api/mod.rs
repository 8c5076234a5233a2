// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::any::Any;

use axum::{
    http::{
        header::{
            ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
            ACCESS_CONTROL_ALLOW_ORIGIN,
        },
        HeaderValue, StatusCode,
    },
    response::{IntoResponse, Response},
    routing::{any, get},
    Router,
};
use tower_http::{
    catch_panic::CatchPanicLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    config::Settings,
    error::{ApiError, ErrorBody},
    models::{normalize_phone, ContactConfig, UpdateContactRequest, UpdateContactResponse},
    state::AppState,
};

pub mod health;
pub mod phone;
pub mod phone_kv;

pub const UPDATE_FAILED_MESSAGE: &str = "Error al actualizar el número de teléfono";
pub const INTERNAL_ERROR_MESSAGE: &str = "Error interno del servidor";

pub fn router(state: AppState) -> Router {
    let contact_routes = with_cors(
        Router::new()
            .route("/api/phone-kv", any(phone_kv::handle))
            .route("/api/phone", any(phone::handle)),
    );

    let health_routes = Router::new()
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness));

    Router::new()
        .merge(contact_routes)
        .merge(health_routes)
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

/// Fixed CORS headers on every contact response. The panic catcher sits
/// inside them so a 500 from a panicking handler is still readable by
/// browsers.
fn with_cors<S>(routes: Router<S>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    routes
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(SetResponseHeaderLayer::overriding(
            ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static("GET, POST, OPTIONS"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static("Content-Type, Authorization"),
        ))
}

/// Empty 200 for CORS preflight requests.
pub(crate) fn preflight() -> Response {
    StatusCode::OK.into_response()
}

/// Decode an update body. A body that is not a JSON object is treated as an
/// unexpected failure, not a validation error.
pub(crate) fn parse_update_request(body: &[u8]) -> Result<UpdateContactRequest, ApiError> {
    serde_json::from_slice(body).map_err(|e| {
        tracing::error!(error = %e, "Failed to decode update request");
        ApiError::internal(UPDATE_FAILED_MESSAGE)
    })
}

/// Check the admin secret, then the phone number. Returns the phone with
/// whitespace removed.
pub(crate) fn authorize_update(
    settings: &Settings,
    request: &UpdateContactRequest,
) -> Result<String, ApiError> {
    if request.password() != Some(settings.admin_password()) {
        return Err(ApiError::unauthorized("Contraseña incorrecta"));
    }

    request
        .phone()
        .and_then(normalize_phone)
        .ok_or_else(|| ApiError::bad_request("Número de teléfono inválido"))
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    tracing::error!(panic = detail, "Request handler panicked");
    ApiError::internal(INTERNAL_ERROR_MESSAGE).into_response()
}

#[derive(OpenApi)]
#[openapi(
    paths(
        phone_kv::get_contact,
        phone_kv::update_contact,
        phone::get_contact,
        phone::update_contact,
        health::health,
        health::liveness,
        health::readiness
    ),
    components(
        schemas(
            ContactConfig,
            UpdateContactRequest,
            UpdateContactResponse,
            ErrorBody,
            health::ReadyResponse,
            health::HealthChecks,
            health::HealthResponse
        )
    ),
    tags(
        (name = "Contact (KV)", description = "Contact configuration stored in the managed KV store"),
        (name = "Contact (Redis)", description = "Contact configuration stored in Redis, per deployment"),
        (name = "Health", description = "Liveness and readiness probes")
    )
)]
struct ApiDoc;
