// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Environment variable names, default values, and the [`Settings`] snapshot
//! loaded once at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `PHONE_NUMBER` | Phone served when no store value exists | `5491157552283` |
//! | `WHATSAPP_MESSAGE` | URL-encoded message template | greeting template |
//! | `ADMIN_PASSWORD` | Shared secret required for updates | `admin123` |
//! | `REDIS_URL` | Redis connection string for `/api/phone` | Optional |
//! | `REDIS_NAMESPACE` | Key prefix for `/api/phone` | Derived from `Host` |
//! | `KV_REST_API_URL` | Managed KV REST endpoint for `/api/phone-kv` | Optional |
//! | `KV_REST_API_TOKEN` | Managed KV bearer token | Optional |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |
//!
//! Empty or whitespace-only values are treated as unset. `ADMIN_PASSWORD` is
//! the exception: it is used verbatim and only an empty value is unset.

use std::env;

pub const PHONE_NUMBER_ENV: &str = "PHONE_NUMBER";
pub const WHATSAPP_MESSAGE_ENV: &str = "WHATSAPP_MESSAGE";
pub const ADMIN_PASSWORD_ENV: &str = "ADMIN_PASSWORD";
pub const REDIS_URL_ENV: &str = "REDIS_URL";
pub const REDIS_NAMESPACE_ENV: &str = "REDIS_NAMESPACE";
pub const KV_REST_API_URL_ENV: &str = "KV_REST_API_URL";
pub const KV_REST_API_TOKEN_ENV: &str = "KV_REST_API_TOKEN";
pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// Phone number served when neither the store nor the environment has one.
pub const DEFAULT_PHONE_NUMBER: &str = "5491157552283";

/// Message template served when `WHATSAPP_MESSAGE` is unset.
///
/// Already URL-encoded; clients append it verbatim as the `text` query value.
pub const DEFAULT_WHATSAPP_MESSAGE: &str =
    "¡Buen4s!%20Me%20gust4rí4%20cre4r%20un%20usu4rio.%20Mi%20nombre%20es:";

/// Admin secret used when `ADMIN_PASSWORD` is unset.
pub const DEFAULT_ADMIN_PASSWORD: &str = "admin123";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;

/// Snapshot of the process environment taken at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    pub phone_number: Option<String>,
    pub whatsapp_message: Option<String>,
    pub admin_password: Option<String>,
    pub redis_url: Option<String>,
    pub redis_namespace: Option<String>,
    pub kv_rest_api_url: Option<String>,
    pub kv_rest_api_token: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build settings from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        Self {
            phone_number: get(PHONE_NUMBER_ENV),
            whatsapp_message: get(WHATSAPP_MESSAGE_ENV),
            // The secret is compared verbatim, so only an empty value is unset.
            admin_password: lookup(ADMIN_PASSWORD_ENV).filter(|value| !value.is_empty()),
            redis_url: get(REDIS_URL_ENV).map(|url| url.trim().to_string()),
            redis_namespace: get(REDIS_NAMESPACE_ENV).map(|ns| ns.trim().to_string()),
            kv_rest_api_url: get(KV_REST_API_URL_ENV).map(|url| url.trim().to_string()),
            kv_rest_api_token: get(KV_REST_API_TOKEN_ENV).map(|token| token.trim().to_string()),
            host: get(HOST_ENV),
            port: get(PORT_ENV).and_then(|port| port.trim().parse().ok()),
        }
    }

    pub fn admin_password(&self) -> &str {
        self.admin_password
            .as_deref()
            .unwrap_or(DEFAULT_ADMIN_PASSWORD)
    }

    pub fn bind_address(&self) -> String {
        let host = self.host.as_deref().unwrap_or(DEFAULT_HOST);
        let port = self.port.unwrap_or(DEFAULT_PORT);
        format!("{host}:{port}")
    }
}
