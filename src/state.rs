// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::config::Settings;
use crate::store::{KeyValueStore, KvRestStore, RedisStore};

/// Shared handles for both contact endpoints.
///
/// Each store is `None` when it is not configured or failed to initialize;
/// handlers then fall back to the environment instead of failing to start.
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    /// Managed KV store behind `/api/phone-kv`.
    pub kv: Option<Arc<dyn KeyValueStore>>,
    /// Redis store behind `/api/phone`.
    pub redis: Option<Arc<dyn KeyValueStore>>,
}

impl AppState {
    pub fn new(
        settings: Settings,
        kv: Option<Arc<dyn KeyValueStore>>,
        redis: Option<Arc<dyn KeyValueStore>>,
    ) -> Self {
        Self {
            settings: Arc::new(settings),
            kv,
            redis,
        }
    }

    /// Build the store clients described by `settings`.
    ///
    /// Initialization errors are logged and leave the corresponding store
    /// unset.
    pub fn from_settings(settings: Settings) -> Self {
        let kv = match KvRestStore::from_settings(
            settings.kv_rest_api_url.as_deref(),
            settings.kv_rest_api_token.as_deref(),
        ) {
            Ok(Some(store)) => {
                tracing::info!("Managed KV store configured");
                Some(Arc::new(store) as Arc<dyn KeyValueStore>)
            }
            Ok(None) => {
                tracing::info!("Managed KV store not configured, using environment values");
                None
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to initialize managed KV store");
                None
            }
        };

        let redis = match settings.redis_url.as_deref() {
            Some(url) => match RedisStore::open(url) {
                Ok(store) => {
                    tracing::info!("Redis client initialized");
                    Some(Arc::new(store) as Arc<dyn KeyValueStore>)
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to initialize Redis client");
                    None
                }
            },
            None => {
                tracing::info!("Redis not configured: REDIS_URL is missing");
                None
            }
        };

        Self::new(settings, kv, redis)
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Settings::default(), None, None)
    }
}
