// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Store Clients
//!
//! Single-key get/set access to the backing stores:
//!
//! - [`KvRestStore`] - the platform's managed KV service, over its REST API
//! - [`RedisStore`] - a Redis-compatible server, over the native protocol
//! - [`MemoryStore`] - process-local map, used in tests
//!
//! There are no transactions and no compare-and-swap. Concurrent writers
//! race and the last write wins.

pub mod kv;
pub mod memory;
pub mod redis;

use async_trait::async_trait;

pub use self::kv::KvRestStore;
pub use self::memory::MemoryStore;
pub use self::redis::RedisStore;

/// Store key for the phone number.
pub const PHONE_NUMBER_KEY: &str = "phone_number";

/// Store key for the message template (KV store only).
pub const WHATSAPP_MESSAGE_KEY: &str = "whatsapp_message";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store request failed: {0}")]
    Request(String),

    #[error("store returned an error: {0}")]
    Backend(String),

    #[error("store response was invalid: {0}")]
    InvalidResponse(String),

    #[error("store configuration is invalid: {0}")]
    Config(String),

    #[error(transparent)]
    Redis(#[from] ::redis::RedisError),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Minimal key-value access shared by every store client.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Fetch a string value. `Ok(None)` when the key has never been written.
    async fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Overwrite a string value.
    async fn set(&self, key: &str, value: &str) -> StoreResult<()>;

    /// Round-trip to the backend without touching data.
    async fn ping(&self) -> StoreResult<()>;
}
