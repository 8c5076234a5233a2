// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Redis client with a lazily established, process-wide connection.
//!
//! The client is parsed from `REDIS_URL` at startup without touching the
//! network. The first request that needs Redis opens one multiplexed
//! connection, which is then shared by every later request. A failed connect
//! is reported to that request only. When a command fails because the
//! connection is gone, the cached connection is dropped so the next request
//! reconnects.

use async_trait::async_trait;
use redis::{aio::MultiplexedConnection, AsyncCommands, Client, RedisError};
use tokio::sync::Mutex;

use super::{KeyValueStore, StoreResult};

pub struct RedisStore {
    client: Client,
    connection: Mutex<Option<MultiplexedConnection>>,
}

impl RedisStore {
    /// Parse the connection URL. No I/O happens here.
    pub fn open(url: &str) -> StoreResult<Self> {
        let client = Client::open(url)?;
        Ok(Self {
            client,
            connection: Mutex::new(None),
        })
    }

    async fn connection(&self) -> StoreResult<MultiplexedConnection> {
        let mut cached = self.connection.lock().await;
        if let Some(connection) = cached.as_ref() {
            return Ok(connection.clone());
        }
        let connection = self.client.get_multiplexed_async_connection().await?;
        tracing::info!("Connected to Redis");
        *cached = Some(connection.clone());
        Ok(connection)
    }

    /// Forget the shared connection if `err` means it is unusable.
    async fn check<T>(&self, result: Result<T, RedisError>) -> StoreResult<T> {
        if let Err(e) = &result {
            if is_connection_lost(e) {
                tracing::warn!(error = %e, "Redis connection lost, reconnecting on next request");
                self.connection.lock().await.take();
            }
        }
        Ok(result?)
    }
}

fn is_connection_lost(err: &RedisError) -> bool {
    err.is_io_error()
        || err.is_connection_dropped()
        || err.is_connection_refusal()
        || err.is_timeout()
}

#[async_trait]
impl KeyValueStore for RedisStore {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let mut connection = self.connection().await?;
        self.check(connection.get(key).await).await
    }

    async fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        let mut connection = self.connection().await?;
        self.check(connection.set::<_, _, ()>(key, value).await).await
    }

    async fn ping(&self) -> StoreResult<()> {
        let mut connection = self.connection().await?;
        let _pong: String = self
            .check(redis::cmd("PING").query_async(&mut connection).await)
            .await?;
        Ok(())
    }
}
