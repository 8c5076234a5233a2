// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Managed KV client.
//!
//! The hosting platform exposes its KV service as a Redis-compatible REST
//! endpoint. A command is a JSON array (`["GET", "phone_number"]`) posted to
//! the base URL with a bearer token; the reply is `{"result": ...}` on
//! success or `{"error": "..."}` on failure.
//!
//! Values are stored JSON-encoded, so a string written here reads back as the
//! same string from any other client of the same database.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use url::Url;

use super::{KeyValueStore, StoreError, StoreResult};

#[derive(Debug, Deserialize)]
struct CommandReply {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Clone)]
pub struct KvRestStore {
    base_url: Url,
    token: String,
    http: Client,
}

impl KvRestStore {
    pub fn new(base_url: &str, token: impl Into<String>) -> StoreResult<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| StoreError::Config(format!("invalid KV REST URL: {e}")))?;
        let http = Client::builder()
            .build()
            .map_err(|e| StoreError::Request(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url,
            token: token.into(),
            http,
        })
    }

    /// Returns `None` unless both the URL and the token are configured.
    pub fn from_settings(url: Option<&str>, token: Option<&str>) -> StoreResult<Option<Self>> {
        match (url, token) {
            (Some(url), Some(token)) => Self::new(url, token).map(Some),
            _ => Ok(None),
        }
    }

    async fn command(&self, command: Value) -> StoreResult<Value> {
        let response = self
            .http
            .post(self.base_url.clone())
            .bearer_auth(&self.token)
            .json(&command)
            .send()
            .await
            .map_err(|e| StoreError::Request(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| StoreError::Request(e.to_string()))?;

        let reply: CommandReply = serde_json::from_str(&body).map_err(|_| {
            StoreError::InvalidResponse(format!("HTTP {status}: {}", truncate(&body)))
        })?;

        if let Some(error) = reply.error {
            return Err(StoreError::Backend(error));
        }
        if !status.is_success() {
            return Err(StoreError::InvalidResponse(format!("HTTP {status}")));
        }

        Ok(reply.result.unwrap_or(Value::Null))
    }
}

#[async_trait]
impl KeyValueStore for KvRestStore {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        match self.command(json!(["GET", key])).await? {
            Value::Null => Ok(None),
            Value::String(raw) => Ok(Some(decode_value(raw))),
            other => Err(StoreError::InvalidResponse(format!(
                "unexpected GET result: {other}"
            ))),
        }
    }

    async fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        let encoded = Value::String(value.to_string()).to_string();
        match self.command(json!(["SET", key, encoded])).await? {
            Value::String(ref ok) if ok == "OK" => Ok(()),
            other => Err(StoreError::InvalidResponse(format!(
                "unexpected SET result: {other}"
            ))),
        }
    }

    async fn ping(&self) -> StoreResult<()> {
        self.command(json!(["PING"])).await.map(|_| ())
    }
}

/// Values written by JSON-aware clients come back quoted; plain values are
/// returned as-is.
fn decode_value(raw: String) -> String {
    match serde_json::from_str::<Value>(&raw) {
        Ok(Value::String(inner)) => inner,
        Ok(Value::Number(number)) => number.to_string(),
        _ => raw,
    }
}

fn truncate(body: &str) -> &str {
    match body.char_indices().nth(200) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}
