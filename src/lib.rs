// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Contact Config Server - click-to-chat phone configuration API
//!
//! Serves and updates the phone number and message template that a landing
//! page uses to build its click-to-chat link.
//!
//! ## Modules
//!
//! - `api` - HTTP handlers (Axum): `/api/phone-kv`, `/api/phone`, health
//! - `config` - environment variables and defaults
//! - `store` - managed KV (REST) and Redis clients

pub mod api;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod state;
pub mod store;
