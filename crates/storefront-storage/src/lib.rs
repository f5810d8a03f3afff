// SPDX-FileCopyrightText: 2026 Storefront Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence layer for the Storefront bot.
//!
//! WAL-mode SQLite with embedded migrations, a single-writer model via
//! `tokio-rusqlite`, and typed query modules for the catalog, content,
//! profile, order and notification stores.

pub mod adapter;
pub mod database;
pub mod migrations;
pub mod queries;

pub use adapter::SqliteStorage;
pub use database::Database;
