// SPDX-FileCopyrightText: 2026 Clarity Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Local key-value storage backends for Clarity.
//!
//! [`SqliteStorage`] is the durable backend: WAL-mode SQLite with embedded
//! migrations and a single-writer model via `tokio-rusqlite`. [`MemoryStorage`]
//! keeps everything in process.

pub mod database;
pub mod memory;
pub mod migrations;
pub mod sqlite;

pub use database::Database;
pub use memory::MemoryStorage;
pub use sqlite::SqliteStorage;
