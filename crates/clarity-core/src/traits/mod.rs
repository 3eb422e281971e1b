// SPDX-FileCopyrightText: 2026 Clarity Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait definitions for the host storage seam.
//!
//! Backends use `#[async_trait]` for dynamic dispatch compatibility.

pub mod storage;

pub use storage::KeyValueStore;
