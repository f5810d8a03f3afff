// SPDX-FileCopyrightText: 2026 Storefront Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Storefront integration tests.
//!
//! - [`MockChannel`] - messaging channel with event injection and capture
//! - [`TestHarness`] - engine over a temporary SQLite database

pub mod harness;
pub mod mock_channel;

pub use harness::{TestHarness, TestHarnessBuilder, bodies, press_event, text_event};
pub use mock_channel::MockChannel;
