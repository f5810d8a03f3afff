// SPDX-FileCopyrightText: 2026 Storefront Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Query modules, one per store.

pub mod catalog;
pub mod content;
pub mod notifications;
pub mod orders;
pub mod profiles;
