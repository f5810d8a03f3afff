// SPDX-FileCopyrightText: 2026 Storefront Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Customer profiles, created lazily on first reference.

use rusqlite::params;
use storefront_core::{StorefrontError, UserProfile};

use crate::database::{map_tr_err, Database};

/// Return the profile for `user_id`, inserting an empty row if needed.
pub async fn get_profile(db: &Database, user_id: i64) -> Result<UserProfile, StorefrontError> {
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT OR IGNORE INTO users (user_id) VALUES (?1)",
                params![user_id],
            )?;
            conn.query_row(
                "SELECT user_id, username, phone, address FROM users WHERE user_id = ?1",
                params![user_id],
                |row| {
                    Ok(UserProfile {
                        user_id: row.get(0)?,
                        username: row.get(1)?,
                        phone: row.get(2)?,
                        address: row.get(3)?,
                    })
                },
            )
        })
        .await
        .map_err(map_tr_err)
}

/// Record the messaging username, creating the profile if needed.
pub async fn upsert_username(
    db: &Database,
    user_id: i64,
    username: Option<&str>,
) -> Result<(), StorefrontError> {
    let username = username.map(|u| u.trim_start_matches('@').to_string());
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO users (user_id, username) VALUES (?1, ?2)
                 ON CONFLICT(user_id) DO UPDATE SET username = excluded.username",
                params![user_id, username],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

pub async fn set_phone(db: &Database, user_id: i64, phone: &str) -> Result<(), StorefrontError> {
    let phone = phone.trim().to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO users (user_id, phone) VALUES (?1, ?2)
                 ON CONFLICT(user_id) DO UPDATE SET phone = excluded.phone",
                params![user_id, phone],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

pub async fn set_address(
    db: &Database,
    user_id: i64,
    address: &str,
) -> Result<(), StorefrontError> {
    let address = address.trim().to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO users (user_id, address) VALUES (?1, ?2)
                 ON CONFLICT(user_id) DO UPDATE SET address = excluded.address",
                params![user_id, address],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}
