// SPDX-FileCopyrightText: 2026 Storefront Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Posts, shop settings and pickup points.

use rusqlite::{params, Row};
use storefront_core::time::now_timestamp;
use storefront_core::{NewPost, PickupPoint, Post, StorefrontError};

use crate::database::{map_tr_err, Database};

const MIN_DELIVERY_SUM_KEY: &str = "min_delivery_sum";

const POST_COLUMNS: &str = "id, kind, image, title, text, publish_at, created_at";

fn post_from_row(row: &Row<'_>) -> rusqlite::Result<Post> {
    let kind: String = row.get(1)?;
    let image: Option<String> = row.get(2)?;
    Ok(Post {
        id: row.get(0)?,
        kind: kind.parse().unwrap_or_default(),
        image: image.filter(|s| !s.trim().is_empty()),
        title: row.get(3)?,
        text: row.get(4)?,
        publish_at: row.get(5)?,
        created_at: row.get(6)?,
    })
}

/// Insert a post stamped with the current time. Returns its id.
pub async fn add_post(db: &Database, post: NewPost) -> Result<i64, StorefrontError> {
    let created_at = now_timestamp();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO posts (kind, image, title, text, publish_at, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    post.kind.to_string(),
                    post.image.filter(|s| !s.trim().is_empty()),
                    post.title,
                    post.text,
                    post.publish_at,
                    created_at,
                ],
            )?;
            Ok(conn.last_insert_rowid())
        })
        .await
        .map_err(map_tr_err)
}

/// All posts, newest effective time first.
pub async fn list_posts(db: &Database) -> Result<Vec<Post>, StorefrontError> {
    db.connection()
        .call(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {POST_COLUMNS} FROM posts
                 ORDER BY COALESCE(publish_at, created_at) DESC, id DESC"
            ))?;
            let rows = stmt.query_map([], post_from_row)?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}

/// Posts whose effective time has passed, newest first.
pub async fn list_published_posts(
    db: &Database,
    now: &str,
    limit: usize,
) -> Result<Vec<Post>, StorefrontError> {
    let now = now.to_string();
    let limit = i64::try_from(limit).unwrap_or(i64::MAX);
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {POST_COLUMNS} FROM posts
                 WHERE COALESCE(publish_at, created_at) <= ?1
                 ORDER BY COALESCE(publish_at, created_at) DESC, id DESC
                 LIMIT ?2"
            ))?;
            let rows = stmt.query_map(params![now, limit], post_from_row)?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}

pub async fn get_post(db: &Database, id: i64) -> Result<Option<Post>, StorefrontError> {
    db.connection()
        .call(move |conn| {
            let result = conn.query_row(
                &format!("SELECT {POST_COLUMNS} FROM posts WHERE id = ?1"),
                params![id],
                post_from_row,
            );
            match result {
                Ok(post) => Ok(Some(post)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(map_tr_err)
}

pub async fn delete_post(db: &Database, id: i64) -> Result<(), StorefrontError> {
    db.connection()
        .call(move |conn| {
            conn.execute("DELETE FROM posts WHERE id = ?1", params![id])?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Minimum cart total for home delivery.
///
/// A missing row or a value that does not parse as a number reads as `0.0`.
pub async fn get_min_delivery_sum(db: &Database) -> Result<f64, StorefrontError> {
    let raw: Option<String> = db
        .connection()
        .call(|conn| {
            let result = conn.query_row(
                "SELECT value FROM settings WHERE key = ?1",
                params![MIN_DELIVERY_SUM_KEY],
                |row| row.get::<_, Option<String>>(0),
            );
            match result {
                Ok(value) => Ok(value),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(map_tr_err)?;

    Ok(raw
        .and_then(|v| v.trim().replace(',', ".").parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(0.0))
}

pub async fn set_min_delivery_sum(db: &Database, value: f64) -> Result<(), StorefrontError> {
    let value = value.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO settings (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                params![MIN_DELIVERY_SUM_KEY, value],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Insert default settings that are not present yet. Existing values win.
pub async fn seed_defaults(db: &Database, default_min_sum: f64) -> Result<(), StorefrontError> {
    let value = default_min_sum.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT OR IGNORE INTO settings (key, value) VALUES (?1, ?2)",
                params![MIN_DELIVERY_SUM_KEY, value],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

pub async fn add_pickup_point(db: &Database, address: &str) -> Result<i64, StorefrontError> {
    let address = address.trim().to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO pickup_points (address) VALUES (?1)",
                params![address],
            )?;
            Ok(conn.last_insert_rowid())
        })
        .await
        .map_err(map_tr_err)
}

/// Pickup points, most recently added first.
pub async fn list_pickup_points(db: &Database) -> Result<Vec<PickupPoint>, StorefrontError> {
    db.connection()
        .call(|conn| {
            let mut stmt = conn.prepare("SELECT id, address FROM pickup_points ORDER BY id DESC")?;
            let rows = stmt.query_map([], |row| {
                Ok(PickupPoint {
                    id: row.get(0)?,
                    address: row.get(1)?,
                })
            })?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}

pub async fn delete_pickup_point(db: &Database, id: i64) -> Result<(), StorefrontError> {
    db.connection()
        .call(move |conn| {
            conn.execute("DELETE FROM pickup_points WHERE id = ?1", params![id])?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}
