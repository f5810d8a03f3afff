// SPDX-FileCopyrightText: 2026 Storefront Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Order placement, listing, status updates and sales statistics.

use rusqlite::{params, Row};
use storefront_core::time::now_timestamp;
use storefront_core::{
    OrderItem, OrderStatus, OrderSummary, PlacedOrder, SalesRow, StorefrontError,
};

use crate::database::{map_tr_err, Database};

const SUMMARY_SELECT: &str = "SELECT o.id, o.user_id, o.chat_id, o.total, o.status, o.created_at,
            u.username
     FROM orders o LEFT JOIN users u ON u.user_id = o.user_id";

fn summary_from_row(row: &Row<'_>) -> rusqlite::Result<OrderSummary> {
    Ok(OrderSummary {
        id: row.get(0)?,
        user_id: row.get(1)?,
        chat_id: row.get(2)?,
        total: row.get(3)?,
        status: row.get(4)?,
        created_at: row.get(5)?,
        username: row.get(6)?,
    })
}

fn sql_limit(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}

/// Write an order for `lines` priced at the products' current prices.
///
/// Runs in one transaction. Lines whose product has been deleted are dropped;
/// if none remain nothing is written and `None` is returned.
pub async fn place_order(
    db: &Database,
    user_id: i64,
    chat_id: Option<i64>,
    lines: &[(i64, u32)],
) -> Result<Option<PlacedOrder>, StorefrontError> {
    let lines = lines.to_vec();
    let created_at = now_timestamp();
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;

            let mut priced: Vec<(i64, u32, f64)> = Vec::with_capacity(lines.len());
            {
                let mut price_of = tx.prepare("SELECT price FROM products WHERE id = ?1")?;
                for (product_id, qty) in lines {
                    if qty == 0 {
                        continue;
                    }
                    match price_of.query_row(params![product_id], |row| row.get::<_, f64>(0)) {
                        Ok(price) => priced.push((product_id, qty, price)),
                        Err(rusqlite::Error::QueryReturnedNoRows) => {}
                        Err(e) => return Err(e),
                    }
                }
            }

            if priced.is_empty() {
                return Ok(None);
            }

            let total: f64 = priced
                .iter()
                .map(|(_, qty, price)| f64::from(*qty) * price)
                .sum();
            let item_count: u32 = priced.iter().map(|(_, qty, _)| qty).sum();

            tx.execute(
                "INSERT INTO orders (user_id, chat_id, total, status, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    user_id,
                    chat_id,
                    total,
                    OrderStatus::Received.to_string(),
                    created_at
                ],
            )?;
            let order_id = tx.last_insert_rowid();
            {
                let mut insert_item = tx.prepare(
                    "INSERT INTO order_items (order_id, product_id, qty, price)
                     VALUES (?1, ?2, ?3, ?4)",
                )?;
                for (product_id, qty, price) in &priced {
                    insert_item.execute(params![order_id, product_id, qty, price])?;
                }
            }
            tx.commit()?;

            Ok(Some(PlacedOrder {
                id: order_id,
                total,
                item_count,
            }))
        })
        .await
        .map_err(map_tr_err)
}

/// Orders with the given status, newest first.
pub async fn list_orders_by_status(
    db: &Database,
    status: &str,
    limit: usize,
) -> Result<Vec<OrderSummary>, StorefrontError> {
    let status = status.to_string();
    let limit = sql_limit(limit);
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "{SUMMARY_SELECT} WHERE o.status = ?1
                 ORDER BY o.created_at DESC, o.id DESC LIMIT ?2"
            ))?;
            let rows = stmt.query_map(params![status, limit], summary_from_row)?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}

/// A customer's most recent orders, newest first.
pub async fn list_orders_by_user(
    db: &Database,
    user_id: i64,
    limit: usize,
) -> Result<Vec<OrderSummary>, StorefrontError> {
    let limit = sql_limit(limit);
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "{SUMMARY_SELECT} WHERE o.user_id = ?1
                 ORDER BY o.created_at DESC, o.id DESC LIMIT ?2"
            ))?;
            let rows = stmt.query_map(params![user_id, limit], summary_from_row)?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}

pub async fn get_order(db: &Database, id: i64) -> Result<Option<OrderSummary>, StorefrontError> {
    db.connection()
        .call(move |conn| {
            let result = conn.query_row(
                &format!("{SUMMARY_SELECT} WHERE o.id = ?1"),
                params![id],
                summary_from_row,
            );
            match result {
                Ok(order) => Ok(Some(order)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// Items of an order with their frozen prices. `name` is `None` for deleted products.
pub async fn get_order_items(
    db: &Database,
    order_id: i64,
) -> Result<Vec<OrderItem>, StorefrontError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT oi.product_id, oi.qty, oi.price, p.name
                 FROM order_items oi LEFT JOIN products p ON p.id = oi.product_id
                 WHERE oi.order_id = ?1 ORDER BY oi.id",
            )?;
            let rows = stmt.query_map(params![order_id], |row| {
                Ok(OrderItem {
                    product_id: row.get(0)?,
                    qty: row.get(1)?,
                    price: row.get(2)?,
                    name: row.get(3)?,
                })
            })?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}

/// Overwrite the status with any string. Returns false if the order is missing.
pub async fn update_order_status(
    db: &Database,
    id: i64,
    status: &str,
) -> Result<bool, StorefrontError> {
    let status = status.to_string();
    db.connection()
        .call(move |conn| {
            let changed = conn.execute(
                "UPDATE orders SET status = ?1 WHERE id = ?2",
                params![status, id],
            )?;
            Ok(changed > 0)
        })
        .await
        .map_err(map_tr_err)
}

/// Quantity and revenue per product for orders created in `[start, end]`.
///
/// Products deleted since are left out. Sorted by quantity then revenue.
pub async fn sales_by_product(
    db: &Database,
    start: &str,
    end: &str,
    limit: Option<usize>,
) -> Result<Vec<SalesRow>, StorefrontError> {
    let start = start.to_string();
    let end = end.to_string();
    let limit = limit.map(sql_limit).unwrap_or(-1);
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT oi.product_id, p.name, SUM(oi.qty) AS total_qty,
                        SUM(oi.qty * oi.price) AS total_sum
                 FROM order_items oi
                 JOIN orders o ON o.id = oi.order_id
                 JOIN products p ON p.id = oi.product_id
                 WHERE o.created_at >= ?1 AND o.created_at <= ?2
                 GROUP BY oi.product_id
                 ORDER BY total_qty DESC, total_sum DESC
                 LIMIT ?3",
            )?;
            let rows = stmt.query_map(params![start, end, limit], |row| {
                Ok(SalesRow {
                    product_id: row.get(0)?,
                    name: row.get(1)?,
                    total_qty: row.get(2)?,
                    total_sum: row.get(3)?,
                })
            })?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::catalog::{add_product, delete_product, update_product};
    use crate::queries::profiles::upsert_username;
    use storefront_core::{NewProduct, ProductUpdate};

    async fn product(db: &Database, name: &str, price: f64) -> i64 {
        add_product(
            db,
            NewProduct {
                name: name.into(),
                price,
                min_qty: 1,
                image: None,
                description: String::new(),
                category_id: None,
            },
        )
        .await
        .unwrap()
    }

    async fn backdate(db: &Database, order_id: i64, created_at: &'static str) {
        db.connection()
            .call(move |conn| -> Result<(), rusqlite::Error> {
                conn.execute(
                    "UPDATE orders SET created_at = ?1 WHERE id = ?2",
                    params![created_at, order_id],
                )?;
                Ok(())
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn place_order_freezes_current_prices() {
        let db = Database::open_in_memory().await.unwrap();
        let a = product(&db, "A", 10.0).await;
        let b = product(&db, "B", 2.5).await;

        let placed = place_order(&db, 1, Some(100), &[(a, 2), (b, 2)])
            .await
            .unwrap()
            .unwrap();
        assert_eq!(placed.total, 25.0);
        assert_eq!(placed.item_count, 4);

        update_product(
            &db,
            a,
            ProductUpdate {
                price: Some(99.0),
                ..ProductUpdate::default()
            },
        )
        .await
        .unwrap();

        let order = get_order(&db, placed.id).await.unwrap().unwrap();
        assert_eq!(order.total, 25.0);
        assert_eq!(order.status, "Received");
        assert_eq!(order.chat_id, Some(100));
        let items = get_order_items(&db, placed.id).await.unwrap();
        assert_eq!(items[0].price, 10.0);
        assert_eq!(items[0].name.as_deref(), Some("A"));
    }

    #[tokio::test]
    async fn deleted_product_is_skipped_at_placement() {
        let db = Database::open_in_memory().await.unwrap();
        let a = product(&db, "A", 10.0).await;
        let b = product(&db, "B", 2.5).await;
        delete_product(&db, b).await.unwrap();

        let placed = place_order(&db, 1, None, &[(a, 2), (b, 2)])
            .await
            .unwrap()
            .unwrap();
        assert_eq!(placed.total, 20.0);
        assert_eq!(get_order_items(&db, placed.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn nothing_valid_writes_nothing() {
        let db = Database::open_in_memory().await.unwrap();
        let a = product(&db, "A", 10.0).await;
        delete_product(&db, a).await.unwrap();

        assert!(place_order(&db, 1, None, &[(a, 1)]).await.unwrap().is_none());
        assert!(place_order(&db, 1, None, &[]).await.unwrap().is_none());
        assert!(list_orders_by_user(&db, 1, 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn order_items_survive_product_deletion() {
        let db = Database::open_in_memory().await.unwrap();
        let a = product(&db, "A", 4.0).await;
        let placed = place_order(&db, 1, None, &[(a, 3)]).await.unwrap().unwrap();
        delete_product(&db, a).await.unwrap();

        let items = get_order_items(&db, placed.id).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, None);
        assert_eq!(items[0].qty, 3);
    }

    #[tokio::test]
    async fn status_updates_are_unconditional() {
        let db = Database::open_in_memory().await.unwrap();
        let a = product(&db, "A", 1.0).await;
        let id = place_order(&db, 1, None, &[(a, 1)]).await.unwrap().unwrap().id;

        assert!(update_order_status(&db, id, "Delivering").await.unwrap());
        assert!(update_order_status(&db, id, "Received").await.unwrap());
        assert!(update_order_status(&db, id, "anything").await.unwrap());
        assert_eq!(get_order(&db, id).await.unwrap().unwrap().status, "anything");
        assert!(!update_order_status(&db, 999, "Packing").await.unwrap());
    }

    #[tokio::test]
    async fn listings_join_username_newest_first() {
        let db = Database::open_in_memory().await.unwrap();
        upsert_username(&db, 7, Some("kim")).await.unwrap();
        let a = product(&db, "A", 1.0).await;
        let first = place_order(&db, 7, None, &[(a, 1)]).await.unwrap().unwrap().id;
        let second = place_order(&db, 7, None, &[(a, 2)]).await.unwrap().unwrap().id;
        place_order(&db, 8, None, &[(a, 1)]).await.unwrap();
        backdate(&db, first, "2026-01-01 00:00:00").await;

        let mine = list_orders_by_user(&db, 7, 10).await.unwrap();
        assert_eq!(mine.iter().map(|o| o.id).collect::<Vec<_>>(), vec![second, first]);
        assert_eq!(mine[0].username.as_deref(), Some("kim"));
        assert_eq!(list_orders_by_user(&db, 7, 1).await.unwrap().len(), 1);

        update_order_status(&db, second, "Packing").await.unwrap();
        let packing = list_orders_by_status(&db, "Packing", 50).await.unwrap();
        assert_eq!(packing.len(), 1);
        assert_eq!(list_orders_by_status(&db, "Received", 50).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn sales_aggregate_within_window() {
        let db = Database::open_in_memory().await.unwrap();
        let a = product(&db, "A", 10.0).await;
        let b = product(&db, "B", 1.0).await;

        let o1 = place_order(&db, 1, None, &[(a, 1), (b, 5)]).await.unwrap().unwrap().id;
        let o2 = place_order(&db, 2, None, &[(a, 2)]).await.unwrap().unwrap().id;
        let o3 = place_order(&db, 3, None, &[(b, 100)]).await.unwrap().unwrap().id;
        backdate(&db, o1, "2026-03-02 10:00:00").await;
        backdate(&db, o2, "2026-03-31 23:59:59").await;
        backdate(&db, o3, "2026-04-01 00:00:00").await;

        let rows = sales_by_product(&db, "2026-03-01 00:00:00", "2026-03-31 23:59:59", None)
            .await
            .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].name, "B");
        assert_eq!(rows[0].total_qty, 5);
        assert_eq!(rows[1].name, "A");
        assert_eq!(rows[1].total_qty, 3);
        assert_eq!(rows[1].total_sum, 30.0);

        let top = sales_by_product(&db, "2026-03-01 00:00:00", "2026-03-31 23:59:59", Some(1))
            .await
            .unwrap();
        assert_eq!(top.len(), 1);
    }
}
