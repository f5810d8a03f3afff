// SPDX-FileCopyrightText: 2026 Storefront Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Category and product CRUD.

use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Row};
use storefront_core::{Category, NewProduct, Product, ProductUpdate, StorefrontError};

use crate::database::{map_tr_err, Database};

const PRODUCT_COLUMNS: &str = "id, name, price, min_qty, image, description, category_id";

fn product_from_row(row: &Row<'_>) -> rusqlite::Result<Product> {
    let image: Option<String> = row.get(4)?;
    let description: Option<String> = row.get(5)?;
    Ok(Product {
        id: row.get(0)?,
        name: row.get(1)?,
        price: row.get(2)?,
        min_qty: row.get(3)?,
        image: image.filter(|s| !s.trim().is_empty()),
        description: description.unwrap_or_default(),
        category_id: row.get(6)?,
    })
}

/// Insert a category. Returns its id.
pub async fn add_category(db: &Database, name: &str) -> Result<i64, StorefrontError> {
    let name = name.trim().to_string();
    db.connection()
        .call(move |conn| {
            conn.execute("INSERT INTO categories (name) VALUES (?1)", params![name])?;
            Ok(conn.last_insert_rowid())
        })
        .await
        .map_err(map_tr_err)
}

/// All categories, case-insensitively by name.
pub async fn list_categories(db: &Database) -> Result<Vec<Category>, StorefrontError> {
    db.connection()
        .call(|conn| {
            let mut stmt =
                conn.prepare("SELECT id, name FROM categories ORDER BY name COLLATE NOCASE, id")?;
            let rows = stmt.query_map([], |row| {
                Ok(Category {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            })?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}

pub async fn get_category(db: &Database, id: i64) -> Result<Option<Category>, StorefrontError> {
    db.connection()
        .call(move |conn| {
            let result = conn.query_row(
                "SELECT id, name FROM categories WHERE id = ?1",
                params![id],
                |row| {
                    Ok(Category {
                        id: row.get(0)?,
                        name: row.get(1)?,
                    })
                },
            );
            match result {
                Ok(category) => Ok(Some(category)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// Delete a category. Its products remain with `category_id = NULL`.
pub async fn delete_category(db: &Database, id: i64) -> Result<(), StorefrontError> {
    db.connection()
        .call(move |conn| {
            conn.execute("DELETE FROM categories WHERE id = ?1", params![id])?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Insert a product. Returns its id.
pub async fn add_product(db: &Database, product: NewProduct) -> Result<i64, StorefrontError> {
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO products (name, price, min_qty, image, description, category_id)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    product.name.trim(),
                    product.price,
                    product.min_qty,
                    product.image.filter(|s| !s.trim().is_empty()),
                    product.description,
                    product.category_id,
                ],
            )?;
            Ok(conn.last_insert_rowid())
        })
        .await
        .map_err(map_tr_err)
}

/// Products of one category, case-insensitively by name.
pub async fn list_products(
    db: &Database,
    category_id: i64,
) -> Result<Vec<Product>, StorefrontError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {PRODUCT_COLUMNS} FROM products
                 WHERE category_id = ?1 ORDER BY name COLLATE NOCASE, id"
            ))?;
            let rows = stmt.query_map(params![category_id], product_from_row)?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}

pub async fn get_product(db: &Database, id: i64) -> Result<Option<Product>, StorefrontError> {
    db.connection()
        .call(move |conn| {
            let result = conn.query_row(
                &format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1"),
                params![id],
                product_from_row,
            );
            match result {
                Ok(product) => Ok(Some(product)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// Apply the fields set in `update`. An empty update touches nothing.
pub async fn update_product(
    db: &Database,
    id: i64,
    update: ProductUpdate,
) -> Result<(), StorefrontError> {
    if update.is_empty() {
        return Ok(());
    }

    let mut assignments: Vec<&'static str> = Vec::new();
    let mut values: Vec<Value> = Vec::new();
    if let Some(name) = update.name {
        assignments.push("name = ?");
        values.push(Value::Text(name.trim().to_string()));
    }
    if let Some(price) = update.price {
        assignments.push("price = ?");
        values.push(Value::Real(price));
    }
    if let Some(min_qty) = update.min_qty {
        assignments.push("min_qty = ?");
        values.push(Value::Integer(i64::from(min_qty)));
    }
    if let Some(image) = update.image {
        assignments.push("image = ?");
        values.push(if image.trim().is_empty() {
            Value::Null
        } else {
            Value::Text(image)
        });
    }
    if let Some(description) = update.description {
        assignments.push("description = ?");
        values.push(Value::Text(description));
    }
    if let Some(category_id) = update.category_id {
        assignments.push("category_id = ?");
        values.push(Value::Integer(category_id));
    }
    values.push(Value::Integer(id));

    let sql = format!("UPDATE products SET {} WHERE id = ?", assignments.join(", "));
    db.connection()
        .call(move |conn| {
            conn.execute(&sql, params_from_iter(values))?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

pub async fn delete_product(db: &Database, id: i64) -> Result<(), StorefrontError> {
    db.connection()
        .call(move |conn| {
            conn.execute("DELETE FROM products WHERE id = ?1", params![id])?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}
