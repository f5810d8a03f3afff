// SPDX-FileCopyrightText: 2026 Storefront Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persisted shop entities and the value types used to create or change them.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::error::StorefrontError;

/// A product category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
}

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub price: f64,
    pub min_qty: u32,
    pub image: Option<String>,
    pub description: String,
    pub category_id: Option<i64>,
}

/// Fields for a product about to be inserted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub name: String,
    pub price: f64,
    pub min_qty: u32,
    pub image: Option<String>,
    pub description: String,
    pub category_id: Option<i64>,
}

/// Product columns an administrator may change one at a time.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, IntoStaticStr,
    Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
pub enum ProductField {
    Name,
    Price,
    MinQty,
    Image,
    Description,
    CategoryId,
}

impl ProductField {
    /// Coerces admin text input into a single-field update.
    ///
    /// Prices accept `,` as the decimal separator. `-` clears the image.
    pub fn parse_value(self, input: &str) -> Result<ProductUpdate, StorefrontError> {
        let value = input.trim();
        let mut update = ProductUpdate::default();
        match self {
            Self::Name => {
                if value.is_empty() {
                    return Err(StorefrontError::Validation("name must not be empty".into()));
                }
                update.name = Some(value.to_string());
            }
            Self::Price => update.price = Some(parse_price(value)?),
            Self::MinQty => update.min_qty = Some(parse_min_qty(value)?),
            Self::Image => {
                update.image = Some(if value == "-" { String::new() } else { value.to_string() });
            }
            Self::Description => update.description = Some(value.to_string()),
            Self::CategoryId => {
                let id = value.parse::<i64>().map_err(|_| {
                    StorefrontError::Validation(format!("`{value}` is not a category id"))
                })?;
                update.category_id = Some(id);
            }
        }
        Ok(update)
    }
}

/// Parses a non-negative price, accepting a decimal comma.
pub fn parse_price(input: &str) -> Result<f64, StorefrontError> {
    let normalized = input.trim().replace(',', ".");
    match normalized.parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => Ok(v),
        _ => Err(StorefrontError::Validation(format!(
            "`{}` is not a non-negative number",
            input.trim()
        ))),
    }
}

/// Parses a minimum order quantity (integer, at least 1).
pub fn parse_min_qty(input: &str) -> Result<u32, StorefrontError> {
    match input.trim().parse::<u32>() {
        Ok(v) if v >= 1 => Ok(v),
        _ => Err(StorefrontError::Validation(format!(
            "`{}` is not an integer >= 1",
            input.trim()
        ))),
    }
}

/// A partial product update restricted to the editable columns.
///
/// `image = Some("")` clears the image. An update with no fields set is a no-op.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub price: Option<f64>,
    pub min_qty: Option<u32>,
    pub image: Option<String>,
    pub description: Option<String>,
    pub category_id: Option<i64>,
}

impl ProductUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.price.is_none()
            && self.min_qty.is_none()
            && self.image.is_none()
            && self.description.is_none()
            && self.category_id.is_none()
    }

    pub fn category(category_id: i64) -> Self {
        Self {
            category_id: Some(category_id),
            ..Self::default()
        }
    }
}

/// Kind of a published post.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, EnumIter,
    Serialize, Deserialize,
)]
pub enum PostKind {
    #[default]
    News,
    Promotion,
}

/// A news item or promotion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub kind: PostKind,
    pub image: Option<String>,
    pub title: String,
    pub text: String,
    pub publish_at: Option<String>,
    pub created_at: String,
}

impl Post {
    /// The timestamp the post is ordered and shown by.
    pub fn effective_at(&self) -> &str {
        self.publish_at.as_deref().unwrap_or(&self.created_at)
    }
}

/// Fields for a post about to be inserted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPost {
    pub kind: PostKind,
    pub image: Option<String>,
    pub title: String,
    pub text: String,
    pub publish_at: Option<String>,
}

/// A physical location customers may collect orders from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PickupPoint {
    pub id: i64,
    pub address: String,
}

/// Contact details kept per messaging user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: i64,
    pub username: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

/// The nominal order statuses offered to administrators.
///
/// Stored as free text: any string is accepted by the order store.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, IntoStaticStr,
    Serialize, Deserialize,
)]
pub enum OrderStatus {
    Received,
    Packing,
    Delivering,
}

/// An order row joined with the customer's username.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderSummary {
    pub id: i64,
    pub user_id: i64,
    pub chat_id: Option<i64>,
    pub total: f64,
    pub status: String,
    pub created_at: String,
    pub username: Option<String>,
}

/// A line of a placed order with its frozen price.
///
/// `name` is `None` when the product has since been deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: i64,
    pub qty: u32,
    pub price: f64,
    pub name: Option<String>,
}

/// Result of a successful checkout write.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacedOrder {
    pub id: i64,
    pub total: f64,
    pub item_count: u32,
}

/// A scheduled message that became due.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: i64,
    pub chat_id: i64,
    pub text: String,
    pub send_at: String,
}

/// Aggregated sales of one product over a period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesRow {
    pub product_id: i64,
    pub name: String,
    pub total_qty: i64,
    pub total_sum: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn product_field_uses_snake_case_names() {
        assert_eq!(ProductField::MinQty.to_string(), "min_qty");
        assert_eq!(
            ProductField::from_str("category_id").unwrap(),
            ProductField::CategoryId
        );
        assert!(ProductField::from_str("stock").is_err());
    }

    #[test]
    fn price_accepts_decimal_comma() {
        let update = ProductField::Price.parse_value("12,50").unwrap();
        assert_eq!(update.price, Some(12.5));
    }

    #[test]
    fn price_rejects_garbage_and_negatives() {
        assert!(ProductField::Price.parse_value("cheap").is_err());
        assert!(ProductField::Price.parse_value("-3").is_err());
    }

    #[test]
    fn min_qty_must_be_positive_integer() {
        assert_eq!(
            ProductField::MinQty.parse_value(" 4 ").unwrap().min_qty,
            Some(4)
        );
        assert!(ProductField::MinQty.parse_value("0").is_err());
        assert!(ProductField::MinQty.parse_value("1.5").is_err());
    }

    #[test]
    fn image_dash_clears() {
        let update = ProductField::Image.parse_value("-").unwrap();
        assert_eq!(update.image.as_deref(), Some(""));
    }

    #[test]
    fn empty_update_is_detected() {
        assert!(ProductUpdate::default().is_empty());
        assert!(!ProductUpdate::category(3).is_empty());
    }

    #[test]
    fn post_effective_time_prefers_publish_at() {
        let mut post = Post {
            id: 1,
            kind: PostKind::News,
            image: None,
            title: "t".into(),
            text: "x".into(),
            publish_at: None,
            created_at: "2026-01-01 10:00:00".into(),
        };
        assert_eq!(post.effective_at(), "2026-01-01 10:00:00");
        post.publish_at = Some("2026-02-01 09:00:00".into());
        assert_eq!(post.effective_at(), "2026-02-01 09:00:00");
    }

    #[test]
    fn order_status_round_trips_through_strings() {
        for status in [
            OrderStatus::Received,
            OrderStatus::Packing,
            OrderStatus::Delivering,
        ] {
            let s = status.to_string();
            assert_eq!(OrderStatus::from_str(&s).unwrap(), status);
        }
    }
}
