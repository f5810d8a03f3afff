// SPDX-FileCopyrightText: 2026 Storefront Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The per-user dialogue slot.
//!
//! A user has at most one active [`Flow`]. Each step variant carries exactly
//! the values collected so far, so an incomplete flow cannot be finalised.

use storefront_core::{PostKind, ProductField};

/// Steps of the add-product dialogue.
#[derive(Debug, Clone, PartialEq)]
pub enum ProductStep {
    Name,
    Price {
        name: String,
    },
    MinQty {
        name: String,
        price: f64,
    },
    Image {
        name: String,
        price: f64,
        min_qty: u32,
    },
    Description {
        name: String,
        price: f64,
        min_qty: u32,
        image: Option<String>,
    },
}

/// Steps of the add-post dialogue.
#[derive(Debug, Clone, PartialEq)]
pub enum PostStep {
    Image,
    Title {
        image: Option<String>,
    },
    Text {
        image: Option<String>,
        title: String,
    },
    PublishAt {
        image: Option<String>,
        title: String,
        text: String,
    },
}

/// An in-progress multi-step dialogue.
#[derive(Debug, Clone, PartialEq)]
pub enum Flow {
    AddCategory,
    AddProduct {
        category_id: i64,
        step: ProductStep,
    },
    EditProduct {
        product_id: i64,
        field: ProductField,
    },
    AddPost {
        kind: PostKind,
        step: PostStep,
    },
    SetMinimumSum,
    AddPickupPoint,
    CheckoutPhone {
        home_delivery: bool,
    },
    CheckoutAddress,
    CheckoutPickup,
    EditPhone,
    EditAddress,
}

impl Flow {
    /// Whether the flow belongs to the admin panel.
    pub fn is_admin(&self) -> bool {
        matches!(
            self,
            Self::AddCategory
                | Self::AddProduct { .. }
                | Self::EditProduct { .. }
                | Self::AddPost { .. }
                | Self::SetMinimumSum
                | Self::AddPickupPoint
        )
    }

    pub fn is_checkout(&self) -> bool {
        matches!(
            self,
            Self::CheckoutPhone { .. } | Self::CheckoutAddress | Self::CheckoutPickup
        )
    }

    pub fn is_profile_edit(&self) -> bool {
        matches!(self, Self::EditPhone | Self::EditAddress)
    }

    /// Short label for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::AddCategory => "add_category",
            Self::AddProduct { .. } => "add_product",
            Self::EditProduct { .. } => "edit_product",
            Self::AddPost { .. } => "add_post",
            Self::SetMinimumSum => "set_minimum_sum",
            Self::AddPickupPoint => "add_pickup_point",
            Self::CheckoutPhone { .. } => "checkout_phone",
            Self::CheckoutAddress => "checkout_address",
            Self::CheckoutPickup => "checkout_pickup",
            Self::EditPhone => "edit_phone",
            Self::EditAddress => "edit_address",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_is_disjoint() {
        let flows = [
            Flow::AddCategory,
            Flow::AddProduct {
                category_id: 1,
                step: ProductStep::Name,
            },
            Flow::EditProduct {
                product_id: 1,
                field: ProductField::Price,
            },
            Flow::AddPost {
                kind: PostKind::News,
                step: PostStep::Image,
            },
            Flow::SetMinimumSum,
            Flow::AddPickupPoint,
            Flow::CheckoutPhone {
                home_delivery: true,
            },
            Flow::CheckoutAddress,
            Flow::CheckoutPickup,
            Flow::EditPhone,
            Flow::EditAddress,
        ];
        for flow in &flows {
            let kinds = [flow.is_admin(), flow.is_checkout(), flow.is_profile_edit()];
            assert_eq!(
                kinds.iter().filter(|k| **k).count(),
                1,
                "{} must be in exactly one family",
                flow.name()
            );
        }
        assert_eq!(flows.iter().filter(|f| f.is_admin()).count(), 6);
    }
}
