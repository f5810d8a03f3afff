// SPDX-FileCopyrightText: 2026 Storefront Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! An admin stocks the shop, a customer buys, the admin reviews the order.

use storefront_core::{CatalogStore, OrderStore, ProfileStore};
use storefront_test_utils::{TestHarness, bodies};

const ADMIN: i64 = 1;
const CUSTOMER: i64 = 2;

async fn say(harness: &TestHarness, user: i64, text: &str) -> Vec<String> {
    bodies(&harness.send_text(user, text).await.unwrap())
}

async fn tap(harness: &TestHarness, user: i64, command: &str) -> Vec<String> {
    bodies(&harness.press(user, command).await.unwrap())
}

#[tokio::test]
async fn stock_buy_and_review() {
    let harness = TestHarness::builder()
        .with_admins(vec![ADMIN])
        .with_min_delivery_sum(50.0)
        .build()
        .await
        .unwrap();

    // Stock the catalog.
    tap(&harness, ADMIN, "admin:cat:add").await;
    say(&harness, ADMIN, "Tea").await;
    let category = harness.storage.list_categories().await.unwrap()[0].id;
    tap(&harness, ADMIN, &format!("admin:prod:add:cat:{category}")).await;
    for input in ["Green tea", "12,50", "2", "-", "Loose leaf"] {
        say(&harness, ADMIN, input).await;
    }
    tap(&harness, ADMIN, "admin:set:pickup:add").await;
    say(&harness, ADMIN, "Main square 1").await;
    let product = harness.storage.list_products(category).await.unwrap()[0].clone();
    assert_eq!(product.price, 12.5);

    // Browse and buy: 2 × 12.50 = 25.00 is below the delivery minimum.
    let shown = tap(&harness, CUSTOMER, &format!("cat:{category}")).await;
    assert!(shown[0].contains("Tea"));
    tap(&harness, CUSTOMER, &format!("add:{}", product.id)).await;
    tap(&harness, CUSTOMER, "checkout:start").await;
    let offered = say(&harness, CUSTOMER, "+381 11 222").await;
    assert!(offered[0].contains("Choose a pickup point"));
    let point = harness.storage.list_pickup_points().await.unwrap()[0].id;
    let confirmed = tap(&harness, CUSTOMER, &format!("choose_pickup:{point}")).await;
    assert!(confirmed[0].contains("total: <b>25.00 RSD</b>"), "{}", confirmed[0]);

    let profile = harness.storage.get_profile(CUSTOMER).await.unwrap();
    assert_eq!(profile.phone.as_deref(), Some("+381 11 222"));

    // Review.
    let listed = tap(&harness, ADMIN, "admin:orders:list:Received").await;
    assert!(listed[0].contains("Green tea×2"), "{}", listed[0]);
    let report = tap(&harness, ADMIN, "admin:stats:preset:7").await;
    assert!(report[0].contains("1. Green tea — 2 pcs · 25.00 RSD"), "{}", report[0]);

    let orders = harness.storage.list_orders_by_user(CUSTOMER, 10).await.unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].status, "Received");
}

#[tokio::test]
async fn customers_cannot_reach_the_admin_panel() {
    let harness = TestHarness::builder()
        .with_admins(vec![ADMIN])
        .build()
        .await
        .unwrap();
    let reply = tap(&harness, CUSTOMER, "admin:cat:add").await;
    assert!(reply[0].starts_with("⛔"));
    assert!(harness.engine.sessions().session(CUSTOMER).lock().await.flow.is_none());
}
