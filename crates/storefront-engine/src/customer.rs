// SPDX-FileCopyrightText: 2026 Storefront Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Customer-facing screens: catalog, cart, news and profile.

use tracing::debug;

use storefront_core::time::now_timestamp;
use storefront_core::{
    CatalogStore, ContentStore, OrderStore, OutboundMessage, Product, ProfileStore,
    StorefrontError,
};
use storefront_session::{Cart, Flow, UserSession};

use crate::command::CustomerCommand;
use crate::engine::{card, ConversationEngine, Ctx, Reply};
use crate::render;

pub(crate) fn lines_total(lines: &[(Product, u32)]) -> f64 {
    lines
        .iter()
        .map(|(product, qty)| product.price * f64::from(*qty))
        .sum()
}

impl ConversationEngine {
    pub(crate) async fn customer_action(
        &self,
        ctx: Ctx,
        session: &mut UserSession,
        cmd: CustomerCommand,
    ) -> Result<Reply, StorefrontError> {
        match cmd {
            CustomerCommand::Categories => self.show_categories(ctx).await,
            CustomerCommand::Category { id, page } => self.show_category(ctx, id, page).await,
            CustomerCommand::Product(id) => self.show_product(ctx, session, id).await,
            CustomerCommand::AddToCart(id) => self.add_to_cart(ctx, session, id).await,
            CustomerCommand::OpenCart => Ok(Reply::message(self.cart_view(ctx, session).await?)),
            CustomerCommand::ClearCart => {
                session.cart.clear();
                Ok(Reply::message(self.cart_view(ctx, session).await?).with_toast("Cart cleared"))
            }
            CustomerCommand::Increment(id) => {
                session.cart.increment(id);
                Ok(Reply::message(self.cart_view(ctx, session).await?))
            }
            CustomerCommand::Decrement(id) => {
                session.cart.decrement(id);
                Ok(Reply::message(self.cart_view(ctx, session).await?))
            }
            CustomerCommand::RemoveFromCart(id) => {
                session.cart.remove(id);
                Ok(Reply::message(self.cart_view(ctx, session).await?).with_toast("Item removed"))
            }
            CustomerCommand::StartCheckout => self.start_checkout(ctx, session).await,
            CustomerCommand::ChoosePickup(id) => self.choose_pickup(ctx, session, id).await,
            CustomerCommand::Post(id) => self.show_post(ctx, id).await,
            CustomerCommand::ViewOrder(id) => self.view_own_order(ctx, id).await,
            CustomerCommand::RepeatOrder(id) => self.repeat_order(ctx, session, id).await,
            CustomerCommand::EditPhone => {
                session.start(Flow::EditPhone);
                Ok(Reply::text(ctx.chat_id, "Enter your phone number:"))
            }
            CustomerCommand::EditAddress => {
                session.start(Flow::EditAddress);
                Ok(Reply::text(ctx.chat_id, "Enter your delivery address:"))
            }
            CustomerCommand::Noop => Ok(Reply::none()),
            CustomerCommand::Unknown(payload) => {
                debug!(user_id = ctx.user_id, payload = %payload, "unknown action acknowledged");
                Ok(Reply::none())
            }
        }
    }

    /// Current products for the cart lines. Lines of deleted products are
    /// dropped from the cart.
    pub(crate) async fn resolve_cart(
        &self,
        cart: &mut Cart,
    ) -> Result<Vec<(Product, u32)>, StorefrontError> {
        let mut lines = Vec::with_capacity(cart.len());
        let mut missing = Vec::new();
        for (product_id, qty) in cart.lines() {
            match self.storage.get_product(product_id).await? {
                Some(product) => lines.push((product, qty)),
                None => missing.push(product_id),
            }
        }
        if !missing.is_empty() {
            debug!(?missing, "pruning deleted products from cart");
            cart.retain_products(|id| !missing.contains(&id));
        }
        Ok(lines)
    }

    pub(crate) async fn cart_view(
        &self,
        ctx: Ctx,
        session: &mut UserSession,
    ) -> Result<OutboundMessage, StorefrontError> {
        let lines = self.resolve_cart(&mut session.cart).await?;
        let min_sum = self.storage.get_min_delivery_sum().await?;
        let points = self.storage.list_pickup_points().await?;
        Ok(OutboundMessage::with_keyboard(
            ctx.chat_id,
            render::cart_text(&lines, min_sum, &points, self.currency()),
            render::cart_keyboard(&lines),
        ))
    }

    pub(crate) async fn show_categories(&self, ctx: Ctx) -> Result<Reply, StorefrontError> {
        let categories = self.storage.list_categories().await?;
        if categories.is_empty() {
            return Ok(Reply::text(ctx.chat_id, "The catalog is empty."));
        }
        Ok(Reply::keyboard(
            ctx.chat_id,
            "<b>Categories:</b>",
            render::categories_keyboard(&categories),
        ))
    }

    async fn show_category(&self, ctx: Ctx, id: i64, page: usize) -> Result<Reply, StorefrontError> {
        let Some(category) = self.storage.get_category(id).await? else {
            return Ok(Reply::toast("Category not found"));
        };
        let products = self.storage.list_products(id).await?;
        if products.is_empty() {
            return Ok(Reply::text(
                ctx.chat_id,
                "There are no products in this category yet.",
            ));
        }
        let (text, keyboard) = render::category_page(
            &category,
            &products,
            page,
            self.shop.page_size,
            self.currency(),
        );
        Ok(Reply::keyboard(ctx.chat_id, text, keyboard))
    }

    async fn show_product(
        &self,
        ctx: Ctx,
        session: &mut UserSession,
        id: i64,
    ) -> Result<Reply, StorefrontError> {
        let Some(product) = self.storage.get_product(id).await? else {
            return Ok(Reply::toast("Product not found"));
        };
        let cart_total = lines_total(&self.resolve_cart(&mut session.cart).await?);
        Ok(Reply::message(card(
            ctx.chat_id,
            product.image.as_deref(),
            render::product_caption(&product, self.currency()),
            Some(render::product_keyboard(&product, cart_total, self.currency())),
        )))
    }

    /// Adds the product's minimum quantity.
    async fn add_to_cart(
        &self,
        ctx: Ctx,
        session: &mut UserSession,
        id: i64,
    ) -> Result<Reply, StorefrontError> {
        let Some(product) = self.storage.get_product(id).await? else {
            return Ok(Reply::toast("Product not found"));
        };
        session.cart.add(product.id, product.min_qty);
        let cart_total = lines_total(&self.resolve_cart(&mut session.cart).await?);
        let name = render::escape_html(&product.name);
        Ok(Reply::keyboard(
            ctx.chat_id,
            format!("Added <b>{name}</b> × {}.", product.min_qty),
            render::product_keyboard(&product, cart_total, self.currency()),
        )
        .with_toast(format!("Added: {} × {}", product.name, product.min_qty)))
    }

    pub(crate) async fn show_news(&self, ctx: Ctx) -> Result<Reply, StorefrontError> {
        let posts = self
            .storage
            .list_published_posts(&now_timestamp(), self.shop.news_limit)
            .await?;
        if posts.is_empty() {
            return Ok(Reply::text(ctx.chat_id, "No posts yet."));
        }
        let mut reply = Reply::none();
        for post in &posts {
            let (caption, keyboard) = render::post_preview(post);
            reply = reply.push(card(
                ctx.chat_id,
                post.image.as_deref(),
                caption,
                Some(keyboard),
            ));
        }
        Ok(reply)
    }

    async fn show_post(&self, ctx: Ctx, id: i64) -> Result<Reply, StorefrontError> {
        let Some(post) = self.storage.get_post(id).await? else {
            return Ok(Reply::toast("Post not found"));
        };
        Ok(Reply::message(card(
            ctx.chat_id,
            post.image.as_deref(),
            render::post_body(&post),
            None,
        )))
    }

    pub(crate) async fn show_profile(&self, ctx: Ctx) -> Result<Reply, StorefrontError> {
        let profile = self.storage.get_profile(ctx.user_id).await?;
        let orders = self
            .storage
            .list_orders_by_user(ctx.user_id, self.shop.order_history_limit)
            .await?;
        let reply = Reply::keyboard(
            ctx.chat_id,
            render::profile_card(&profile),
            render::profile_keyboard(),
        );
        Ok(match render::order_history(&orders, self.currency()) {
            Some((text, keyboard)) => {
                reply.push(OutboundMessage::with_keyboard(ctx.chat_id, text, keyboard))
            }
            None => reply.push(OutboundMessage::text(
                ctx.chat_id,
                "📦 Order history: nothing yet.",
            )),
        })
    }

    async fn view_own_order(&self, ctx: Ctx, id: i64) -> Result<Reply, StorefrontError> {
        let order = match self.storage.get_order(id).await? {
            Some(order) if order.user_id == ctx.user_id => order,
            _ => return Ok(Reply::toast("Order not found")),
        };
        let items = self.storage.get_order_items(id).await?;
        Ok(Reply::keyboard(
            ctx.chat_id,
            render::order_detail(&order, &items, self.currency(), false),
            render::customer_order_keyboard(order.id),
        ))
    }

    /// Adds every item of a past order to the cart.
    async fn repeat_order(
        &self,
        ctx: Ctx,
        session: &mut UserSession,
        id: i64,
    ) -> Result<Reply, StorefrontError> {
        match self.storage.get_order(id).await? {
            Some(order) if order.user_id == ctx.user_id => {}
            _ => return Ok(Reply::toast("Order not found")),
        }
        let items = self.storage.get_order_items(id).await?;
        if items.is_empty() {
            return Ok(Reply::toast("The order has no items"));
        }
        for item in &items {
            session.cart.add(item.product_id, item.qty);
        }
        Ok(Reply::message(self.cart_view(ctx, session).await?)
            .with_toast(format!("Items from order #{id} added to the cart")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::tests::{bodies, press, test_engine, text};
    use storefront_config::model::ShopConfig;
    use storefront_core::{Keyboard, NewPost, NewProduct, PostKind};

    async fn seed_product(engine: &ConversationEngine, name: &str, price: f64, min_qty: u32) -> i64 {
        let storage = engine.storage();
        let category_id = match storage.list_categories().await.unwrap().first() {
            Some(c) => c.id,
            None => storage.add_category("Food").await.unwrap(),
        };
        storage
            .add_product(NewProduct {
                name: name.into(),
                price,
                min_qty,
                image: None,
                description: format!("{name} description"),
                category_id: Some(category_id),
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn add_uses_minimum_quantity() {
        let engine = test_engine(ShopConfig::default()).await;
        let pid = seed_product(&engine, "Tea", 10.0, 3).await;

        let out = engine.handle(press(1, &format!("add:{pid}"))).await.unwrap();
        match &out[0] {
            OutboundMessage::Ack { text, .. } => assert_eq!(text.as_deref(), Some("Added: Tea × 3")),
            other => panic!("expected ack, got {other:?}"),
        }
        engine.handle(press(1, &format!("add:{pid}"))).await.unwrap();
        let handle = engine.sessions().session(1);
        assert_eq!(handle.lock().await.cart.quantity(pid), Some(6));
    }

    #[tokio::test]
    async fn inc_and_dec_only_touch_existing_lines() {
        let engine = test_engine(ShopConfig::default()).await;
        let pid = seed_product(&engine, "Tea", 10.0, 1).await;

        engine.handle(press(1, &format!("inc:{pid}"))).await.unwrap();
        assert!(engine.sessions().session(1).lock().await.cart.is_empty());

        engine.handle(press(1, &format!("add:{pid}"))).await.unwrap();
        engine.handle(press(1, &format!("inc:{pid}"))).await.unwrap();
        assert_eq!(engine.sessions().session(1).lock().await.cart.quantity(pid), Some(2));

        engine.handle(press(1, &format!("dec:{pid}"))).await.unwrap();
        engine.handle(press(1, &format!("dec:{pid}"))).await.unwrap();
        assert!(engine.sessions().session(1).lock().await.cart.is_empty());
    }

    #[tokio::test]
    async fn cart_view_prunes_deleted_products() {
        let engine = test_engine(ShopConfig::default()).await;
        let tea = seed_product(&engine, "Tea", 10.0, 2).await;
        let cake = seed_product(&engine, "Cake", 5.0, 1).await;
        engine.handle(press(1, &format!("add:{tea}"))).await.unwrap();
        engine.handle(press(1, &format!("add:{cake}"))).await.unwrap();
        engine.storage().delete_product(cake).await.unwrap();

        let out = engine.handle(press(1, "cart:open")).await.unwrap();
        let body = &bodies(&out)[0];
        assert!(body.contains("Tea"));
        assert!(!body.contains("Cake"));
        assert!(body.contains("sum <b>20.00 RSD</b>"));
        let handle = engine.sessions().session(1);
        assert_eq!(handle.lock().await.cart.quantity(cake), None);
    }

    #[tokio::test]
    async fn clear_cart_empties_it() {
        let engine = test_engine(ShopConfig::default()).await;
        let pid = seed_product(&engine, "Tea", 10.0, 1).await;
        engine.handle(press(1, &format!("add:{pid}"))).await.unwrap();
        let out = engine.handle(press(1, "cart:clear")).await.unwrap();
        assert_eq!(bodies(&out), vec!["Cart cleared".to_string(), "Your cart is empty.".to_string()]);
    }

    #[tokio::test]
    async fn category_pages_follow_page_size() {
        let shop = ShopConfig {
            page_size: 2,
            ..ShopConfig::default()
        };
        let engine = test_engine(shop).await;
        for name in ["A", "B", "C"] {
            seed_product(&engine, name, 1.0, 1).await;
        }
        let cid = engine.storage().list_categories().await.unwrap()[0].id;
        let out = engine.handle(press(1, &format!("cat:{cid}"))).await.unwrap();
        assert!(bodies(&out)[0].contains("Page 1/2"));
        let out = engine.handle(press(1, &format!("cat:{cid}:1"))).await.unwrap();
        assert!(bodies(&out)[0].contains("Page 2/2"));
    }

    #[tokio::test]
    async fn missing_product_is_a_toast() {
        let engine = test_engine(ShopConfig::default()).await;
        let out = engine.handle(press(1, "prod:999")).await.unwrap();
        assert_eq!(
            out,
            vec![OutboundMessage::Ack {
                callback_id: "cb-prod:999".into(),
                text: Some("Product not found".into()),
            }]
        );
    }

    #[tokio::test]
    async fn product_with_image_is_sent_as_photo() {
        let engine = test_engine(ShopConfig::default()).await;
        let pid = engine
            .storage()
            .add_product(NewProduct {
                name: "Tea".into(),
                price: 1.0,
                min_qty: 1,
                image: Some("https://example.com/tea.png".into()),
                description: String::new(),
                category_id: None,
            })
            .await
            .unwrap();
        let out = engine.handle(press(1, &format!("prod:{pid}"))).await.unwrap();
        assert!(matches!(&out[1], OutboundMessage::Photo { image, .. } if image.ends_with("tea.png")));
    }

    #[tokio::test]
    async fn news_hides_future_posts() {
        let engine = test_engine(ShopConfig::default()).await;
        engine
            .storage()
            .add_post(NewPost {
                kind: PostKind::Promotion,
                image: None,
                title: "Now".into(),
                text: "on sale".into(),
                publish_at: None,
            })
            .await
            .unwrap();
        engine
            .storage()
            .add_post(NewPost {
                kind: PostKind::News,
                image: None,
                title: "Later".into(),
                text: "soon".into(),
                publish_at: Some("2999-01-01 00:00:00".into()),
            })
            .await
            .unwrap();
        let out = engine.handle(text(1, render::MENU_NEWS)).await.unwrap();
        let all = bodies(&out).join("\n");
        assert!(all.contains("[Promotion] Now"));
        assert!(!all.contains("Later"));
    }

    #[tokio::test]
    async fn orders_of_other_users_are_hidden() {
        let engine = test_engine(ShopConfig::default()).await;
        let pid = seed_product(&engine, "Tea", 10.0, 1).await;
        let placed = engine
            .storage()
            .place_order(1, Some(10), &[(pid, 2)])
            .await
            .unwrap()
            .unwrap();

        let out = engine
            .handle(press(2, &format!("order:view:{}", placed.id)))
            .await
            .unwrap();
        assert_eq!(bodies(&out), vec!["Order not found".to_string()]);

        let out = engine
            .handle(press(2, &format!("order:readd:{}", placed.id)))
            .await
            .unwrap();
        assert_eq!(bodies(&out), vec!["Order not found".to_string()]);
        assert!(engine.sessions().session(2).lock().await.cart.is_empty());
    }

    #[tokio::test]
    async fn repeat_order_adds_quantities() {
        let engine = test_engine(ShopConfig::default()).await;
        let pid = seed_product(&engine, "Tea", 10.0, 1).await;
        let placed = engine
            .storage()
            .place_order(1, Some(10), &[(pid, 2)])
            .await
            .unwrap()
            .unwrap();
        engine.sessions().session(1).lock().await.cart.add(pid, 1);

        engine
            .handle(press(1, &format!("order:readd:{}", placed.id)))
            .await
            .unwrap();
        assert_eq!(engine.sessions().session(1).lock().await.cart.quantity(pid), Some(3));
    }

    #[tokio::test]
    async fn profile_shows_card_and_history() {
        let engine = test_engine(ShopConfig::default()).await;
        let pid = seed_product(&engine, "Tea", 10.0, 1).await;
        engine.storage().place_order(1, Some(10), &[(pid, 1)]).await.unwrap();
        engine.handle(text(1, "/start")).await.unwrap();

        let out = engine.handle(text(1, render::MENU_PROFILE)).await.unwrap();
        let texts = bodies(&out);
        assert!(texts[0].contains("Username: @user1"));
        assert!(texts[0].contains("Phone: —"));
        assert!(texts[1].contains("| Received | #"));
        assert!(matches!(out[1].keyboard(), Some(Keyboard::Inline(_))));
    }

    #[tokio::test]
    async fn profile_edit_saves_and_clears_flow() {
        let engine = test_engine(ShopConfig::default()).await;
        engine.handle(press(1, "profile:addr")).await.unwrap();
        let out = engine.handle(text(1, "  Main st 5 ")).await.unwrap();
        assert!(bodies(&out)[0].contains("Address updated"));
        let profile = engine.storage().get_profile(1).await.unwrap();
        assert_eq!(profile.address.as_deref(), Some("Main st 5"));
        assert!(engine.sessions().session(1).lock().await.flow.is_none());
    }
}
