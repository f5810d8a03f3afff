// SPDX-FileCopyrightText: 2026 Storefront Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Admin panel: catalog, posts, orders, settings and statistics.
//!
//! Every dialogue step either advances the flow slot without writing, or
//! performs exactly one persistent write with the slot already taken.

use chrono::Local;
use tracing::info;

use storefront_core::time::parse_input_time;
use storefront_core::{
    parse_min_qty, parse_price, CatalogStore, ContentStore, NewPost, NewProduct, OrderStore,
    PostKind, ProductField, ProductUpdate, StorefrontError,
};
use storefront_session::{Flow, PostStep, ProductStep, UserSession};

use crate::command::AdminCommand;
use crate::engine::{card, ConversationEngine, Ctx, Reply};
use crate::events::DomainEvent;
use crate::render::{self, format_money};
use crate::stats::{self, StatsPreset};

/// Posts offered for deletion at once.
const POST_DELETE_LIMIT: usize = 50;

const CATALOG_TITLE: &str = "<b>📦 Catalog</b>";
const IMAGE_PROMPT: &str = "Send an image URL, or '-' for none:";
const PUBLISH_PROMPT: &str =
    "Enter the publish time 'YYYY-MM-DD HH:MM', or '-' to publish now:";

fn optional_image(input: &str) -> Option<String> {
    match input.trim() {
        "" | "-" => None,
        url => Some(url.to_string()),
    }
}

impl ConversationEngine {
    pub(crate) async fn admin_action(
        &self,
        ctx: Ctx,
        session: &mut UserSession,
        cmd: AdminCommand,
    ) -> Result<Reply, StorefrontError> {
        let chat = ctx.chat_id;
        match cmd {
            AdminCommand::Exit => Ok(Reply::keyboard(
                chat,
                "You left the admin panel.",
                self.main_menu(ctx.user_id),
            )),
            AdminCommand::Back => Ok(Reply::keyboard(
                chat,
                render::ADMIN_TITLE,
                render::admin_menu(),
            )),

            // Catalog
            AdminCommand::Catalog => Ok(Reply::keyboard(
                chat,
                CATALOG_TITLE,
                render::catalog_menu(),
            )),
            AdminCommand::AddCategory => {
                session.start(Flow::AddCategory);
                Ok(Reply::text(chat, "Enter the category name:"))
            }
            AdminCommand::DeleteCategoryMenu => {
                let categories = self.storage.list_categories().await?;
                Ok(Reply::keyboard(
                    chat,
                    "Choose a category to delete (its products stay without a category):",
                    render::category_picker(
                        &categories,
                        "🗑 ",
                        AdminCommand::DeleteCategory,
                        AdminCommand::Catalog,
                    ),
                ))
            }
            AdminCommand::DeleteCategory(id) => {
                self.storage.delete_category(id).await?;
                info!(category_id = id, "category deleted");
                Ok(Reply::keyboard(
                    chat,
                    "Category deleted.",
                    render::catalog_menu(),
                ))
            }
            AdminCommand::AddProductMenu => {
                let categories = self.storage.list_categories().await?;
                if categories.is_empty() {
                    return Ok(Reply::keyboard(
                        chat,
                        "Add a category first.",
                        render::catalog_menu(),
                    ));
                }
                Ok(Reply::keyboard(
                    chat,
                    "Choose a category for the new product:",
                    render::category_picker(
                        &categories,
                        "",
                        AdminCommand::AddProductIn,
                        AdminCommand::Catalog,
                    ),
                ))
            }
            AdminCommand::AddProductIn(category_id) => {
                if self.storage.get_category(category_id).await?.is_none() {
                    return Ok(Reply::toast("Category not found"));
                }
                session.start(Flow::AddProduct {
                    category_id,
                    step: ProductStep::Name,
                });
                Ok(Reply::text(chat, "Enter the product name:"))
            }
            AdminCommand::EditProductMenu => {
                self.category_menu(chat, "Choose a category:", AdminCommand::EditProductIn)
                    .await
            }
            AdminCommand::EditProductIn(category_id) => {
                let products = self.storage.list_products(category_id).await?;
                Ok(Reply::keyboard(
                    chat,
                    "Choose a product:",
                    render::product_picker(
                        &products,
                        "",
                        AdminCommand::PickProduct,
                        AdminCommand::EditProductMenu,
                    ),
                ))
            }
            AdminCommand::PickProduct(product_id) => {
                let Some(product) = self.storage.get_product(product_id).await? else {
                    return Ok(Reply::toast("Product not found"));
                };
                Ok(Reply::message(card(
                    chat,
                    product.image.as_deref(),
                    format!(
                        "{}\n\nChoose a field to edit:",
                        render::product_caption(&product, self.currency())
                    ),
                    Some(render::product_field_menu(product_id)),
                )))
            }
            AdminCommand::EditProductField { product_id, field } => {
                if field == ProductField::CategoryId {
                    let categories = self.storage.list_categories().await?;
                    return Ok(Reply::keyboard(
                        chat,
                        "Choose the new category:",
                        render::category_picker(
                            &categories,
                            "",
                            |category_id| AdminCommand::SetProductCategory {
                                product_id,
                                category_id,
                            },
                            AdminCommand::PickProduct(product_id),
                        ),
                    ));
                }
                session.start(Flow::EditProduct { product_id, field });
                Ok(Reply::text(
                    chat,
                    format!("Enter a new value for «{}»:", render::field_label(field)),
                ))
            }
            AdminCommand::SetProductCategory {
                product_id,
                category_id,
            } => {
                if self.storage.get_product(product_id).await?.is_none() {
                    return Ok(Reply::toast("Product not found"));
                }
                if self.storage.get_category(category_id).await?.is_none() {
                    return Ok(Reply::toast("Category not found"));
                }
                self.storage
                    .update_product(product_id, ProductUpdate::category(category_id))
                    .await?;
                Ok(Reply::keyboard(
                    chat,
                    "✅ Category changed.",
                    render::catalog_menu(),
                ))
            }
            AdminCommand::DeleteProductMenu => {
                self.category_menu(chat, "Choose a category:", AdminCommand::DeleteProductIn)
                    .await
            }
            AdminCommand::DeleteProductIn(category_id) => {
                let products = self.storage.list_products(category_id).await?;
                Ok(Reply::keyboard(
                    chat,
                    "Choose a product to delete:",
                    render::product_picker(
                        &products,
                        "🗑 ",
                        AdminCommand::DeleteProduct,
                        AdminCommand::DeleteProductMenu,
                    ),
                ))
            }
            AdminCommand::DeleteProduct(product_id) => {
                self.storage.delete_product(product_id).await?;
                info!(product_id, "product deleted");
                Ok(Reply::keyboard(
                    chat,
                    "Product deleted.",
                    render::catalog_menu(),
                ))
            }

            // Posts
            AdminCommand::Posts => Ok(Reply::keyboard(
                chat,
                "<b>📰 Posts</b>",
                render::posts_menu(),
            )),
            AdminCommand::AddPostMenu => Ok(Reply::keyboard(
                chat,
                "Choose the post type:",
                render::post_kind_menu(),
            )),
            AdminCommand::AddPost(kind) => {
                session.start(Flow::AddPost {
                    kind,
                    step: PostStep::Image,
                });
                Ok(Reply::text(chat, IMAGE_PROMPT))
            }
            AdminCommand::DeletePostMenu => {
                let posts = self.storage.list_posts().await?;
                Ok(Reply::keyboard(
                    chat,
                    "Choose a post to delete:",
                    render::post_delete_menu(&posts, POST_DELETE_LIMIT),
                ))
            }
            AdminCommand::DeletePost(post_id) => {
                self.storage.delete_post(post_id).await?;
                Ok(Reply::keyboard(chat, "Post deleted.", render::posts_menu()))
            }

            // Orders
            AdminCommand::Orders => Ok(Reply::keyboard(
                chat,
                "<b>🧾 Orders</b>\nChoose a status:",
                render::orders_menu(),
            )),
            AdminCommand::OrdersByStatus(status) => self.order_list(chat, &status).await,
            AdminCommand::ViewOrder(order_id) => {
                let Some(order) = self.storage.get_order(order_id).await? else {
                    return Ok(Reply::toast("Order not found"));
                };
                let items = self.storage.get_order_items(order_id).await?;
                Ok(Reply::keyboard(
                    chat,
                    render::order_detail(&order, &items, self.currency(), true),
                    render::order_status_keyboard(order_id),
                ))
            }
            AdminCommand::SetOrderStatus { order_id, status } => {
                self.set_order_status(chat, order_id, &status).await
            }

            // Settings
            AdminCommand::Settings => {
                let min_sum = self.storage.get_min_delivery_sum().await?;
                Ok(Reply::keyboard(
                    chat,
                    format!(
                        "<b>⚙️ Settings</b>\nMinimum sum for home delivery: <b>{}</b>",
                        format_money(min_sum, self.currency())
                    ),
                    render::settings_menu(),
                ))
            }
            AdminCommand::MinimumSum => {
                let min_sum = self.storage.get_min_delivery_sum().await?;
                session.start(Flow::SetMinimumSum);
                Ok(Reply::text(
                    chat,
                    format!(
                        "Current minimum sum: <b>{}</b>\nEnter a new value:",
                        format_money(min_sum, self.currency())
                    ),
                ))
            }
            AdminCommand::PickupPoints => self.pickup_overview(chat, None).await,
            AdminCommand::AddPickupPoint => {
                session.start(Flow::AddPickupPoint);
                Ok(Reply::text(chat, "Enter the pickup point address:"))
            }
            AdminCommand::DeletePickupPoint(point_id) => {
                self.storage.delete_pickup_point(point_id).await?;
                self.pickup_overview(chat, Some("Address deleted.")).await
            }

            // Statistics
            AdminCommand::Stats => Ok(Reply::keyboard(
                chat,
                "<b>📊 Statistics</b>\nChoose a period:",
                render::stats_menu(),
            )),
            AdminCommand::StatsReport(preset) => self.stats_report(chat, preset).await,
            AdminCommand::UnknownPreset(preset) => {
                info!(preset = %preset, "unknown statistics preset");
                Ok(Reply::toast("Unknown preset"))
            }

            AdminCommand::Unknown(payload) => {
                info!(payload = %payload, "unknown admin action ignored");
                Ok(Reply::none())
            }
        }
    }

    async fn category_menu(
        &self,
        chat: i64,
        title: &str,
        to_cmd: fn(i64) -> AdminCommand,
    ) -> Result<Reply, StorefrontError> {
        let categories = self.storage.list_categories().await?;
        if categories.is_empty() {
            return Ok(Reply::keyboard(
                chat,
                "The catalog is empty.",
                render::catalog_menu(),
            ));
        }
        Ok(Reply::keyboard(
            chat,
            title,
            render::category_picker(&categories, "", to_cmd, AdminCommand::Catalog),
        ))
    }

    async fn order_list(&self, chat: i64, status: &str) -> Result<Reply, StorefrontError> {
        let orders = self
            .storage
            .list_orders_by_status(status, self.shop.admin_order_limit)
            .await?;
        if orders.is_empty() {
            return Ok(Reply::keyboard(
                chat,
                format!("No orders with status «{}».", render::escape_html(status)),
                render::orders_menu(),
            ));
        }
        let mut with_items = Vec::with_capacity(orders.len());
        for order in orders {
            let items = self.storage.get_order_items(order.id).await?;
            with_items.push((order, items));
        }
        let (text, keyboard) = render::admin_order_list(status, &with_items);
        Ok(Reply::keyboard(chat, text, keyboard))
    }

    /// Any status text is accepted; the customer is notified through the
    /// event bus.
    async fn set_order_status(
        &self,
        chat: i64,
        order_id: i64,
        status: &str,
    ) -> Result<Reply, StorefrontError> {
        let Some(order) = self.storage.get_order(order_id).await? else {
            return Ok(Reply::text(chat, "Order not found."));
        };
        if !self.storage.update_order_status(order_id, status).await? {
            return Ok(Reply::text(chat, "Order not found."));
        }
        info!(order_id, status, "order status changed");
        #[cfg(feature = "prometheus")]
        storefront_prometheus::record_status_change(status);

        self.events.publish(DomainEvent::OrderStatusChanged {
            order_id,
            user_id: order.user_id,
            chat_id: order.chat_id,
            status: status.to_string(),
        });
        Ok(Reply::keyboard(
            chat,
            format!(
                "Status of order #{order_id} changed to «{}».",
                render::escape_html(status)
            ),
            render::order_status_keyboard(order_id),
        ))
    }

    async fn pickup_overview(
        &self,
        chat: i64,
        notice: Option<&str>,
    ) -> Result<Reply, StorefrontError> {
        let points = self.storage.list_pickup_points().await?;
        let mut text = String::new();
        if let Some(notice) = notice {
            text.push_str(notice);
            text.push_str("\n\n");
        }
        text.push_str("<b>📍 Pickup points</b>\n");
        if points.is_empty() {
            text.push_str("No pickup points yet.");
        } else {
            let list = points
                .iter()
                .map(|p| format!("• {}", render::escape_html(&p.address)))
                .collect::<Vec<_>>()
                .join("\n");
            text.push_str(&list);
        }
        Ok(Reply::keyboard(chat, text, render::pickup_menu(&points)))
    }

    async fn stats_report(&self, chat: i64, preset: StatsPreset) -> Result<Reply, StorefrontError> {
        let (start, end) = preset.bounds(Local::now().naive_local());
        let rows = self.storage.sales_by_product(&start, &end, None).await?;
        Ok(Reply::keyboard(
            chat,
            stats::render_report(&rows, &start, &end, self.currency()),
            render::stats_menu(),
        ))
    }

    pub(crate) async fn add_category_step(
        &self,
        ctx: Ctx,
        session: &mut UserSession,
        text: &str,
    ) -> Result<Reply, StorefrontError> {
        let name = text.trim();
        if name.is_empty() {
            session.start(Flow::AddCategory);
            return Ok(Reply::text(
                ctx.chat_id,
                "The name is empty. Enter the category name:",
            ));
        }
        let id = self.storage.add_category(name).await?;
        info!(category_id = id, name, "category added");
        Ok(Reply::keyboard(
            ctx.chat_id,
            format!("✅ Category «{}» added.", render::escape_html(name)),
            render::catalog_menu(),
        ))
    }

    pub(crate) async fn add_product_step(
        &self,
        ctx: Ctx,
        session: &mut UserSession,
        category_id: i64,
        step: ProductStep,
        text: &str,
    ) -> Result<Reply, StorefrontError> {
        let input = text.trim();
        let (next, prompt) = match step {
            ProductStep::Name => {
                if input.is_empty() {
                    (ProductStep::Name, "The name is empty. Enter the product name:")
                } else {
                    (
                        ProductStep::Price {
                            name: input.to_string(),
                        },
                        "Enter the price:",
                    )
                }
            }
            ProductStep::Price { name } => match parse_price(input) {
                Ok(price) => (
                    ProductStep::MinQty { name, price },
                    "Enter the minimum order quantity (integer >= 1):",
                ),
                Err(_) => (
                    ProductStep::Price { name },
                    "Invalid price. Enter a number, for example 199.90:",
                ),
            },
            ProductStep::MinQty { name, price } => match parse_min_qty(input) {
                Ok(min_qty) => (
                    ProductStep::Image {
                        name,
                        price,
                        min_qty,
                    },
                    IMAGE_PROMPT,
                ),
                Err(_) => (
                    ProductStep::MinQty { name, price },
                    "Invalid quantity. Enter an integer >= 1:",
                ),
            },
            ProductStep::Image {
                name,
                price,
                min_qty,
            } => (
                ProductStep::Description {
                    name,
                    price,
                    min_qty,
                    image: optional_image(input),
                },
                "Enter the description:",
            ),
            ProductStep::Description {
                name,
                price,
                min_qty,
                image,
            } => {
                if self.storage.get_category(category_id).await?.is_none() {
                    return Ok(Reply::keyboard(
                        ctx.chat_id,
                        "The category no longer exists. The product was not added.",
                        render::catalog_menu(),
                    ));
                }
                let id = self
                    .storage
                    .add_product(NewProduct {
                        name: name.clone(),
                        price,
                        min_qty,
                        image,
                        description: input.to_string(),
                        category_id: Some(category_id),
                    })
                    .await?;
                info!(product_id = id, category_id, "product added");
                return Ok(Reply::keyboard(
                    ctx.chat_id,
                    format!("✅ Product «{}» added.", render::escape_html(&name)),
                    render::catalog_menu(),
                ));
            }
        };
        session.start(Flow::AddProduct {
            category_id,
            step: next,
        });
        Ok(Reply::text(ctx.chat_id, prompt))
    }

    pub(crate) async fn edit_product_step(
        &self,
        ctx: Ctx,
        session: &mut UserSession,
        product_id: i64,
        field: ProductField,
        text: &str,
    ) -> Result<Reply, StorefrontError> {
        let label = render::field_label(field);
        let update = match field.parse_value(text) {
            Ok(update) => update,
            Err(e) => {
                session.start(Flow::EditProduct { product_id, field });
                return Ok(Reply::text(
                    ctx.chat_id,
                    format!("Error: {e}\nEnter a new value for «{label}» again:"),
                ));
            }
        };
        if self.storage.get_product(product_id).await?.is_none() {
            return Ok(Reply::keyboard(
                ctx.chat_id,
                "Product not found.",
                render::catalog_menu(),
            ));
        }
        self.storage.update_product(product_id, update).await?;
        info!(product_id, field = %field, "product updated");
        Ok(Reply::keyboard(
            ctx.chat_id,
            format!("✅ «{label}» updated."),
            render::product_field_menu(product_id),
        ))
    }

    pub(crate) async fn add_post_step(
        &self,
        ctx: Ctx,
        session: &mut UserSession,
        kind: PostKind,
        step: PostStep,
        text: &str,
    ) -> Result<Reply, StorefrontError> {
        let input = text.trim();
        let (next, prompt) = match step {
            PostStep::Image => (
                PostStep::Title {
                    image: optional_image(input),
                },
                "Enter the title:",
            ),
            PostStep::Title { image } => {
                if input.is_empty() {
                    (
                        PostStep::Title { image },
                        "The title is empty. Enter the title:",
                    )
                } else {
                    (
                        PostStep::Text {
                            image,
                            title: input.to_string(),
                        },
                        "Enter the post text:",
                    )
                }
            }
            PostStep::Text { image, title } => (
                PostStep::PublishAt {
                    image,
                    title,
                    text: input.to_string(),
                },
                PUBLISH_PROMPT,
            ),
            PostStep::PublishAt { image, title, text } => {
                let publish_at = if input == "-" {
                    None
                } else {
                    match parse_input_time(input) {
                        Some(ts) => Some(ts),
                        None => {
                            session.start(Flow::AddPost {
                                kind,
                                step: PostStep::PublishAt { image, title, text },
                            });
                            return Ok(Reply::text(
                                ctx.chat_id,
                                "Invalid format. Enter 'YYYY-MM-DD HH:MM' or '-':",
                            ));
                        }
                    }
                };
                let done = match &publish_at {
                    Some(at) => format!("✅ Post scheduled for {at}."),
                    None => "✅ Post published.".to_string(),
                };
                let id = self
                    .storage
                    .add_post(NewPost {
                        kind,
                        image,
                        title,
                        text,
                        publish_at,
                    })
                    .await?;
                info!(post_id = id, kind = %kind, "post added");
                return Ok(Reply::keyboard(ctx.chat_id, done, render::posts_menu()));
            }
        };
        session.start(Flow::AddPost { kind, step: next });
        Ok(Reply::text(ctx.chat_id, prompt))
    }

    pub(crate) async fn minimum_sum_step(
        &self,
        ctx: Ctx,
        session: &mut UserSession,
        text: &str,
    ) -> Result<Reply, StorefrontError> {
        let Ok(value) = parse_price(text) else {
            session.start(Flow::SetMinimumSum);
            return Ok(Reply::text(
                ctx.chat_id,
                "Invalid sum. Enter a non-negative number:",
            ));
        };
        self.storage.set_min_delivery_sum(value).await?;
        info!(value, "minimum delivery sum changed");
        Ok(Reply::keyboard(
            ctx.chat_id,
            format!(
                "✅ Minimum order sum set: {}",
                format_money(value, self.currency())
            ),
            render::settings_menu(),
        ))
    }

    pub(crate) async fn pickup_point_step(
        &self,
        ctx: Ctx,
        session: &mut UserSession,
        text: &str,
    ) -> Result<Reply, StorefrontError> {
        let address = text.trim();
        if address.is_empty() {
            session.start(Flow::AddPickupPoint);
            return Ok(Reply::text(
                ctx.chat_id,
                "The address is empty. Enter the pickup point address:",
            ));
        }
        self.storage.add_pickup_point(address).await?;
        self.pickup_overview(ctx.chat_id, Some("✅ Address added."))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::tests::{bodies, press, test_engine, text};
    use storefront_config::model::ShopConfig;
    use storefront_core::{OutboundMessage, ProfileStore};

    const ADMIN: i64 = 1;

    async fn admin_engine() -> ConversationEngine {
        test_engine(ShopConfig {
            admin_users: vec![ADMIN],
            ..ShopConfig::default()
        })
        .await
    }

    async fn say(engine: &ConversationEngine, input: &str) -> Vec<String> {
        bodies(&engine.handle(text(ADMIN, input)).await.unwrap())
    }

    async fn tap(engine: &ConversationEngine, cmd: AdminCommand) -> Vec<OutboundMessage> {
        engine.handle(press(ADMIN, &cmd.to_string())).await.unwrap()
    }

    async fn flow(engine: &ConversationEngine) -> Option<Flow> {
        engine.sessions().session(ADMIN).lock().await.flow.clone()
    }

    #[tokio::test]
    async fn category_name_must_not_be_empty() {
        let engine = admin_engine().await;
        tap(&engine, AdminCommand::AddCategory).await;
        assert!(say(&engine, "   ").await[0].starts_with("The name is empty"));
        assert_eq!(flow(&engine).await, Some(Flow::AddCategory));

        assert!(say(&engine, "Drinks").await[0].contains("«Drinks» added"));
        assert_eq!(flow(&engine).await, None);
        assert_eq!(engine.storage().list_categories().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn product_dialogue_validates_each_step() {
        let engine = admin_engine().await;
        let cid = engine.storage().add_category("Drinks").await.unwrap();
        tap(&engine, AdminCommand::AddProductIn(cid)).await;

        say(&engine, "Tea").await;
        assert!(say(&engine, "cheap").await[0].starts_with("Invalid price"));
        say(&engine, "199,90").await;
        assert!(say(&engine, "0").await[0].starts_with("Invalid quantity"));
        say(&engine, "2").await;
        say(&engine, "-").await;
        assert_eq!(
            flow(&engine).await,
            Some(Flow::AddProduct {
                category_id: cid,
                step: ProductStep::Description {
                    name: "Tea".into(),
                    price: 199.9,
                    min_qty: 2,
                    image: None,
                },
            })
        );
        // Nothing is written before the last step.
        assert!(engine.storage().list_products(cid).await.unwrap().is_empty());

        say(&engine, "Green tea").await;
        let products = engine.storage().list_products(cid).await.unwrap();
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].price, 199.9);
        assert_eq!(products[0].min_qty, 2);
        assert_eq!(products[0].image, None);
        assert_eq!(flow(&engine).await, None);
    }

    #[tokio::test]
    async fn starting_a_flow_replaces_the_previous_one() {
        let engine = admin_engine().await;
        let cid = engine.storage().add_category("Drinks").await.unwrap();
        tap(&engine, AdminCommand::AddProductIn(cid)).await;
        say(&engine, "Tea").await;
        tap(&engine, AdminCommand::AddCategory).await;
        assert_eq!(flow(&engine).await, Some(Flow::AddCategory));

        say(&engine, "Cakes").await;
        assert!(engine.storage().list_products(cid).await.unwrap().is_empty());
        assert_eq!(engine.storage().list_categories().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn product_edit_retries_on_bad_value() {
        let engine = admin_engine().await;
        let pid = engine
            .storage()
            .add_product(NewProduct {
                name: "Tea".into(),
                price: 10.0,
                min_qty: 1,
                image: None,
                description: String::new(),
                category_id: None,
            })
            .await
            .unwrap();
        tap(
            &engine,
            AdminCommand::EditProductField {
                product_id: pid,
                field: ProductField::MinQty,
            },
        )
        .await;
        let reply = say(&engine, "zero").await;
        assert!(reply[0].starts_with("Error: "));
        assert!(reply[0].contains("«Min qty» again"));

        say(&engine, "4").await;
        let product = engine.storage().get_product(pid).await.unwrap().unwrap();
        assert_eq!(product.min_qty, 4);
        assert_eq!(flow(&engine).await, None);
    }

    #[tokio::test]
    async fn post_publish_time_is_validated() {
        let engine = admin_engine().await;
        tap(&engine, AdminCommand::AddPost(PostKind::Promotion)).await;
        say(&engine, "-").await;
        say(&engine, "Sale").await;
        say(&engine, "Everything -20%").await;
        assert!(say(&engine, "next friday").await[0].starts_with("Invalid format"));
        assert!(say(&engine, "2030-05-01 10:00").await[0].contains("2030-05-01 10:00:00"));

        let posts = engine.storage().list_posts().await.unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].kind, PostKind::Promotion);
        assert_eq!(posts[0].publish_at.as_deref(), Some("2030-05-01 10:00:00"));
        assert_eq!(posts[0].image, None);
    }

    #[tokio::test]
    async fn status_change_accepts_any_text_and_notifies() {
        let engine = admin_engine().await;
        let mut events = engine.events().subscribe();
        let pid = engine
            .storage()
            .add_product(NewProduct {
                name: "Tea".into(),
                price: 10.0,
                min_qty: 1,
                image: None,
                description: String::new(),
                category_id: None,
            })
            .await
            .unwrap();
        let placed = engine
            .storage()
            .place_order(5, Some(50), &[(pid, 1)])
            .await
            .unwrap()
            .unwrap();

        for status in ["Delivering", "Received", "Lost: found later"] {
            let out = tap(
                &engine,
                AdminCommand::SetOrderStatus {
                    order_id: placed.id,
                    status: status.into(),
                },
            )
            .await;
            assert!(bodies(&out)[0].contains(status));
            assert_eq!(
                events.recv().await.unwrap(),
                DomainEvent::OrderStatusChanged {
                    order_id: placed.id,
                    user_id: 5,
                    chat_id: Some(50),
                    status: status.into(),
                }
            );
        }
        let order = engine.storage().get_order(placed.id).await.unwrap().unwrap();
        assert_eq!(order.status, "Lost: found later");
    }

    #[tokio::test]
    async fn status_change_on_missing_order() {
        let engine = admin_engine().await;
        let out = tap(
            &engine,
            AdminCommand::SetOrderStatus {
                order_id: 404,
                status: "Packing".into(),
            },
        )
        .await;
        assert_eq!(bodies(&out), vec!["Order not found.".to_string()]);
    }

    #[tokio::test]
    async fn minimum_sum_accepts_decimal_comma() {
        let engine = admin_engine().await;
        tap(&engine, AdminCommand::MinimumSum).await;
        assert!(say(&engine, "-5").await[0].starts_with("Invalid sum"));
        assert_eq!(
            say(&engine, "1500,5").await,
            vec!["✅ Minimum order sum set: 1 500.50 RSD".to_string()]
        );
        assert_eq!(engine.storage().get_min_delivery_sum().await.unwrap(), 1500.5);
    }

    #[tokio::test]
    async fn pickup_points_are_added_and_deleted() {
        let engine = admin_engine().await;
        tap(&engine, AdminCommand::AddPickupPoint).await;
        assert!(say(&engine, "Depot 1").await[0].contains("• Depot 1"));
        let points = engine.storage().list_pickup_points().await.unwrap();
        assert_eq!(points.len(), 1);

        let out = tap(&engine, AdminCommand::DeletePickupPoint(points[0].id)).await;
        assert!(bodies(&out)[0].contains("No pickup points yet."));
    }

    #[tokio::test]
    async fn statistics_report_and_unknown_preset() {
        let engine = admin_engine().await;
        let out = tap(&engine, AdminCommand::StatsReport(StatsPreset::LastWeek)).await;
        assert_eq!(
            bodies(&out),
            vec!["Statistics: no sales found for the period.".to_string()]
        );

        let out = engine
            .handle(press(ADMIN, "admin:stats:preset:year"))
            .await
            .unwrap();
        assert_eq!(bodies(&out), vec!["Unknown preset".to_string()]);
    }

    #[tokio::test]
    async fn admin_exit_keeps_demo_grant() {
        let engine = test_engine(ShopConfig::default()).await;
        engine.handle(text(2, "demo admin")).await.unwrap();
        engine.handle(press(2, "admin:exit")).await.unwrap();
        assert!(engine.has_admin_access(2));
        // Profile is untouched by admin navigation.
        let profile = engine.storage().get_profile(2).await.unwrap();
        assert_eq!(profile.phone, None);
    }
}
