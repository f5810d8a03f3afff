// SPDX-FileCopyrightText: 2026 Storefront Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message texts and keyboards.
//!
//! Everything here is pure: handlers load data from the stores and pass it in.
//! Texts use Telegram's HTML subset, so user-provided strings go through
//! [`escape_html`].

use storefront_core::{
    Button, Category, Keyboard, OrderItem, OrderStatus, OrderSummary, PickupPoint, PlacedOrder,
    Post, PostKind, Product, ProductField, UserProfile,
};
use strum::IntoEnumIterator;

use crate::command::{AdminCommand, CustomerCommand};
use crate::stats::StatsPreset;

pub const MENU_CATALOG: &str = "🛍 Catalog";
pub const MENU_NEWS: &str = "📰 News & promotions";
pub const MENU_CART: &str = "🛒 Cart";
pub const MENU_PROFILE: &str = "👤 Profile";
pub const MENU_ADMIN: &str = "🛠 Admin panel";
pub const MENU_EXIT_ADMIN: &str = "⬅️ Exit admin panel";

pub const ADMIN_TITLE: &str = "<b>🛠 Admin panel</b>";

/// Formats an amount with two decimals, space-grouped thousands and the currency.
///
/// `1250.0` with `RSD` renders as `1 250.00 RSD`.
pub fn format_money(amount: f64, currency: &str) -> String {
    let fixed = format!("{:.2}", amount.abs());
    let (int_part, frac) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(ch);
    }
    let sign = if amount < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{sign}{grouped}.{frac} {currency}")
}

pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

fn customer(label: impl Into<String>, cmd: CustomerCommand) -> Button {
    Button::new(label, cmd.to_string())
}

fn admin(label: impl Into<String>, cmd: AdminCommand) -> Button {
    Button::new(label, cmd.to_string())
}

fn noop(label: &str) -> Button {
    customer(label, CustomerCommand::Noop)
}

fn item_name(item: &OrderItem) -> String {
    match &item.name {
        Some(name) => escape_html(name),
        None => format!("#{} (removed)", item.product_id),
    }
}

/// Persistent reply keyboard. The last row toggles with the demo admin grant.
pub fn main_menu(admin_unlocked: bool) -> Keyboard {
    let admin_label = if admin_unlocked {
        MENU_EXIT_ADMIN
    } else {
        MENU_ADMIN
    };
    Keyboard::Menu(vec![
        vec![MENU_CATALOG.to_string(), MENU_NEWS.to_string()],
        vec![MENU_CART.to_string(), MENU_PROFILE.to_string()],
        vec![admin_label.to_string()],
    ])
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

pub fn categories_keyboard(categories: &[Category]) -> Keyboard {
    let mut rows: Vec<Vec<Button>> = categories
        .iter()
        .map(|c| {
            vec![customer(
                escape_html(&c.name),
                CustomerCommand::Category { id: c.id, page: 0 },
            )]
        })
        .collect();
    rows.push(vec![customer("🛒", CustomerCommand::OpenCart)]);
    Keyboard::Inline(rows)
}

/// One page of a category: the header text and a keyboard with product
/// buttons and `«`/`»` navigation. Out-of-range pages clamp to the last one.
pub fn category_page(
    category: &Category,
    products: &[Product],
    page: usize,
    page_size: usize,
    currency: &str,
) -> (String, Keyboard) {
    let page_size = page_size.max(1);
    let pages = products.len().div_ceil(page_size).max(1);
    let page = page.min(pages - 1);

    let mut rows: Vec<Vec<Button>> = products
        .iter()
        .skip(page * page_size)
        .take(page_size)
        .map(|p| {
            vec![customer(
                format!("{} — {}", p.name, format_money(p.price, currency)),
                CustomerCommand::Product(p.id),
            )]
        })
        .collect();

    let mut nav = Vec::new();
    if page > 0 {
        nav.push(customer(
            "«",
            CustomerCommand::Category {
                id: category.id,
                page: page - 1,
            },
        ));
    }
    if page + 1 < pages {
        nav.push(customer(
            "»",
            CustomerCommand::Category {
                id: category.id,
                page: page + 1,
            },
        ));
    }
    if !nav.is_empty() {
        rows.push(nav);
    }
    rows.push(vec![
        customer("🛒", CustomerCommand::OpenCart),
        customer("←", CustomerCommand::Categories),
    ]);

    let text = format!(
        "<b>{}</b>\nPage {}/{}",
        escape_html(&category.name),
        page + 1,
        pages
    );
    (text, Keyboard::Inline(rows))
}

pub fn product_caption(product: &Product, currency: &str) -> String {
    format!(
        "<b>{}</b>\n\n{}\n\nMinimum: <b>{} pcs</b>\nPrice per unit: <b>{}</b>",
        escape_html(&product.name),
        escape_html(&product.description),
        product.min_qty,
        format_money(product.price, currency)
    )
}

/// Add button plus a cart button showing the live cart total.
pub fn product_keyboard(product: &Product, cart_total: f64, currency: &str) -> Keyboard {
    let mut rows = vec![vec![
        customer(
            format!("➕ {} pcs", product.min_qty),
            CustomerCommand::AddToCart(product.id),
        ),
        customer(
            format!("🛒 {}", format_money(cart_total, currency)),
            CustomerCommand::OpenCart,
        ),
    ]];
    let mut back = Vec::new();
    if let Some(category_id) = product.category_id {
        back.push(customer(
            "←",
            CustomerCommand::Category {
                id: category_id,
                page: 0,
            },
        ));
    }
    back.push(customer("⇦", CustomerCommand::Categories));
    rows.push(back);
    Keyboard::Inline(rows)
}

// ---------------------------------------------------------------------------
// Cart and checkout
// ---------------------------------------------------------------------------

/// Cart summary. `lines` holds only products that still exist.
pub fn cart_text(
    lines: &[(Product, u32)],
    min_sum: f64,
    pickup_points: &[PickupPoint],
    currency: &str,
) -> String {
    if lines.is_empty() {
        return "Your cart is empty.".to_string();
    }
    let mut out = vec!["<b>🛒 Your cart</b>".to_string(), String::new()];
    let mut total_qty = 0u32;
    let mut total_sum = 0.0;
    for (product, qty) in lines {
        let line_total = product.price * f64::from(*qty);
        total_qty += qty;
        total_sum += line_total;
        out.push(format!(
            "• {} — {} × {} = <b>{}</b>",
            escape_html(&product.name),
            qty,
            format_money(product.price, currency),
            format_money(line_total, currency)
        ));
    }
    out.push(String::new());
    out.push(format!(
        "Total: {total_qty} pcs, sum <b>{}</b>",
        format_money(total_sum, currency)
    ));
    if min_sum > 0.0 {
        out.push(format!(
            "\nMinimum sum for home delivery: <b>{}</b>",
            format_money(min_sum, currency)
        ));
    }
    if !pickup_points.is_empty() {
        let joined = pickup_points
            .iter()
            .map(|p| escape_html(&p.address))
            .collect::<Vec<_>>()
            .join("; ");
        out.push(format!("Pickup points: <b>{joined}</b>"));
    }
    out.join("\n")
}

pub fn cart_keyboard(lines: &[(Product, u32)]) -> Keyboard {
    let mut rows = Vec::new();
    for (product, qty) in lines {
        rows.push(vec![
            customer("−", CustomerCommand::Decrement(product.id)),
            noop(&format!("{} × {}", product.name, qty)),
            customer("+", CustomerCommand::Increment(product.id)),
        ]);
        rows.push(vec![customer(
            format!("🗑 {}", product.name),
            CustomerCommand::RemoveFromCart(product.id),
        )]);
    }
    if !lines.is_empty() {
        rows.push(vec![customer("🧹 Clear cart", CustomerCommand::ClearCart)]);
        rows.push(vec![customer("✅ Checkout", CustomerCommand::StartCheckout)]);
    }
    rows.push(vec![customer("⇦", CustomerCommand::Categories)]);
    Keyboard::Inline(rows)
}

pub fn pickup_choice_keyboard(points: &[PickupPoint], limit: usize) -> Keyboard {
    Keyboard::column(
        points
            .iter()
            .take(limit)
            .map(|p| customer(p.address.clone(), CustomerCommand::ChoosePickup(p.id))),
    )
}

/// Where a placed order goes.
#[derive(Debug, Clone, Copy)]
pub enum Destination<'a> {
    Home(&'a str),
    Pickup(&'a str),
}

pub fn order_confirmation(placed: &PlacedOrder, destination: Destination<'_>, currency: &str) -> String {
    let destination = match destination {
        Destination::Home(address) => format!("Delivery address: <b>{}</b>", escape_html(address)),
        Destination::Pickup(address) => format!("Pickup point: <b>{}</b>", escape_html(address)),
    };
    format!(
        "✅ Order <b>#{}</b> accepted.\nItems: {} pcs, total: <b>{}</b>.\n{destination}",
        placed.id,
        placed.item_count,
        format_money(placed.total, currency)
    )
}

// ---------------------------------------------------------------------------
// News
// ---------------------------------------------------------------------------

fn kind_label(kind: PostKind) -> &'static str {
    match kind {
        PostKind::News => "News",
        PostKind::Promotion => "Promotion",
    }
}

pub fn post_preview(post: &Post) -> (String, Keyboard) {
    let caption = format!(
        "<b>[{}] {}</b>\nDate: {}",
        kind_label(post.kind),
        escape_html(&post.title),
        post.effective_at()
    );
    let keyboard = Keyboard::column([customer("Read", CustomerCommand::Post(post.id))]);
    (caption, keyboard)
}

pub fn post_body(post: &Post) -> String {
    format!(
        "<b>{}</b>\n\n{}",
        escape_html(&post.title),
        escape_html(&post.text)
    )
}

// ---------------------------------------------------------------------------
// Profile and order history
// ---------------------------------------------------------------------------

pub fn profile_card(profile: &UserProfile) -> String {
    let username = profile
        .username
        .as_deref()
        .map(|u| format!("@{}", escape_html(u)))
        .unwrap_or_else(|| "—".to_string());
    format!(
        "<b>👤 Profile</b>\nUsername: {username}\nPhone: {}\nAddress: {}",
        profile.phone.as_deref().map(escape_html).unwrap_or_else(|| "—".into()),
        profile.address.as_deref().map(escape_html).unwrap_or_else(|| "—".into()),
    )
}

pub fn profile_keyboard() -> Keyboard {
    Keyboard::column([
        customer("✏️ Phone", CustomerCommand::EditPhone),
        customer("✏️ Delivery address", CustomerCommand::EditAddress),
    ])
}

/// Order history block, or `None` when the user has no orders.
pub fn order_history(orders: &[OrderSummary], currency: &str) -> Option<(String, Keyboard)> {
    if orders.is_empty() {
        return None;
    }
    let mut lines = vec![
        format!("<b>📦 Order history (last {}):</b>", orders.len()),
        String::new(),
    ];
    let mut rows = Vec::new();
    for o in orders {
        lines.push(format!(
            "• {} | {} | #{} | {}",
            o.created_at,
            escape_html(&o.status),
            o.id,
            format_money(o.total, currency)
        ));
        rows.push(vec![
            customer(format!("ℹ️ #{}", o.id), CustomerCommand::ViewOrder(o.id)),
            customer(format!("🧺 Repeat #{}", o.id), CustomerCommand::RepeatOrder(o.id)),
        ]);
    }
    Some((lines.join("\n"), Keyboard::Inline(rows)))
}

/// Order card shared by the customer and admin views.
pub fn order_detail(order: &OrderSummary, items: &[OrderItem], currency: &str, admin_view: bool) -> String {
    let items_text = if items.is_empty() {
        "—".to_string()
    } else {
        items
            .iter()
            .map(|it| {
                format!(
                    "• {} — {} × {}",
                    item_name(it),
                    it.qty,
                    format_money(it.price, currency)
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    };
    let mut text = format!(
        "<b>Order #{}</b>\nStatus: <b>{}</b>\nTotal: {}\n",
        order.id,
        escape_html(&order.status),
        format_money(order.total, currency)
    );
    if admin_view {
        text.push_str(&format!(
            "Customer: @{} (id {})\n",
            escape_html(order.username.as_deref().unwrap_or("")),
            order.user_id
        ));
    }
    text.push_str(&format!(
        "Created: {}\n\n<b>Items:</b>\n{items_text}",
        order.created_at
    ));
    text
}

pub fn customer_order_keyboard(order_id: i64) -> Keyboard {
    Keyboard::column([
        customer(format!("🧺 Repeat #{order_id}"), CustomerCommand::RepeatOrder(order_id)),
        customer("🛒 Open cart", CustomerCommand::OpenCart),
    ])
}

// ---------------------------------------------------------------------------
// Admin panel
// ---------------------------------------------------------------------------

pub fn admin_menu() -> Keyboard {
    Keyboard::Inline(vec![
        vec![
            admin("📦 Catalog", AdminCommand::Catalog),
            admin("📰 Posts", AdminCommand::Posts),
        ],
        vec![
            admin("🧾 Orders", AdminCommand::Orders),
            admin("⚙️ Settings", AdminCommand::Settings),
        ],
        vec![
            admin("📊 Statistics", AdminCommand::Stats),
            admin("⬅️ Exit", AdminCommand::Exit),
        ],
    ])
}

pub fn catalog_menu() -> Keyboard {
    Keyboard::column([
        admin("➕ Add category", AdminCommand::AddCategory),
        admin("🗑 Delete category", AdminCommand::DeleteCategoryMenu),
        admin("➕ Add product", AdminCommand::AddProductMenu),
        admin("✏️ Edit product", AdminCommand::EditProductMenu),
        admin("🗑 Delete product", AdminCommand::DeleteProductMenu),
        admin("⬅️ Back", AdminCommand::Back),
    ])
}

pub fn posts_menu() -> Keyboard {
    Keyboard::column([
        admin("➕ Add post", AdminCommand::AddPostMenu),
        admin("🗑 Delete post", AdminCommand::DeletePostMenu),
        admin("⬅️ Back", AdminCommand::Back),
    ])
}

pub fn orders_menu() -> Keyboard {
    let mut buttons: Vec<Button> = OrderStatus::iter()
        .map(|s| {
            admin(
                format!("Show: {s}"),
                AdminCommand::OrdersByStatus(s.to_string()),
            )
        })
        .collect();
    buttons.push(admin("⬅️ Back", AdminCommand::Back));
    Keyboard::column(buttons)
}

pub fn settings_menu() -> Keyboard {
    Keyboard::column([
        admin("💰 Minimum order sum", AdminCommand::MinimumSum),
        admin("📍 Pickup points", AdminCommand::PickupPoints),
        admin("⬅️ Back", AdminCommand::Back),
    ])
}

pub fn pickup_menu(points: &[PickupPoint]) -> Keyboard {
    let mut buttons: Vec<Button> = points
        .iter()
        .map(|p| {
            admin(
                format!("🗑 {}", p.address),
                AdminCommand::DeletePickupPoint(p.id),
            )
        })
        .collect();
    buttons.push(admin("➕ Add address", AdminCommand::AddPickupPoint));
    buttons.push(admin("⬅️ Back", AdminCommand::Settings));
    Keyboard::column(buttons)
}

pub fn stats_menu() -> Keyboard {
    let mut buttons: Vec<Button> = StatsPreset::iter()
        .map(|p| admin(p.label(), AdminCommand::StatsReport(p)))
        .collect();
    buttons.push(admin("⬅️ Back", AdminCommand::Back));
    Keyboard::column(buttons)
}

pub fn post_kind_menu() -> Keyboard {
    let mut buttons: Vec<Button> = PostKind::iter()
        .map(|k| admin(kind_label(k), AdminCommand::AddPost(k)))
        .collect();
    buttons.push(admin("⬅️ Back", AdminCommand::Posts));
    Keyboard::column(buttons)
}

/// A pick list of categories, each button built by `to_cmd`.
pub fn category_picker(
    categories: &[Category],
    prefix: &str,
    to_cmd: impl Fn(i64) -> AdminCommand,
    back: AdminCommand,
) -> Keyboard {
    let mut buttons: Vec<Button> = categories
        .iter()
        .map(|c| admin(format!("{prefix}{}", c.name), to_cmd(c.id)))
        .collect();
    if buttons.is_empty() {
        buttons.push(noop("No categories"));
    }
    buttons.push(admin("⬅️ Back", back));
    Keyboard::column(buttons)
}

pub fn product_picker(
    products: &[Product],
    prefix: &str,
    to_cmd: impl Fn(i64) -> AdminCommand,
    back: AdminCommand,
) -> Keyboard {
    let mut buttons: Vec<Button> = products
        .iter()
        .map(|p| admin(format!("{prefix}{}", p.name), to_cmd(p.id)))
        .collect();
    if buttons.is_empty() {
        buttons.push(noop("No products"));
    }
    buttons.push(admin("⬅️ Back", back));
    Keyboard::column(buttons)
}

pub fn field_label(field: ProductField) -> &'static str {
    match field {
        ProductField::Name => "Name",
        ProductField::Price => "Price",
        ProductField::MinQty => "Min qty",
        ProductField::Image => "Image URL",
        ProductField::Description => "Description",
        ProductField::CategoryId => "Category",
    }
}

pub fn product_field_menu(product_id: i64) -> Keyboard {
    let mut buttons: Vec<Button> = ProductField::iter()
        .map(|field| {
            admin(
                field_label(field),
                AdminCommand::EditProductField { product_id, field },
            )
        })
        .collect();
    buttons.push(admin("⬅️ Back", AdminCommand::EditProductMenu));
    Keyboard::column(buttons)
}

pub fn post_delete_menu(posts: &[Post], limit: usize) -> Keyboard {
    let mut buttons: Vec<Button> = posts
        .iter()
        .take(limit)
        .map(|p| {
            admin(
                format!("🗑 [{}] {}", kind_label(p.kind), p.title),
                AdminCommand::DeletePost(p.id),
            )
        })
        .collect();
    if buttons.is_empty() {
        buttons.push(noop("No posts"));
    }
    buttons.push(admin("⬅️ Back", AdminCommand::Posts));
    Keyboard::column(buttons)
}

/// Orders of one status with their items, one edit button per order.
pub fn admin_order_list(status: &str, orders: &[(OrderSummary, Vec<OrderItem>)]) -> (String, Keyboard) {
    let mut lines = vec![format!("<b>Orders: {}</b>", escape_html(status)), String::new()];
    let mut buttons = Vec::new();
    for (order, items) in orders {
        let items_text = if items.is_empty() {
            "—".to_string()
        } else {
            items
                .iter()
                .map(|it| format!("{}×{}", item_name(it), it.qty))
                .collect::<Vec<_>>()
                .join(", ")
        };
        let who = match &order.username {
            Some(u) => format!("@{}", escape_html(u)),
            None => order.user_id.to_string(),
        };
        lines.push(format!(
            "{} | {} | #{} | {who} | {items_text}",
            order.created_at,
            escape_html(&order.status),
            order.id
        ));
        buttons.push(admin(
            format!("Edit #{}", order.id),
            AdminCommand::ViewOrder(order.id),
        ));
    }
    (lines.join("\n"), Keyboard::column(buttons))
}

/// The nominal statuses as buttons. Any stored status is still accepted.
pub fn order_status_keyboard(order_id: i64) -> Keyboard {
    let mut buttons: Vec<Button> = OrderStatus::iter()
        .map(|s| {
            admin(
                s.to_string(),
                AdminCommand::SetOrderStatus {
                    order_id,
                    status: s.to_string(),
                },
            )
        })
        .collect();
    buttons.push(admin("⬅️ Back to list", AdminCommand::Orders));
    Keyboard::column(buttons)
}
