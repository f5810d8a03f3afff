// SPDX-FileCopyrightText: 2026 Storefront Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Button payload and text command parsing.
//!
//! Payloads are parsed once into [`Command`] at the boundary. Formatting a
//! command with `Display` yields the payload it was parsed from, so keyboards
//! are built from typed commands rather than ad-hoc strings.

use std::fmt;
use std::str::FromStr;

use storefront_core::{PostKind, ProductField};

use crate::render;
use crate::stats::StatsPreset;

/// A parsed button payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Any payload under the `admin:` prefix.
    Admin(AdminCommand),
    Customer(CustomerCommand),
}

impl Command {
    pub fn parse(payload: &str) -> Self {
        match payload.strip_prefix("admin:") {
            Some(rest) => Self::Admin(AdminCommand::parse(rest)),
            None => Self::Customer(CustomerCommand::parse(payload)),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Admin(cmd) => cmd.fmt(f),
            Self::Customer(cmd) => cmd.fmt(f),
        }
    }
}

/// Admin panel actions. Unrecognised `admin:` payloads parse to `Unknown`.
#[derive(Debug, Clone, PartialEq)]
pub enum AdminCommand {
    Exit,
    Back,
    Catalog,
    AddCategory,
    DeleteCategoryMenu,
    DeleteCategory(i64),
    AddProductMenu,
    AddProductIn(i64),
    EditProductMenu,
    EditProductIn(i64),
    PickProduct(i64),
    EditProductField { product_id: i64, field: ProductField },
    SetProductCategory { product_id: i64, category_id: i64 },
    DeleteProductMenu,
    DeleteProductIn(i64),
    DeleteProduct(i64),
    Posts,
    AddPostMenu,
    AddPost(PostKind),
    DeletePostMenu,
    DeletePost(i64),
    Orders,
    OrdersByStatus(String),
    ViewOrder(i64),
    SetOrderStatus { order_id: i64, status: String },
    Settings,
    MinimumSum,
    PickupPoints,
    AddPickupPoint,
    DeletePickupPoint(i64),
    Stats,
    StatsReport(StatsPreset),
    UnknownPreset(String),
    Unknown(String),
}

fn id(s: &str) -> Option<i64> {
    s.parse().ok()
}

impl AdminCommand {
    /// Parses the part of the payload after `admin:`.
    pub fn parse(rest: &str) -> Self {
        Self::try_parse(rest).unwrap_or_else(|| Self::Unknown(rest.to_string()))
    }

    fn try_parse(rest: &str) -> Option<Self> {
        let parts: Vec<&str> = rest.split(':').collect();
        let cmd = match parts.as_slice() {
            ["exit"] => Self::Exit,
            ["back"] => Self::Back,
            ["catalog"] => Self::Catalog,
            ["cat", "add"] => Self::AddCategory,
            ["cat", "del"] => Self::DeleteCategoryMenu,
            ["cat", "del", cid] => Self::DeleteCategory(id(cid)?),
            ["prod", "add"] => Self::AddProductMenu,
            ["prod", "add", "cat", cid] => Self::AddProductIn(id(cid)?),
            ["prod", "edit"] => Self::EditProductMenu,
            ["prod", "edit", "cat", cid] => Self::EditProductIn(id(cid)?),
            ["prod", "edit", "pick", pid] => Self::PickProduct(id(pid)?),
            ["prod", "edit", "set", pid, field] => Self::EditProductField {
                product_id: id(pid)?,
                field: ProductField::from_str(field).ok()?,
            },
            ["prod", "edit", "setcat", pid, cid] => Self::SetProductCategory {
                product_id: id(pid)?,
                category_id: id(cid)?,
            },
            ["prod", "del"] => Self::DeleteProductMenu,
            ["prod", "del", "cat", cid] => Self::DeleteProductIn(id(cid)?),
            ["prod", "del", "id", pid] => Self::DeleteProduct(id(pid)?),
            ["posts"] => Self::Posts,
            ["post", "add"] => Self::AddPostMenu,
            ["post", "add", "type", kind] => Self::AddPost(PostKind::from_str(kind).ok()?),
            ["post", "del"] => Self::DeletePostMenu,
            ["post", "del", pid] => Self::DeletePost(id(pid)?),
            ["orders"] => Self::Orders,
            // Statuses are free text and may themselves contain `:`.
            ["orders", "list", status @ ..] if !status.is_empty() => {
                Self::OrdersByStatus(non_empty(status.join(":"))?)
            }
            ["order", "view", oid] => Self::ViewOrder(id(oid)?),
            ["order", "status", oid, status @ ..] if !status.is_empty() => Self::SetOrderStatus {
                order_id: id(oid)?,
                status: non_empty(status.join(":"))?,
            },
            ["settings"] => Self::Settings,
            ["set", "minsum"] => Self::MinimumSum,
            ["set", "pickup"] => Self::PickupPoints,
            ["set", "pickup", "add"] => Self::AddPickupPoint,
            ["set", "pickup", "del", pid] => Self::DeletePickupPoint(id(pid)?),
            ["stats"] => Self::Stats,
            ["stats", "preset", preset] => match StatsPreset::from_str(preset) {
                Ok(p) => Self::StatsReport(p),
                Err(_) => Self::UnknownPreset((*preset).to_string()),
            },
            _ => return None,
        };
        Some(cmd)
    }
}

fn non_empty(s: String) -> Option<String> {
    (!s.is_empty()).then_some(s)
}

impl fmt::Display for AdminCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("admin:")?;
        match self {
            Self::Exit => f.write_str("exit"),
            Self::Back => f.write_str("back"),
            Self::Catalog => f.write_str("catalog"),
            Self::AddCategory => f.write_str("cat:add"),
            Self::DeleteCategoryMenu => f.write_str("cat:del"),
            Self::DeleteCategory(cid) => write!(f, "cat:del:{cid}"),
            Self::AddProductMenu => f.write_str("prod:add"),
            Self::AddProductIn(cid) => write!(f, "prod:add:cat:{cid}"),
            Self::EditProductMenu => f.write_str("prod:edit"),
            Self::EditProductIn(cid) => write!(f, "prod:edit:cat:{cid}"),
            Self::PickProduct(pid) => write!(f, "prod:edit:pick:{pid}"),
            Self::EditProductField { product_id, field } => {
                write!(f, "prod:edit:set:{product_id}:{field}")
            }
            Self::SetProductCategory {
                product_id,
                category_id,
            } => write!(f, "prod:edit:setcat:{product_id}:{category_id}"),
            Self::DeleteProductMenu => f.write_str("prod:del"),
            Self::DeleteProductIn(cid) => write!(f, "prod:del:cat:{cid}"),
            Self::DeleteProduct(pid) => write!(f, "prod:del:id:{pid}"),
            Self::Posts => f.write_str("posts"),
            Self::AddPostMenu => f.write_str("post:add"),
            Self::AddPost(kind) => write!(f, "post:add:type:{kind}"),
            Self::DeletePostMenu => f.write_str("post:del"),
            Self::DeletePost(pid) => write!(f, "post:del:{pid}"),
            Self::Orders => f.write_str("orders"),
            Self::OrdersByStatus(status) => write!(f, "orders:list:{status}"),
            Self::ViewOrder(oid) => write!(f, "order:view:{oid}"),
            Self::SetOrderStatus { order_id, status } => {
                write!(f, "order:status:{order_id}:{status}")
            }
            Self::Settings => f.write_str("settings"),
            Self::MinimumSum => f.write_str("set:minsum"),
            Self::PickupPoints => f.write_str("set:pickup"),
            Self::AddPickupPoint => f.write_str("set:pickup:add"),
            Self::DeletePickupPoint(pid) => write!(f, "set:pickup:del:{pid}"),
            Self::Stats => f.write_str("stats"),
            Self::StatsReport(preset) => write!(f, "stats:preset:{preset}"),
            Self::UnknownPreset(preset) => write!(f, "stats:preset:{preset}"),
            Self::Unknown(rest) => f.write_str(rest),
        }
    }
}

/// Customer actions.
#[derive(Debug, Clone, PartialEq)]
pub enum CustomerCommand {
    Categories,
    Category { id: i64, page: usize },
    Product(i64),
    AddToCart(i64),
    OpenCart,
    ClearCart,
    Increment(i64),
    Decrement(i64),
    RemoveFromCart(i64),
    StartCheckout,
    ChoosePickup(i64),
    Post(i64),
    ViewOrder(i64),
    RepeatOrder(i64),
    EditPhone,
    EditAddress,
    Noop,
    Unknown(String),
}

impl CustomerCommand {
    pub fn parse(payload: &str) -> Self {
        Self::try_parse(payload).unwrap_or_else(|| Self::Unknown(payload.to_string()))
    }

    fn try_parse(payload: &str) -> Option<Self> {
        let parts: Vec<&str> = payload.split(':').collect();
        let cmd = match parts.as_slice() {
            ["cats"] => Self::Categories,
            ["cat", cid] => Self::Category {
                id: id(cid)?,
                page: 0,
            },
            ["cat", cid, page] => Self::Category {
                id: id(cid)?,
                page: page.parse().ok()?,
            },
            ["prod", pid] => Self::Product(id(pid)?),
            ["add", pid] => Self::AddToCart(id(pid)?),
            ["cart", "open"] => Self::OpenCart,
            ["cart", "clear"] => Self::ClearCart,
            ["inc", pid] => Self::Increment(id(pid)?),
            ["dec", pid] => Self::Decrement(id(pid)?),
            ["del", pid] => Self::RemoveFromCart(id(pid)?),
            ["checkout", "start"] => Self::StartCheckout,
            ["choose_pickup", pid] => Self::ChoosePickup(id(pid)?),
            ["post", pid] => Self::Post(id(pid)?),
            ["order", "view", oid] => Self::ViewOrder(id(oid)?),
            ["order", "readd", oid] => Self::RepeatOrder(id(oid)?),
            ["profile", "phone"] => Self::EditPhone,
            ["profile", "addr"] => Self::EditAddress,
            ["noop"] => Self::Noop,
            _ => return None,
        };
        Some(cmd)
    }
}

impl fmt::Display for CustomerCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Categories => f.write_str("cats"),
            Self::Category { id, page } => write!(f, "cat:{id}:{page}"),
            Self::Product(pid) => write!(f, "prod:{pid}"),
            Self::AddToCart(pid) => write!(f, "add:{pid}"),
            Self::OpenCart => f.write_str("cart:open"),
            Self::ClearCart => f.write_str("cart:clear"),
            Self::Increment(pid) => write!(f, "inc:{pid}"),
            Self::Decrement(pid) => write!(f, "dec:{pid}"),
            Self::RemoveFromCart(pid) => write!(f, "del:{pid}"),
            Self::StartCheckout => f.write_str("checkout:start"),
            Self::ChoosePickup(pid) => write!(f, "choose_pickup:{pid}"),
            Self::Post(pid) => write!(f, "post:{pid}"),
            Self::ViewOrder(oid) => write!(f, "order:view:{oid}"),
            Self::RepeatOrder(oid) => write!(f, "order:readd:{oid}"),
            Self::EditPhone => f.write_str("profile:phone"),
            Self::EditAddress => f.write_str("profile:addr"),
            Self::Noop => f.write_str("noop"),
            Self::Unknown(payload) => f.write_str(payload),
        }
    }
}

/// Free text recognised before any active flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextCommand {
    Start,
    OpenAdmin,
    UnlockAdmin,
    ExitAdmin,
    Catalog,
    News,
    Cart,
    Profile,
}

impl TextCommand {
    /// Classifies `text`. The demo phrase matches case-insensitively after trimming.
    pub fn parse(text: &str, demo_phrase: Option<&str>) -> Option<Self> {
        let trimmed = text.trim();
        if trimmed == "/start" || trimmed.starts_with("/start ") {
            return Some(Self::Start);
        }
        if trimmed == "/admin" {
            return Some(Self::OpenAdmin);
        }
        let unlocks = demo_phrase
            .is_some_and(|phrase| trimmed.to_lowercase() == phrase.trim().to_lowercase());
        if unlocks {
            return Some(Self::UnlockAdmin);
        }
        match trimmed {
            render::MENU_CATALOG => Some(Self::Catalog),
            render::MENU_NEWS => Some(Self::News),
            render::MENU_CART => Some(Self::Cart),
            render::MENU_PROFILE => Some(Self::Profile),
            render::MENU_ADMIN => Some(Self::OpenAdmin),
            render::MENU_EXIT_ADMIN => Some(Self::ExitAdmin),
            _ => None,
        }
    }
}
