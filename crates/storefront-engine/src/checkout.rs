// SPDX-FileCopyrightText: 2026 Storefront Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Checkout dialogue and profile edits.
//!
//! Checkout asks for a phone number, then either a delivery address (cart
//! total at or above the minimum delivery sum) or a pickup point. The order is
//! written in a single storage call once the destination is known; the cart
//! and the flow slot are cleared only after that call succeeds.

use tracing::info;

use storefront_core::{ContentStore, OrderStore, ProfileStore, StorefrontError};
use storefront_session::{Flow, UserSession};

use crate::customer::lines_total;
use crate::engine::{ConversationEngine, Ctx, Reply};
use crate::render::{self, Destination};

const PHONE_PROMPT: &str = "Enter your phone number (it will be saved to your profile):";
const ADDRESS_PROMPT: &str = "Enter the delivery address (it will be saved to your profile):";

impl ConversationEngine {
    pub(crate) async fn start_checkout(
        &self,
        ctx: Ctx,
        session: &mut UserSession,
    ) -> Result<Reply, StorefrontError> {
        let lines = self.resolve_cart(&mut session.cart).await?;
        if lines.is_empty() {
            return Ok(Reply::toast("Your cart is empty"));
        }
        let total = lines_total(&lines);
        let min_sum = self.storage.get_min_delivery_sum().await?;
        let home_delivery = total >= min_sum;
        session.start(Flow::CheckoutPhone { home_delivery });
        Ok(Reply::text(ctx.chat_id, PHONE_PROMPT))
    }

    pub(crate) async fn checkout_phone_step(
        &self,
        ctx: Ctx,
        session: &mut UserSession,
        home_delivery: bool,
        text: &str,
    ) -> Result<Reply, StorefrontError> {
        let phone = text.trim();
        if phone.is_empty() {
            session.start(Flow::CheckoutPhone { home_delivery });
            return Ok(Reply::text(
                ctx.chat_id,
                format!("The phone number is empty. {PHONE_PROMPT}"),
            ));
        }
        self.storage.set_phone(ctx.user_id, phone).await?;

        if home_delivery {
            session.start(Flow::CheckoutAddress);
            return Ok(Reply::text(ctx.chat_id, ADDRESS_PROMPT));
        }

        let points = self.storage.list_pickup_points().await?;
        if points.is_empty() {
            return Ok(Reply::text(
                ctx.chat_id,
                "Pickup points are not configured. Please contact the administrator.",
            ));
        }
        session.start(Flow::CheckoutPickup);
        Ok(Reply::keyboard(
            ctx.chat_id,
            "<b>Choose a pickup point:</b>",
            render::pickup_choice_keyboard(&points, self.shop.pickup_choice_limit),
        ))
    }

    pub(crate) async fn checkout_address_step(
        &self,
        ctx: Ctx,
        session: &mut UserSession,
        text: &str,
    ) -> Result<Reply, StorefrontError> {
        let address = text.trim();
        if address.is_empty() {
            session.start(Flow::CheckoutAddress);
            return Ok(Reply::text(
                ctx.chat_id,
                format!("The address is empty. {ADDRESS_PROMPT}"),
            ));
        }
        self.storage.set_address(ctx.user_id, address).await?;
        self.place_order(ctx, session, Destination::Home(address))
            .await
    }

    /// Completes a pickup checkout. Only valid while the pickup choice is open.
    pub(crate) async fn choose_pickup(
        &self,
        ctx: Ctx,
        session: &mut UserSession,
        point_id: i64,
    ) -> Result<Reply, StorefrontError> {
        if session.flow != Some(Flow::CheckoutPickup) {
            return Ok(Reply::toast("No checkout in progress"));
        }
        let points = self.storage.list_pickup_points().await?;
        let Some(point) = points.iter().find(|p| p.id == point_id) else {
            return Ok(Reply::toast("Pickup point not found"));
        };
        self.place_order(ctx, session, Destination::Pickup(&point.address))
            .await
    }

    async fn place_order(
        &self,
        ctx: Ctx,
        session: &mut UserSession,
        destination: Destination<'_>,
    ) -> Result<Reply, StorefrontError> {
        let placed = self
            .storage
            .place_order(ctx.user_id, Some(ctx.chat_id), &session.cart.lines())
            .await?;
        session.clear_flow();
        session.cart.clear();

        let Some(placed) = placed else {
            return Ok(Reply::text(ctx.chat_id, "Your cart is empty."));
        };
        info!(
            order_id = placed.id,
            user_id = ctx.user_id,
            total = placed.total,
            items = placed.item_count,
            "order placed"
        );
        #[cfg(feature = "prometheus")]
        storefront_prometheus::record_order_placed(placed.total);

        Ok(Reply::keyboard(
            ctx.chat_id,
            render::order_confirmation(&placed, destination, self.currency()),
            self.main_menu(ctx.user_id),
        ))
    }

    pub(crate) async fn profile_edit_step(
        &self,
        ctx: Ctx,
        session: &mut UserSession,
        flow: Flow,
        text: &str,
    ) -> Result<Reply, StorefrontError> {
        let value = text.trim();
        let is_phone = flow == Flow::EditPhone;
        if value.is_empty() {
            let prompt = if is_phone {
                "The phone number is empty. Enter your phone number:"
            } else {
                "The address is empty. Enter your delivery address:"
            };
            session.start(flow);
            return Ok(Reply::text(ctx.chat_id, prompt));
        }
        let done = if is_phone {
            self.storage.set_phone(ctx.user_id, value).await?;
            "✅ Phone updated"
        } else {
            self.storage.set_address(ctx.user_id, value).await?;
            "✅ Address updated"
        };
        Ok(Reply::keyboard(ctx.chat_id, done, self.main_menu(ctx.user_id)))
    }
}
