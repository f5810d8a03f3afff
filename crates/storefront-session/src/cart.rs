// SPDX-FileCopyrightText: 2026 Storefront Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory shopping cart.

use std::collections::BTreeMap;

/// Product id to quantity. Every stored quantity is at least 1.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cart {
    lines: BTreeMap<i64, u32>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `qty` of a product, creating the line if needed. Zero is ignored.
    pub fn add(&mut self, product_id: i64, qty: u32) {
        if qty == 0 {
            return;
        }
        let entry = self.lines.entry(product_id).or_insert(0);
        *entry = entry.saturating_add(qty);
    }

    /// Increase an existing line by one. Returns false if the product is not in the cart.
    pub fn increment(&mut self, product_id: i64) -> bool {
        match self.lines.get_mut(&product_id) {
            Some(qty) => {
                *qty = qty.saturating_add(1);
                true
            }
            None => false,
        }
    }

    /// Decrease an existing line by one, dropping it at zero.
    ///
    /// Returns false if the product is not in the cart.
    pub fn decrement(&mut self, product_id: i64) -> bool {
        let Some(qty) = self.lines.get_mut(&product_id) else {
            return false;
        };
        *qty -= 1;
        if *qty == 0 {
            self.lines.remove(&product_id);
        }
        true
    }

    pub fn remove(&mut self, product_id: i64) -> bool {
        self.lines.remove(&product_id).is_some()
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Drop every line whose product id fails `keep`.
    pub fn retain_products(&mut self, mut keep: impl FnMut(i64) -> bool) {
        self.lines.retain(|product_id, _| keep(*product_id));
    }

    pub fn quantity(&self, product_id: i64) -> Option<u32> {
        self.lines.get(&product_id).copied()
    }

    /// Lines in product id order.
    pub fn lines(&self) -> Vec<(i64, u32)> {
        self.lines.iter().map(|(id, qty)| (*id, *qty)).collect()
    }

    pub fn product_ids(&self) -> impl Iterator<Item = i64> + '_ {
        self.lines.keys().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Sum of quantities.
    pub fn item_count(&self) -> u32 {
        self.lines.values().fold(0u32, |acc, q| acc.saturating_add(*q))
    }

    /// Sum of `qty * price` over lines whose price `price_of` knows.
    ///
    /// Lines without a price (deleted products) are skipped.
    pub fn total(&self, mut price_of: impl FnMut(i64) -> Option<f64>) -> f64 {
        self.lines
            .iter()
            .filter_map(|(id, qty)| price_of(*id).map(|p| p * f64::from(*qty)))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn add_creates_then_increases() {
        let mut cart = Cart::new();
        cart.add(1, 3);
        cart.add(1, 2);
        cart.add(2, 0);
        assert_eq!(cart.quantity(1), Some(5));
        assert_eq!(cart.quantity(2), None);
    }

    #[test]
    fn inc_and_dec_only_touch_existing_lines() {
        let mut cart = Cart::new();
        assert!(!cart.increment(7));
        assert!(!cart.decrement(7));
        assert!(cart.is_empty());

        cart.add(7, 1);
        assert!(cart.increment(7));
        assert_eq!(cart.quantity(7), Some(2));
        assert!(cart.decrement(7));
        assert!(cart.decrement(7));
        assert_eq!(cart.quantity(7), None);
        assert!(cart.is_empty());
    }

    #[test]
    fn retain_prunes_missing_products() {
        let mut cart = Cart::new();
        cart.add(1, 1);
        cart.add(2, 1);
        cart.add(3, 1);
        cart.retain_products(|id| id != 2);
        assert_eq!(cart.lines(), vec![(1, 1), (3, 1)]);
    }

    #[test]
    fn total_skips_unknown_prices() {
        let mut cart = Cart::new();
        cart.add(1, 2);
        cart.add(2, 2);
        let total = cart.total(|id| (id == 1).then_some(10.0));
        assert_eq!(total, 20.0);
        assert_eq!(cart.item_count(), 4);
    }

    #[derive(Debug, Clone)]
    enum Op {
        Add(i64, u32),
        Inc(i64),
        Dec(i64),
        Del(i64),
        Clear,
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0i64..5, 0u32..4).prop_map(|(p, q)| Op::Add(p, q)),
            (0i64..5).prop_map(Op::Inc),
            (0i64..5).prop_map(Op::Dec),
            (0i64..5).prop_map(Op::Del),
            Just(Op::Clear),
        ]
    }

    proptest! {
        #[test]
        fn quantities_stay_positive_and_total_matches(ops in prop::collection::vec(op(), 0..60)) {
            let prices = [1.0, 2.5, 10.0, 0.0, 7.25];
            let mut cart = Cart::new();
            for op in ops {
                match op {
                    Op::Add(p, q) => cart.add(p, q),
                    Op::Inc(p) => { cart.increment(p); }
                    Op::Dec(p) => { cart.decrement(p); }
                    Op::Del(p) => { cart.remove(p); }
                    Op::Clear => cart.clear(),
                }
                for (_, qty) in cart.lines() {
                    prop_assert!(qty >= 1);
                }
            }
            let expected: f64 = cart
                .lines()
                .iter()
                .map(|(p, q)| prices[*p as usize] * f64::from(*q))
                .sum();
            let total = cart.total(|p| prices.get(p as usize).copied());
            prop_assert!((total - expected).abs() < 1e-9);
        }
    }
}
