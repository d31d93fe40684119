//! Working copy of the shopping cart.
//!
//! The cart service owns the persisted cart; this module holds the copy the
//! cart screen edits between renders. The working copy is seeded once when
//! the screen is entered, mutated locally on quantity and selection changes
//! (no network calls), and reconciled after the cart service acknowledges a
//! line-item delete. Between requests it lives in the session under
//! [`session_keys::WORKING_CART`](crate::models::session_keys::WORKING_CART).
//!
//! Invariants maintained by every operation:
//! - `total_price` equals the sum of quantity × unit price over the record's
//!   current line items, and `total_quantity` the sum of quantities.
//! - No record with an empty line-item map stays in the list.
//! - A quantity never drops below 1 through `decrease`; removing a line
//!   entirely goes through `remove_line`.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use greenbasket_core::{CartRecordId, Price, ProductId, UserId};

/// Composite key addressing one line item within the selection set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LineKey {
    pub record: CartRecordId,
    pub product: ProductId,
}

impl LineKey {
    #[must_use]
    pub const fn new(record: CartRecordId, product: ProductId) -> Self {
        Self { record, product }
    }
}

/// One cart record as the cart screen works with it.
///
/// The line-item map supports multiple products per record, while the
/// display fields assume one dominant product per card. That mismatch comes
/// from the cart service's record shape and is carried as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartRecord {
    pub id: CartRecordId,
    pub owner_id: Option<UserId>,
    /// Product ID → quantity. Quantities are always ≥ 1.
    pub quantities: BTreeMap<ProductId, u32>,
    pub total_quantity: u32,
    pub total_price: Price,
    pub product_name: String,
    pub product_desc: String,
    /// Unit price is fixed per record, not per product.
    pub unit_price: Price,
    pub category: String,
    pub image_url: Option<String>,
}

impl CartRecord {
    /// Line items in stable (product ID) order, for rendering.
    pub fn lines(&self) -> impl Iterator<Item = (ProductId, u32)> + '_ {
        self.quantities.iter().map(|(id, qty)| (*id, *qty))
    }
}

/// The cart screen's working state: the record list plus the selection set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkingCart {
    records: Vec<CartRecord>,
    selected: HashSet<LineKey>,
}

impl WorkingCart {
    /// Seed the working copy from records fetched by the caller.
    ///
    /// Every line item present at load time starts selected. The selection
    /// set is never carried over from a previous seed.
    #[must_use]
    pub fn seed(records: Vec<CartRecord>) -> Self {
        let selected = records
            .iter()
            .flat_map(|record| {
                record
                    .quantities
                    .keys()
                    .map(|product| LineKey::new(record.id.clone(), *product))
            })
            .collect();

        Self { records, selected }
    }

    /// The current record list, in seed order.
    #[must_use]
    pub fn records(&self) -> &[CartRecord] {
        &self.records
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Whether a line item is included in the running subtotal.
    #[must_use]
    pub fn is_selected(&self, record: &CartRecordId, product: ProductId) -> bool {
        self.selected
            .contains(&LineKey::new(record.clone(), product))
    }

    /// Number of selected composite keys, including stale ones.
    #[must_use]
    pub fn selected_count(&self) -> usize {
        self.selected.len()
    }

    /// Flip a composite key's membership in the selection set.
    pub fn toggle_select(&mut self, record: CartRecordId, product: ProductId) {
        let key = LineKey::new(record, product);
        if !self.selected.remove(&key) {
            self.selected.insert(key);
        }
    }

    /// Increment a line item's quantity by one.
    ///
    /// No upper bound is applied here; the order service enforces stock at
    /// checkout. A missing record or line is a silent no-op.
    pub fn increase(&mut self, record: &CartRecordId, product: ProductId) {
        if let Some(rec) = self.records.iter_mut().find(|r| &r.id == record)
            && let Some(qty) = rec.quantities.get_mut(&product)
        {
            *qty += 1;
            rec.total_quantity += 1;
            rec.total_price += rec.unit_price;
        }
    }

    /// Decrement a line item's quantity by one, flooring at 1.
    ///
    /// At the floor this is a silent no-op; removing the line entirely goes
    /// through [`remove_line`](Self::remove_line).
    pub fn decrease(&mut self, record: &CartRecordId, product: ProductId) {
        if let Some(rec) = self.records.iter_mut().find(|r| &r.id == record)
            && let Some(qty) = rec.quantities.get_mut(&product)
            && *qty > 1
        {
            *qty -= 1;
            rec.total_quantity -= 1;
            rec.total_price -= rec.unit_price;
        }
    }

    /// Remove a line item after the cart service acknowledged the delete.
    ///
    /// Subtracts the removed line's full contribution from the record's
    /// aggregates and drops the record when its last line goes. Returns
    /// `false` (leaving state untouched) when the record or line does not
    /// exist. Selection keys for removed lines are left behind; they no
    /// longer match any line so they never count toward the subtotal.
    pub fn remove_line(&mut self, record: &CartRecordId, product: ProductId) -> bool {
        let Some(rec) = self.records.iter_mut().find(|r| &r.id == record) else {
            return false;
        };
        let Some(removed_qty) = rec.quantities.remove(&product) else {
            return false;
        };

        rec.total_quantity -= removed_qty;
        rec.total_price -= rec.unit_price.times(removed_qty);

        if rec.quantities.is_empty() {
            self.records.retain(|r| &r.id != record);
        }
        true
    }

    /// Subtotal over the selected line items, derived per render.
    #[must_use]
    pub fn selected_total(&self) -> Price {
        self.records
            .iter()
            .flat_map(|record| {
                record.lines().filter_map(|(product, qty)| {
                    self.is_selected(&record.id, product)
                        .then(|| record.unit_price.times(qty))
                })
            })
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, lines: &[(i64, u32)], unit_price: i64) -> CartRecord {
        let quantities: BTreeMap<ProductId, u32> = lines
            .iter()
            .map(|&(product, qty)| (ProductId::new(product), qty))
            .collect();
        let total_quantity = quantities.values().sum();
        let unit = Price::from_rupees(unit_price);

        CartRecord {
            id: CartRecordId::from(id),
            owner_id: Some(UserId::new(1)),
            total_price: unit.times(total_quantity),
            total_quantity,
            quantities,
            product_name: "Test Product".to_owned(),
            product_desc: "A product".to_owned(),
            unit_price: unit,
            category: "Grocery".to_owned(),
            image_url: None,
        }
    }

    fn assert_aggregates_consistent(cart: &WorkingCart) {
        for rec in cart.records() {
            assert!(!rec.quantities.is_empty(), "empty record left in list");
            let qty_sum: u32 = rec.quantities.values().sum();
            assert_eq!(rec.total_quantity, qty_sum);
            assert_eq!(rec.total_price, rec.unit_price.times(qty_sum));
        }
    }

    #[test]
    fn seed_selects_every_line() {
        let cart = WorkingCart::seed(vec![record("c1", &[(1, 2), (2, 1)], 50)]);
        assert!(cart.is_selected(&CartRecordId::from("c1"), ProductId::new(1)));
        assert!(cart.is_selected(&CartRecordId::from("c1"), ProductId::new(2)));
        assert_eq!(cart.selected_count(), 2);
    }

    #[test]
    fn full_scenario_from_seed_to_delete() {
        // Seed: one record, lineItems {p1: 2}, unit price 100.
        let mut cart = WorkingCart::seed(vec![record("c1", &[(1, 2)], 100)]);
        let id = CartRecordId::from("c1");
        let p1 = ProductId::new(1);
        assert_eq!(cart.records()[0].total_price, Price::from_rupees(200));

        cart.increase(&id, p1);
        assert_eq!(cart.records()[0].quantities[&p1], 3);
        assert_eq!(cart.records()[0].total_price, Price::from_rupees(300));

        // Two decreases: 3 -> 2 -> 1. A third must floor at 1, not 0.
        cart.decrease(&id, p1);
        cart.decrease(&id, p1);
        assert_eq!(cart.records()[0].quantities[&p1], 1);
        assert_eq!(cart.records()[0].total_price, Price::from_rupees(100));

        cart.decrease(&id, p1);
        assert_eq!(cart.records()[0].quantities[&p1], 1, "decrease went below 1");
        assert_aggregates_consistent(&cart);

        // Delete (after a mocked remote success) empties the record, which
        // removes it from the working list entirely.
        assert!(cart.remove_line(&id, p1));
        assert!(cart.is_empty());
    }

    #[test]
    fn aggregates_hold_under_mixed_operations() {
        let mut cart = WorkingCart::seed(vec![
            record("c1", &[(1, 2), (2, 3)], 40),
            record("c2", &[(9, 1)], 250),
        ]);
        let c1 = CartRecordId::from("c1");
        let c2 = CartRecordId::from("c2");

        cart.increase(&c1, ProductId::new(1));
        cart.increase(&c1, ProductId::new(1));
        cart.decrease(&c1, ProductId::new(2));
        cart.increase(&c2, ProductId::new(9));
        cart.decrease(&c2, ProductId::new(9));
        assert!(cart.remove_line(&c1, ProductId::new(2)));

        assert_aggregates_consistent(&cart);
        assert_eq!(cart.records().len(), 2);
        assert_eq!(cart.records()[0].total_quantity, 4);
        assert_eq!(cart.records()[0].total_price, Price::from_rupees(160));
    }

    #[test]
    fn delete_keeps_record_while_lines_remain() {
        let mut cart = WorkingCart::seed(vec![record("c1", &[(1, 2), (2, 5)], 10)]);
        let id = CartRecordId::from("c1");

        assert!(cart.remove_line(&id, ProductId::new(2)));
        assert_eq!(cart.records().len(), 1);
        assert_eq!(cart.records()[0].total_quantity, 2);
        assert_eq!(cart.records()[0].total_price, Price::from_rupees(20));
        assert_aggregates_consistent(&cart);
    }

    #[test]
    fn remove_of_unknown_line_is_untouched_state() {
        let mut cart = WorkingCart::seed(vec![record("c1", &[(1, 2)], 10)]);
        let before = cart.clone();

        assert!(!cart.remove_line(&CartRecordId::from("nope"), ProductId::new(1)));
        assert!(!cart.remove_line(&CartRecordId::from("c1"), ProductId::new(99)));
        assert_eq!(cart, before);
    }

    #[test]
    fn increase_on_missing_line_is_a_no_op() {
        let mut cart = WorkingCart::seed(vec![record("c1", &[(1, 1)], 10)]);
        let before = cart.clone();

        cart.increase(&CartRecordId::from("c1"), ProductId::new(42));
        cart.increase(&CartRecordId::from("other"), ProductId::new(1));
        assert_eq!(cart, before);
    }

    #[test]
    fn selected_total_restricts_to_the_selection() {
        let mut cart = WorkingCart::seed(vec![
            record("c1", &[(1, 2), (2, 1)], 100),
            record("c2", &[(3, 4)], 25),
        ]);
        // Everything selected at seed time: 200 + 100 + 100.
        assert_eq!(cart.selected_total(), Price::from_rupees(400));

        cart.toggle_select(CartRecordId::from("c1"), ProductId::new(2));
        assert_eq!(cart.selected_total(), Price::from_rupees(300));

        cart.toggle_select(CartRecordId::from("c1"), ProductId::new(1));
        cart.toggle_select(CartRecordId::from("c2"), ProductId::new(3));
        assert_eq!(cart.selected_total(), Price::ZERO);

        // Toggling back re-includes the line.
        cart.toggle_select(CartRecordId::from("c2"), ProductId::new(3));
        assert_eq!(cart.selected_total(), Price::from_rupees(100));
    }

    #[test]
    fn stale_selection_keys_do_not_count() {
        let mut cart = WorkingCart::seed(vec![record("c1", &[(1, 1), (2, 2)], 10)]);
        assert!(cart.remove_line(&CartRecordId::from("c1"), ProductId::new(1)));

        // The deleted line's key is still in the set (tolerated, not
        // pruned) but contributes nothing.
        assert_eq!(cart.selected_count(), 2);
        assert_eq!(cart.selected_total(), Price::from_rupees(20));
    }

    #[test]
    fn session_round_trip_preserves_state() {
        let mut cart = WorkingCart::seed(vec![record("c1", &[(1, 2)], 100)]);
        cart.toggle_select(CartRecordId::from("c1"), ProductId::new(1));

        let json = serde_json::to_string(&cart).unwrap();
        let back: WorkingCart = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cart);
    }
}
