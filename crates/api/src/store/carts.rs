//! Cart records and their store front.

use brightspoke_core::{CartId, CustomerId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{Collection, StoreError};

/// One line in a cart.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub product_id: i64,
    pub name: String,
    pub price: Decimal,
    pub quantity: u32,
}

impl CartItem {
    /// Price times quantity for this line.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

/// A stored cart, linked to its customer profile by `customer_id`.
///
/// `total` is persisted with the record and must always equal the sum of
/// the line totals; mutations go through [`Cart::set_items`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    pub id: CartId,
    pub customer_id: CustomerId,
    pub items: Vec<CartItem>,
    pub total: Decimal,
    pub created_at: DateTime<Utc>,
}

impl Cart {
    /// A fresh cart: no items, zero total.
    #[must_use]
    pub fn empty(id: CartId, customer_id: CustomerId) -> Self {
        Self {
            id,
            customer_id,
            items: Vec::new(),
            total: Decimal::ZERO,
            created_at: Utc::now(),
        }
    }

    /// Replace the line items, keeping `total` in sync.
    pub fn set_items(&mut self, items: Vec<CartItem>) {
        self.total = items.iter().map(CartItem::line_total).sum();
        self.items = items;
    }
}

/// Typed front over the carts collection.
pub struct CartStore<'a> {
    collection: &'a Collection<Cart>,
}

impl<'a> CartStore<'a> {
    pub(super) fn new(collection: &'a Collection<Cart>) -> Self {
        Self { collection }
    }

    /// Insert an empty cart for a customer.
    ///
    /// # Errors
    ///
    /// Returns a persistence error if the write fails.
    pub async fn create(&self, customer_id: CustomerId) -> Result<Cart, StoreError> {
        self.collection
            .insert_with(move |id| Cart::empty(CartId::new(id), customer_id))
            .await
    }

    /// Look up a cart by id.
    pub async fn find_by_id(&self, id: CartId) -> Option<Cart> {
        self.collection.find(|c| c.id == id).await
    }

    /// Fetch a cart by id, treating absence as an error.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if no cart has this id.
    pub async fn get(&self, id: CartId) -> Result<Cart, StoreError> {
        self.find_by_id(id).await.ok_or(StoreError::NotFound("Cart"))
    }

    /// Look up the cart linked to a customer profile.
    pub async fn find_by_customer(&self, customer_id: CustomerId) -> Option<Cart> {
        self.collection.find(|c| c.customer_id == customer_id).await
    }

    /// Number of stored carts.
    pub async fn count(&self) -> usize {
        self.collection.count().await
    }
}
