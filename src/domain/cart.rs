use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::DomainError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub product_id: Uuid,
    pub quantity: i32,
}

/// A user's cart. `version` increases on every write and backs the
/// conditional replace in [`CartRepository`](super::ports::CartRepository).
#[derive(Debug, Clone)]
pub struct Cart {
    pub id: Uuid,
    pub user_id: String,
    pub items: Vec<CartItem>,
    pub version: i64,
    pub created_at: DateTime<Utc>,
}

/// One requested addition, as submitted by a client.
#[derive(Debug, Clone)]
pub struct CartItemInput {
    pub product_id: String,
    pub quantity: i32,
}

/// Parse an opaque product identifier.
pub fn parse_product_id(raw: &str) -> Result<Uuid, DomainError> {
    Uuid::parse_str(raw.trim()).map_err(|_| DomainError::InvalidReference("product"))
}

/// Merge `additions` into `items`. A product already present has its quantity
/// incremented, anything else is appended, so product ids stay unique.
pub fn merge_items(
    mut items: Vec<CartItem>,
    additions: &[CartItem],
) -> Result<Vec<CartItem>, DomainError> {
    for addition in additions {
        match items
            .iter_mut()
            .find(|i| i.product_id == addition.product_id)
        {
            Some(existing) => {
                existing.quantity = existing
                    .quantity
                    .checked_add(addition.quantity)
                    .ok_or_else(|| {
                        DomainError::InvalidInput(format!(
                            "quantity for product {} is too large",
                            addition.product_id
                        ))
                    })?;
            }
            None => items.push(addition.clone()),
        }
    }
    Ok(items)
}

/// Drop every item for `product_id`. Removing an absent product is a no-op.
pub fn remove_product(items: Vec<CartItem>, product_id: Uuid) -> Vec<CartItem> {
    items
        .into_iter()
        .filter(|i| i.product_id != product_id)
        .collect()
}
