use std::collections::HashMap;
use std::sync::Arc;

use uuid::Uuid;

use crate::domain::cart::{merge_items, CartItem};
use crate::domain::errors::DomainError;
use crate::domain::order::{price_cart_items, NewOrder, Order, OrderStatus, PricedCart};
use crate::domain::ports::{CartRepository, CatalogRepository, OrderRepository};

use super::MAX_WRITE_ATTEMPTS;

/// Turns a user's cart into a pending order.
///
/// The cart is emptied with a conditional write on the version that was
/// priced, so an item added meanwhile either makes it into this order (after
/// a retry) or stays in the cart. If the order cannot be written the claimed
/// items are merged back into the cart.
pub struct CheckoutService {
    carts: Arc<dyn CartRepository>,
    orders: Arc<dyn OrderRepository>,
    catalog: Arc<dyn CatalogRepository>,
}

impl CheckoutService {
    pub fn new(
        carts: Arc<dyn CartRepository>,
        orders: Arc<dyn OrderRepository>,
        catalog: Arc<dyn CatalogRepository>,
    ) -> Self {
        Self {
            carts,
            orders,
            catalog,
        }
    }

    pub fn create_order(&self, user_id: &str) -> Result<Order, DomainError> {
        for attempt in 1..=MAX_WRITE_ATTEMPTS {
            let cart = match self.carts.find_by_user(user_id)? {
                Some(cart) if !cart.items.is_empty() => cart,
                _ => return Err(DomainError::EmptyCart),
            };
            let priced = self.price(user_id, &cart.items)?;

            if !self.carts.replace_items(user_id, &[], cart.version)? {
                log::warn!(
                    "Cart of user {} changed during checkout (attempt {}/{})",
                    user_id,
                    attempt,
                    MAX_WRITE_ATTEMPTS
                );
                continue;
            }

            let inserted = self.orders.insert(NewOrder {
                user_id: user_id.to_string(),
                items: priced.items,
                total: priced.total,
                status: OrderStatus::Pending,
            });
            let order_id = match inserted {
                Ok(id) => id,
                Err(e) => {
                    if let Err(restore_err) = self.restore_items(user_id, &cart.items) {
                        log::error!(
                            "Could not give back cart items of user {} after failed checkout: {}",
                            user_id,
                            restore_err
                        );
                    }
                    return Err(e);
                }
            };

            let order = self
                .orders
                .find_by_id(order_id)?
                .ok_or_else(|| DomainError::Internal(format!("order {order_id} vanished after insert")))?;
            log::info!(
                "Created order {} for user {} with {} item(s), total {}",
                order.id,
                user_id,
                order.items.len(),
                order.total
            );
            return Ok(order);
        }

        Err(DomainError::ConcurrentModification(user_id.to_string()))
    }

    fn price(&self, user_id: &str, items: &[CartItem]) -> Result<PricedCart, DomainError> {
        let ids: Vec<Uuid> = items.iter().map(|i| i.product_id).collect();
        let catalog: HashMap<Uuid, _> = self
            .catalog
            .find_by_ids(&ids)?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        let priced = price_cart_items(items, &catalog);
        if !priced.skipped.is_empty() {
            log::warn!(
                "Checkout for user {} skipped {} product(s) no longer in the catalog: {:?}",
                user_id,
                priced.skipped.len(),
                priced.skipped
            );
        }
        Ok(priced)
    }

    fn restore_items(&self, user_id: &str, items: &[CartItem]) -> Result<(), DomainError> {
        for _ in 0..MAX_WRITE_ATTEMPTS {
            let cart = self.carts.create_if_missing(user_id)?;
            let merged = merge_items(cart.items, items)?;
            if self.carts.replace_items(user_id, &merged, cart.version)? {
                return Ok(());
            }
        }
        Err(DomainError::ConcurrentModification(user_id.to_string()))
    }
}
