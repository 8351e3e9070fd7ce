use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use bigdecimal::{BigDecimal, Zero};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::cart::CartItem;
use super::errors::DomainError;
use super::product::Product;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Pending,
        OrderStatus::Processing,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// Statuses reachable in one step under [`TransitionPolicy::ForwardOnly`].
    fn forward_successors(self) -> &'static [OrderStatus] {
        match self {
            OrderStatus::Pending => &[OrderStatus::Processing, OrderStatus::Cancelled],
            OrderStatus::Processing => &[OrderStatus::Shipped, OrderStatus::Cancelled],
            OrderStatus::Shipped => &[OrderStatus::Delivered, OrderStatus::Cancelled],
            OrderStatus::Delivered | OrderStatus::Cancelled => &[],
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Case-insensitive: `"SHIPPED"` parses as [`OrderStatus::Shipped`].
impl FromStr for OrderStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == normalized)
            .ok_or(DomainError::InvalidStatus(normalized))
    }
}

/// Which status changes `update_status` accepts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TransitionPolicy {
    /// Any status may be set from any status.
    #[default]
    Unrestricted,
    /// pending -> processing -> shipped -> delivered, with cancellation from
    /// any non-terminal status. Delivered and cancelled are terminal.
    ForwardOnly,
}

impl TransitionPolicy {
    pub fn allows(self, from: OrderStatus, to: OrderStatus) -> bool {
        match self {
            TransitionPolicy::Unrestricted => true,
            TransitionPolicy::ForwardOnly => from.forward_successors().contains(&to),
        }
    }

    pub fn check(self, from: OrderStatus, to: OrderStatus) -> Result<(), DomainError> {
        if self.allows(from, to) {
            Ok(())
        } else {
            Err(DomainError::InvalidTransition { from, to })
        }
    }
}

impl FromStr for TransitionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "unrestricted" => Ok(TransitionPolicy::Unrestricted),
            "forward-only" | "forward_only" => Ok(TransitionPolicy::ForwardOnly),
            other => Err(format!(
                "unknown status policy '{other}', expected 'unrestricted' or 'forward-only'"
            )),
        }
    }
}

/// A cart line priced at checkout. `price` is a snapshot and never changes
/// after the order is written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: Uuid,
    pub quantity: i32,
    pub price: BigDecimal,
}

#[derive(Debug, Clone)]
pub struct Order {
    pub id: Uuid,
    pub user_id: String,
    pub items: Vec<OrderItem>,
    pub total: BigDecimal,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewOrder {
    pub user_id: String,
    pub items: Vec<OrderItem>,
    pub total: BigDecimal,
    pub status: OrderStatus,
}

/// Result of pricing a cart against the catalog.
#[derive(Debug, Clone)]
pub struct PricedCart {
    pub items: Vec<OrderItem>,
    pub total: BigDecimal,
    /// Cart products that no longer exist in the catalog.
    pub skipped: Vec<Uuid>,
}

/// Price each cart item from `catalog`. Items whose product is missing are
/// left out of the order and reported in `skipped` instead of failing.
pub fn price_cart_items(items: &[CartItem], catalog: &HashMap<Uuid, Product>) -> PricedCart {
    let mut priced = PricedCart {
        items: Vec::with_capacity(items.len()),
        total: BigDecimal::zero(),
        skipped: Vec::new(),
    };

    for item in items {
        let Some(product) = catalog.get(&item.product_id) else {
            priced.skipped.push(item.product_id);
            continue;
        };

        priced.total += &product.price * BigDecimal::from(item.quantity);
        priced.items.push(OrderItem {
            product_id: item.product_id,
            quantity: item.quantity,
            price: product.price.clone(),
        });
    }

    priced
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::product::tests::product_with_price;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    #[test]
    fn status_parsing_is_case_insensitive() {
        assert_eq!("SHIPPED".parse::<OrderStatus>().unwrap(), OrderStatus::Shipped);
        assert_eq!(" Pending ".parse::<OrderStatus>().unwrap(), OrderStatus::Pending);
    }

    #[test]
    fn unknown_status_is_rejected() {
        let err = "bogus".parse::<OrderStatus>().unwrap_err();
        assert!(matches!(err, DomainError::InvalidStatus(s) if s == "bogus"));
    }

    #[test]
    fn status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&OrderStatus::Cancelled).unwrap(),
            "\"cancelled\""
        );
    }

    #[test]
    fn unrestricted_policy_allows_everything() {
        for from in OrderStatus::ALL {
            for to in OrderStatus::ALL {
                assert!(TransitionPolicy::Unrestricted.allows(from, to));
            }
        }
    }

    #[test]
    fn forward_only_policy_follows_fulfillment_order() {
        let policy = TransitionPolicy::ForwardOnly;

        assert!(policy.allows(OrderStatus::Pending, OrderStatus::Processing));
        assert!(policy.allows(OrderStatus::Processing, OrderStatus::Shipped));
        assert!(policy.allows(OrderStatus::Shipped, OrderStatus::Delivered));
        assert!(policy.allows(OrderStatus::Shipped, OrderStatus::Cancelled));

        assert!(!policy.allows(OrderStatus::Pending, OrderStatus::Shipped));
        assert!(!policy.allows(OrderStatus::Delivered, OrderStatus::Cancelled));
        assert!(!policy.allows(OrderStatus::Cancelled, OrderStatus::Pending));
        assert!(!policy.allows(OrderStatus::Shipped, OrderStatus::Processing));
    }

    #[test]
    fn forward_only_check_reports_both_ends() {
        let err = TransitionPolicy::ForwardOnly
            .check(OrderStatus::Delivered, OrderStatus::Pending)
            .unwrap_err();

        assert_eq!(err.to_string(), "Cannot move order from delivered to pending");
    }

    #[test]
    fn policy_parses_from_config_values() {
        assert_eq!(
            "forward-only".parse::<TransitionPolicy>().unwrap(),
            TransitionPolicy::ForwardOnly
        );
        assert_eq!(
            "Unrestricted".parse::<TransitionPolicy>().unwrap(),
            TransitionPolicy::Unrestricted
        );
        assert!("strict".parse::<TransitionPolicy>().is_err());
    }

    #[test]
    fn pricing_sums_price_times_quantity() {
        let p1 = product_with_price("10.00");
        let p2 = product_with_price("5.00");
        let items = vec![
            CartItem { product_id: p1.id, quantity: 2 },
            CartItem { product_id: p2.id, quantity: 1 },
        ];
        let catalog = HashMap::from([(p1.id, p1.clone()), (p2.id, p2.clone())]);

        let priced = price_cart_items(&items, &catalog);

        assert_eq!(priced.total, dec("25.00"));
        assert_eq!(priced.items.len(), 2);
        assert_eq!(priced.items[0].price, dec("10.00"));
        assert!(priced.skipped.is_empty());
    }

    #[test]
    fn pricing_skips_products_missing_from_catalog() {
        let kept = product_with_price("3.50");
        let gone = Uuid::new_v4();
        let items = vec![
            CartItem { product_id: gone, quantity: 4 },
            CartItem { product_id: kept.id, quantity: 2 },
        ];
        let catalog = HashMap::from([(kept.id, kept.clone())]);

        let priced = price_cart_items(&items, &catalog);

        assert_eq!(priced.total, dec("7.00"));
        assert_eq!(priced.items.len(), 1);
        assert_eq!(priced.items[0].product_id, kept.id);
        assert_eq!(priced.skipped, vec![gone]);
    }

    #[test]
    fn pricing_with_nothing_in_catalog_yields_zero_total() {
        let items = vec![CartItem { product_id: Uuid::new_v4(), quantity: 1 }];

        let priced = price_cart_items(&items, &HashMap::new());

        assert!(priced.items.is_empty());
        assert_eq!(priced.total, BigDecimal::zero());
    }
}
