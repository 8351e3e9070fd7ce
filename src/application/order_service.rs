use std::sync::Arc;

use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::order::{Order, OrderStatus, TransitionPolicy};
use crate::domain::ports::OrderRepository;

use super::MAX_WRITE_ATTEMPTS;

pub struct OrderService {
    repo: Arc<dyn OrderRepository>,
    policy: TransitionPolicy,
}

impl OrderService {
    pub fn new(repo: Arc<dyn OrderRepository>, policy: TransitionPolicy) -> Self {
        Self { repo, policy }
    }

    pub fn list_orders(&self, user_id: &str) -> Result<Vec<Order>, DomainError> {
        self.repo.list_by_user(user_id)
    }

    /// Set an order's status. `new_status` is matched case-insensitively and
    /// the change must be allowed by the configured [`TransitionPolicy`].
    ///
    /// The write only lands if the order still has the status the policy was
    /// checked against; otherwise the order is re-read and checked again.
    pub fn update_status(&self, order_id: &str, new_status: &str) -> Result<Order, DomainError> {
        let status: OrderStatus = new_status.parse()?;
        let order_id =
            Uuid::parse_str(order_id.trim()).map_err(|_| DomainError::InvalidReference("order"))?;

        for attempt in 1..=MAX_WRITE_ATTEMPTS {
            let current = self
                .repo
                .find_by_id(order_id)?
                .ok_or(DomainError::NotFound("Order"))?;
            self.policy.check(current.status, status)?;

            if self.repo.update_status(order_id, current.status, status)? {
                log::info!("Order {} moved from {} to {}", order_id, current.status, status);
                return self
                    .repo
                    .find_by_id(order_id)?
                    .ok_or(DomainError::NotFound("Order"));
            }
            log::warn!(
                "Order {} changed status concurrently (attempt {}/{})",
                order_id,
                attempt,
                MAX_WRITE_ATTEMPTS
            );
        }

        Err(DomainError::ConcurrentModification(order_id.to_string()))
    }
}
