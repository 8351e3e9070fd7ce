use thiserror::Error;

use super::order::OrderStatus;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Invalid {0} ID format")]
    InvalidReference(&'static str),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Cart items list is empty.")]
    EmptyBatch,
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("Cart is empty")]
    EmptyCart,
    #[error("Invalid status '{0}'. Allowed values: pending, processing, shipped, delivered, cancelled")]
    InvalidStatus(String),
    #[error("Order must be 'asc' or 'desc'.")]
    InvalidSortOrder,
    #[error("Cannot move order from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },
    #[error("Cart for user '{0}' was modified concurrently, retry the request")]
    ConcurrentModification(String),
    #[error("Internal error: {0}")]
    Internal(String),
}
