use uuid::Uuid;

use super::cart::{Cart, CartItem};
use super::errors::DomainError;
use super::order::{NewOrder, Order, OrderStatus};
use super::product::{NewProduct, Product, ProductChanges};

pub trait CartRepository: Send + Sync + 'static {
    fn find_by_user(&self, user_id: &str) -> Result<Option<Cart>, DomainError>;
    /// Insert an empty cart unless one exists, then return the stored cart.
    fn create_if_missing(&self, user_id: &str) -> Result<Cart, DomainError>;
    /// Replace the item list only if the stored version is still
    /// `expected_version`. Returns `false` when another write got there first.
    fn replace_items(
        &self,
        user_id: &str,
        items: &[CartItem],
        expected_version: i64,
    ) -> Result<bool, DomainError>;
    fn list_all(&self) -> Result<Vec<Cart>, DomainError>;
}

pub trait OrderRepository: Send + Sync + 'static {
    fn insert(&self, order: NewOrder) -> Result<Uuid, DomainError>;
    fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, DomainError>;
    fn list_by_user(&self, user_id: &str) -> Result<Vec<Order>, DomainError>;
    /// Move the order from `from` to `to`. Returns `false` when no order has
    /// this id or its status is no longer `from`.
    fn update_status(&self, id: Uuid, from: OrderStatus, to: OrderStatus) -> Result<bool, DomainError>;
}

pub trait CatalogRepository: Send + Sync + 'static {
    fn create(&self, product: NewProduct) -> Result<Uuid, DomainError>;
    fn find_by_id(&self, id: Uuid) -> Result<Option<Product>, DomainError>;
    fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Product>, DomainError>;
    /// Returns `false` when no product has this id.
    fn update(&self, id: Uuid, changes: ProductChanges) -> Result<bool, DomainError>;
    fn delete(&self, id: Uuid) -> Result<bool, DomainError>;
}
