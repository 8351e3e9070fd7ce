//! In-process implementations of the storage ports, backed by
//! `RwLock<HashMap>`. They follow the same contracts as the Diesel
//! repositories and are used by the test suites and for running the service
//! without Postgres.

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;
use uuid::Uuid;

use crate::domain::cart::{Cart, CartItem};
use crate::domain::errors::DomainError;
use crate::domain::order::{NewOrder, Order, OrderStatus};
use crate::domain::ports::{CartRepository, CatalogRepository, OrderRepository};
use crate::domain::product::{NewProduct, Product, ProductChanges};

fn read<T>(lock: &RwLock<T>) -> Result<RwLockReadGuard<'_, T>, DomainError> {
    lock.read()
        .map_err(|_| DomainError::Internal("lock poisoned (read)".to_string()))
}

fn write<T>(lock: &RwLock<T>) -> Result<RwLockWriteGuard<'_, T>, DomainError> {
    lock.write()
        .map_err(|_| DomainError::Internal("lock poisoned (write)".to_string()))
}

#[derive(Debug, Default, Clone)]
pub struct InMemoryCartRepository {
    carts: Arc<RwLock<HashMap<String, Cart>>>,
}

impl InMemoryCartRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CartRepository for InMemoryCartRepository {
    fn find_by_user(&self, user_id: &str) -> Result<Option<Cart>, DomainError> {
        Ok(read(&self.carts)?.get(user_id).cloned())
    }

    fn create_if_missing(&self, user_id: &str) -> Result<Cart, DomainError> {
        let mut carts = write(&self.carts)?;
        let cart = carts.entry(user_id.to_string()).or_insert_with(|| Cart {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            items: Vec::new(),
            version: 0,
            created_at: Utc::now(),
        });
        Ok(cart.clone())
    }

    fn replace_items(
        &self,
        user_id: &str,
        items: &[CartItem],
        expected_version: i64,
    ) -> Result<bool, DomainError> {
        let mut carts = write(&self.carts)?;
        match carts.get_mut(user_id) {
            Some(cart) if cart.version == expected_version => {
                cart.items = items.to_vec();
                cart.version += 1;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn list_all(&self) -> Result<Vec<Cart>, DomainError> {
        let mut carts: Vec<Cart> = read(&self.carts)?.values().cloned().collect();
        carts.sort_by_key(|c| c.created_at);
        Ok(carts)
    }
}

#[derive(Debug, Default, Clone)]
pub struct InMemoryOrderRepository {
    orders: Arc<RwLock<Vec<Order>>>,
}

impl InMemoryOrderRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl OrderRepository for InMemoryOrderRepository {
    fn insert(&self, order: NewOrder) -> Result<Uuid, DomainError> {
        let id = Uuid::new_v4();
        write(&self.orders)?.push(Order {
            id,
            user_id: order.user_id,
            items: order.items,
            total: order.total,
            status: order.status,
            created_at: Utc::now(),
        });
        Ok(id)
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, DomainError> {
        Ok(read(&self.orders)?.iter().find(|o| o.id == id).cloned())
    }

    fn list_by_user(&self, user_id: &str) -> Result<Vec<Order>, DomainError> {
        Ok(read(&self.orders)?
            .iter()
            .filter(|o| o.user_id == user_id)
            .cloned()
            .collect())
    }

    fn update_status(&self, id: Uuid, from: OrderStatus, to: OrderStatus) -> Result<bool, DomainError> {
        let mut orders = write(&self.orders)?;
        match orders.iter_mut().find(|o| o.id == id && o.status == from) {
            Some(order) => {
                order.status = to;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct InMemoryCatalog {
    products: Arc<RwLock<HashMap<Uuid, Product>>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CatalogRepository for InMemoryCatalog {
    fn create(&self, product: NewProduct) -> Result<Uuid, DomainError> {
        let id = Uuid::new_v4();
        write(&self.products)?.insert(
            id,
            Product {
                id,
                title: product.title,
                description: product.description,
                price: product.price,
                discount_percentage: product.discount_percentage,
                rating: product.rating,
                stock: product.stock,
                brand: product.brand,
                category: product.category,
                thumbnail: product.thumbnail,
                images: product.images,
                created_at: Utc::now(),
            },
        );
        Ok(id)
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<Product>, DomainError> {
        Ok(read(&self.products)?.get(&id).cloned())
    }

    fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Product>, DomainError> {
        let products = read(&self.products)?;
        Ok(ids.iter().filter_map(|id| products.get(id).cloned()).collect())
    }

    fn update(&self, id: Uuid, changes: ProductChanges) -> Result<bool, DomainError> {
        match write(&self.products)?.get_mut(&id) {
            Some(product) => {
                changes.apply_to(product);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn delete(&self, id: Uuid) -> Result<bool, DomainError> {
        Ok(write(&self.products)?.remove(&id).is_some())
    }
}
