pub mod cart_service;
pub mod catalog_service;
pub mod checkout_service;
pub mod order_service;

use std::sync::Arc;

use crate::db::DbPool;
use crate::domain::order::TransitionPolicy;
use crate::domain::ports::{CartRepository, CatalogRepository, OrderRepository};
use crate::infrastructure::cart_repo::DieselCartRepository;
use crate::infrastructure::memory::{InMemoryCartRepository, InMemoryCatalog, InMemoryOrderRepository};
use crate::infrastructure::order_repo::DieselOrderRepository;
use crate::infrastructure::product_repo::DieselCatalogRepository;

use cart_service::CartService;
use catalog_service::CatalogService;
use checkout_service::CheckoutService;
use order_service::OrderService;

/// Attempts at a conditional write before giving up on a contended record.
pub(crate) const MAX_WRITE_ATTEMPTS: usize = 5;

/// Every service the HTTP layer talks to, sharing one set of repositories.
pub struct AppServices {
    pub carts: CartService,
    pub checkout: CheckoutService,
    pub orders: OrderService,
    pub catalog: CatalogService,
}

impl AppServices {
    pub fn new(
        carts: Arc<dyn CartRepository>,
        orders: Arc<dyn OrderRepository>,
        catalog: Arc<dyn CatalogRepository>,
        policy: TransitionPolicy,
    ) -> Self {
        Self {
            carts: CartService::new(carts.clone(), catalog.clone()),
            checkout: CheckoutService::new(carts, orders.clone(), catalog.clone()),
            orders: OrderService::new(orders, policy),
            catalog: CatalogService::new(catalog),
        }
    }

    /// Services backed by Postgres through `pool`.
    pub fn with_pool(pool: DbPool, policy: TransitionPolicy) -> Self {
        Self::new(
            Arc::new(DieselCartRepository::new(pool.clone())),
            Arc::new(DieselOrderRepository::new(pool.clone())),
            Arc::new(DieselCatalogRepository::new(pool)),
            policy,
        )
    }

    /// Services backed by process memory; nothing survives a restart.
    pub fn in_memory(policy: TransitionPolicy) -> Self {
        Self::new(
            Arc::new(InMemoryCartRepository::new()),
            Arc::new(InMemoryOrderRepository::new()),
            Arc::new(InMemoryCatalog::new()),
            policy,
        )
    }
}
