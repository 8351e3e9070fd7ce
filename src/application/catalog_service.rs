use std::sync::Arc;

use crate::domain::cart::parse_product_id;
use crate::domain::errors::DomainError;
use crate::domain::ports::CatalogRepository;
use crate::domain::product::{validate_price, NewProduct, Product, ProductChanges};

fn validate_stock(stock: i32) -> Result<(), DomainError> {
    if stock < 0 {
        return Err(DomainError::InvalidInput("stock must not be negative".to_string()));
    }
    Ok(())
}

pub struct CatalogService {
    repo: Arc<dyn CatalogRepository>,
}

impl CatalogService {
    pub fn new(repo: Arc<dyn CatalogRepository>) -> Self {
        Self { repo }
    }

    pub fn create_product(&self, product: NewProduct) -> Result<Product, DomainError> {
        validate_price(&product.price)?;
        validate_stock(product.stock)?;
        let id = self.repo.create(product)?;
        self.repo.find_by_id(id)?.ok_or(DomainError::NotFound("Product"))
    }

    pub fn get_product(&self, id: &str) -> Result<Product, DomainError> {
        let id = parse_product_id(id)?;
        self.repo.find_by_id(id)?.ok_or(DomainError::NotFound("Product"))
    }

    /// Apply a partial update. Orders already placed keep the price they were
    /// checked out at.
    pub fn update_product(&self, id: &str, changes: ProductChanges) -> Result<Product, DomainError> {
        let id = parse_product_id(id)?;
        if let Some(price) = &changes.price {
            validate_price(price)?;
        }
        if let Some(stock) = changes.stock {
            validate_stock(stock)?;
        }

        if !self.repo.update(id, changes)? {
            return Err(DomainError::NotFound("Product"));
        }
        log::info!("Updated product {}", id);
        self.repo.find_by_id(id)?.ok_or(DomainError::NotFound("Product"))
    }

    pub fn delete_product(&self, id: &str) -> Result<(), DomainError> {
        let id = parse_product_id(id)?;
        if self.repo.delete(id)? {
            Ok(())
        } else {
            Err(DomainError::NotFound("Product"))
        }
    }
}
