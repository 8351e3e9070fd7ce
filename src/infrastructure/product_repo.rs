use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::ports::CatalogRepository;
use crate::domain::product::{NewProduct, Product, ProductChanges};
use crate::schema::products;

use super::models::{NewProductRow, ProductChangesRow, ProductRow};

pub struct DieselCatalogRepository {
    pool: DbPool,
}

impl DieselCatalogRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl CatalogRepository for DieselCatalogRepository {
    fn create(&self, product: NewProduct) -> Result<Uuid, DomainError> {
        let mut conn = self.pool.get()?;

        let id = Uuid::new_v4();
        diesel::insert_into(products::table)
            .values(&NewProductRow::new(id, product))
            .execute(&mut conn)?;

        Ok(id)
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<Product>, DomainError> {
        let mut conn = self.pool.get()?;

        let row = products::table
            .filter(products::id.eq(id))
            .select(ProductRow::as_select())
            .first(&mut conn)
            .optional()?;

        Ok(row.map(Product::from))
    }

    fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Product>, DomainError> {
        if ids.is_empty() {
            return Ok(vec![]);
        }
        let mut conn = self.pool.get()?;

        let rows = products::table
            .filter(products::id.eq_any(ids))
            .select(ProductRow::as_select())
            .load(&mut conn)?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    fn update(&self, id: Uuid, changes: ProductChanges) -> Result<bool, DomainError> {
        // Diesel refuses an UPDATE with no columns.
        if changes.is_empty() {
            return Ok(self.find_by_id(id)?.is_some());
        }
        let mut conn = self.pool.get()?;

        let updated = diesel::update(products::table.filter(products::id.eq(id)))
            .set(&ProductChangesRow::from(changes))
            .execute(&mut conn)?;

        Ok(updated > 0)
    }

    fn delete(&self, id: Uuid) -> Result<bool, DomainError> {
        let mut conn = self.pool.get()?;

        let deleted = diesel::delete(products::table.filter(products::id.eq(id))).execute(&mut conn)?;

        Ok(deleted > 0)
    }
}
