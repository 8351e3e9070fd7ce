use chrono::Utc;
use diesel::prelude::*;
use serde_json::Value;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::cart::{Cart, CartItem};
use crate::domain::errors::DomainError;
use crate::domain::ports::CartRepository;
use crate::schema::carts;

use super::models::{CartRow, NewCartRow};

fn items_to_json(items: &[CartItem]) -> Result<Value, DomainError> {
    serde_json::to_value(items).map_err(|e| DomainError::Internal(e.to_string()))
}

pub struct DieselCartRepository {
    pool: DbPool,
}

impl DieselCartRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl CartRepository for DieselCartRepository {
    fn find_by_user(&self, user_id: &str) -> Result<Option<Cart>, DomainError> {
        let mut conn = self.pool.get()?;

        carts::table
            .filter(carts::user_id.eq(user_id))
            .select(CartRow::as_select())
            .first(&mut conn)
            .optional()?
            .map(Cart::try_from)
            .transpose()
    }

    fn create_if_missing(&self, user_id: &str) -> Result<Cart, DomainError> {
        let mut conn = self.pool.get()?;

        // Two first requests for the same user may race; the unique index on
        // user_id makes the loser's insert a no-op.
        diesel::insert_into(carts::table)
            .values(&NewCartRow {
                id: Uuid::new_v4(),
                user_id: user_id.to_string(),
                items: Value::Array(vec![]),
            })
            .on_conflict(carts::user_id)
            .do_nothing()
            .execute(&mut conn)?;

        let row = carts::table
            .filter(carts::user_id.eq(user_id))
            .select(CartRow::as_select())
            .first(&mut conn)?;
        Cart::try_from(row)
    }

    fn replace_items(
        &self,
        user_id: &str,
        items: &[CartItem],
        expected_version: i64,
    ) -> Result<bool, DomainError> {
        let mut conn = self.pool.get()?;

        let updated = diesel::update(
            carts::table
                .filter(carts::user_id.eq(user_id))
                .filter(carts::version.eq(expected_version)),
        )
        .set((
            carts::items.eq(items_to_json(items)?),
            carts::version.eq(carts::version + 1_i64),
            carts::updated_at.eq(Utc::now()),
        ))
        .execute(&mut conn)?;

        Ok(updated == 1)
    }

    fn list_all(&self) -> Result<Vec<Cart>, DomainError> {
        let mut conn = self.pool.get()?;

        carts::table
            .select(CartRow::as_select())
            .order(carts::created_at.asc())
            .load(&mut conn)?
            .into_iter()
            .map(Cart::try_from)
            .collect()
    }
}
