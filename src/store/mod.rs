//! Persistence boundary. Services talk to these traits; the Postgres
//! implementation lives in `postgres`, and test doubles in `crate::testing`.

pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::catalog::listing::ProductFilter;
use crate::catalog::product::{NewProduct, Product, ProductPatch};
use crate::orders::order::{NewOrder, Order, OrderPatch};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database connection error: {0}")]
    Connection(String),
    #[error("query error: {0}")]
    Query(String),
    #[error("migration error: {0}")]
    Migration(String),
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Filtered page of products in listing order, category populated.
    async fn list(
        &self,
        filter: &ProductFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Product>, StoreError>;

    async fn count(&self, filter: &ProductFilter) -> Result<i64, StoreError>;

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Product>, StoreError>;

    /// Exact-match existence check used for the duplicate-title guard.
    async fn title_exists(&self, title: &str) -> Result<bool, StoreError>;

    async fn insert(&self, product: NewProduct) -> Result<Product, StoreError>;

    /// Apply a partial update; returns the updated record, or `None` when
    /// no record matched the slug.
    async fn update_by_slug(
        &self,
        slug: &str,
        patch: &ProductPatch,
    ) -> Result<Option<Product>, StoreError>;

    /// Remove the record; returns the deleted record, or `None` when no
    /// record matched the slug.
    async fn delete_by_slug(&self, slug: &str) -> Result<Option<Product>, StoreError>;
}

#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Order>, StoreError>;

    async fn count(&self) -> Result<i64, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, StoreError>;

    async fn insert(&self, order: NewOrder) -> Result<Order, StoreError>;

    async fn update_by_id(&self, id: Uuid, patch: &OrderPatch)
        -> Result<Option<Order>, StoreError>;

    async fn delete_by_id(&self, id: Uuid) -> Result<Option<Order>, StoreError>;
}
