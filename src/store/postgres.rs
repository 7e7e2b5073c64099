//! sqlx Postgres implementation of the store traits.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{FromRow, PgPool, QueryBuilder};
use std::time::Duration;
use uuid::Uuid;

use crate::catalog::listing::{ProductFilter, SqlParam, PRODUCT_ORDER};
use crate::catalog::product::{Category, NewProduct, Product, ProductPatch};
use crate::config::DatabaseConfig;
use crate::orders::order::{NewOrder, Order, OrderPatch, OrderStatus};

use super::{OrderStore, ProductStore, StoreError};

/// Build the connection pool and bring the schema up to date.
pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, StoreError> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .connect(&config.url)
        .await
        .map_err(|e| StoreError::Connection(e.to_string()))?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .map_err(|e| StoreError::Migration(e.to_string()))?;

    Ok(pool)
}

pub async fn health_check(pool: &PgPool) -> Result<(), StoreError> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

const PRODUCT_COLUMNS: &str = "p.id, p.title, p.slug, p.price, p.description, p.quantity, \
     p.sold, p.shipping, p.image, p.created_at, p.updated_at, \
     c.id AS category_id, c.name AS category_name, c.slug AS category_slug";

const PRODUCT_FROM: &str = "FROM products p JOIN categories c ON c.id = p.category_id";

#[derive(Debug, FromRow)]
struct ProductRow {
    id: Uuid,
    title: String,
    slug: String,
    price: Decimal,
    description: String,
    quantity: i32,
    sold: i32,
    shipping: bool,
    image: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    category_id: Uuid,
    category_name: String,
    category_slug: String,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: row.id,
            title: row.title,
            slug: row.slug,
            price: row.price,
            category: Category {
                id: row.category_id,
                name: row.category_name,
                slug: row.category_slug,
            },
            description: row.description,
            quantity: row.quantity,
            sold: row.sold,
            shipping: row.shipping,
            image: row.image,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PostgresProductStore {
    pool: PgPool,
}

impl PostgresProductStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Product>, StoreError> {
        let query = format!("SELECT {PRODUCT_COLUMNS} {PRODUCT_FROM} WHERE p.id = $1");
        let row = sqlx::query_as::<_, ProductRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Product::from))
    }
}

fn bind_filter<'q, T>(
    mut query: sqlx::query::QueryAs<'q, sqlx::Postgres, T, sqlx::postgres::PgArguments>,
    params: &[SqlParam],
) -> sqlx::query::QueryAs<'q, sqlx::Postgres, T, sqlx::postgres::PgArguments>
where
    T: for<'r> FromRow<'r, PgRow>,
{
    for param in params {
        query = match param {
            SqlParam::Text(s) => query.bind(s.clone()),
            SqlParam::TextArray(a) => query.bind(a.clone()),
        };
    }
    query
}

#[async_trait]
impl ProductStore for PostgresProductStore {
    async fn list(
        &self,
        filter: &ProductFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Product>, StoreError> {
        let sql_filter = filter.to_sql(1);
        let mut query = format!("SELECT {PRODUCT_COLUMNS} {PRODUCT_FROM}");
        if !sql_filter.clause.is_empty() {
            query.push_str(" WHERE ");
            query.push_str(&sql_filter.clause);
        }
        let next = sql_filter.params.len() + 1;
        query.push_str(&format!(
            " ORDER BY {PRODUCT_ORDER} LIMIT ${next} OFFSET ${}",
            next + 1
        ));

        let q = bind_filter(sqlx::query_as::<_, ProductRow>(&query), &sql_filter.params);
        let rows = q.bind(limit).bind(offset).fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(Product::from).collect())
    }

    async fn count(&self, filter: &ProductFilter) -> Result<i64, StoreError> {
        let sql_filter = filter.to_sql(1);
        let mut query = String::from("SELECT COUNT(*) FROM products p");
        if !sql_filter.clause.is_empty() {
            query.push_str(" WHERE ");
            query.push_str(&sql_filter.clause);
        }

        let mut q = sqlx::query_scalar::<_, i64>(&query);
        for param in &sql_filter.params {
            q = match param {
                SqlParam::Text(s) => q.bind(s.clone()),
                SqlParam::TextArray(a) => q.bind(a.clone()),
            };
        }
        Ok(q.fetch_one(&self.pool).await?)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Product>, StoreError> {
        let query = format!("SELECT {PRODUCT_COLUMNS} {PRODUCT_FROM} WHERE p.slug = $1");
        let row = sqlx::query_as::<_, ProductRow>(&query)
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Product::from))
    }

    async fn title_exists(&self, title: &str) -> Result<bool, StoreError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM products WHERE title = $1)",
        )
        .bind(title)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn insert(&self, product: NewProduct) -> Result<Product, StoreError> {
        let id = Uuid::new_v4();
        sqlx::query(
            "INSERT INTO products \
                 (id, title, slug, price, category_id, description, quantity, sold, shipping, image) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
        )
        .bind(id)
        .bind(&product.title)
        .bind(&product.slug)
        .bind(product.price)
        .bind(product.category_id)
        .bind(&product.description)
        .bind(product.quantity)
        .bind(product.sold)
        .bind(product.shipping)
        .bind(&product.image)
        .execute(&self.pool)
        .await?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| StoreError::Query("inserted product row missing".to_string()))
    }

    async fn update_by_slug(
        &self,
        slug: &str,
        patch: &ProductPatch,
    ) -> Result<Option<Product>, StoreError> {
        let mut builder = QueryBuilder::<sqlx::Postgres>::new("UPDATE products SET updated_at = now()");
        if let Some(title) = &patch.title {
            builder.push(", title = ").push_bind(title.clone());
        }
        if let Some(new_slug) = &patch.slug {
            builder.push(", slug = ").push_bind(new_slug.clone());
        }
        if let Some(price) = patch.price {
            builder.push(", price = ").push_bind(price);
        }
        if let Some(category) = patch.category {
            builder.push(", category_id = ").push_bind(category);
        }
        if let Some(description) = &patch.description {
            builder.push(", description = ").push_bind(description.clone());
        }
        if let Some(quantity) = patch.quantity {
            builder.push(", quantity = ").push_bind(quantity);
        }
        if let Some(sold) = patch.sold {
            builder.push(", sold = ").push_bind(sold);
        }
        if let Some(shipping) = patch.shipping {
            builder.push(", shipping = ").push_bind(shipping);
        }
        if let Some(image) = &patch.image {
            builder.push(", image = ").push_bind(image.clone());
        }
        builder.push(" WHERE slug = ").push_bind(slug.to_string());
        builder.push(" RETURNING id");

        let updated: Option<(Uuid,)> = builder
            .build_query_as()
            .fetch_optional(&self.pool)
            .await?;
        match updated {
            Some((id,)) => self.find_by_id(id).await,
            None => Ok(None),
        }
    }

    async fn delete_by_slug(&self, slug: &str) -> Result<Option<Product>, StoreError> {
        let existing = self.find_by_slug(slug).await?;
        if existing.is_some() {
            sqlx::query("DELETE FROM products WHERE slug = $1")
                .bind(slug)
                .execute(&self.pool)
                .await?;
        }
        Ok(existing)
    }
}

#[derive(Debug, FromRow)]
struct OrderRow {
    id: Uuid,
    buyer: String,
    items: serde_json::Value,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = StoreError;

    fn try_from(row: OrderRow) -> Result<Self, StoreError> {
        let items = serde_json::from_value(row.items)
            .map_err(|e| StoreError::Query(format!("order {} has malformed items: {e}", row.id)))?;
        let status = OrderStatus::parse(&row.status).ok_or_else(|| {
            StoreError::Query(format!("order {} has unknown status '{}'", row.id, row.status))
        })?;
        Ok(Order {
            id: row.id,
            buyer: row.buyer,
            items,
            status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const ORDER_COLUMNS: &str = "id, buyer, items, status, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct PostgresOrderStore {
    pool: PgPool,
}

impl PostgresOrderStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OrderStore for PostgresOrderStore {
    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Order>, StoreError> {
        let query = format!(
            "SELECT {ORDER_COLUMNS} FROM orders ORDER BY created_at DESC, id ASC LIMIT $1 OFFSET $2"
        );
        let rows = sqlx::query_as::<_, OrderRow>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(Order::try_from).collect()
    }

    async fn count(&self) -> Result<i64, StoreError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM orders")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, StoreError> {
        let query = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1");
        let row = sqlx::query_as::<_, OrderRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Order::try_from).transpose()
    }

    async fn insert(&self, order: NewOrder) -> Result<Order, StoreError> {
        let id = Uuid::new_v4();
        let items = serde_json::to_value(&order.items)
            .map_err(|e| StoreError::Query(format!("failed to encode order items: {e}")))?;
        let query = format!(
            "INSERT INTO orders (id, buyer, items, status) VALUES ($1, $2, $3, $4) \
             RETURNING {ORDER_COLUMNS}"
        );
        let row = sqlx::query_as::<_, OrderRow>(&query)
            .bind(id)
            .bind(&order.buyer)
            .bind(items)
            .bind(order.status.as_str())
            .fetch_one(&self.pool)
            .await?;
        Order::try_from(row)
    }

    async fn update_by_id(
        &self,
        id: Uuid,
        patch: &OrderPatch,
    ) -> Result<Option<Order>, StoreError> {
        let items = patch
            .items
            .as_ref()
            .map(serde_json::to_value)
            .transpose()
            .map_err(|e| StoreError::Query(format!("failed to encode order items: {e}")))?;

        let mut builder = QueryBuilder::<sqlx::Postgres>::new("UPDATE orders SET updated_at = now()");
        if let Some(buyer) = &patch.buyer {
            builder.push(", buyer = ").push_bind(buyer.clone());
        }
        if let Some(items) = items {
            builder.push(", items = ").push_bind(items);
        }
        if let Some(status) = patch.status {
            builder.push(", status = ").push_bind(status.as_str());
        }
        builder.push(" WHERE id = ").push_bind(id);
        builder.push(" RETURNING ");
        builder.push(ORDER_COLUMNS);

        let row: Option<OrderRow> = builder
            .build_query_as()
            .fetch_optional(&self.pool)
            .await?;
        row.map(Order::try_from).transpose()
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<Option<Order>, StoreError> {
        let query = format!("DELETE FROM orders WHERE id = $1 RETURNING {ORDER_COLUMNS}");
        let row = sqlx::query_as::<_, OrderRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Order::try_from).transpose()
    }
}
