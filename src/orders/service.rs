//! Order lifecycle orchestration. Simpler than the product pipeline: no
//! search/filter dimension, no slug, no image side effects.

use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::catalog::listing::{Page, PageInfo};
use crate::config::AppConfig;
use crate::store::{OrderStore, StoreError};

use super::order::{NewOrder, Order, OrderInput, OrderPatch};

#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    #[error("order not found: {0}")]
    NotFound(Uuid),
    #[error("invalid order data")]
    Validation { fields: HashMap<String, String> },
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderPage {
    pub orders: Vec<Order>,
    pub pagination: PageInfo,
}

#[derive(Clone)]
pub struct OrderService {
    store: Arc<dyn OrderStore>,
    page_size: i64,
}

impl OrderService {
    pub fn new(store: Arc<dyn OrderStore>, config: &AppConfig) -> Self {
        Self {
            store,
            page_size: config.listing.order_page_size,
        }
    }

    /// Page through all orders with the same clamp policy as the product
    /// listing; there is no filter dimension here.
    pub async fn list(&self, page: Option<i64>, limit: Option<i64>) -> Result<OrderPage, OrderError> {
        let total = self.store.count().await?;
        let page = Page::resolve(page, limit, self.page_size, total);

        let orders = if page.total_pages == 0 {
            Vec::new()
        } else {
            self.store.list(page.limit, page.offset).await?
        };

        Ok(OrderPage {
            orders,
            pagination: page.info(total),
        })
    }

    /// Persist a new order. Unlike products there is no uniqueness check.
    pub async fn create(&self, input: OrderInput) -> Result<Order, OrderError> {
        input
            .validate()
            .map_err(|fields| OrderError::Validation { fields })?;

        let order = self
            .store
            .insert(NewOrder {
                buyer: input.buyer,
                items: input.items,
                status: input.status,
            })
            .await?;
        Ok(order)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Order, OrderError> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or(OrderError::NotFound(id))
    }

    pub async fn update_by_id(&self, id: Uuid, patch: OrderPatch) -> Result<Order, OrderError> {
        patch
            .validate()
            .map_err(|fields| OrderError::Validation { fields })?;

        self.store
            .update_by_id(id, &patch)
            .await?
            .ok_or(OrderError::NotFound(id))
    }

    /// Delete an order by id. A missing id raises `NotFound`, matching the
    /// read and update operations.
    pub async fn delete_by_id(&self, id: Uuid) -> Result<Order, OrderError> {
        self.store
            .delete_by_id(id)
            .await?
            .ok_or(OrderError::NotFound(id))
    }
}
