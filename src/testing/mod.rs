//! In-memory test doubles for the store and hosting collaborators.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Mutex;
use uuid::Uuid;

use crate::catalog::listing::ProductFilter;
use crate::catalog::product::{Category, NewProduct, Product, ProductPatch};
use crate::imaging::{ImageFile, ImageHost, ImagingError};
use crate::orders::order::{NewOrder, Order, OrderPatch};
use crate::store::{OrderStore, ProductStore, StoreError};

pub fn seeded_category(name: &str) -> Category {
    Category {
        id: Uuid::new_v4(),
        name: name.to_string(),
        slug: name.to_string(),
    }
}

#[derive(Default)]
pub struct MemoryProductStore {
    products: Mutex<Vec<Product>>,
    categories: Vec<Category>,
}

impl MemoryProductStore {
    pub fn with_categories(categories: Vec<Category>) -> Self {
        Self {
            products: Mutex::new(Vec::new()),
            categories,
        }
    }

    pub fn len(&self) -> usize {
        self.products.lock().unwrap().len()
    }

    fn matches(&self, product: &Product, filter: &ProductFilter) -> bool {
        if let Some(search) = &filter.search {
            let needle = search.to_lowercase();
            let hit = product.title.to_lowercase().contains(&needle)
                || product.description.to_lowercase().contains(&needle);
            if !hit {
                return false;
            }
        }
        if !filter.categories.is_empty() && !filter.categories.contains(&product.category.id) {
            return false;
        }
        true
    }

    fn populate(&self, category_id: Uuid) -> Category {
        self.categories
            .iter()
            .find(|c| c.id == category_id)
            .cloned()
            .unwrap_or(Category {
                id: category_id,
                name: String::new(),
                slug: String::new(),
            })
    }
}

#[async_trait]
impl ProductStore for MemoryProductStore {
    async fn list(
        &self,
        filter: &ProductFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Product>, StoreError> {
        let mut matching: Vec<Product> = self
            .products
            .lock()
            .unwrap()
            .iter()
            .filter(|p| self.matches(p, filter))
            .cloned()
            .collect();
        matching.sort_by(|a, b| a.price.cmp(&b.price).then_with(|| a.title.cmp(&b.title)));
        Ok(matching
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn count(&self, filter: &ProductFilter) -> Result<i64, StoreError> {
        let count = self
            .products
            .lock()
            .unwrap()
            .iter()
            .filter(|p| self.matches(p, filter))
            .count();
        Ok(count as i64)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Product>, StoreError> {
        Ok(self
            .products
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.slug == slug)
            .cloned())
    }

    async fn title_exists(&self, title: &str) -> Result<bool, StoreError> {
        Ok(self
            .products
            .lock()
            .unwrap()
            .iter()
            .any(|p| p.title == title))
    }

    async fn insert(&self, product: NewProduct) -> Result<Product, StoreError> {
        let now = Utc::now();
        let stored = Product {
            id: Uuid::new_v4(),
            title: product.title,
            slug: product.slug,
            price: product.price,
            category: self.populate(product.category_id),
            description: product.description,
            quantity: product.quantity,
            sold: product.sold,
            shipping: product.shipping,
            image: product.image,
            created_at: now,
            updated_at: now,
        };
        self.products.lock().unwrap().push(stored.clone());
        Ok(stored)
    }

    async fn update_by_slug(
        &self,
        slug: &str,
        patch: &ProductPatch,
    ) -> Result<Option<Product>, StoreError> {
        let populated = patch.category.map(|id| self.populate(id));
        let mut products = self.products.lock().unwrap();
        let Some(product) = products.iter_mut().find(|p| p.slug == slug) else {
            return Ok(None);
        };

        if let Some(title) = &patch.title {
            product.title = title.clone();
        }
        if let Some(new_slug) = &patch.slug {
            product.slug = new_slug.clone();
        }
        if let Some(price) = patch.price {
            product.price = price;
        }
        if let Some(category) = populated {
            product.category = category;
        }
        if let Some(description) = &patch.description {
            product.description = description.clone();
        }
        if let Some(quantity) = patch.quantity {
            product.quantity = quantity;
        }
        if let Some(sold) = patch.sold {
            product.sold = sold;
        }
        if let Some(shipping) = patch.shipping {
            product.shipping = shipping;
        }
        if let Some(image) = &patch.image {
            product.image = Some(image.clone());
        }
        product.updated_at = Utc::now();
        Ok(Some(product.clone()))
    }

    async fn delete_by_slug(&self, slug: &str) -> Result<Option<Product>, StoreError> {
        let mut products = self.products.lock().unwrap();
        let position = products.iter().position(|p| p.slug == slug);
        Ok(position.map(|i| products.remove(i)))
    }
}

#[derive(Default)]
pub struct MemoryOrderStore {
    orders: Mutex<Vec<Order>>,
}

impl MemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.orders.lock().unwrap().len()
    }
}

#[async_trait]
impl OrderStore for MemoryOrderStore {
    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Order>, StoreError> {
        let mut orders: Vec<Order> = self.orders.lock().unwrap().clone();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        Ok(orders
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn count(&self) -> Result<i64, StoreError> {
        Ok(self.orders.lock().unwrap().len() as i64)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, StoreError> {
        Ok(self
            .orders
            .lock()
            .unwrap()
            .iter()
            .find(|o| o.id == id)
            .cloned())
    }

    async fn insert(&self, order: NewOrder) -> Result<Order, StoreError> {
        let now = Utc::now();
        let stored = Order {
            id: Uuid::new_v4(),
            buyer: order.buyer,
            items: order.items,
            status: order.status,
            created_at: now,
            updated_at: now,
        };
        self.orders.lock().unwrap().push(stored.clone());
        Ok(stored)
    }

    async fn update_by_id(
        &self,
        id: Uuid,
        patch: &OrderPatch,
    ) -> Result<Option<Order>, StoreError> {
        let mut orders = self.orders.lock().unwrap();
        let Some(order) = orders.iter_mut().find(|o| o.id == id) else {
            return Ok(None);
        };

        if let Some(buyer) = &patch.buyer {
            order.buyer = buyer.clone();
        }
        if let Some(items) = &patch.items {
            order.items = items.clone();
        }
        if let Some(status) = patch.status {
            order.status = status;
        }
        order.updated_at = Utc::now();
        Ok(Some(order.clone()))
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<Option<Order>, StoreError> {
        let mut orders = self.orders.lock().unwrap();
        let position = orders.iter().position(|o| o.id == id);
        Ok(position.map(|i| orders.remove(i)))
    }
}

/// Recording double for the image-hosting collaborator. Release attempts
/// are recorded even when configured to fail, so tests can assert cleanup
/// was attempted without it blocking the triggering operation.
#[derive(Default)]
pub struct MockImageHost {
    uploads: Mutex<Vec<String>>,
    releases: Mutex<Vec<String>>,
    fail_uploads: bool,
    fail_releases: bool,
}

impl MockImageHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_uploads() -> Self {
        Self {
            fail_uploads: true,
            ..Default::default()
        }
    }

    pub fn failing_releases() -> Self {
        Self {
            fail_releases: true,
            ..Default::default()
        }
    }

    pub fn upload_count(&self) -> usize {
        self.uploads.lock().unwrap().len()
    }

    pub fn released(&self) -> Vec<String> {
        self.releases.lock().unwrap().clone()
    }

    pub fn release_attempts(&self) -> usize {
        self.releases.lock().unwrap().len()
    }
}

#[async_trait]
impl ImageHost for MockImageHost {
    async fn upload(&self, file: &ImageFile, folder: &str) -> Result<String, ImagingError> {
        if self.fail_uploads {
            return Err(ImagingError::UploadFailed("mock upload failure".to_string()));
        }
        let url = format!("https://images.example.com/{}/{}", folder, file.filename);
        self.uploads.lock().unwrap().push(url.clone());
        Ok(url)
    }

    async fn release(&self, resource_id: &str) -> Result<(), ImagingError> {
        self.releases.lock().unwrap().push(resource_id.to_string());
        if self.fail_releases {
            return Err(ImagingError::ReleaseFailed("mock release failure".to_string()));
        }
        Ok(())
    }
}
