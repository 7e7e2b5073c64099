//! Product lifecycle orchestration: listing, lookup, create, update, delete.

use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::imaging::{resource_id, ImageFile, ImageHost, ImagingError};
use crate::slug::derive_slug;
use crate::store::{ProductStore, StoreError};

use super::listing::{ListingParams, Page, PageInfo, ProductFilter};
use super::product::{NewProduct, Product, ProductInput, ProductPatch};

#[derive(Debug, thiserror::Error)]
pub enum ProductError {
    #[error("product not found: {0}")]
    NotFound(String),
    #[error("a product already exists with title '{0}'")]
    DuplicateTitle(String),
    #[error("invalid product data")]
    Validation { fields: HashMap<String, String> },
    #[error("image upload failed")]
    Upload(#[source] ImagingError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, Serialize)]
pub struct ProductPage {
    pub products: Vec<Product>,
    pub pagination: PageInfo,
}

#[derive(Clone)]
pub struct ProductService {
    store: Arc<dyn ProductStore>,
    images: Arc<dyn ImageHost>,
    page_size: i64,
    image_folder: String,
}

impl ProductService {
    pub fn new(
        store: Arc<dyn ProductStore>,
        images: Arc<dyn ImageHost>,
        config: &AppConfig,
    ) -> Self {
        Self {
            store,
            images,
            page_size: config.listing.product_page_size,
            image_folder: config.imaging.upload_folder.clone(),
        }
    }

    /// Paginated listing with optional search and category-membership
    /// filtering. An out-of-range page clamps to the last page.
    pub async fn list(&self, params: ListingParams) -> Result<ProductPage, ProductError> {
        let filter = ProductFilter::from_params(&params);
        let total = self.store.count(&filter).await?;
        let page = Page::resolve(params.page, params.limit, self.page_size, total);

        let products = if page.total_pages == 0 {
            Vec::new()
        } else {
            self.store.list(&filter, page.limit, page.offset).await?
        };

        Ok(ProductPage {
            products,
            pagination: page.info(total),
        })
    }

    pub async fn find_by_slug(&self, slug: &str) -> Result<Product, ProductError> {
        self.store
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| ProductError::NotFound(slug.to_string()))
    }

    /// Create a product. The title must be unused (exact match); when an
    /// image file is supplied the upload must succeed before anything is
    /// persisted.
    pub async fn create(
        &self,
        input: ProductInput,
        image: Option<ImageFile>,
    ) -> Result<Product, ProductError> {
        input
            .validate()
            .map_err(|fields| ProductError::Validation { fields })?;

        if self.store.title_exists(&input.title).await? {
            return Err(ProductError::DuplicateTitle(input.title));
        }

        let slug = derive_slug(&input.title);
        let hosted_url = match &image {
            Some(file) => Some(
                self.images
                    .upload(file, &self.image_folder)
                    .await
                    .map_err(ProductError::Upload)?,
            ),
            None => None,
        };

        let product = self
            .store
            .insert(NewProduct {
                title: input.title,
                slug,
                price: input.price,
                category_id: input.category,
                description: input.description,
                quantity: input.quantity,
                sold: input.sold.unwrap_or(0),
                shipping: input.shipping.unwrap_or(false),
                image: hosted_url,
            })
            .await?;
        Ok(product)
    }

    /// Partially update a product addressed by slug. A new title recomputes
    /// the slug; a new image is uploaded before the record is written, and
    /// the replaced image is released only after the write commits.
    pub async fn update(
        &self,
        slug: &str,
        mut patch: ProductPatch,
        image: Option<ImageFile>,
    ) -> Result<Product, ProductError> {
        patch
            .validate()
            .map_err(|fields| ProductError::Validation { fields })?;

        let existing = self
            .store
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| ProductError::NotFound(slug.to_string()))?;

        if let Some(title) = &patch.title {
            patch.slug = Some(derive_slug(title));
        }
        if let Some(file) = &image {
            patch.image = Some(
                self.images
                    .upload(file, &self.image_folder)
                    .await
                    .map_err(ProductError::Upload)?,
            );
        }

        let updated = self
            .store
            .update_by_slug(slug, &patch)
            .await?
            .ok_or_else(|| ProductError::NotFound(slug.to_string()))?;

        // The old asset is released only once the record durably points at
        // the new one; a failed write never orphans the stored reference.
        if let (Some(old_url), Some(new_url)) = (&existing.image, &patch.image) {
            if old_url != new_url {
                self.release_quietly(old_url).await;
            }
        }

        Ok(updated)
    }

    /// Delete a product addressed by slug, releasing its hosted image
    /// best-effort first. A failed release never blocks the delete.
    pub async fn delete(&self, slug: &str) -> Result<Product, ProductError> {
        let existing = self
            .store
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| ProductError::NotFound(slug.to_string()))?;

        if let Some(url) = &existing.image {
            self.release_quietly(url).await;
        }

        let deleted = self.store.delete_by_slug(slug).await?;
        Ok(deleted.unwrap_or(existing))
    }

    /// Best-effort release of a hosted asset: failures are logged, never
    /// surfaced to the caller of the originating operation.
    async fn release_quietly(&self, hosted_url: &str) {
        match resource_id(hosted_url, &self.image_folder) {
            Ok(id) => {
                if let Err(e) = self.images.release(&id).await {
                    tracing::warn!(resource = %id, error = %e, "image release failed");
                }
            }
            Err(e) => {
                tracing::warn!(url = %hosted_url, error = %e, "could not derive image resource id");
            }
        }
    }
}
