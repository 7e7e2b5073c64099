//! Product endpoints. Create and update accept multipart bodies so an
//! image file can ride along with the record fields; auth and rate limiting
//! run upstream of these handlers.

use axum::extract::{Multipart, Path, Query, State};
use axum::Json;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::str::FromStr;
use uuid::Uuid;

use crate::catalog::listing::ListingParams;
use crate::catalog::product::{Product, ProductInput, ProductPatch};
use crate::catalog::service::ProductPage;
use crate::error::ApiError;
use crate::imaging::ImageFile;
use crate::response::ApiResponse;

use super::AppState;

#[derive(Debug, Deserialize)]
pub struct ListingQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub search: Option<String>,
}

/// GET /products - paginated listing with optional search
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListingQuery>,
) -> Result<ApiResponse<ProductPage>, ApiError> {
    let page = state
        .products
        .list(ListingParams {
            page: query.page,
            limit: query.limit,
            search: query.search,
            categories: Vec::new(),
        })
        .await?;
    Ok(ApiResponse::success(page))
}

#[derive(Debug, Deserialize)]
pub struct FilterBody {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub search: Option<String>,
    #[serde(default)]
    pub categories: Vec<Uuid>,
}

/// POST /products/filter - listing restricted to a category set
pub async fn list_filtered(
    State(state): State<AppState>,
    Json(body): Json<FilterBody>,
) -> Result<ApiResponse<ProductPage>, ApiError> {
    let page = state
        .products
        .list(ListingParams {
            page: body.page,
            limit: body.limit,
            search: body.search,
            categories: body.categories,
        })
        .await?;
    Ok(ApiResponse::success(page))
}

/// GET /products/:slug
pub async fn get_one(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<ApiResponse<Product>, ApiError> {
    let product = state.products.find_by_slug(&slug).await?;
    Ok(ApiResponse::success(product))
}

/// POST /products - multipart body with record fields and optional image
pub async fn create(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<ApiResponse<Product>, ApiError> {
    let form = ProductForm::read(multipart).await?;
    let (input, image) = form.into_input()?;
    let product = state.products.create(input, image).await?;
    Ok(ApiResponse::created(product))
}

/// PUT /products/:slug - multipart body, all fields optional
pub async fn update(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    multipart: Multipart,
) -> Result<ApiResponse<Product>, ApiError> {
    let form = ProductForm::read(multipart).await?;
    let (patch, image) = form.into_patch();
    let product = state.products.update(&slug, patch, image).await?;
    Ok(ApiResponse::success(product))
}

/// DELETE /products/:slug
pub async fn remove(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<ApiResponse<Value>, ApiError> {
    let deleted = state.products.delete(&slug).await?;
    Ok(ApiResponse::success(json!({ "deleted": deleted.slug })))
}

/// Multipart form fields shared by create and update.
#[derive(Debug, Default)]
struct ProductForm {
    title: Option<String>,
    price: Option<Decimal>,
    category: Option<Uuid>,
    description: Option<String>,
    quantity: Option<i32>,
    sold: Option<i32>,
    shipping: Option<bool>,
    image: Option<ImageFile>,
}

impl ProductForm {
    async fn read(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut form = Self::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::bad_request(format!("malformed multipart body: {e}")))?
        {
            let Some(name) = field.name().map(ToString::to_string) else {
                continue;
            };

            if name == "image" {
                let filename = field.file_name().unwrap_or("upload").to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field.bytes().await.map_err(|e| {
                    ApiError::bad_request(format!("failed to read image field: {e}"))
                })?;
                form.image = Some(ImageFile {
                    filename,
                    content_type,
                    bytes: bytes.to_vec(),
                });
                continue;
            }

            let value = field
                .text()
                .await
                .map_err(|e| ApiError::bad_request(format!("failed to read field {name}: {e}")))?;

            match name.as_str() {
                "title" => form.title = Some(value),
                "description" => form.description = Some(value),
                "price" => form.price = Some(parse_value(&value, "price")?),
                "category" => form.category = Some(parse_value(&value, "category")?),
                "quantity" => form.quantity = Some(parse_value(&value, "quantity")?),
                "sold" => form.sold = Some(parse_value(&value, "sold")?),
                "shipping" => form.shipping = Some(parse_value(&value, "shipping")?),
                // Unknown fields are ignored, matching lenient form handling
                _ => {}
            }
        }

        Ok(form)
    }

    fn into_input(self) -> Result<(ProductInput, Option<ImageFile>), ApiError> {
        let input = ProductInput {
            title: self.title.ok_or_else(|| missing("title"))?,
            price: self.price.ok_or_else(|| missing("price"))?,
            category: self.category.ok_or_else(|| missing("category"))?,
            description: self.description.unwrap_or_default(),
            quantity: self.quantity.ok_or_else(|| missing("quantity"))?,
            sold: self.sold,
            shipping: self.shipping,
        };
        Ok((input, self.image))
    }

    fn into_patch(self) -> (ProductPatch, Option<ImageFile>) {
        let patch = ProductPatch {
            title: self.title,
            slug: None,
            price: self.price,
            category: self.category,
            description: self.description,
            quantity: self.quantity,
            sold: self.sold,
            shipping: self.shipping,
            image: None,
        };
        (patch, self.image)
    }
}

fn parse_value<T>(value: &str, field: &str) -> Result<T, ApiError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e| {
        let mut field_errors = HashMap::new();
        field_errors.insert(field.to_string(), format!("invalid value: {e}"));
        ApiError::validation_error("invalid field format", Some(field_errors))
    })
}

fn missing(field: &str) -> ApiError {
    let mut field_errors = HashMap::new();
    field_errors.insert(field.to_string(), "this field is required".to_string());
    ApiError::validation_error("missing required fields", Some(field_errors))
}
