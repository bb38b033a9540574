use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::categories::CategoryResponse;
use super::DecimalInput;
use crate::application::catalog_service::CatalogService;
use crate::domain::catalog::{ProductFilter, ProductInput, ProductView};
use crate::errors::AppError;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Number or decimal string, e.g. "199.99"
    #[schema(value_type = String, example = "199.99")]
    pub price: DecimalInput,
    /// Empty string or null clears the discount.
    #[serde(default)]
    #[schema(value_type = Option<String>, example = "149.99")]
    pub discount_price: Option<DecimalInput>,
    pub stock: i32,
    #[serde(default)]
    pub image_url: Option<String>,
    pub category_id: Uuid,
}

impl ProductRequest {
    fn into_input(self) -> Result<ProductInput, AppError> {
        Ok(ProductInput {
            price: self.price.parse("price")?,
            discount_price: DecimalInput::parse_optional(
                self.discount_price.as_ref(),
                "discountPrice",
            )?,
            name: self.name,
            description: self.description.unwrap_or_default(),
            stock: self.stock,
            image_url: self.image_url.filter(|u| !u.trim().is_empty()),
            category_id: self.category_id,
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductResponse {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub price: String,
    pub discount_price: Option<String>,
    pub stock: i32,
    pub image_url: Option<String>,
    pub category_id: Uuid,
    pub category: CategoryResponse,
    pub created_at: String,
    pub updated_at: String,
}

impl From<ProductView> for ProductResponse {
    fn from(view: ProductView) -> Self {
        let p = view.product;
        Self {
            id: p.id,
            name: p.name,
            description: p.description,
            price: p.price.to_string(),
            discount_price: p.discount_price.map(|d| d.to_string()),
            stock: p.stock,
            image_url: p.image_url,
            category_id: p.category_id,
            category: view.category.into(),
            created_at: p.created_at.to_rfc3339(),
            updated_at: p.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ListProductsParams {
    pub q: Option<String>,
    pub category: Option<String>,
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// GET /products
///
/// Newest first. `q` matches name or description case-insensitively;
/// `category` is a category slug.
#[utoipa::path(
    get,
    path = "/products",
    params(
        ("q" = Option<String>, Query, description = "Text to search in name and description"),
        ("category" = Option<String>, Query, description = "Category slug"),
    ),
    responses(
        (status = 200, description = "Matching products", body = [ProductResponse]),
        (status = 500, description = "Internal server error"),
    ),
    tag = "catalog"
)]
pub async fn list_products(
    service: web::Data<CatalogService>,
    query: web::Query<ListProductsParams>,
) -> Result<HttpResponse, AppError> {
    let params = query.into_inner();
    let filter = ProductFilter::new(params.q, params.category);

    let products = web::block(move || service.list_products(&filter)).await??;

    let body: Vec<ProductResponse> = products.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// GET /products/{id}
#[utoipa::path(
    get,
    path = "/products/{id}",
    params(
        ("id" = Uuid, Path, description = "Product UUID"),
    ),
    responses(
        (status = 200, description = "Product found", body = ProductResponse),
        (status = 404, description = "Product not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "catalog"
)]
pub async fn get_product(
    service: web::Data<CatalogService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();

    let product = web::block(move || service.get_product(id)).await??;

    Ok(HttpResponse::Ok().json(ProductResponse::from(product)))
}

/// POST /products
#[utoipa::path(
    post,
    path = "/products",
    request_body = ProductRequest,
    responses(
        (status = 201, description = "Product created", body = ProductResponse),
        (status = 400, description = "Invalid product fields or unknown category"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "catalog"
)]
pub async fn create_product(
    service: web::Data<CatalogService>,
    body: web::Json<ProductRequest>,
) -> Result<HttpResponse, AppError> {
    let input = body.into_inner().into_input()?;

    let created = web::block(move || service.create_product(input)).await??;

    Ok(HttpResponse::Created().json(ProductResponse::from(created)))
}

/// PUT /products/{id}
///
/// Replaces every editable field of the product.
#[utoipa::path(
    put,
    path = "/products/{id}",
    params(
        ("id" = Uuid, Path, description = "Product UUID"),
    ),
    request_body = ProductRequest,
    responses(
        (status = 200, description = "Product updated", body = ProductResponse),
        (status = 400, description = "Invalid product fields or unknown category"),
        (status = 404, description = "Product not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "catalog"
)]
pub async fn update_product(
    service: web::Data<CatalogService>,
    path: web::Path<Uuid>,
    body: web::Json<ProductRequest>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let input = body.into_inner().into_input()?;

    let updated = web::block(move || service.update_product(id, input)).await??;

    Ok(HttpResponse::Ok().json(ProductResponse::from(updated)))
}

/// DELETE /products/{id}
#[utoipa::path(
    delete,
    path = "/products/{id}",
    params(
        ("id" = Uuid, Path, description = "Product UUID"),
    ),
    responses(
        (status = 204, description = "Product deleted"),
        (status = 404, description = "Product not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "catalog"
)]
pub async fn delete_product(
    service: web::Data<CatalogService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();

    web::block(move || service.delete_product(id)).await??;

    Ok(HttpResponse::NoContent().finish())
}
