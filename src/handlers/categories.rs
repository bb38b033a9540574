use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::catalog_service::CatalogService;
use crate::domain::catalog::{Category, NewCategory};
use crate::errors::AppError;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CategoryRequest {
    pub name: String,
    /// URL-safe identifier; derived from `name` when omitted.
    pub slug: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryResponse {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub created_at: String,
}

impl From<Category> for CategoryResponse {
    fn from(c: Category) -> Self {
        Self {
            id: c.id,
            name: c.name,
            slug: c.slug,
            description: c.description,
            created_at: c.created_at.to_rfc3339(),
        }
    }
}

/// GET /categories
///
/// Lists all categories ordered by name.
#[utoipa::path(
    get,
    path = "/categories",
    responses(
        (status = 200, description = "All categories", body = [CategoryResponse]),
        (status = 500, description = "Internal server error"),
    ),
    tag = "catalog"
)]
pub async fn list_categories(
    service: web::Data<CatalogService>,
) -> Result<HttpResponse, AppError> {
    let categories = web::block(move || service.list_categories()).await??;

    let body: Vec<CategoryResponse> = categories.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// POST /categories
#[utoipa::path(
    post,
    path = "/categories",
    request_body = CategoryRequest,
    responses(
        (status = 201, description = "Category created", body = CategoryResponse),
        (status = 400, description = "Invalid name or slug"),
        (status = 409, description = "Slug already in use"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "catalog"
)]
pub async fn create_category(
    service: web::Data<CatalogService>,
    body: web::Json<CategoryRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let category = NewCategory::new(body.name, body.slug, body.description)?;

    let created = web::block(move || service.create_category(category)).await??;

    Ok(HttpResponse::Created().json(CategoryResponse::from(created)))
}
