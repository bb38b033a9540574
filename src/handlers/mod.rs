pub mod categories;
pub mod demo_control;
pub mod orders;
pub mod products;

use std::str::FromStr;

use actix_web::error::InternalError;
use actix_web::{web, HttpResponse};
use bigdecimal::BigDecimal;
use serde::Deserialize;
use serde_json::json;
use utoipa::OpenApi;

use crate::errors::AppError;

// ── Decimal input ────────────────────────────────────────────────────────────

/// A decimal accepted either as a JSON number or as a string such as "9.99".
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DecimalInput {
    Number(serde_json::Number),
    Text(String),
}

impl DecimalInput {
    pub fn parse(&self, field: &str) -> Result<BigDecimal, AppError> {
        let raw = match self {
            DecimalInput::Number(n) => n.to_string(),
            DecimalInput::Text(s) => s.trim().to_string(),
        };
        BigDecimal::from_str(&raw)
            .map_err(|e| AppError::BadRequest(format!("Invalid {field} '{raw}': {e}")))
    }

    /// Like `parse`, but an empty string means "no value".
    pub fn parse_optional(value: Option<&Self>, field: &str) -> Result<Option<BigDecimal>, AppError> {
        match value {
            None => Ok(None),
            Some(DecimalInput::Text(s)) if s.trim().is_empty() => Ok(None),
            Some(v) => v.parse(field).map(Some),
        }
    }
}

// ── Extractor configuration ──────────────────────────────────────────────────

fn bad_request<E>(err: E) -> actix_web::Error
where
    E: std::fmt::Debug + std::fmt::Display + 'static,
{
    let body = json!({ "error": err.to_string() });
    InternalError::from_response(err, HttpResponse::BadRequest().json(body)).into()
}

/// Malformed JSON bodies become `400 {"error": ...}` instead of plain text.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| bad_request(err))
}

pub fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(|err, _req| bad_request(err))
}

pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| bad_request(err))
}

// ── OpenAPI document ─────────────────────────────────────────────────────────

#[derive(OpenApi)]
#[openapi(
    servers((url = "/api")),
    paths(
        categories::list_categories,
        categories::create_category,
        products::list_products,
        products::get_product,
        products::create_product,
        products::update_product,
        products::delete_product,
        orders::create_order,
        orders::get_order,
        orders::list_orders,
        demo_control::status,
        demo_control::feature_status,
        demo_control::manage_feature,
        demo_control::switch_db,
        demo_control::run_seed,
    ),
    components(schemas(
        categories::CategoryRequest,
        categories::CategoryResponse,
        products::ProductRequest,
        products::ProductResponse,
        orders::CreateOrderRequest,
        orders::ClientInfoRequest,
        orders::CartItemRequest,
        orders::OrderResponse,
        orders::OrderItemResponse,
        orders::ListOrdersResponse,
        demo_control::ManageFeatureRequest,
        demo_control::SwitchDbRequest,
    )),
    tags(
        (name = "catalog", description = "Categories and products"),
        (name = "orders", description = "Order placement and history"),
        (name = "demo-control", description = "Demo environment operations"),
    )
)]
pub struct ApiDoc;
