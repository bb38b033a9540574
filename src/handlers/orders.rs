use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::DecimalInput;
use crate::application::order_service::OrderService;
use crate::domain::order::{CartItem, ClientInfo, OrderView};
use crate::errors::AppError;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct ClientInfoRequest {
    pub name: String,
    pub phone: String,
    pub address: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CartItemRequest {
    /// Product id
    pub id: Uuid,
    pub quantity: i32,
    /// Unit price as shown to the customer; number or decimal string.
    #[schema(value_type = String, example = "29.99")]
    pub price: DecimalInput,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub client_info: ClientInfoRequest,
    pub cart_items: Vec<CartItemRequest>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemResponse {
    pub id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub price_at_time: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub id: Uuid,
    pub client_name: String,
    pub client_phone: String,
    pub client_address: String,
    pub total_amount: String,
    pub created_at: String,
    pub items: Vec<OrderItemResponse>,
}

impl From<OrderView> for OrderResponse {
    fn from(o: OrderView) -> Self {
        Self {
            id: o.id,
            client_name: o.client_name,
            client_phone: o.client_phone,
            client_address: o.client_address,
            total_amount: o.total_amount.to_string(),
            created_at: o.created_at.to_rfc3339(),
            items: o
                .items
                .into_iter()
                .map(|i| OrderItemResponse {
                    id: i.id,
                    product_id: i.product_id,
                    quantity: i.quantity,
                    price_at_time: i.price_at_time.to_string(),
                })
                .collect(),
        }
    }
}

// ── Pagination ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct ListOrdersParams {
    /// Page number (1-based). Defaults to 1.
    #[serde(default = "default_page")]
    pub page: i64,
    /// Number of items per page. Defaults to 20, maximum 100.
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_page() -> i64 {
    1
}

fn default_limit() -> i64 {
    20
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ListOrdersResponse {
    pub items: Vec<OrderResponse>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /orders
///
/// Places an order. Stock is checked for every cart line before anything is
/// written; the order, its items and the stock decrements are committed in
/// one database transaction, or not at all.
#[utoipa::path(
    post,
    path = "/orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order created successfully", body = OrderResponse),
        (status = 400, description = "Malformed request, missing product or insufficient stock"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn create_order(
    service: web::Data<OrderService>,
    body: web::Json<CreateOrderRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();

    let client = ClientInfo {
        name: body.client_info.name,
        phone: body.client_info.phone,
        address: body.client_info.address,
    };
    let items = body
        .cart_items
        .iter()
        .map(|l| {
            Ok(CartItem {
                product_id: l.id,
                quantity: l.quantity,
                unit_price: l.price.parse("price")?,
            })
        })
        .collect::<Result<Vec<_>, AppError>>()?;

    let order = web::block(move || service.create_order(client, items)).await??;

    Ok(HttpResponse::Created().json(OrderResponse::from(order)))
}

/// GET /orders/{id}
///
/// Returns the order together with its items.
#[utoipa::path(
    get,
    path = "/orders/{id}",
    params(
        ("id" = Uuid, Path, description = "Order UUID"),
    ),
    responses(
        (status = 200, description = "Order found", body = OrderResponse),
        (status = 404, description = "Order not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn get_order(
    service: web::Data<OrderService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();

    let result = web::block(move || service.get_order(order_id)).await??;

    match result {
        Some(order) => Ok(HttpResponse::Ok().json(OrderResponse::from(order))),
        None => Err(AppError::NotFound("Order not found".into())),
    }
}

/// GET /orders
///
/// Returns a paginated list of orders (without their items), newest first.
/// Use `page` (1-based) and `limit` to control pagination.
#[utoipa::path(
    get,
    path = "/orders",
    params(
        ("page" = Option<i64>, Query, description = "Page number (1-based, default 1)"),
        ("limit" = Option<i64>, Query, description = "Items per page (default 20, max 100)"),
    ),
    responses(
        (status = 200, description = "Paginated list of orders", body = ListOrdersResponse),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn list_orders(
    service: web::Data<OrderService>,
    query: web::Query<ListOrdersParams>,
) -> Result<HttpResponse, AppError> {
    let params = query.into_inner();
    let page = params.page.max(1);
    let limit = params.limit.clamp(1, crate::application::order_service::MAX_PAGE_SIZE);

    let result = web::block(move || service.list_orders(page, limit)).await??;

    Ok(HttpResponse::Ok().json(ListOrdersResponse {
        items: result.items.into_iter().map(Into::into).collect(),
        total: result.total,
        page,
        limit,
    }))
}
