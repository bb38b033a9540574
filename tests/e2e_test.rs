//! End-to-end test: real server, real PostgreSQL, concurrent orders.
//!
//! Starts Postgres in a container, runs migrations, seeds the demo catalog
//! and serves the API on a free port. Needs a container runtime:
//!
//!   cargo test --test e2e_test -- --include-ignored

mod common;

use std::str::FromStr;
use std::time::Duration;

use bigdecimal::BigDecimal;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};

use storefront_api::config::AppConfig;
use storefront_api::domain::catalog::{ProductFilter, ProductInput};
use storefront_api::domain::ports::CatalogRepository;
use storefront_api::infrastructure::pg_store::PgStore;
use storefront_api::{build_server, AppState};

/// Wait until the server accepts HTTP requests.
async fn wait_for_http(url: &str) {
    let client = Client::new();
    let deadline = tokio::time::Instant::now() + Duration::from_secs(15);
    while client.get(url).send().await.is_err() {
        if tokio::time::Instant::now() > deadline {
            panic!("server at {url} did not come up");
        }
        tokio::time::sleep(Duration::from_millis(200)).await;
    }
}

fn order_body(product_id: &str) -> Value {
    json!({
        "clientInfo": { "name": "Ada", "phone": "555-0100", "address": "1 Main St" },
        "cartItems": [{ "id": product_id, "quantity": 1, "price": "199.99" }],
    })
}

#[tokio::test]
#[ignore = "requires a container runtime"]
async fn last_unit_is_sold_exactly_once() {
    let db = common::start_postgres().await;
    let database_url = db.url.clone();
    let pool = db.pool.clone();

    let app_port = common::free_port();
    let config = AppConfig::from_lookup(|name| match name {
        "DATABASE_URL" => Some(database_url.clone()),
        "HOST" => Some("127.0.0.1".to_string()),
        "PORT" => Some(app_port.to_string()),
        _ => None,
    })
    .expect("config");

    let store = PgStore::new(pool.clone());
    storefront_api::seed::seed_catalog(&store).expect("seed");
    let headphones = store
        .list_products(&ProductFilter::new(Some("headphones".into()), None))
        .expect("list")
        .remove(0);
    let mut input = ProductInput {
        name: headphones.product.name.clone(),
        description: headphones.product.description.clone(),
        price: BigDecimal::from_str("199.99").unwrap(),
        discount_price: None,
        stock: 1,
        image_url: headphones.product.image_url.clone(),
        category_id: headphones.product.category_id,
    };
    store
        .update_product(headphones.product.id, input.clone())
        .expect("set stock to 1");

    let server = build_server(AppState::postgres(pool, &config), &config.host, config.port)
        .expect("bind server");
    tokio::spawn(server);

    let base = format!("http://127.0.0.1:{app_port}/api");
    wait_for_http(&format!("{base}/categories")).await;

    let http = Client::new();
    let id = headphones.product.id.to_string();
    let (a, b) = futures::future::join(
        http.post(format!("{base}/orders")).json(&order_body(&id)).send(),
        http.post(format!("{base}/orders")).json(&order_body(&id)).send(),
    )
    .await;
    let mut statuses = vec![a.expect("request a").status(), b.expect("request b").status()];
    statuses.sort();

    assert_eq!(statuses, vec![StatusCode::CREATED, StatusCode::BAD_REQUEST]);

    let product: Value = http
        .get(format!("{base}/products/{id}"))
        .send()
        .await
        .expect("get product")
        .json()
        .await
        .expect("product json");
    assert_eq!(product["stock"], 0);

    let orders: Value = http
        .get(format!("{base}/orders"))
        .send()
        .await
        .expect("list orders")
        .json()
        .await
        .expect("orders json");
    assert_eq!(orders["total"], 1);
    assert_eq!(orders["items"][0]["totalAmount"], "199.99");

    // The unit sold out: a restock makes it orderable again.
    input.stock = 2;
    store.update_product(headphones.product.id, input).expect("restock");
    let resp = http
        .post(format!("{base}/orders"))
        .json(&order_body(&id))
        .send()
        .await
        .expect("reorder");
    assert_eq!(resp.status(), StatusCode::CREATED);
}
