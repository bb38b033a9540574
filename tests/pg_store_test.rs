//! `PgStore` against a real PostgreSQL. Needs a container runtime:
//!
//!   cargo test --test pg_store_test -- --include-ignored

mod common;

use std::str::FromStr;
use std::sync::Arc;
use std::thread;

use bigdecimal::BigDecimal;
use uuid::Uuid;

use storefront_api::application::order_engine::place_order;
use storefront_api::domain::catalog::{NewCategory, ProductFilter, ProductInput, ProductView};
use storefront_api::domain::errors::{DomainError, StockShortfall};
use storefront_api::domain::order::{CartItem, ClientInfo, OrderView};
use storefront_api::domain::ports::{
    CatalogRepository, CatalogUnitOfWork, OrderRepository, OrderUnitOfWork,
};
use storefront_api::infrastructure::pg_store::PgStore;
use storefront_api::seed::seed_catalog;

fn seed_product(store: &PgStore, name: &str, stock: i32) -> ProductView {
    let category = match store.find_category_by_slug("electronics").unwrap() {
        Some(c) => c,
        None => store
            .create_category(NewCategory::new("Electronics".into(), None, None).unwrap())
            .unwrap(),
    };
    store
        .create_product(ProductInput {
            name: name.to_string(),
            description: format!("{name} description"),
            price: BigDecimal::from_str("10.00").unwrap(),
            discount_price: None,
            stock,
            image_url: None,
            category_id: category.id,
        })
        .expect("create product failed")
}

fn order(store: &PgStore, items: Vec<CartItem>) -> Result<OrderView, DomainError> {
    store.in_transaction(Box::new(move |uow: &mut dyn OrderUnitOfWork| {
        place_order(
            uow,
            ClientInfo {
                name: "Ada".into(),
                phone: "555-0100".into(),
                address: "1 Main St".into(),
            },
            &items,
        )
    }))
}

fn line(product_id: Uuid, quantity: i32) -> CartItem {
    CartItem {
        product_id,
        quantity,
        unit_price: BigDecimal::from_str("10.00").unwrap(),
    }
}

fn stock_of(store: &PgStore, id: Uuid) -> i32 {
    store.find_product(id).unwrap().unwrap().product.stock
}

#[tokio::test]
#[ignore = "requires a container runtime"]
async fn order_commits_items_and_decrements_stock() {
    let db = common::start_postgres().await;
    let store = PgStore::new(db.pool.clone());
    let p = seed_product(&store, "Headphones", 5);

    let placed = order(&store, vec![line(p.product.id, 3)]).expect("order failed");
    let found = store.find_by_id(placed.id).unwrap().expect("order exists");

    assert_eq!(found.total_amount, BigDecimal::from_str("30.00").unwrap());
    assert_eq!(found.items.len(), 1);
    assert_eq!(found.items[0].price_at_time, BigDecimal::from_str("10.00").unwrap());
    assert_eq!(stock_of(&store, p.product.id), 2);
}

#[tokio::test]
#[ignore = "requires a container runtime"]
async fn failed_line_rolls_back_whole_order() {
    let db = common::start_postgres().await;
    let store = PgStore::new(db.pool.clone());
    let p1 = seed_product(&store, "T-Shirt", 5);

    let err = order(&store, vec![line(p1.product.id, 1), line(Uuid::new_v4(), 1)]).unwrap_err();

    assert!(matches!(
        err,
        DomainError::StockUnavailable(StockShortfall::Missing { .. })
    ));
    assert_eq!(stock_of(&store, p1.product.id), 5);
    assert_eq!(store.list(1, 20).unwrap().total, 0);
}

#[tokio::test]
#[ignore = "requires a container runtime"]
async fn repeated_lines_beyond_stock_are_a_shortfall_not_a_fault() {
    let db = common::start_postgres().await;
    let store = PgStore::new(db.pool.clone());
    let p = seed_product(&store, "Cotton T-Shirt", 5).product.id;

    let err = order(&store, vec![line(p, 3), line(p, 3)]).unwrap_err();

    assert!(matches!(
        err,
        DomainError::StockUnavailable(StockShortfall::Insufficient { requested: 6, available: 5, .. })
    ));
    assert_eq!(stock_of(&store, p), 5);
    assert_eq!(store.list(1, 20).unwrap().total, 0);
}

#[tokio::test]
#[ignore = "requires a container runtime"]
async fn concurrent_orders_for_last_unit_allow_exactly_one() {
    let db = common::start_postgres().await;
    let store = Arc::new(PgStore::new(db.pool.clone()));
    let p = seed_product(&store, "Smart Watch", 1).product.id;

    let handles: Vec<_> = (0..2)
        .map(|_| {
            let store = store.clone();
            thread::spawn(move || order(&store, vec![line(p, 1)]))
        })
        .collect();
    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert_eq!(stock_of(&store, p), 0);
}

#[tokio::test]
#[ignore = "requires a container runtime"]
async fn page_past_the_end_is_empty() {
    let db = common::start_postgres().await;
    let store = PgStore::new(db.pool.clone());
    let p = seed_product(&store, "Headphones", 5).product.id;
    order(&store, vec![line(p, 1)]).unwrap();

    let page = store.list(i64::MAX, 100).unwrap();

    assert_eq!(page.total, 1);
    assert!(page.items.is_empty());
}

#[tokio::test]
#[ignore = "requires a container runtime"]
async fn list_products_filters_by_text_and_category() {
    let db = common::start_postgres().await;
    let store = PgStore::new(db.pool.clone());
    seed_product(&store, "Wireless Headphones", 1);
    seed_product(&store, "Laptop Stand", 1);

    let by_text = store
        .list_products(&ProductFilter::new(Some("HEADPHONES".into()), None))
        .unwrap();
    let by_category = store
        .list_products(&ProductFilter::new(None, Some("electronics".into())))
        .unwrap();
    let wildcard = store
        .list_products(&ProductFilter::new(Some("%".into()), None))
        .unwrap();

    assert_eq!(by_text.len(), 1);
    assert_eq!(by_text[0].category.slug, "electronics");
    assert_eq!(by_category.len(), 2);
    assert!(wildcard.is_empty());
}

#[tokio::test]
#[ignore = "requires a container runtime"]
async fn duplicate_slug_maps_to_conflict() {
    let db = common::start_postgres().await;
    let store = PgStore::new(db.pool.clone());
    store
        .create_category(NewCategory::new("Books".into(), None, None).unwrap())
        .unwrap();

    let err = store
        .create_category(NewCategory::new("Books".into(), None, None).unwrap())
        .unwrap_err();

    assert!(matches!(err, DomainError::Conflict(_)));
}

#[tokio::test]
#[ignore = "requires a container runtime"]
async fn unknown_category_maps_to_invalid_input() {
    let db = common::start_postgres().await;
    let store = PgStore::new(db.pool.clone());

    let err = store
        .create_product(ProductInput {
            name: "Orphan".into(),
            description: String::new(),
            price: BigDecimal::from(1),
            discount_price: None,
            stock: 1,
            image_url: None,
            category_id: Uuid::new_v4(),
        })
        .unwrap_err();

    assert!(matches!(err, DomainError::InvalidInput(_)));
}

#[tokio::test]
#[ignore = "requires a container runtime"]
async fn catalog_transaction_rolls_back_on_failure() {
    let db = common::start_postgres().await;
    let store = PgStore::new(db.pool.clone());

    let err = store
        .in_catalog_transaction(Box::new(|uow: &mut dyn CatalogUnitOfWork| {
            uow.create_category(NewCategory::new("Books".into(), None, None)?)?;
            uow.create_product(ProductInput {
                name: "Orphan".into(),
                description: String::new(),
                price: BigDecimal::from(1),
                discount_price: None,
                stock: 1,
                image_url: None,
                category_id: Uuid::new_v4(),
            })?;
            Ok(())
        }))
        .unwrap_err();

    assert!(matches!(err, DomainError::InvalidInput(_)));
    assert!(store.list_categories().unwrap().is_empty());

    let summary = seed_catalog(&store).expect("seed after rollback");
    assert_eq!(summary.products_created, 6);
    assert_eq!(store.count_products().unwrap(), 6);
}

#[tokio::test]
#[ignore = "requires a container runtime"]
async fn update_and_delete_missing_product_are_not_found() {
    let db = common::start_postgres().await;
    let store = PgStore::new(db.pool.clone());
    let p = seed_product(&store, "Garden Tool Set", 3);
    let mut input = ProductInput {
        name: "Garden Tool Set".into(),
        description: String::new(),
        price: BigDecimal::from(90),
        discount_price: None,
        stock: 3,
        image_url: None,
        category_id: p.category.id,
    };

    assert!(matches!(
        store.update_product(Uuid::new_v4(), input.clone()),
        Err(DomainError::NotFound(_))
    ));
    input.discount_price = Some(BigDecimal::from(80));
    let updated = store.update_product(p.product.id, input).unwrap();
    assert_eq!(updated.product.discount_price, Some(BigDecimal::from(80)));

    store.delete_product(p.product.id).unwrap();
    assert!(matches!(
        store.delete_product(p.product.id),
        Err(DomainError::NotFound(_))
    ));
}
