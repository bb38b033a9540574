pub mod application;
pub mod config;
pub mod db;
pub mod demo_control;
pub mod domain;
pub mod errors;
pub mod handlers;
pub mod infrastructure;
pub mod schema;
pub mod scripting;
pub mod seed;

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use application::catalog_service::CatalogService;
use application::order_service::OrderService;
use config::AppConfig;
use demo_control::DemoControl;
use handlers::{categories, demo_control as demo, orders, products, ApiDoc};
use infrastructure::pg_store::PgStore;
use scripting::ShellScriptRunner;

pub use db::{create_pool, DbPool};

/// Path prefix of every API route; the storefront calls `/api/...`.
pub const API_PREFIX: &str = "/api";

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Run any pending Diesel migrations against the pool's database.
pub fn run_migrations(pool: &DbPool) -> Result<(), BoxError> {
    let mut conn = pool.get()?;
    let applied = conn.run_pending_migrations(MIGRATIONS)?;
    log::info!("applied {} pending migration(s)", applied.len());
    Ok(())
}

/// Shared services handed to every worker.
#[derive(Clone)]
pub struct AppState {
    catalog: web::Data<CatalogService>,
    orders: web::Data<OrderService>,
    demo: web::Data<DemoControl>,
}

impl AppState {
    pub fn new(catalog: CatalogService, orders: OrderService, demo: DemoControl) -> Self {
        Self {
            catalog: web::Data::new(catalog),
            orders: web::Data::new(orders),
            demo: web::Data::new(demo),
        }
    }

    /// Wires the services backed by PostgreSQL and the shell demo manager.
    pub fn postgres(pool: DbPool, config: &AppConfig) -> Self {
        let store = Arc::new(PgStore::new(pool));
        let runner = ShellScriptRunner::new(
            config.demo_dir.join("demo-manager.sh"),
            config.demo_dir.clone(),
            config.script_timeout,
        );
        let demo = DemoControl::new(
            config.env_file.clone(),
            std::path::PathBuf::from("."),
            Arc::new(runner),
            store.clone(),
        );
        Self::new(
            CatalogService::new(store.clone()),
            OrderService::new(store),
            demo,
        )
    }

    /// Registers shared data and every API route under `/api`.
    pub fn configure(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(self.catalog.clone())
            .app_data(self.orders.clone())
            .app_data(self.demo.clone())
            .app_data(handlers::json_config())
            .app_data(handlers::path_config())
            .app_data(handlers::query_config())
            .service(web::scope(API_PREFIX).configure(routes));
    }
}

fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/categories")
            .route(web::get().to(categories::list_categories))
            .route(web::post().to(categories::create_category)),
    )
    .service(
        web::resource("/products")
            .route(web::get().to(products::list_products))
            .route(web::post().to(products::create_product)),
    )
    .service(
        web::resource("/products/{id}")
            .route(web::get().to(products::get_product))
            .route(web::put().to(products::update_product))
            .route(web::delete().to(products::delete_product)),
    )
    .service(
        web::resource("/orders")
            .route(web::get().to(orders::list_orders))
            .route(web::post().to(orders::create_order)),
    )
    .service(web::resource("/orders/{id}").route(web::get().to(orders::get_order)))
    .service(
        web::scope("/demo-control")
            .route("/status", web::get().to(demo::status))
            .route("/feature-status/{name}", web::get().to(demo::feature_status))
            .route("/manage-feature", web::post().to(demo::manage_feature))
            .route("/switch-db", web::post().to(demo::switch_db))
            .route("/run-seed", web::post().to(demo::run_seed)),
    );
}

/// Build and return an actix-web `Server` bound to `host:port`.
///
/// The caller is responsible for `.await`-ing (or `tokio::spawn`-ing) the
/// returned server.
pub fn build_server(
    state: AppState,
    host: &str,
    port: u16,
) -> std::io::Result<actix_web::dev::Server> {
    let openapi = ApiDoc::openapi();
    Ok(HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(Cors::permissive())
            .configure(|cfg| state.configure(cfg))
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", openapi.clone()),
            )
    })
    .bind((host.to_string(), port))?
    .run())
}
