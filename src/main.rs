use std::io;

use dotenvy::dotenv;
use storefront_api::config::AppConfig;
use storefront_api::domain::errors::DomainError;
use storefront_api::infrastructure::pg_store::PgStore;
use storefront_api::seed::seed_catalog;
use storefront_api::{build_server, create_pool, run_migrations, AppState};

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = AppConfig::from_env().map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

    let pool = create_pool(&config.database_url, config.db_pool_size).map_err(io::Error::other)?;
    run_migrations(&pool).map_err(io::Error::other)?;

    if config.seed_db {
        match seed_catalog(&PgStore::new(pool.clone())) {
            Ok(_) => {}
            Err(DomainError::InvalidInput(msg)) => log::info!("{msg}"),
            Err(e) => return Err(io::Error::other(e)),
        }
    }

    log::info!("Starting server at http://{}:{}", config.host, config.port);

    let state = AppState::postgres(pool, &config);
    build_server(state, &config.host, config.port)?.await
}
