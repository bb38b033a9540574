pub mod catalog_service;
pub mod order_engine;
pub mod order_service;
