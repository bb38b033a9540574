pub mod in_memory;
pub mod models;
pub mod pg_store;
