pub mod config;
pub mod handlers;
pub mod models;
pub mod pagination;
pub mod query;
pub mod routes;
pub mod services;
pub mod utils;
