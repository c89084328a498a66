// API module organization
pub mod bus;
pub mod config;
pub mod middleware;
pub mod models;
pub mod openapi;
pub mod routes;
pub mod services;
pub mod storage;
pub mod streams;
