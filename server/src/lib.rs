pub mod backend;
pub mod booking;
pub mod catalog;
pub mod config;
pub mod fetch;
pub mod handlers;
pub mod management;
pub mod models;
pub mod preferences;
pub mod routes;
pub mod state;
pub mod utils;
pub mod validation;
