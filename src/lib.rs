pub mod api;
pub mod app;
pub mod config;
pub mod form;
pub mod logging;
pub mod models;
pub mod panel;
pub mod parser;
pub mod ui;
