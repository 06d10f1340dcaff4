pub mod app;
pub mod auth;
pub mod categories;
pub mod config;
pub mod db;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod items;
pub mod state;
pub mod validation;
