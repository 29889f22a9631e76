//! # Rumi Common Library
//!
//! Catalogue core shared by the Rumi services:
//! - Entity models and the SQLite schema
//! - The `PoetryStore` repository and its SQLite / in-memory backends
//! - Search, pagination and tag matching rules
//! - Configuration loading
//! - Password hashing

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod pagination;
pub mod search;
pub mod store;

pub use error::{Error, Result};
pub use store::{open_store, PoetryStore};
