//! # Doormap Common Library
//!
//! Shared code for the doormap services including:
//! - Database models and initialization
//! - API request/response types
//! - Configuration loading
//! - Door label encoding (InfoCodec)
//! - Pin color classification

pub mod api;
pub mod classify;
pub mod config;
#[cfg(feature = "sqlx")]
pub mod db;
pub mod error;
pub mod info_codec;

pub use error::{Error, Result};
