//! HTTP API handlers for doormap-server

pub mod handlers;
pub mod health;

pub use handlers::{
    create_aggregate, delete_aggregate, get_aggregate, list_aggregates, update_aggregate,
};
pub use health::health;
