//! Shared API request/response types

pub mod types;

pub use types::{
    AggregateRecord, AggregateRequest, DeleteResponse, ErrorResponse, MutationResponse,
};
