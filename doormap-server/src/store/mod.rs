//! Aggregate store: buildings and their doors as one consistency unit

pub mod aggregates;

pub use aggregates::{
    create_aggregate, delete_aggregate, get_aggregate, get_aggregate_record,
    list_recent_aggregates, update_aggregate, AggregateUpdate, NewAggregate,
};
