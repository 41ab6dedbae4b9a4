//! Database layer: initialization and models

pub mod init;
pub mod models;

pub use init::init_database;
pub use models::{Building, ClassificationEntry, Door};
