//! MongoDB access for the opo topic collection
//!
//! # Features
//! - Connection setup with pool options and an eager ping
//! - Topic Record model and the classification filters
//! - `TopicStore` trait with a MongoDB implementation

pub mod connection;
pub mod query;
pub mod store;
pub mod topic;

pub use connection::{Connection, PoolConfig};
pub use opo_common::{OpoError, Result};
pub use query::QueryBuilder;
pub use store::{MongoTopicStore, TopicStore, UpdateSummary};
pub use topic::{
    display_bson, missing_type_filter, set_type_update, type_filter, TopicRecord, TopicType,
    TOPICS_COLLECTION,
};
