//! Store abstraction over the topics collection
//!
//! `TopicStore` has one method per network call the backfill makes, so the
//! runner can be driven against MongoDB or an in-memory double.

use async_trait::async_trait;
use bson::Document as BsonDocument;
use mongodb::Collection;
use opo_common::{OpoError, Result};
use tracing::{debug, instrument};

use crate::connection::Connection;
use crate::query::QueryBuilder;
use crate::topic::{
    missing_type_filter, set_type_update, type_filter, TopicRecord, TopicType,
};

/// Counts reported by a set-based update
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UpdateSummary {
    pub matched_count: u64,
    pub modified_count: u64,
}

#[async_trait]
pub trait TopicStore: Send + Sync {
    /// Count records whose classification field is absent
    async fn count_missing_type(&self) -> Result<u64>;

    /// Assign `kind` to every record lacking a classification, as one conditional update
    async fn backfill_missing_type(&self, kind: TopicType) -> Result<UpdateSummary>;

    /// Count every record in the collection
    async fn count_all(&self) -> Result<u64>;

    /// Count records classified as `kind`
    async fn count_by_type(&self, kind: TopicType) -> Result<u64>;

    /// Fetch up to `limit` records classified as `kind`
    async fn sample_by_type(&self, kind: TopicType, limit: i64) -> Result<Vec<TopicRecord>>;

    /// Release the underlying connection. Calling it again is a no-op.
    async fn close(&mut self) -> Result<()>;

    fn is_closed(&self) -> bool;
}

/// `TopicStore` backed by a MongoDB collection
pub struct MongoTopicStore {
    connection: Option<Connection>,
    collection_name: String,
}

impl MongoTopicStore {
    /// Wrap a connection, targeting `collection_name`
    pub fn with_collection(connection: Connection, collection_name: impl Into<String>) -> Self {
        Self {
            connection: Some(connection),
            collection_name: collection_name.into(),
        }
    }

    fn raw_collection(&self) -> Result<Collection<BsonDocument>> {
        self.connection
            .as_ref()
            .map(|conn| conn.get_collection(&self.collection_name))
            .ok_or_else(|| OpoError::Connection("Connection already closed".to_string()))
    }

    fn typed_collection(&self) -> Result<Collection<TopicRecord>> {
        self.connection
            .as_ref()
            .map(|conn| conn.get_typed_collection(&self.collection_name))
            .ok_or_else(|| OpoError::Connection("Connection already closed".to_string()))
    }

    async fn count(&self, filter: BsonDocument) -> Result<u64> {
        let count = self.raw_collection()?.count_documents(filter).await?;
        Ok(count)
    }
}

#[async_trait]
impl TopicStore for MongoTopicStore {
    #[instrument(skip(self), fields(collection = %self.collection_name))]
    async fn count_missing_type(&self) -> Result<u64> {
        self.count(missing_type_filter()).await
    }

    #[instrument(skip(self), fields(collection = %self.collection_name))]
    async fn backfill_missing_type(&self, kind: TopicType) -> Result<UpdateSummary> {
        let result = self
            .raw_collection()?
            .update_many(missing_type_filter(), set_type_update(kind))
            .await?;

        debug!(
            matched = result.matched_count,
            modified = result.modified_count,
            "update_many finished"
        );

        Ok(UpdateSummary {
            matched_count: result.matched_count,
            modified_count: result.modified_count,
        })
    }

    #[instrument(skip(self), fields(collection = %self.collection_name))]
    async fn count_all(&self) -> Result<u64> {
        self.count(BsonDocument::new()).await
    }

    #[instrument(skip(self), fields(collection = %self.collection_name))]
    async fn count_by_type(&self, kind: TopicType) -> Result<u64> {
        self.count(type_filter(kind)).await
    }

    #[instrument(skip(self), fields(collection = %self.collection_name))]
    async fn sample_by_type(&self, kind: TopicType, limit: i64) -> Result<Vec<TopicRecord>> {
        let collection = self.typed_collection()?;
        QueryBuilder::new()
            .filter(type_filter(kind))
            .limit(limit)
            .to_list(&collection)
            .await
    }

    async fn close(&mut self) -> Result<()> {
        if let Some(connection) = self.connection.take() {
            connection.shutdown().await;
        }
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.connection.is_none()
    }
}
