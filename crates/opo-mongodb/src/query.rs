//! Query builder for MongoDB find operations

use bson::Document as BsonDocument;
use futures::TryStreamExt;
use mongodb::{options::FindOptions, Collection};
use opo_common::Result;
use serde::de::DeserializeOwned;

/// Query builder for MongoDB find operations
#[derive(Debug, Clone, Default)]
pub struct QueryBuilder {
    filter: BsonDocument,
    limit: Option<i64>,
}

impl QueryBuilder {
    /// Create a query matching every document
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the filter document
    pub fn filter(mut self, filter: BsonDocument) -> Self {
        self.filter = filter;
        self
    }

    /// Set the maximum number of documents to return
    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    fn find_options(&self) -> FindOptions {
        let mut options = FindOptions::default();
        options.limit = self.limit;
        options
    }

    /// Execute the query against `collection` and collect every matching document
    pub async fn to_list<T>(self, collection: &Collection<T>) -> Result<Vec<T>>
    where
        T: DeserializeOwned + Unpin + Send + Sync,
    {
        let options = self.find_options();
        let cursor = collection.find(self.filter).with_options(options).await?;
        let results: Vec<T> = cursor.try_collect().await?;
        Ok(results)
    }
}
