//! In-memory `TopicStore` evaluating the same `$exists` / equality semantics
//! as the MongoDB filters.

#![allow(dead_code)]

use async_trait::async_trait;
use bson::{doc, Document};
use opo_common::{OpoError, Result};
use opo_mongodb::{TopicRecord, TopicStore, TopicType, UpdateSummary};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Store call that should fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailPoint {
    CountMissing,
    Backfill,
    CountAll,
    Sample,
}

/// Shared view of a store's state, usable after the store moved into `execute`
#[derive(Clone, Default)]
pub struct StoreHandle {
    docs: Arc<Mutex<Vec<Document>>>,
    closed: Arc<AtomicBool>,
    writes: Arc<AtomicUsize>,
}

impl StoreHandle {
    pub fn documents(&self) -> Vec<Document> {
        self.docs.lock().unwrap().clone()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn type_of(&self, id: i32) -> Option<String> {
        self.documents()
            .into_iter()
            .find(|d| d.get_i32("id").ok() == Some(id))
            .and_then(|d| d.get_str("type").ok().map(str::to_string))
    }
}

pub struct MemoryTopicStore {
    handle: StoreHandle,
    fail_on: Option<FailPoint>,
}

impl MemoryTopicStore {
    pub fn new(docs: Vec<Document>) -> Self {
        let handle = StoreHandle::default();
        *handle.docs.lock().unwrap() = docs;
        Self {
            handle,
            fail_on: None,
        }
    }

    pub fn failing_on(mut self, point: FailPoint) -> Self {
        self.fail_on = Some(point);
        self
    }

    pub fn handle(&self) -> StoreHandle {
        self.handle.clone()
    }

    fn check(&self, point: FailPoint) -> Result<()> {
        if self.handle.is_closed() {
            return Err(OpoError::Connection("Connection already closed".to_string()));
        }
        if self.fail_on == Some(point) {
            return Err(OpoError::MongoDB(format!("injected failure at {:?}", point)));
        }
        Ok(())
    }

    fn count_where(&self, pred: impl Fn(&Document) -> bool) -> u64 {
        self.handle.docs.lock().unwrap().iter().filter(|d| pred(d)).count() as u64
    }
}

fn lacks_type(doc: &Document) -> bool {
    !doc.contains_key("type")
}

fn has_type(doc: &Document, kind: TopicType) -> bool {
    doc.get_str("type").ok() == Some(kind.as_str())
}

#[async_trait]
impl TopicStore for MemoryTopicStore {
    async fn count_missing_type(&self) -> Result<u64> {
        self.check(FailPoint::CountMissing)?;
        Ok(self.count_where(lacks_type))
    }

    async fn backfill_missing_type(&self, kind: TopicType) -> Result<UpdateSummary> {
        self.check(FailPoint::Backfill)?;
        self.handle.writes.fetch_add(1, Ordering::SeqCst);

        let mut docs = self.handle.docs.lock().unwrap();
        let mut matched = 0;
        for doc in docs.iter_mut().filter(|d| lacks_type(d)) {
            doc.insert("type", kind.as_str());
            matched += 1;
        }
        Ok(UpdateSummary {
            matched_count: matched,
            modified_count: matched,
        })
    }

    async fn count_all(&self) -> Result<u64> {
        self.check(FailPoint::CountAll)?;
        Ok(self.count_where(|_| true))
    }

    async fn count_by_type(&self, kind: TopicType) -> Result<u64> {
        self.check(FailPoint::CountAll)?;
        Ok(self.count_where(|d| has_type(d, kind)))
    }

    async fn sample_by_type(&self, kind: TopicType, limit: i64) -> Result<Vec<TopicRecord>> {
        self.check(FailPoint::Sample)?;
        let docs = self.handle.docs.lock().unwrap();
        docs.iter()
            .filter(|d| has_type(d, kind))
            .take(limit.max(0) as usize)
            .map(|d| bson::from_document(d.clone()).map_err(OpoError::from))
            .collect()
    }

    async fn close(&mut self) -> Result<()> {
        self.handle.closed.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.handle.is_closed()
    }
}

/// The three-record collection: two legacy topics and one exam
pub fn sample_collection() -> Vec<Document> {
    vec![
        doc! { "id": 1, "title": "A" },
        doc! { "id": 2, "title": "B", "type": "exam" },
        doc! { "id": 3, "title": "C" },
    ]
}
