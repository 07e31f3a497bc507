use std::{
    collections::HashMap,
    sync::atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;

use super::{Collection, CollectionSource, Document, Filter};
use crate::error::AppError;

/// In-memory collections for exercising plans without a database.
#[derive(Default)]
pub struct MemorySource {
    collections: HashMap<Collection, Vec<Document>>,
    fetches: AtomicUsize,
}

impl MemorySource {
    pub fn with(mut self, collection: Collection, doc: serde_json::Value) -> Self {
        if let serde_json::Value::Object(map) = doc {
            self.collections.entry(collection).or_default().push(map);
        }
        self
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CollectionSource for MemorySource {
    async fn fetch(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<Vec<Document>, AppError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .collections
            .get(&collection)
            .map(|docs| docs.iter().filter(|doc| filter.matches(doc)).cloned().collect())
            .unwrap_or_default())
    }
}
