use crate::adapters::snapshot::StoreSnapshot;
use crate::core::{Feed, FeedId, FeedStore, Form, FormId, PortableDocument, Result};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Process-local feed store. Clones share the same data.
#[derive(Debug, Clone, Default)]
pub struct InMemoryFeedStore {
    inner: Arc<Mutex<StoreSnapshot>>,
}

impl InMemoryFeedStore {
    pub fn new(forms: Vec<Form>) -> Self {
        Self::from_snapshot(StoreSnapshot::new(forms))
    }

    pub fn from_snapshot(snapshot: StoreSnapshot) -> Self {
        Self {
            inner: Arc::new(Mutex::new(snapshot)),
        }
    }

    pub async fn snapshot(&self) -> StoreSnapshot {
        self.inner.lock().await.clone()
    }
}

#[async_trait]
impl FeedStore for InMemoryFeedStore {
    async fn list_forms(&self) -> Result<Vec<Form>> {
        Ok(self.inner.lock().await.forms.clone())
    }

    async fn list_feeds(&self, form_id: FormId) -> Result<Vec<Feed>> {
        Ok(self.inner.lock().await.feeds_of(form_id))
    }

    async fn get_feed(&self, feed_id: FeedId) -> Result<Option<Feed>> {
        Ok(self.inner.lock().await.feed(feed_id))
    }

    async fn create_feed(&self, document: &PortableDocument) -> Result<FeedId> {
        self.inner.lock().await.insert(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::document::parse_document;

    #[tokio::test]
    async fn test_concurrent_creates_get_distinct_ids() {
        let store = InMemoryFeedStore::new(vec![Form::new(1, "Contact")]);
        let document = parse_document(r#"{"form_id":1,"addon_slug":"x","meta":{}}"#).unwrap();

        let mut handles = Vec::new();
        for _ in 0..8 {
            let store = store.clone();
            let document = document.clone();
            handles.push(tokio::spawn(async move {
                store.create_feed(&document).await.unwrap()
            }));
        }

        let mut ids = Vec::new();
        for handle in handles {
            ids.push(handle.await.unwrap());
        }
        ids.sort_unstable();
        ids.dedup();

        assert_eq!(ids.len(), 8);
        assert_eq!(store.list_feeds(1).await.unwrap().len(), 8);
    }

    #[tokio::test]
    async fn test_get_missing_feed_is_none() {
        let store = InMemoryFeedStore::new(vec![]);
        assert!(store.get_feed(1).await.unwrap().is_none());
    }
}
