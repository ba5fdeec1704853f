use crate::adapters::snapshot::StoreSnapshot;
use crate::core::{Feed, FeedId, FeedStore, Form, FormId, PortableDocument, Result, Storage};
use async_trait::async_trait;
use tokio::sync::Mutex;

/// Feed store kept as one JSON document (see [`StoreSnapshot`]) in a
/// [`Storage`]. A missing document reads as an empty store.
pub struct FileFeedStore<S: Storage> {
    storage: S,
    path: String,
    // 讀-改-寫 之間不可穿插另一個寫入
    write_lock: Mutex<()>,
}

impl<S: Storage> FileFeedStore<S> {
    pub fn new(storage: S, path: impl Into<String>) -> Self {
        Self {
            storage,
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub async fn load(&self) -> Result<StoreSnapshot> {
        if !self.storage.exists(&self.path).await {
            tracing::debug!("Store file {} not found, starting empty", self.path);
            return Ok(StoreSnapshot::new(Vec::new()));
        }

        let data = self.storage.read_file(&self.path).await?;
        let snapshot = serde_json::from_slice(&data)?;
        Ok(snapshot)
    }

    pub async fn save(&self, snapshot: &StoreSnapshot) -> Result<()> {
        let data = serde_json::to_vec_pretty(snapshot)?;
        tracing::debug!("Writing store file {} ({} bytes)", self.path, data.len());
        self.storage.write_file(&self.path, &data).await
    }
}

#[async_trait]
impl<S: Storage> FeedStore for FileFeedStore<S> {
    async fn list_forms(&self) -> Result<Vec<Form>> {
        Ok(self.load().await?.forms)
    }

    async fn list_feeds(&self, form_id: FormId) -> Result<Vec<Feed>> {
        Ok(self.load().await?.feeds_of(form_id))
    }

    async fn get_feed(&self, feed_id: FeedId) -> Result<Option<Feed>> {
        Ok(self.load().await?.feed(feed_id))
    }

    async fn create_feed(&self, document: &PortableDocument) -> Result<FeedId> {
        let _guard = self.write_lock.lock().await;

        let mut snapshot = self.load().await?;
        let id = snapshot.insert(document)?;
        self.save(&snapshot).await?;

        Ok(id)
    }
}
