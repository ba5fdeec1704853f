use crate::domain::model::{Feed, FeedId, Form, FormId, PortableDocument};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
    fn exists(&self, path: &str) -> impl std::future::Future<Output = bool> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn activate_on_import(&self) -> bool;
    fn kind_filter(&self) -> &str;
    fn pretty_export(&self) -> bool;
}

/// The form plugin's record storage. `create_feed` rejects documents it
/// cannot store with `MigratorError::ValidationError`.
#[async_trait]
pub trait FeedStore: Send + Sync {
    async fn list_forms(&self) -> Result<Vec<Form>>;
    async fn list_feeds(&self, form_id: FormId) -> Result<Vec<Feed>>;
    async fn get_feed(&self, feed_id: FeedId) -> Result<Option<Feed>>;
    async fn create_feed(&self, document: &PortableDocument) -> Result<FeedId>;
}

#[async_trait]
impl<T: FeedStore + ?Sized> FeedStore for Box<T> {
    async fn list_forms(&self) -> Result<Vec<Form>> {
        (**self).list_forms().await
    }

    async fn list_feeds(&self, form_id: FormId) -> Result<Vec<Feed>> {
        (**self).list_feeds(form_id).await
    }

    async fn get_feed(&self, feed_id: FeedId) -> Result<Option<Feed>> {
        (**self).get_feed(feed_id).await
    }

    async fn create_feed(&self, document: &PortableDocument) -> Result<FeedId> {
        (**self).create_feed(document).await
    }
}

#[async_trait]
impl<T: FeedStore + ?Sized> FeedStore for Arc<T> {
    async fn list_forms(&self) -> Result<Vec<Form>> {
        (**self).list_forms().await
    }

    async fn list_feeds(&self, form_id: FormId) -> Result<Vec<Feed>> {
        (**self).list_feeds(form_id).await
    }

    async fn get_feed(&self, feed_id: FeedId) -> Result<Option<Feed>> {
        (**self).get_feed(feed_id).await
    }

    async fn create_feed(&self, document: &PortableDocument) -> Result<FeedId> {
        (**self).create_feed(document).await
    }
}
