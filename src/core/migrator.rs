use crate::core::document::{parse_document, sanitize_for_import};
use crate::core::page::PageState;
use crate::core::{ConfigProvider, FeedStore};
use crate::domain::model::{ExportedFile, FeedId, FormId, ImportOutcome, PortableDocument};
use crate::utils::error::{MigratorError, Result};

/// Exports one feed to a portable document and imports such documents back,
/// possibly under another form.
pub struct FeedMigrator<S: FeedStore, C: ConfigProvider> {
    store: S,
    config: C,
}

impl<S: FeedStore, C: ConfigProvider> FeedMigrator<S, C> {
    pub fn new(store: S, config: C) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &C {
        &self.config
    }

    /// Reads the feed and checks it belongs to `form_id`. The document keeps
    /// `id` and `form_id`; the import side never trusts them.
    pub async fn export(&self, form_id: FormId, feed_id: FeedId) -> Result<PortableDocument> {
        tracing::debug!("Exporting feed {} of form {}", feed_id, form_id);

        let feed = self
            .store
            .get_feed(feed_id)
            .await?
            .ok_or(MigratorError::NotFound { feed_id })?;

        if feed.form_id() != form_id {
            tracing::warn!(
                "Feed {} belongs to form {}, not to the requested form {}",
                feed_id,
                feed.form_id(),
                form_id
            );
            return Err(MigratorError::Mismatch {
                feed_id,
                form_id,
                actual_form_id: feed.form_id(),
            });
        }

        PortableDocument::from_feed(&feed)
    }

    pub async fn export_file(&self, form_id: FormId, feed_id: FeedId) -> Result<ExportedFile> {
        let document = self.export(form_id, feed_id).await?;
        let body = document.to_json(self.config.pretty_export())?;

        tracing::info!(
            "📤 Exported feed {} of form {} ({} bytes)",
            feed_id,
            form_id,
            body.len()
        );

        Ok(ExportedFile {
            filename: ExportedFile::filename_for(feed_id, form_id),
            content_type: ExportedFile::CONTENT_TYPE,
            body,
        })
    }

    /// Creates a new feed under `target_form_id` from pasted text. Every call
    /// creates a new feed, so importing the same text twice yields two feeds.
    pub async fn import(&self, raw: &str, target_form_id: FormId) -> Result<ImportOutcome> {
        let document = parse_document(raw)?;

        tracing::debug!(
            "Importing {} feed into form {}",
            document.addon_slug().unwrap_or("unknown"),
            target_form_id
        );

        let document =
            sanitize_for_import(document, target_form_id, self.config.activate_on_import());

        let feed_id = self
            .store
            .create_feed(&document)
            .await
            .map_err(|e| match e {
                MigratorError::ValidationError { message } => {
                    MigratorError::PersistFailed { reason: message }
                }
                other => MigratorError::PersistFailed {
                    reason: other.to_string(),
                },
            })?;

        tracing::info!(
            "📥 Imported feed into form {} as feed {}",
            target_form_id,
            feed_id
        );

        Ok(ImportOutcome {
            feed_id,
            form_id: target_form_id,
        })
    }

    /// Loads what the page needs. Store failures degrade to empty lists so the
    /// page stays usable.
    pub async fn page_state(&self, selected_form: Option<FormId>, kind_only: bool) -> PageState {
        let forms = match self.store.list_forms().await {
            Ok(forms) => forms,
            Err(e) => {
                tracing::warn!("⚠️ Could not list forms: {}", e);
                Vec::new()
            }
        };

        let mut feeds = match selected_form {
            Some(form_id) => match self.store.list_feeds(form_id).await {
                Ok(feeds) => feeds,
                Err(e) => {
                    tracing::warn!("⚠️ Could not list feeds of form {}: {}", form_id, e);
                    Vec::new()
                }
            },
            None => Vec::new(),
        };

        if kind_only {
            let kind = self.config.kind_filter();
            feeds.retain(|feed| feed.is_kind(kind));
        }

        PageState {
            forms,
            selected_form,
            feeds,
            kind_only,
            kind_filter: self.config.kind_filter().to_string(),
            notice: None,
        }
    }
}
