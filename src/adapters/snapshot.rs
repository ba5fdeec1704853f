use crate::domain::model::{
    value_as_flag, value_as_id, Feed, FeedId, Form, FormId, PortableDocument, FIELD_ADDON_SLUG,
    FIELD_FORM_ID, FIELD_ID, FIELD_IS_ACTIVE, FIELD_META,
};
use crate::utils::error::{MigratorError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Whole contents of a local feed store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreSnapshot {
    #[serde(default)]
    pub forms: Vec<Form>,
    #[serde(default)]
    pub feeds: Vec<Feed>,
    #[serde(default)]
    pub next_feed_id: FeedId,
}

impl StoreSnapshot {
    pub fn new(forms: Vec<Form>) -> Self {
        Self {
            forms,
            feeds: Vec::new(),
            next_feed_id: 1,
        }
    }

    pub fn feeds_of(&self, form_id: FormId) -> Vec<Feed> {
        self.feeds
            .iter()
            .filter(|feed| feed.form_id() == form_id)
            .cloned()
            .collect()
    }

    pub fn feed(&self, feed_id: FeedId) -> Option<Feed> {
        self.feeds.iter().find(|feed| feed.id() == feed_id).cloned()
    }

    /// Validates the document as a new feed and stores it under a fresh id.
    /// Nothing is stored when validation fails.
    pub fn insert(&mut self, document: &PortableDocument) -> Result<FeedId> {
        let mut record = self.validated_record(document)?;

        let id = self.allocate_id()?;
        record.insert(FIELD_ID.to_string(), Value::from(id));
        let feed = Feed::try_from(record).map_err(rejected)?;

        self.feeds.push(feed);
        // u64::MAX 用完後，下一次分配會失敗
        self.next_feed_id = id.saturating_add(1);

        Ok(id)
    }

    // 除了 id 以外，欄位原樣保存
    fn validated_record(&self, document: &PortableDocument) -> Result<Map<String, Value>> {
        let form_id = document
            .get(FIELD_FORM_ID)
            .and_then(value_as_id)
            .ok_or_else(|| rejected("form_id must be a form identifier"))?;

        if !self.forms.iter().any(|form| form.id == form_id) {
            return Err(rejected(format!("Form {} does not exist", form_id)));
        }

        match document.get(FIELD_ADDON_SLUG) {
            Some(Value::String(slug)) if !slug.trim().is_empty() => {}
            _ => return Err(rejected("addon_slug must be a non-empty string")),
        }

        match document.get(FIELD_META) {
            Some(Value::Object(_)) => {}
            _ => return Err(rejected("meta must be an object")),
        }

        if let Some(value) = document.get(FIELD_IS_ACTIVE) {
            if value_as_flag(value).is_none() {
                return Err(rejected(format!("is_active has an invalid value: {}", value)));
            }
        }

        let mut record = document.fields().clone();
        record.remove(FIELD_ID);
        Ok(record)
    }

    // 永遠分配比現有最大值更大的 id
    fn allocate_id(&self) -> Result<FeedId> {
        let max_existing = self.feeds.iter().map(|feed| feed.id()).max().unwrap_or(0);
        let above_existing = max_existing
            .checked_add(1)
            .ok_or_else(|| rejected("no feed id available"))?;
        Ok(self.next_feed_id.max(above_existing))
    }
}

fn rejected(message: impl Into<String>) -> MigratorError {
    MigratorError::ValidationError {
        message: message.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn document(value: Value) -> PortableDocument {
        match value {
            Value::Object(fields) => PortableDocument::from_fields(fields).unwrap(),
            _ => panic!("test document must be an object"),
        }
    }

    #[test]
    fn test_insert_assigns_sequential_ids() {
        let mut snapshot = StoreSnapshot::new(vec![Form::new(1, "Contact")]);
        let doc = document(json!({"form_id": 1, "addon_slug": "x", "meta": {}}));

        assert_eq!(snapshot.insert(&doc).unwrap(), 1);
        assert_eq!(snapshot.insert(&doc).unwrap(), 2);
        assert_eq!(snapshot.next_feed_id, 3);
        assert_eq!(snapshot.feeds_of(1).len(), 2);
    }

    #[test]
    fn test_insert_skips_ids_already_taken() {
        let mut snapshot: StoreSnapshot = serde_json::from_value(json!({
            "forms": [{"id": 1, "title": "Contact"}],
            "feeds": [{"id": 40, "form_id": 1, "addon_slug": "x", "meta": {}}]
        }))
        .unwrap();

        let id = snapshot
            .insert(&document(json!({"form_id": 1, "addon_slug": "x", "meta": {}})))
            .unwrap();

        assert_eq!(id, 41);
    }

    #[test]
    fn test_insert_validation() {
        let mut snapshot = StoreSnapshot::new(vec![Form::new(1, "Contact")]);

        let cases = [
            (json!({"form_id": 2, "addon_slug": "x", "meta": {}}), "Form 2 does not exist"),
            (json!({"form_id": 1, "addon_slug": "", "meta": {}}), "addon_slug must be a non-empty string"),
            (json!({"form_id": 1, "addon_slug": "x", "meta": []}), "meta must be an object"),
            (json!({"addon_slug": "x", "meta": {}}), "form_id must be a form identifier"),
        ];

        for (value, expected) in cases {
            match snapshot.insert(&document(value)) {
                Err(MigratorError::ValidationError { message }) => assert_eq!(message, expected),
                other => panic!("expected ValidationError, got {:?}", other),
            }
        }
        assert!(snapshot.feeds.is_empty());
    }

    #[test]
    fn test_insert_keeps_unknown_fields() {
        let mut snapshot = StoreSnapshot::new(vec![Form::new(1, "Contact")]);
        let id = snapshot
            .insert(&document(json!({
                "form_id": 1,
                "addon_slug": "x",
                "meta": {"k": 1},
                "event_type": "form_submission",
                "is_active": "0"
            })))
            .unwrap();

        let feed = snapshot.feed(id).unwrap();
        assert!(!feed.is_active());
        assert_eq!(feed.field("event_type"), Some(&json!("form_submission")));
        // 原始值不改寫
        assert_eq!(feed.field("is_active"), Some(&json!("0")));
    }

    #[test]
    fn test_insert_fails_when_ids_are_exhausted() {
        let mut snapshot: StoreSnapshot = serde_json::from_value(json!({
            "forms": [{"id": 1, "title": "Contact"}],
            "feeds": [{"id": u64::MAX, "form_id": 1, "addon_slug": "x", "meta": {}}]
        }))
        .unwrap();
        let before = snapshot.clone();

        let result = snapshot.insert(&document(json!({"form_id": 1, "addon_slug": "x", "meta": {}})));

        match result {
            Err(MigratorError::ValidationError { message }) => {
                assert_eq!(message, "no feed id available")
            }
            other => panic!("expected ValidationError, got {:?}", other),
        }
        assert_eq!(snapshot, before);
    }

    #[test]
    fn test_last_id_can_still_be_allocated_once() {
        let mut snapshot = StoreSnapshot::new(vec![Form::new(1, "Contact")]);
        snapshot.next_feed_id = u64::MAX;
        let doc = document(json!({"form_id": 1, "addon_slug": "x", "meta": {}}));

        assert_eq!(snapshot.insert(&doc).unwrap(), u64::MAX);
        assert!(snapshot.insert(&doc).is_err());
        assert_eq!(snapshot.feeds.len(), 1);
    }
}
