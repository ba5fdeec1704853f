use crate::domain::ports::Storage;
use crate::utils::error::{MigratorError, Result};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

pub type FormId = u64;
pub type FeedId = u64;

pub const FIELD_ID: &str = "id";
pub const FIELD_FORM_ID: &str = "form_id";
pub const FIELD_ADDON_SLUG: &str = "addon_slug";
pub const FIELD_META: &str = "meta";
pub const FIELD_IS_ACTIVE: &str = "is_active";

pub const WEBHOOKS_ADDON_SLUG: &str = "gravityformswebhooks";

/// Parent entity. Read-only to this crate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Form {
    #[serde(deserialize_with = "de_id")]
    pub id: FormId,
    #[serde(default)]
    pub title: String,
}

impl Form {
    pub fn new(id: FormId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
        }
    }

    pub fn label(&self) -> String {
        format!("{} (ID: {})", self.title, self.id)
    }
}

/// A single feed exactly as the store hands it out. The typed fields are read
/// from the raw record, and serializing a feed writes the raw record back
/// untouched (string ids, `"0"` flags and nulls included).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct Feed {
    id: FeedId,
    form_id: FormId,
    is_active: bool,
    raw: Map<String, Value>,
}

impl Feed {
    pub fn id(&self) -> FeedId {
        self.id
    }

    pub fn form_id(&self) -> FormId {
        self.form_id
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn addon_slug(&self) -> Option<&str> {
        self.raw.get(FIELD_ADDON_SLUG).and_then(Value::as_str)
    }

    pub fn meta(&self) -> Option<&Value> {
        self.raw.get(FIELD_META)
    }

    pub fn field(&self, key: &str) -> Option<&Value> {
        self.raw.get(key)
    }

    pub fn raw(&self) -> &Map<String, Value> {
        &self.raw
    }

    pub fn feed_name(&self) -> Option<&str> {
        self.meta()
            .and_then(|meta| meta.get("feedName"))
            .and_then(Value::as_str)
    }

    pub fn is_kind(&self, addon_slug: &str) -> bool {
        self.addon_slug() == Some(addon_slug)
    }

    /// `<feedName> (ID: <id>, <addon_slug>)`
    pub fn label(&self) -> String {
        format!(
            "{} (ID: {}, {})",
            self.feed_name().unwrap_or("Untitled"),
            self.id,
            self.addon_slug().unwrap_or("Unknown")
        )
    }
}

impl TryFrom<Map<String, Value>> for Feed {
    type Error = String;

    fn try_from(raw: Map<String, Value>) -> std::result::Result<Self, Self::Error> {
        let id_field = |key: &str| -> std::result::Result<u64, String> {
            match raw.get(key) {
                Some(value) => {
                    value_as_id(value).ok_or_else(|| format!("invalid {}: {}", key, value))
                }
                None => Err(format!("missing field `{}`", key)),
            }
        };

        let id = id_field(FIELD_ID)?;
        let form_id = id_field(FIELD_FORM_ID)?;
        let is_active = match raw.get(FIELD_IS_ACTIVE) {
            Some(value) => {
                value_as_flag(value).ok_or_else(|| format!("invalid active flag: {}", value))?
            }
            None => true,
        };

        Ok(Self {
            id,
            form_id,
            is_active,
            raw,
        })
    }
}

impl From<Feed> for Map<String, Value> {
    fn from(feed: Feed) -> Self {
        feed.raw
    }
}

/// Transfer form of a feed: always a non-empty JSON object.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct PortableDocument(Map<String, Value>);

impl PortableDocument {
    pub fn from_fields(fields: Map<String, Value>) -> Result<Self> {
        if fields.is_empty() {
            return Err(MigratorError::MalformedInput {
                reason: "document is an empty object".to_string(),
            });
        }
        Ok(Self(fields))
    }

    /// The store's record as-is, including `id` and `form_id`.
    pub fn from_feed(feed: &Feed) -> Result<Self> {
        Self::from_fields(feed.raw().clone())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn insert(&mut self, key: &str, value: Value) -> Option<Value> {
        self.0.insert(key.to_string(), value)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_fields(self) -> Map<String, Value> {
        self.0
    }

    pub fn addon_slug(&self) -> Option<&str> {
        self.get(FIELD_ADDON_SLUG).and_then(Value::as_str)
    }

    pub fn to_json(&self, pretty: bool) -> Result<String> {
        let body = if pretty {
            serde_json::to_string_pretty(&self.0)?
        } else {
            serde_json::to_string(&self.0)?
        };
        Ok(body)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ImportOutcome {
    pub feed_id: FeedId,
    pub form_id: FormId,
}

/// Download produced by an export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedFile {
    pub filename: String,
    pub content_type: &'static str,
    pub body: String,
}

impl ExportedFile {
    pub const CONTENT_TYPE: &'static str = "application/json";

    pub fn filename_for(feed_id: FeedId, form_id: FormId) -> String {
        format!("feed_{}_form_{}.json", feed_id, form_id)
    }

    /// Writes the download under its own filename. `storage` is rooted at the
    /// output directory.
    pub async fn write_to<S: Storage>(&self, storage: &S) -> Result<()> {
        storage
            .write_file(&self.filename, self.body.as_bytes())
            .await
    }
}

/// Store APIs hand identifiers out as numbers or numeric strings.
pub fn value_as_id(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Accepts `true`/`false`, `0`/`1` and `"0"`/`"1"`.
pub fn value_as_flag(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_i64().map(|n| n != 0),
        Value::String(s) => match s.trim() {
            "1" | "true" => Some(true),
            "0" | "false" | "" => Some(false),
            _ => None,
        },
        Value::Null => Some(false),
        _ => None,
    }
}

fn de_id<'de, D>(deserializer: D) -> std::result::Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    value_as_id(&value)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid identifier: {}", value)))
}
