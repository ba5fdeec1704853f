use crate::core::{Feed, FeedId, FeedStore, Form, FormId, PortableDocument, Result};
use crate::domain::model::value_as_id;
use crate::utils::error::MigratorError;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Response, StatusCode};
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;
use url::Url;

/// Feed store behind a Gravity Forms style REST API (`.../wp-json/gf/v2/`).
///
/// - `GET forms` (array, or object keyed by form id)
/// - `GET forms/{id}/feeds`
/// - `GET feeds/{id}`, 404 meaning the feed does not exist
/// - `POST feeds`, answering with the new feed id
#[derive(Debug, Clone)]
pub struct RestFeedStore {
    client: Client,
    base_url: Url,
}

impl RestFeedStore {
    pub fn new(
        endpoint: &str,
        timeout: Duration,
        headers: &HashMap<String, String>,
    ) -> Result<Self> {
        // join() 需要結尾斜線，否則最後一段路徑會被取代
        let normalized = if endpoint.ends_with('/') {
            endpoint.to_string()
        } else {
            format!("{}/", endpoint)
        };
        let base_url = Url::parse(&normalized).map_err(|e| MigratorError::InvalidConfigValueError {
            field: "store.endpoint".to_string(),
            value: endpoint.to_string(),
            reason: e.to_string(),
        })?;

        let client = Client::builder()
            .timeout(timeout)
            .default_headers(header_map(headers)?)
            .build()?;

        Ok(Self { client, base_url })
    }

    fn url(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| MigratorError::ConfigError {
                message: format!("Cannot build store URL for '{}': {}", path, e),
            })
    }

    async fn get_json(&self, path: &str) -> Result<Value> {
        let url = self.url(path)?;
        tracing::debug!("Making API request to: {}", url);

        let response = self.client.get(url).send().await?;
        tracing::debug!("API response status: {}", response.status());

        let response = ensure_success(response).await?;
        Ok(response.json().await?)
    }
}

#[async_trait]
impl FeedStore for RestFeedStore {
    async fn list_forms(&self) -> Result<Vec<Form>> {
        let (items, keyed_by_id) = match self.get_json("forms").await? {
            Value::Array(items) => (items, false),
            Value::Object(by_id) => (by_id.into_iter().map(|(_, form)| form).collect(), true),
            other => {
                return Err(MigratorError::ApiStatusError {
                    status: 200,
                    message: format!("unexpected forms payload: {}", other),
                })
            }
        };

        let mut forms = items
            .into_iter()
            .map(|form| serde_json::from_value(form).map_err(MigratorError::from))
            .collect::<Result<Vec<Form>>>()?;

        // 物件的鍵是字串排序 ("10" 在 "2" 之前)
        if keyed_by_id {
            forms.sort_by_key(|form| form.id);
        }

        Ok(forms)
    }

    async fn list_feeds(&self, form_id: FormId) -> Result<Vec<Feed>> {
        let feeds = self.get_json(&format!("forms/{}/feeds", form_id)).await?;
        Ok(serde_json::from_value(feeds)?)
    }

    async fn get_feed(&self, feed_id: FeedId) -> Result<Option<Feed>> {
        let url = self.url(&format!("feeds/{}", feed_id))?;
        tracing::debug!("Making API request to: {}", url);

        let response = self.client.get(url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let response = ensure_success(response).await?;
        let value: Value = response.json().await?;
        if value.is_null() || value.as_object().is_some_and(|o| o.is_empty()) {
            return Ok(None);
        }

        Ok(Some(serde_json::from_value(value)?))
    }

    async fn create_feed(&self, document: &PortableDocument) -> Result<FeedId> {
        let url = self.url("feeds")?;
        tracing::debug!("Posting feed document to: {}", url);

        let response = self.client.post(url).json(document).send().await?;
        let status = response.status();

        if status.is_client_error() {
            // 4xx: 存儲端拒絕了這份文件
            let body = response.text().await.unwrap_or_default();
            return Err(MigratorError::ValidationError {
                message: error_message(&body).unwrap_or_else(|| format!("HTTP {}", status)),
            });
        }

        let response = ensure_success(response).await?;
        let value: Value = response.json().await?;

        value_as_id(&value)
            .or_else(|| value.get("id").and_then(value_as_id))
            .ok_or_else(|| MigratorError::ApiStatusError {
                status: status.as_u16(),
                message: format!("response did not contain a feed id: {}", value),
            })
    }
}

async fn ensure_success(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(MigratorError::ApiStatusError {
        status: status.as_u16(),
        message: error_message(&body).unwrap_or(body),
    })
}

/// Pulls `message` out of a WordPress style error body.
fn error_message(body: &str) -> Option<String> {
    serde_json::from_str::<Value>(body)
        .ok()?
        .get("message")?
        .as_str()
        .map(str::to_string)
}

fn header_map(headers: &HashMap<String, String>) -> Result<HeaderMap> {
    let mut map = HeaderMap::new();
    for (name, value) in headers {
        let invalid = |reason: String| MigratorError::InvalidConfigValueError {
            field: format!("store.headers.{}", name),
            value: value.clone(),
            reason,
        };
        let header_name =
            HeaderName::from_bytes(name.as_bytes()).map_err(|e| invalid(e.to_string()))?;
        let header_value = HeaderValue::from_str(value).map_err(|e| invalid(e.to_string()))?;
        map.insert(header_name, header_value);
    }
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn store(server: &MockServer) -> RestFeedStore {
        RestFeedStore::new(
            &server.url("/wp-json/gf/v2"),
            Duration::from_secs(5),
            &HashMap::new(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_list_forms_accepts_object_keyed_by_id() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET).path("/wp-json/gf/v2/forms");
            then.status(200).json_body(json!({
                "1": {"id": "1", "title": "Contact", "entries": "12"},
                "10": {"id": "10", "title": "Survey", "entries": "3"},
                "2": {"id": "2", "title": "Quote", "entries": "0"}
            }));
        });

        let forms = store(&server).list_forms().await.unwrap();

        api_mock.assert();
        assert_eq!(
            forms,
            vec![
                Form::new(1, "Contact"),
                Form::new(2, "Quote"),
                Form::new(10, "Survey")
            ]
        );
    }

    #[tokio::test]
    async fn test_get_feed_not_found_is_none() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET).path("/wp-json/gf/v2/feeds/99");
            then.status(404)
                .json_body(json!({"code": "not_found", "message": "Feed not found"}));
        });

        let feed = store(&server).get_feed(99).await.unwrap();

        api_mock.assert();
        assert!(feed.is_none());
    }

    #[tokio::test]
    async fn test_create_feed_posts_document() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(POST)
                .path("/wp-json/gf/v2/feeds")
                .json_body(json!({"form_id": 4, "addon_slug": "x", "meta": {"k": 1}}));
            then.status(201).json_body(json!(17));
        });

        let document = crate::core::document::parse_document(
            r#"{"form_id": 4, "addon_slug": "x", "meta": {"k": 1}}"#,
        )
        .unwrap();
        let id = store(&server).create_feed(&document).await.unwrap();

        api_mock.assert();
        assert_eq!(id, 17);
    }

    #[tokio::test]
    async fn test_create_feed_rejection_keeps_server_message() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/wp-json/gf/v2/feeds");
            then.status(400).json_body(json!({
                "code": "invalid_feed_meta",
                "message": "The feed meta is invalid for add-on x."
            }));
        });

        let document =
            crate::core::document::parse_document(r#"{"form_id": 4, "addon_slug": "x"}"#).unwrap();
        let result = store(&server).create_feed(&document).await;

        match result {
            Err(MigratorError::ValidationError { message }) => {
                assert_eq!(message, "The feed meta is invalid for add-on x.")
            }
            other => panic!("expected ValidationError, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_server_error_on_listing() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/wp-json/gf/v2/forms/3/feeds");
            then.status(500).body("boom");
        });

        let result = store(&server).list_feeds(3).await;

        assert!(matches!(
            result,
            Err(MigratorError::ApiStatusError { status: 500, .. })
        ));
    }

    #[test]
    fn test_invalid_header_is_config_error() {
        let mut headers = HashMap::new();
        headers.insert("bad header".to_string(), "x".to_string());

        let result = RestFeedStore::new("https://example.com/wp-json/gf/v2", Duration::from_secs(5), &headers);

        assert!(matches!(
            result,
            Err(MigratorError::InvalidConfigValueError { .. })
        ));
    }
}
