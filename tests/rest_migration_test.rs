use anyhow::Result;
use feed_migrator::adapters::store_from_config;
use feed_migrator::config::{MigratorConfig, StoreKind};
use feed_migrator::{FeedMigrator, MigratorError};
use httpmock::prelude::*;
use serde_json::json;

fn rest_config(server: &MockServer) -> MigratorConfig {
    let mut config = MigratorConfig::default();
    config.store.kind = StoreKind::Rest;
    config.store.endpoint = Some(server.url("/wp-json/gf/v2/"));
    config
        .store
        .headers
        .insert("Authorization".to_string(), "Basic dGVzdDp0ZXN0".to_string());
    config
}

/// 從一個站點匯出，再匯入到另一個站點
#[tokio::test]
async fn test_migrate_feed_between_sites() -> Result<()> {
    let source = MockServer::start();
    let target = MockServer::start();

    let feed_mock = source.mock(|when, then| {
        when.method(GET)
            .path("/wp-json/gf/v2/feeds/12")
            .header("Authorization", "Basic dGVzdDp0ZXN0");
        then.status(200).json_body(json!({
            "id": "12",
            "form_id": "3",
            "is_active": "1",
            "feed_order": "0",
            "addon_slug": "gravityformswebhooks",
            "meta": {"feedName": "Zapier", "requestURL": "https://hooks.zapier.com/abc"}
        }));
    });

    let create_mock = target.mock(|when, then| {
        when.method(POST).path("/wp-json/gf/v2/feeds").json_body(json!({
            "form_id": 8,
            "is_active": true,
            "feed_order": "0",
            "addon_slug": "gravityformswebhooks",
            "meta": {"feedName": "Zapier", "requestURL": "https://hooks.zapier.com/abc"}
        }));
        then.status(201).json_body(json!({"id": 31}));
    });

    let exporter = FeedMigrator::new(store_from_config(&rest_config(&source).store)?, rest_config(&source));
    let importer = FeedMigrator::new(store_from_config(&rest_config(&target).store)?, rest_config(&target));

    let file = exporter.export_file(3, 12).await?;
    let outcome = importer.import(&file.body, 8).await?;

    feed_mock.assert();
    create_mock.assert();
    assert_eq!(file.filename, "feed_12_form_3.json");
    assert_eq!(outcome.feed_id, 31);
    assert_eq!(outcome.form_id, 8);

    Ok(())
}

#[tokio::test]
async fn test_export_of_missing_remote_feed() -> Result<()> {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/wp-json/gf/v2/feeds/404");
        then.status(404)
            .json_body(json!({"code": "not_found", "message": "Feed not found"}));
    });

    let config = rest_config(&server);
    let migrator = FeedMigrator::new(store_from_config(&config.store)?, config);

    let result = migrator.export(1, 404).await;
    assert!(matches!(result, Err(MigratorError::NotFound { feed_id: 404 })));

    Ok(())
}

#[tokio::test]
async fn test_remote_rejection_is_reported_once() -> Result<()> {
    let server = MockServer::start();
    let create_mock = server.mock(|when, then| {
        when.method(POST).path("/wp-json/gf/v2/feeds");
        then.status(422).json_body(json!({
            "code": "invalid_form_id",
            "message": "The form ID is invalid."
        }));
    });

    let config = rest_config(&server);
    let migrator = FeedMigrator::new(store_from_config(&config.store)?, config);

    let result = migrator
        .import(r#"{"addon_slug":"gravityformswebhooks","meta":{}}"#, 77)
        .await;

    create_mock.assert_hits(1);
    match result {
        Err(MigratorError::PersistFailed { reason }) => assert_eq!(reason, "The form ID is invalid."),
        other => panic!("expected PersistFailed, got {:?}", other),
    }

    Ok(())
}

#[tokio::test]
async fn test_page_degrades_when_remote_listing_fails() -> Result<()> {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/wp-json/gf/v2/forms");
        then.status(200).json_body(json!([{"id": 5, "title": "Booking"}]));
    });
    server.mock(|when, then| {
        when.method(GET).path("/wp-json/gf/v2/forms/5/feeds");
        then.status(500).body("database gone");
    });

    let config = rest_config(&server);
    let migrator = FeedMigrator::new(store_from_config(&config.store)?, config);

    let view = feed_migrator::render_page(&migrator.page_state(Some(5), false).await);

    assert_eq!(view.forms.len(), 1);
    assert!(view.forms[0].selected);
    let export = view.export.expect("export section");
    assert!(export.feeds.is_empty());
    assert_eq!(
        export.empty_notice.map(|n| n.message),
        Some("No feeds found for Form ID 5.".to_string())
    );

    Ok(())
}
