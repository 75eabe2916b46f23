use async_trait::async_trait;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use dogshare_core::{
    Expiry, LinkShortener, ObjectPublisher, PublishOptions, Publisher, Registry, ShareError,
    ShareResult, Visibility,
};

/// Records calls and answers with a URL derived from the visibility
#[derive(Default)]
struct FakeObjects {
    calls: Mutex<Vec<(Visibility, Expiry)>>,
    fail: bool,
}

#[async_trait]
impl ObjectPublisher for FakeObjects {
    async fn upload(
        &self,
        _path: &Path,
        visibility: Visibility,
        expiry: Expiry,
    ) -> ShareResult<String> {
        self.calls.lock().unwrap().push((visibility, expiry));
        if self.fail {
            return Err(ShareError::upload(std::io::Error::other("connection reset")));
        }
        Ok(format!("http://localhost:9000/dogshare-{visibility}/obj.txt"))
    }
}

#[derive(Default)]
struct FakeShortener {
    calls: AtomicUsize,
    status: Option<u16>,
}

#[async_trait]
impl LinkShortener for FakeShortener {
    async fn shorten(&self, long_url: &str, title: &str) -> ShareResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        assert!(long_url.starts_with("http://localhost:9000/"));
        assert_eq!(title, "test title");
        match self.status {
            Some(code) => Err(ShareError::shorten(format!("unexpected status code: {code}"))),
            None => Ok("http://sho.rt/abc".to_string()),
        }
    }
}

/// Never finishes, so only cancellation can end the stage
struct HangingShortener;

#[async_trait]
impl LinkShortener for HangingShortener {
    async fn shorten(&self, _long_url: &str, _title: &str) -> ShareResult<String> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok("http://sho.rt/late".to_string())
    }
}

struct Fixture {
    _dir: tempfile::TempDir,
    file: std::path::PathBuf,
    registry_path: std::path::PathBuf,
}

async fn fixture() -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("notes.txt");
    tokio::fs::write(&file, "hello").await.unwrap();
    let registry_path = dir.path().join("registry.json");
    Fixture {
        _dir: dir,
        file,
        registry_path,
    }
}

fn options() -> PublishOptions {
    PublishOptions::new()
        .with_title("test title")
        .with_link_expiry(Expiry::hours(1))
}

#[tokio::test]
async fn private_publish_records_both_links_with_link_expiry() {
    let fx = fixture().await;
    let objects = Arc::new(FakeObjects::default());
    let registry = Registry::open(&fx.registry_path, Expiry::Never).await.unwrap();
    let mut publisher = Publisher::new(
        objects.clone(),
        Arc::new(FakeShortener::default()),
        registry,
        options(),
    );

    let record = publisher
        .publish(&fx.file, "private", &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(record.id, 1);
    assert_eq!(record.object_link, "http://localhost:9000/dogshare-private/obj.txt");
    assert_eq!(record.short_link, "http://sho.rt/abc");
    assert_eq!(record.expiry, Expiry::hours(1));
    assert_eq!(objects.calls.lock().unwrap()[0], (Visibility::Private, Expiry::hours(1)));
    assert_eq!(publisher.list_all(), &[record]);
}

#[tokio::test]
async fn public_publish_records_never_expiring_link() {
    let fx = fixture().await;
    let registry = Registry::open(&fx.registry_path, Expiry::Never).await.unwrap();
    let mut publisher = Publisher::new(
        Arc::new(FakeObjects::default()),
        Arc::new(FakeShortener::default()),
        registry,
        options(),
    );

    let record = publisher
        .publish(&fx.file, "public", &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(record.expiry, Expiry::Never);
}

#[tokio::test]
async fn shortener_failure_skips_the_registry() {
    let fx = fixture().await;
    let shortener = Arc::new(FakeShortener {
        status: Some(500),
        ..Default::default()
    });
    let registry = Registry::open(&fx.registry_path, Expiry::Never).await.unwrap();
    let mut publisher = Publisher::new(
        Arc::new(FakeObjects::default()),
        shortener.clone(),
        registry,
        options(),
    );

    let err = publisher
        .publish(&fx.file, "private", &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, ShareError::Shorten { .. }));
    assert_eq!(shortener.calls.load(Ordering::SeqCst), 1);
    assert!(publisher.list_all().is_empty());

    let reopened = Registry::open(&fx.registry_path, Expiry::Never).await.unwrap();
    assert!(reopened.is_empty());
}

#[tokio::test]
async fn upload_failure_stops_before_shortening() {
    let fx = fixture().await;
    let objects = Arc::new(FakeObjects {
        fail: true,
        ..Default::default()
    });
    let shortener = Arc::new(FakeShortener::default());
    let registry = Registry::open(&fx.registry_path, Expiry::Never).await.unwrap();
    let mut publisher = Publisher::new(objects, shortener.clone(), registry, options());

    let err = publisher
        .publish(&fx.file, "public", &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, ShareError::Upload { .. }));
    assert_eq!(shortener.calls.load(Ordering::SeqCst), 0);
    assert!(publisher.list_all().is_empty());
}

#[tokio::test]
async fn bad_policy_and_missing_file_fail_before_upload() {
    let fx = fixture().await;
    let objects = Arc::new(FakeObjects::default());
    let registry = Registry::open(&fx.registry_path, Expiry::Never).await.unwrap();
    let mut publisher = Publisher::new(
        objects.clone(),
        Arc::new(FakeShortener::default()),
        registry,
        options(),
    );
    let cancel = CancellationToken::new();

    let err = publisher.publish(&fx.file, "shared", &cancel).await.unwrap_err();
    assert!(matches!(err, ShareError::Validation { .. }));

    let missing = fx.file.with_file_name("missing.txt");
    let err = publisher.publish(&missing, "public", &cancel).await.unwrap_err();
    assert!(matches!(err, ShareError::FileAccess { .. }));

    assert!(objects.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn cancellation_aborts_the_in_flight_stage() {
    let fx = fixture().await;
    let registry = Registry::open(&fx.registry_path, Expiry::Never).await.unwrap();
    let mut publisher = Publisher::new(
        Arc::new(FakeObjects::default()),
        Arc::new(HangingShortener),
        registry,
        options(),
    );
    let cancel = CancellationToken::new();

    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        trigger.cancel();
    });

    let publishing = publisher.publish(&fx.file, "public", &cancel);
    let err = tokio::time::timeout(Duration::from_secs(5), publishing)
        .await
        .expect("publish should stop once cancelled")
        .unwrap_err();

    assert!(err.is_cancelled());
    assert!(publisher.list_all().is_empty());
}
