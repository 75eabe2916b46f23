//! Presigning and URL composition are computed locally by the SDK, so these
//! run without a reachable object store.

use std::time::Duration;
use url::Url;

use dogshare_blob::{ObjectStore, S3ObjectStore, StoreConfig};
use dogshare_core::ShareError;

async fn local_store() -> S3ObjectStore {
    let config = StoreConfig::new("http://127.0.0.1:9000", "minio", "minio123")
        .unwrap()
        .with_region("us-east-1");
    S3ObjectStore::connect(config).await
}

#[tokio::test]
async fn presigned_url_carries_signature_and_expiry() {
    let store = local_store().await;

    let link = store
        .presign_get("dogshare-private", "0b1c.png", Duration::from_secs(3600))
        .await
        .unwrap();

    let url = Url::parse(&link).unwrap();
    assert_eq!(url.host_str(), Some("127.0.0.1"));
    assert_eq!(url.path(), "/dogshare-private/0b1c.png");

    let params: Vec<(String, String)> = url.query_pairs().into_owned().collect();
    let get = |name: &str| {
        params
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.clone())
    };
    assert_eq!(get("X-Amz-Expires").as_deref(), Some("3600"));
    assert!(get("X-Amz-Signature").is_some());
    assert!(get("X-Amz-Credential").unwrap().starts_with("minio/"));
}

#[tokio::test]
async fn presign_rejects_durations_over_a_week() {
    let store = local_store().await;

    let err = store
        .presign_get("dogshare-private", "a.txt", Duration::from_secs(8 * 24 * 3600))
        .await
        .unwrap_err();
    assert!(matches!(err, ShareError::Validation { .. }));
}

#[tokio::test]
async fn public_url_is_path_style() {
    let store = local_store().await;
    assert_eq!(
        store.public_url("dogshare-public", "0b1c.png"),
        "http://127.0.0.1:9000/dogshare-public/0b1c.png"
    );
}

#[tokio::test]
async fn public_url_encodes_reserved_key_characters() {
    let store = local_store().await;
    let key = "0b1c.notes#2 draft?v";

    let link = store.public_url("dogshare-public", key);

    let url = Url::parse(&link).unwrap();
    assert_eq!(url.fragment(), None);
    assert_eq!(url.query(), None);
    let segments: Vec<&str> = url.path_segments().unwrap().collect();
    assert_eq!(segments.len(), 2);
    assert_eq!(segments[0], "dogshare-public");
    assert_eq!(urlencoding::decode(segments[1]).unwrap(), key);
}

#[tokio::test]
async fn virtual_hosted_public_url_moves_bucket_into_host() {
    let config = StoreConfig::new("http://s3.local:9000", "minio", "minio123")
        .unwrap()
        .virtual_hosted();
    let store = S3ObjectStore::connect(config).await;

    assert_eq!(
        store.public_url("dogshare-public", "a b.png"),
        "http://dogshare-public.s3.local:9000/a%20b.png"
    );
}

#[tokio::test]
async fn virtual_hosted_falls_back_to_path_style_for_ip_endpoints() {
    let config = StoreConfig::new("http://127.0.0.1:9000", "minio", "minio123")
        .unwrap()
        .virtual_hosted();
    let store = S3ObjectStore::connect(config).await;

    assert_eq!(
        store.public_url("dogshare-public", "a.png"),
        "http://127.0.0.1:9000/dogshare-public/a.png"
    );
}
