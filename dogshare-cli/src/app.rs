use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

use dogshare_blob::{ObjectGateway, StoreConfig};
use dogshare_core::{PublishOptions, Publisher, Registry, Settings, ShareError};
use dogshare_yourls::YourlsClient;

use crate::cli::{Cli, Command};
use crate::table;

/// Execute one command to completion
pub async fn run(cli: Cli, cancel: CancellationToken) -> Result<()> {
    let settings = Settings::from_env().context("failed to load configuration")?;
    info!(settings = ?settings, "loaded configuration");

    match cli.command {
        Command::Upload { filepath, policy } => {
            let short_link = upload(&settings, &filepath, &policy, &cancel).await?;
            println!("{short_link}");
        }
        Command::List => {
            let publisher = build(&settings, false, &cancel).await?;
            print!("{}", table::render(publisher.list_all()));
        }
    }
    Ok(())
}

async fn upload(
    settings: &Settings,
    path: &Path,
    policy: &str,
    cancel: &CancellationToken,
) -> Result<String> {
    let mut publisher = build(settings, true, cancel).await?;
    let record = publisher
        .publish(path, policy, cancel)
        .await
        .with_context(|| format!("failed to share {}", path.display()))?;
    info!(id = record.id, short_link = %record.short_link, "upload recorded");
    Ok(record.short_link)
}

/// Wire the gateway, shortener and registry together. Bucket provisioning
/// talks to the object store, so it only runs when `provision` is set.
async fn build(
    settings: &Settings,
    provision: bool,
    cancel: &CancellationToken,
) -> Result<Publisher> {
    let registry = Registry::initialize(settings.minio_link_expiry)
        .await
        .context("failed to open upload registry")?;

    let store = StoreConfig::new(
        &settings.minio_endpoint,
        settings.minio_access_key.as_str(),
        settings.minio_access_secret.as_str(),
    )?
    .with_region(settings.minio_region.as_str());
    let mut gateway = ObjectGateway::connect_with(store).await?;

    if provision {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(ShareError::Cancelled.into()),
            result = gateway.setup(&settings.minio_bucket_name, &settings.minio_region) => {
                result.context("failed to prepare buckets")?;
            }
        }
    }

    let shortener =
        YourlsClient::new(&settings.yourls_endpoint, settings.yourls_signature.as_str())?;
    let options = PublishOptions::new()
        .with_title(settings.yourls_title.as_str())
        .with_link_expiry(settings.minio_link_expiry);

    Ok(Publisher::new(
        Arc::new(gateway),
        Arc::new(shortener),
        registry,
        options,
    ))
}
