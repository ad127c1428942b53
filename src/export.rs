/*!
 * Asset export pipeline
 *
 * Joins the asset collection against the streaming locator collection by
 * asset name, resolves each matched locator to a manifest reference, and
 * accumulates one row per exportable asset. Locator pages are scanned from
 * the start for every asset, stopping at the first page that contains a
 * match (tie-break: page order, then in-page order).
 */

use std::time::Instant;

use tracing::{debug, info, warn};

use crate::catalog::{Asset, CatalogClient, StreamingLocator};
use crate::config::{ErrorPolicy, ExportConfig, ManifestMode};
use crate::error::{ExportError, Result};

/// One output row: asset identifier plus the manifest reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRow {
    pub asset_id: String,
    pub manifest: String,
}

/// Summary of a completed export run
#[derive(Debug, Clone)]
pub struct ExportStats {
    pub exported: usize,
    pub skipped: usize,
    pub elapsed: std::time::Duration,
}

/// Find the first streaming locator whose asset_name matches, page by page
///
/// Every locator page is consulted until a match is found or pages are
/// exhausted; duplicate locators for one asset resolve to the first in
/// page order.
pub async fn find_locator(
    client: &CatalogClient,
    asset_name: &str,
) -> Result<Option<StreamingLocator>> {
    let mut page = client.list_streaming_locators().await?;
    loop {
        if let Some(locator) = page
            .value
            .iter()
            .find(|locator| locator.asset_name == asset_name)
        {
            return Ok(Some(locator.clone()));
        }
        match page.next_link {
            Some(link) => page = client.list_streaming_locators_next(&link).await?,
            None => return Ok(None),
        }
    }
}

/// Extract the manifest name from a streaming path
///
/// The path is URL-shaped with a predictable prefix before the manifest
/// segment; the manifest is the third non-empty `/`-separated segment:
/// `"/videoid/locatorid/manifestname.ism/manifest(format=m3u8-aapl)"`
/// yields `"manifestname.ism"`, as does the scheme-relative
/// `"//host/locatorid/manifestname.ism/..."` form.
pub fn extract_manifest_name(path: &str) -> Result<String> {
    path.split('/')
        .filter(|segment| !segment.is_empty())
        .nth(2)
        .map(str::to_string)
        .ok_or_else(|| ExportError::ManifestShape(path.to_string()))
}

/// Resolve a locator to its manifest reference per the configured mode
pub async fn resolve_manifest(
    client: &CatalogClient,
    locator: &StreamingLocator,
    mode: ManifestMode,
) -> Result<String> {
    let paths = client.list_streaming_paths(&locator.name).await?;

    let first = paths
        .streaming_paths
        .first()
        .and_then(|entry| entry.paths.first())
        .ok_or_else(|| {
            ExportError::ManifestShape(format!("locator '{}' has no streaming paths", locator.name))
        })?;

    match mode {
        ManifestMode::Extracted => extract_manifest_name(first),
        ManifestMode::RawPath => Ok(first.clone()),
    }
}

/// Export pipeline over a catalog client
pub struct Exporter<'a> {
    client: &'a CatalogClient,
    error_policy: ErrorPolicy,
    manifest_mode: ManifestMode,
}

impl<'a> Exporter<'a> {
    pub fn new(client: &'a CatalogClient, config: &ExportConfig) -> Self {
        Self {
            client,
            error_policy: config.error_policy,
            manifest_mode: config.manifest_mode,
        }
    }

    /// Produce one row for a single asset, or fail
    async fn export_asset(&self, asset: &Asset) -> Result<AssetRow> {
        let locator = find_locator(self.client, &asset.name)
            .await?
            .ok_or_else(|| ExportError::LocatorNotFound(asset.name.clone()))?;

        let manifest = resolve_manifest(self.client, &locator, self.manifest_mode).await?;

        Ok(AssetRow {
            // The source exports the human-readable description under the
            // asset id column; an absent description becomes an empty field.
            asset_id: asset.description.clone().unwrap_or_default(),
            manifest,
        })
    }

    /// Build rows for the full asset collection
    ///
    /// Tolerant policy skips failed assets with a warning; strict policy
    /// propagates the first failure.
    pub async fn build_rows(&self, assets: &[Asset]) -> Result<(Vec<AssetRow>, usize)> {
        let mut rows = Vec::with_capacity(assets.len());
        let mut skipped = 0usize;

        for asset in assets {
            match self.export_asset(asset).await {
                Ok(row) => {
                    info!(asset = %asset.name, manifest = %row.manifest, "exported");
                    rows.push(row);
                }
                Err(e) if self.error_policy == ErrorPolicy::Tolerant && e.is_per_asset() => {
                    warn!(asset = %asset.name, error = %e, "skipping asset");
                    skipped += 1;
                }
                Err(e) => return Err(e),
            }
        }

        Ok((rows, skipped))
    }
}

/// Run a full export: drain assets, build rows, write the CSV, log a summary
pub async fn run_export(
    client: &CatalogClient,
    config: &ExportConfig,
    output: &std::path::Path,
) -> Result<ExportStats> {
    let started = Instant::now();

    let assets = client.list_all_assets().await?;
    debug!(count = assets.len(), "drained asset pages");

    let exporter = Exporter::new(client, config);
    let (rows, skipped) = exporter.build_rows(&assets).await?;

    crate::output::write_csv(output, &rows, config.csv_header)?;

    let stats = ExportStats {
        exported: rows.len(),
        skipped,
        elapsed: started.elapsed(),
    };

    info!(
        exported = stats.exported,
        skipped = stats.skipped,
        account = %config.account_name,
        elapsed = ?stats.elapsed,
        "export complete"
    );

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_manifest_name() {
        assert_eq!(
            extract_manifest_name("/videoid/locatorid/manifestname.ism/manifest(format=m3u8-aapl)")
                .unwrap(),
            "manifestname.ism"
        );
        assert_eq!(
            extract_manifest_name("/x/y/a1.ism/manifest").unwrap(),
            "a1.ism"
        );
    }

    #[test]
    fn test_extract_from_scheme_relative_path() {
        assert_eq!(
            extract_manifest_name(
                "//contoso.streaming.example.net/4c1017a4/promo.ism/manifest(format=m3u8-aapl)"
            )
            .unwrap(),
            "promo.ism"
        );
    }

    #[test]
    fn test_extract_rejects_short_paths() {
        for path in ["", "/", "/only", "/two/segments", "a/b"] {
            let err = extract_manifest_name(path).unwrap_err();
            assert!(
                matches!(err, ExportError::ManifestShape(_)),
                "expected shape error for {:?}",
                path
            );
        }
    }

    #[test]
    fn test_extract_exactly_three_segments() {
        assert_eq!(extract_manifest_name("/a/b/c").unwrap(), "c");
        assert_eq!(extract_manifest_name("a/b/c").unwrap(), "c");
    }
}
