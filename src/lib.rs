/*!
 * medex - Media asset export
 *
 * A run-once batch tool that pages through the assets and streaming
 * locators of a cloud media account, joins them by asset name, resolves
 * each published locator to its streaming manifest, and writes one CSV
 * row per exportable asset.
 */

pub mod auth;
pub mod catalog;
pub mod config;
pub mod error;
pub mod export;
pub mod logging;
pub mod output;

// Re-export commonly used types
pub use catalog::{Asset, CatalogClient, Page, StreamingLocator};
pub use config::{ErrorPolicy, ExportConfig, ManifestMode};
pub use error::{ExportError, Result};
pub use export::{run_export, AssetRow, Exporter, ExportStats};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
