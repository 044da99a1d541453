//! Catalog loading from files, strings and HTTP URLs.

use std::path::Path;

use serde_json::Value;
use tracing::debug;

use crate::catalog::Catalog;
use crate::error::LoadError;

#[cfg(feature = "remote")]
use std::time::Duration;

/// Default timeout for HTTP requests (10 seconds).
#[cfg(feature = "remote")]
const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Load a JSON document from a file path.
///
/// # Errors
///
/// Returns `LoadError::FileNotFound` if the file doesn't exist,
/// or `LoadError::InvalidJson` if the file isn't valid JSON.
pub fn load_json(path: &Path) -> Result<Value, LoadError> {
    if !path.exists() {
        return Err(LoadError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let content = std::fs::read_to_string(path).map_err(|source| LoadError::ReadError {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_str(&content).map_err(|source| LoadError::InvalidJson { source })
}

/// Load a catalog document from a file path.
pub fn load_catalog(path: &Path) -> Result<Catalog, LoadError> {
    debug!(path = %path.display(), "loading catalog");
    let document = load_json(path)?;
    Ok(Catalog::from_document(&document)?)
}

/// Load a catalog document from a JSON string.
///
/// # Errors
///
/// Returns `LoadError::InvalidJson` if the string isn't valid JSON, or
/// `LoadError::Schema` if the document doesn't describe a valid catalog.
pub fn load_catalog_str(content: &str) -> Result<Catalog, LoadError> {
    let document: Value =
        serde_json::from_str(content).map_err(|source| LoadError::InvalidJson { source })?;
    Ok(Catalog::from_document(&document)?)
}

/// Load a catalog document from an HTTP/HTTPS URL.
///
/// Requires the `remote` feature (enabled by default).
///
/// # Errors
///
/// Returns `LoadError::NetworkError` if the request fails or the body
/// isn't valid JSON.
#[cfg(feature = "remote")]
pub fn load_catalog_url(url: &str) -> Result<Catalog, LoadError> {
    debug!(url, "fetching catalog");
    let network = |source: reqwest::Error| LoadError::NetworkError {
        url: url.to_string(),
        source,
    };

    let client = reqwest::blocking::Client::builder()
        .timeout(HTTP_TIMEOUT)
        .build()
        .map_err(network)?;

    // Check for HTTP errors before parsing
    let document: Value = client
        .get(url)
        .send()
        .and_then(|response| response.error_for_status())
        .and_then(|response| response.json())
        .map_err(network)?;

    Ok(Catalog::from_document(&document)?)
}

/// Check if a string looks like a URL (starts with http:// or https://).
pub fn is_url(s: &str) -> bool {
    s.starts_with("http://") || s.starts_with("https://")
}

/// Load a catalog from a file path or, with the `remote` feature, a URL.
pub fn load_catalog_auto(source: &str) -> Result<Catalog, LoadError> {
    if is_url(source) {
        #[cfg(feature = "remote")]
        {
            load_catalog_url(source)
        }
        #[cfg(not(feature = "remote"))]
        {
            Err(LoadError::FileNotFound {
                path: std::path::PathBuf::from(source),
            })
        }
    } else {
        load_catalog(Path::new(source))
    }
}
