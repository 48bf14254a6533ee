//! Release metadata resolution.
//!
//! Queries a GitHub-style releases endpoint
//! (`GET .../releases/latest`) and decodes the response into a [`Release`].
//! The resolver makes exactly one request and does not retry; a transient
//! failure surfaces immediately and the user can simply re-run the command.

use serde::Deserialize;
use tracing::debug;

use crate::core::UpgradeError;

/// Parsed metadata for one published release.
///
/// Immutable once decoded; created per upgrade invocation and discarded
/// after use.
#[derive(Debug, Clone, Deserialize)]
pub struct Release {
    /// The release tag, e.g. `v1.2.0`
    pub tag_name: String,
    /// Downloadable assets attached to the release, in published order
    pub assets: Vec<ReleaseAsset>,
}

/// One downloadable file attached to a release.
#[derive(Debug, Clone, Deserialize)]
pub struct ReleaseAsset {
    /// Asset filename, unique within a release's asset list
    pub name: String,
    /// Direct download URL for the asset bytes
    pub browser_download_url: String,
}

/// Fetches the latest release descriptor from a releases endpoint.
pub struct ReleaseResolver<'a> {
    client: &'a reqwest::Client,
    endpoint: &'a str,
}

impl<'a> ReleaseResolver<'a> {
    /// Create a resolver against the given endpoint URL.
    #[must_use]
    pub fn new(client: &'a reqwest::Client, endpoint: &'a str) -> Self {
        Self { client, endpoint }
    }

    /// Fetch and decode the latest release.
    ///
    /// # Errors
    ///
    /// - [`UpgradeError::Network`] on transport failure
    /// - [`UpgradeError::UnexpectedStatus`] on a non-200 response
    /// - [`UpgradeError::MalformedResponse`] when the body does not decode
    ///   into the expected release shape
    pub async fn fetch_latest(&self) -> Result<Release, UpgradeError> {
        debug!("fetching latest release from {}", self.endpoint);

        let response =
            self.client.get(self.endpoint).send().await.map_err(|source| {
                UpgradeError::Network { url: self.endpoint.to_string(), source }
            })?;

        let status = response.status();
        if status.as_u16() != 200 {
            return Err(UpgradeError::UnexpectedStatus { status: status.as_u16() });
        }

        let body = response.text().await.map_err(|source| UpgradeError::Network {
            url: self.endpoint.to_string(),
            source,
        })?;

        let release: Release = serde_json::from_str(&body)
            .map_err(|source| UpgradeError::MalformedResponse { source })?;

        debug!(tag = %release.tag_name, assets = release.assets.len(), "resolved latest release");
        Ok(release)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn release_decodes_from_github_shape() {
        let json = r#"{
            "tag_name": "v2.0.0",
            "name": "Release 2.0.0",
            "prerelease": false,
            "assets": [
                {
                    "name": "loft_Linux_x86_64.tar.gz",
                    "browser_download_url": "https://example.com/loft_Linux_x86_64.tar.gz",
                    "size": 123456
                }
            ]
        }"#;
        let release: Release = serde_json::from_str(json).unwrap();
        assert_eq!(release.tag_name, "v2.0.0");
        assert_eq!(release.assets.len(), 1);
        assert_eq!(release.assets[0].name, "loft_Linux_x86_64.tar.gz");
    }

    #[test]
    fn release_with_missing_fields_is_rejected() {
        let json = r#"{"message": "Not Found"}"#;
        assert!(serde_json::from_str::<Release>(json).is_err());
    }

    #[test]
    fn asset_order_is_preserved() {
        let json = r#"{
            "tag_name": "v1.0.0",
            "assets": [
                {"name": "b", "browser_download_url": "https://example.com/b"},
                {"name": "a", "browser_download_url": "https://example.com/a"}
            ]
        }"#;
        let release: Release = serde_json::from_str(json).unwrap();
        assert_eq!(release.assets[0].name, "b");
        assert_eq!(release.assets[1].name, "a");
    }
}
