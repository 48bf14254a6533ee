//! Streaming asset download.
//!
//! Writes the response body to the destination chunk by chunk so a release
//! archive is never buffered whole in memory. The destination lives inside
//! the invocation's scoped temp directory, so there is no pre-existing data
//! to clobber.

use std::path::Path;

use futures::StreamExt;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::core::UpgradeError;

/// Stream the asset at `url` into `dest`.
///
/// # Errors
///
/// - [`UpgradeError::Network`] on transport failure (initial request or
///   mid-stream)
/// - [`UpgradeError::UnexpectedStatus`] on a non-200 response
/// - [`UpgradeError::Io`] if the destination cannot be created or written
pub async fn download(
    client: &reqwest::Client,
    url: &str,
    dest: &Path,
) -> Result<(), UpgradeError> {
    debug!("downloading {} to {}", url, dest.display());

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|source| UpgradeError::Network { url: url.to_string(), source })?;

    let status = response.status();
    if status.as_u16() != 200 {
        return Err(UpgradeError::UnexpectedStatus { status: status.as_u16() });
    }

    let mut file = tokio::fs::File::create(dest).await?;
    let mut stream = response.bytes_stream();
    let mut written: u64 = 0;

    while let Some(chunk) = stream.next().await {
        let chunk =
            chunk.map_err(|source| UpgradeError::Network { url: url.to_string(), source })?;
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }

    file.flush().await?;
    debug!("downloaded {} bytes", written);
    Ok(())
}
