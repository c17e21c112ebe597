use reqwest::blocking::{Client, Response};
use reqwest::header::{HeaderValue, CONNECTION};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

use super::catalog::{parse_listing, BuildRecord};
use super::pattern::BuildPattern;
use crate::error::{Error, Result};
use crate::ui::Ui;

/// Default listing of Linux tiles builds
pub const DEFAULT_LISTING_URI: &str =
    "http://dev.narc.ro/cataclysm/jenkins-latest/Linux_x64/Tiles/";

// The build host turns away requests that do not look like a browser.
const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64; rv:121.0) Gecko/20100101 Firefox/121.0";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Blocking client for the build listing and archives
pub struct BuildsClient {
    client: Client,
}

impl BuildsClient {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(CONNECT_TIMEOUT)
            // Archives are large; only the connect step is bounded.
            .timeout(None)
            .build()
            .map_err(Error::Client)?;
        Ok(Self { client })
    }

    /// Wrap an already configured client
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }

    /// Fetch the listing page and parse it into a catalog, most recent build first
    pub fn fetch_catalog(
        &self,
        listing_uri: &str,
        pattern: &BuildPattern,
        ui: &mut impl Ui,
    ) -> Result<Vec<BuildRecord>> {
        ui.log(format!("Getting list of builds from {}", listing_uri));

        let fetch_error = |reason: String| Error::Fetch {
            uri: listing_uri.to_string(),
            reason,
        };

        let response = self
            .client
            .get(listing_uri)
            .send()
            .map_err(|e| fetch_error(e.to_string()))?;
        let response = check_status(response).map_err(fetch_error)?;
        // Links are relative to wherever redirects ended up.
        let served_from = response.url().to_string();
        let body = response.text().map_err(|e| fetch_error(e.to_string()))?;
        debug!("Listing is {} bytes, served from {}", body.len(), served_from);

        let catalog = parse_listing(&body, &served_from, pattern)?;
        info!("Found {} builds at {}", catalog.len(), listing_uri);
        Ok(catalog)
    }

    /// Download a build archive to `dest`, reporting progress as bytes arrive.
    ///
    /// Returns the number of bytes written. The file is synced before returning.
    pub fn download(&self, record: &BuildRecord, dest: &Path, ui: &mut impl Ui) -> Result<u64> {
        let download_error = |reason: String| Error::Download {
            uri: record.uri.clone(),
            reason,
        };

        let response = self
            .client
            .get(&record.uri)
            .header(CONNECTION, HeaderValue::from_static("keep-alive"))
            .send()
            .map_err(|e| download_error(e.to_string()))?;
        let mut response = check_status(response).map_err(download_error)?;

        let total_size = response.content_length().unwrap_or(0);
        debug!("Saving {} ({} bytes) to {:?}", record.uri, total_size, dest);

        let mut file = File::create(dest)
            .map_err(|e| download_error(format!("could not create {:?}: {}", dest, e)))?;

        let mut downloaded: u64 = 0;
        let mut buffer = [0u8; 8192];

        loop {
            let bytes_read = response
                .read(&mut buffer)
                .map_err(|e| download_error(format!("reading the response failed: {}", e)))?;

            if bytes_read == 0 {
                break;
            }

            file.write_all(&buffer[..bytes_read])
                .map_err(|e| download_error(format!("could not write to {:?}: {}", dest, e)))?;

            downloaded += bytes_read as u64;
            ui.set_progress(downloaded, total_size, format_bytes(downloaded, total_size));
        }

        file.sync_all()
            .map_err(|e| download_error(format!("could not flush {:?}: {}", dest, e)))?;

        ui.clear_progress();
        ui.log(format!("Downloaded {}", format_bytes(downloaded, total_size)));
        Ok(downloaded)
    }
}

fn check_status(response: Response) -> std::result::Result<Response, String> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(format!(
            "did not get a 2xx status, got a {} ({}) instead",
            status.as_u16(),
            status.canonical_reason().unwrap_or("unknown status")
        ))
    }
}

/// Format bytes as human-readable string; `total` of 0 means unknown
fn format_bytes(current: u64, total: u64) -> String {
    fn fmt(bytes: u64) -> String {
        if bytes >= 1_000_000_000 {
            format!("{:.1} GB", bytes as f64 / 1_000_000_000.0)
        } else if bytes >= 1_000_000 {
            format!("{:.1} MB", bytes as f64 / 1_000_000.0)
        } else if bytes >= 1_000 {
            format!("{:.1} KB", bytes as f64 / 1_000.0)
        } else {
            format!("{} B", bytes)
        }
    }
    if total == 0 {
        fmt(current)
    } else {
        format!("{} / {}", fmt(current), fmt(total))
    }
}
