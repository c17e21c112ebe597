//! Turning a build listing page into an ordered catalog of [`BuildRecord`]s
//!
//! A listing page carries two independent pieces of information: the archive links (in `href`
//! attributes) and the upload times (only in the visible text next to each link). Both are
//! scraped separately and joined on the archive filename.

use chrono::NaiveDateTime;
use lol_html::{doc_text, element, HtmlRewriter, Settings};
use reqwest::Url;
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, warn};

use super::pattern::BuildPattern;
use crate::error::{Error, Result};

/// Format of the upload times shown in the listing
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Base name of a build archive as it appears in the listing
///
/// Used as the join key between links and upload times.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ArchiveName(String);

impl ArchiveName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ArchiveName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One downloadable build from the listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildRecord {
    pub build_number: u32,
    pub version: String,
    pub filename: ArchiveName,
    pub uri: String,
    /// `None` when the listing text had no upload time for this file
    pub released: Option<NaiveDateTime>,
}

impl BuildRecord {
    pub fn released_label(&self) -> String {
        match self.released {
            Some(at) => at.format(TIMESTAMP_FORMAT).to_string(),
            None => "at an unknown time".to_string(),
        }
    }
}

/// Parse a listing page into build records, most recently released first.
///
/// Records with equal upload times (including records with none) keep their document order.
/// Links that do not match `pattern` are ignored, so a page without any builds yields an
/// empty catalog. Links are resolved against `base_uri`, the address the page was served from.
pub fn parse_listing(html: &str, base_uri: &str, pattern: &BuildPattern) -> Result<Vec<BuildRecord>> {
    let base = Url::parse(base_uri)
        .map_err(|e| Error::Parse(format!("Invalid listing address {}: {}", base_uri, e)))?;
    let (hrefs, text) = scan_document(html)?;
    let released = parse_release_dates(&text, pattern)?;

    let mut records = Vec::new();
    for href in hrefs {
        let Some(m) = pattern.match_archive(&href) else {
            debug!("Skipping link {}", href);
            continue;
        };

        let build_number = m.build.parse::<u32>().map_err(|e| {
            Error::Parse(format!("Could not convert {} to a build number: {}", m.build, e))
        })?;
        if build_number == 0 {
            warn!("Skipping {}: build numbers start at 1", href);
            continue;
        }

        let filename = ArchiveName::new(href.as_str());
        let released_at = released.get(&filename).copied();
        if released_at.is_none() {
            warn!("No upload time found for {}", filename);
        }

        records.push(BuildRecord {
            build_number,
            version: m.version.to_string(),
            uri: join_uri(&base, &href)?,
            filename,
            released: released_at,
        });
    }

    // `sort_by` is stable, and `None` orders below every timestamp.
    records.sort_by(|a, b| b.released.cmp(&a.released));
    Ok(records)
}

/// Collect every `<a href>` target in document order plus the concatenated document text
fn scan_document(html: &str) -> Result<(Vec<String>, String)> {
    let mut hrefs = Vec::new();
    let mut text = String::new();

    {
        let mut rewriter = HtmlRewriter::new(
            Settings {
                element_content_handlers: vec![element!("a[href]", |el| {
                    if let Some(href) = el.get_attribute("href") {
                        hrefs.push(href);
                    }
                    Ok(())
                })],
                document_content_handlers: vec![doc_text!(|chunk| {
                    text.push_str(chunk.as_str());
                    Ok(())
                })],
                ..Settings::new()
            },
            |_: &[u8]| {},
        );

        rewriter
            .write(html.as_bytes())
            .map_err(|e| Error::Parse(format!("Malformed HTML: {}", e)))?;
        rewriter
            .end()
            .map_err(|e| Error::Parse(format!("Malformed HTML: {}", e)))?;
    }

    Ok((hrefs, text))
}

fn parse_release_dates(
    text: &str,
    pattern: &BuildPattern,
) -> Result<HashMap<ArchiveName, NaiveDateTime>> {
    let mut dates = HashMap::new();
    for (name, stamp) in pattern.dated_entries(text) {
        let at = NaiveDateTime::parse_from_str(stamp, TIMESTAMP_FORMAT).map_err(|e| {
            Error::Parse(format!(
                "Could not parse the date for the file {} from text ({}): {}",
                name, stamp, e
            ))
        })?;
        dates.insert(ArchiveName::new(name), at);
    }
    Ok(dates)
}

/// Resolve `href` the way a browser would on the page at `base`
fn join_uri(base: &Url, href: &str) -> Result<String> {
    base.join(href)
        .map(String::from)
        .map_err(|e| Error::Parse(format!("Could not resolve the link {}: {}", href, e)))
}
