use super::types::{Catalog, Category, ContentItem};
use crate::error::LoopMirrorError;
use crate::feed::{FeedClient, FeedDocument, Manifest, PackageEntry};
use crate::selection::Selection;
use url::Url;

/// Download names starting with this marker point outside the year's
/// content directory.
const PARENT_MARKER: &str = "../";

/// Path segments of content URLs carrying the release year in their last
/// four characters, e.g. `lp10_ms3_content_2016`.
const YEAR_SEGMENT_MARKER: &str = "lp10_ms3";

#[derive(Clone, Copy, Debug)]
pub struct CatalogOptions {
    /// Ask the server for each package's size instead of trusting the feed.
    pub probe_sizes: bool,
}

impl Default for CatalogOptions {
    fn default() -> Self {
        Self { probe_sizes: true }
    }
}

pub async fn build_catalog(
    client: &FeedClient,
    manifest: &Manifest,
    selection: &Selection,
    options: CatalogOptions,
) -> Result<Catalog, LoopMirrorError> {
    let mut catalog = Catalog::new();

    for feed in manifest.feeds(&selection.categories, &selection.years) {
        let document = client.fetch_feed(feed.year, feed.feed_name).await?;
        let added = add_feed_document(
            &mut catalog,
            client,
            feed.year,
            feed.feed_name,
            &document,
            options,
        )
        .await?;
        tracing::info!(
            feed = feed.feed_name,
            year = feed.year,
            packages = document.packages.len(),
            added,
            "Processed feed document"
        );
    }

    if catalog.duplicates() > 0 {
        tracing::debug!(
            duplicates = catalog.duplicates(),
            "Dropped duplicate catalog entries"
        );
    }
    tracing::info!(items = catalog.len(), "Catalog built");
    Ok(catalog)
}

/// Resolves every package of one feed document into the catalog, returning
/// how many new items were added.
pub async fn add_feed_document(
    catalog: &mut Catalog,
    client: &FeedClient,
    year: &str,
    feed_name: &str,
    document: &FeedDocument,
    options: CatalogOptions,
) -> Result<usize, LoopMirrorError> {
    let category =
        Category::from_feed_name(feed_name).ok_or_else(|| LoopMirrorError::Parse {
            source_name: feed_name.to_string(),
            reason: "feed name does not match any known category".to_string(),
        })?;

    let mut added = 0;
    for (package_id, entry) in &document.packages {
        let item = resolve_entry(client, year, category, package_id, entry, options).await?;
        if catalog.insert(item) {
            added += 1;
        }
    }
    Ok(added)
}

async fn resolve_entry(
    client: &FeedClient,
    year: &str,
    category: Category,
    package_id: &str,
    entry: &PackageEntry,
    options: CatalogOptions,
) -> Result<ContentItem, LoopMirrorError> {
    let (name, url) = resolve_download_name(client, year, &entry.download_name)?;

    let year = match year_from_url(&url) {
        Some(url_year) => url_year,
        None => {
            tracing::warn!(%url, year, "No release year in content URL, using the feed's year");
            year.to_string()
        }
    };

    let size = if options.probe_sizes {
        match client.probe_size(&url).await {
            Ok(size) => size,
            Err(err) => {
                tracing::warn!(%url, "{err}, falling back to the declared size");
                declared_size(package_id, entry)?
            }
        }
    } else {
        declared_size(package_id, entry)?
    };

    Ok(ContentItem {
        name,
        url,
        mandatory: entry.is_mandatory.unwrap_or(false),
        size,
        year,
        category,
    })
}

/// Computes the item name and download URL for a feed's `DownloadName`.
pub fn resolve_download_name(
    client: &FeedClient,
    year: &str,
    download_name: &str,
) -> Result<(String, String), LoopMirrorError> {
    let (relative, url) = match download_name.strip_prefix(PARENT_MARKER) {
        Some(relative) => (relative, client.root_url(relative)),
        None => (download_name, client.year_url(year, download_name)),
    };
    let name = final_component(relative).ok_or_else(|| LoopMirrorError::Parse {
        source_name: download_name.to_string(),
        reason: "DownloadName does not end in a file name".to_string(),
    })?;
    Ok((name, url))
}

fn final_component(path: &str) -> Option<String> {
    match path.rsplit('/').next() {
        None | Some("") | Some(".") | Some("..") => None,
        Some(name) => Some(name.to_string()),
    }
}

/// Extracts the release year from the content directory segment of a URL.
pub fn year_from_url(url: &str) -> Option<String> {
    let url = Url::parse(url).ok()?;
    let segment = url
        .path_segments()?
        .find(|segment| segment.contains(YEAR_SEGMENT_MARKER))?;
    let split_at = segment.char_indices().rev().nth(3)?.0;
    Some(segment[split_at..].to_string())
}

fn declared_size(package_id: &str, entry: &PackageEntry) -> Result<u64, LoopMirrorError> {
    entry
        .download_size
        .as_ref()
        .and_then(|size| size.to_bytes())
        .ok_or_else(|| LoopMirrorError::Parse {
            source_name: package_id.to_string(),
            reason: format!("unusable DownloadSize {:?}", entry.download_size),
        })
}
