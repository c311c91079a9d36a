use crate::catalog::{Catalog, CatalogOptions, ContentItem, build_catalog};
use crate::config::{FailurePolicy, PacingConfig};
use crate::error::LoopMirrorError;
use crate::feed::FeedClient;
use crate::local_state::{ProbeOutcome, local_path, probe};
use crate::selection::{Selection, filter};
use crate::transfer::{ProgressReporter, TransferOptions, TransferResult, transfer};
use crate::utils::format_size;
use itertools::Itertools;
use std::path::PathBuf;
use url::Url;

/// Everything a run needs, resolved from the config file and the command line.
#[derive(Debug, Clone)]
pub struct RunParams {
    pub manifest_url: Url,
    pub content_root: Url,
    pub destination: PathBuf,
    pub selection: Selection,
    pub dry_run: bool,
    pub probe_sizes: bool,
    pub pacing: PacingConfig,
    pub failure_policy: FailurePolicy,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    /// Items processed, whatever their outcome
    pub item_count: usize,
    /// Bytes reported by the transfer engine; intended bytes in a dry run
    pub total_bytes: u64,
    pub transferred: usize,
    pub skipped: usize,
    pub failed: usize,
}

#[derive(Debug)]
enum ItemOutcome {
    Skipped,
    Transferred(TransferResult),
}

/// Fetches the manifest and feed documents and returns the selected items.
pub async fn select_items(
    client: &FeedClient,
    params: &RunParams,
) -> Result<Catalog, LoopMirrorError> {
    tracing::info!(
        categories = %params.selection.categories.iter().join(","),
        years = %params.selection.years.iter().join(","),
        exclusivity = ?params.selection.exclusivity,
        "Building catalog"
    );
    let manifest = client.fetch_manifest().await?;
    let catalog = build_catalog(
        client,
        &manifest,
        &params.selection,
        CatalogOptions {
            probe_sizes: params.probe_sizes,
        },
    )
    .await?;

    let selected = filter(&catalog, &params.selection);
    tracing::info!(
        selected = selected.len(),
        catalog = catalog.len(),
        size = %format_size(selected.total_size()),
        "Selected content"
    );
    Ok(selected)
}

pub async fn run_list(params: &RunParams) -> Result<Catalog, LoopMirrorError> {
    let client = FeedClient::new(params.manifest_url.clone(), params.content_root.clone())?;
    let selected = select_items(&client, params).await?;

    for item in &selected {
        tracing::info!(
            category = %item.category,
            year = %item.year,
            kind = item.mandatory_dir(),
            size = %format_size(item.size),
            "{}",
            item.name
        );
    }
    Ok(selected)
}

pub async fn run_sync<R>(params: &RunParams, reporter: &mut R) -> Result<Summary, LoopMirrorError>
where
    R: ProgressReporter + ?Sized,
{
    let client = FeedClient::new(params.manifest_url.clone(), params.content_root.clone())?;
    let selected = select_items(&client, params).await?;
    let options = TransferOptions {
        dry_run: params.dry_run,
        pacing: params.pacing,
    };

    let mut summary = Summary::default();
    for item in &selected {
        summary.item_count += 1;
        match process_item(&client, params, item, &options, reporter).await {
            Ok(ItemOutcome::Skipped) => summary.skipped += 1,
            Ok(ItemOutcome::Transferred(result)) => {
                summary.transferred += 1;
                summary.total_bytes += result.bytes_transferred;
            }
            Err(err) => match params.failure_policy {
                FailurePolicy::Abort => {
                    tracing::error!(name = %item.name, "Aborting run: {err}");
                    return Err(err);
                }
                FailurePolicy::Continue => {
                    tracing::warn!(name = %item.name, "Failed, continuing: {err}");
                    summary.failed += 1;
                }
            },
        }
    }

    tracing::info!(
        skipped = summary.skipped,
        failed = summary.failed,
        "{} {} items, {}",
        if params.dry_run { "Would process" } else { "Processed" },
        summary.item_count,
        format_size(summary.total_bytes)
    );
    Ok(summary)
}

async fn process_item<R>(
    client: &FeedClient,
    params: &RunParams,
    item: &ContentItem,
    options: &TransferOptions,
    reporter: &mut R,
) -> Result<ItemOutcome, LoopMirrorError>
where
    R: ProgressReporter + ?Sized,
{
    let path = local_path(&params.destination, item);
    match probe(item, &path)? {
        ProbeOutcome::Complete => {
            tracing::info!(output = %path.display(), "Skipping, already downloaded");
            Ok(ItemOutcome::Skipped)
        }
        ProbeOutcome::NeedsDownload => {
            let result = transfer(client, item, &path, options, reporter).await?;
            Ok(ItemOutcome::Transferred(result))
        }
    }
}
