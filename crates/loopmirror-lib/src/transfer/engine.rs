use super::progress::{ProgressEvent, ProgressReporter, percent};
use crate::catalog::ContentItem;
use crate::config::PacingConfig;
use crate::error::LoopMirrorError;
use crate::feed::FeedClient;
use crate::utils::format_size;
use futures::StreamExt;
use std::path::Path;
use tokio::io::AsyncWriteExt;

/// Upper bound on the amount of data written between two progress updates.
pub const CHUNK_SIZE: usize = 8192;

#[derive(Clone, Copy, Debug)]
pub struct TransferOptions {
    pub dry_run: bool,
    pub pacing: PacingConfig,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TransferResult {
    /// Bytes written, or the declared size when nothing was transferred.
    pub bytes_transferred: u64,
    /// True when the transfer was only simulated.
    pub skipped: bool,
}

pub async fn transfer<R>(
    client: &FeedClient,
    item: &ContentItem,
    local_path: &Path,
    options: &TransferOptions,
    reporter: &mut R,
) -> Result<TransferResult, LoopMirrorError>
where
    R: ProgressReporter + ?Sized,
{
    if options.dry_run {
        tracing::info!(
            url = %item.url,
            output = %local_path.display(),
            size = %format_size(item.size),
            "Dry run, would download"
        );
        return Ok(TransferResult {
            bytes_transferred: item.size,
            skipped: true,
        });
    }

    if let Some(parent) = local_path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| LoopMirrorError::filesystem(parent, e))?;
    }

    let response = client
        .http()
        .get(&item.url)
        .send()
        .await
        .and_then(reqwest::Response::error_for_status)
        .map_err(|e| LoopMirrorError::fetch(&item.url, e))?;

    let file = tokio::fs::File::create(local_path)
        .await
        .map_err(|e| LoopMirrorError::filesystem(local_path, e))?;
    let mut writer = tokio::io::BufWriter::new(file);

    reporter.on_event(ProgressEvent::Started {
        name: &item.name,
        total: item.size,
    });

    let mut bytes_so_far = 0u64;
    let mut body = response.bytes_stream();
    while let Some(chunk) = body.next().await {
        let chunk = chunk.map_err(|e| LoopMirrorError::fetch(&item.url, e))?;
        for piece in chunk.chunks(CHUNK_SIZE) {
            writer
                .write_all(piece)
                .await
                .map_err(|e| LoopMirrorError::filesystem(local_path, e))?;
            bytes_so_far += piece.len() as u64;
            reporter.on_event(ProgressEvent::Chunk {
                name: &item.name,
                bytes_so_far,
                total: item.size,
                percent: percent(bytes_so_far, item.size),
            });
        }
    }

    writer
        .flush()
        .await
        .map_err(|e| LoopMirrorError::filesystem(local_path, e))?;
    writer
        .into_inner()
        .sync_all()
        .await
        .map_err(|e| LoopMirrorError::filesystem(local_path, e))?;

    reporter.on_event(ProgressEvent::Finished {
        name: &item.name,
        bytes: bytes_so_far,
    });

    let pause = options.pacing.sample();
    if !pause.is_zero() {
        tracing::trace!(?pause, "Pausing before the next request");
        tokio::time::sleep(pause).await;
    }

    Ok(TransferResult {
        bytes_transferred: bytes_so_far,
        skipped: false,
    })
}
