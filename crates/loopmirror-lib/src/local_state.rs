//! Decides whether a previously mirrored file can stand in for a remote item.
//!
//! Sizes are compared in whole filesystem allocation blocks rather than in
//! bytes. This tolerates storage-layer padding, at the cost of treating a
//! file truncated within its last block as complete.

use crate::catalog::ContentItem;
use crate::error::LoopMirrorError;
use std::fs::Metadata;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

const FALLBACK_BLOCK_SIZE: u64 = 4096;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProbeOutcome {
    Complete,
    NeedsDownload,
}

/// `destination/category/year/{mandatory|optional}/name`
pub fn local_path(destination: &Path, item: &ContentItem) -> PathBuf {
    destination
        .join(item.category.as_str())
        .join(&item.year)
        .join(item.mandatory_dir())
        .join(&item.name)
}

pub fn probe(item: &ContentItem, local_path: &Path) -> Result<ProbeOutcome, LoopMirrorError> {
    let metadata = match std::fs::metadata(local_path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(ProbeOutcome::NeedsDownload),
        Err(e) => return Err(LoopMirrorError::filesystem(local_path, e)),
    };

    let block_size = block_size(&metadata);
    let outcome = compare_blocks(item.size, metadata.len(), block_size);
    tracing::trace!(
        path = %local_path.display(),
        remote_size = item.size,
        local_size = metadata.len(),
        block_size,
        ?outcome,
        "Probed local copy"
    );
    Ok(outcome)
}

pub fn compare_blocks(remote_size: u64, local_size: u64, block_size: u64) -> ProbeOutcome {
    let block_size = block_size.max(1);
    if local_size / block_size >= remote_size / block_size {
        ProbeOutcome::Complete
    } else {
        ProbeOutcome::NeedsDownload
    }
}

#[cfg(unix)]
fn block_size(metadata: &Metadata) -> u64 {
    use std::os::unix::fs::MetadataExt;

    match metadata.blksize() {
        0 => FALLBACK_BLOCK_SIZE,
        size => size,
    }
}

#[cfg(not(unix))]
fn block_size(_metadata: &Metadata) -> u64 {
    FALLBACK_BLOCK_SIZE
}
