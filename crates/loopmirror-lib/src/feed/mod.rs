mod client;
mod types;

pub use client::{CONTENT_DIR_PREFIX, FeedClient, USER_AGENT};
pub use types::{DeclaredSize, FeedDocument, FeedRef, Manifest, PackageEntry};
