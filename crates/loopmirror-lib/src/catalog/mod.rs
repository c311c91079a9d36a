mod builder;
mod types;

pub use builder::{
    CatalogOptions, add_feed_document, build_catalog, resolve_download_name, year_from_url,
};
pub use types::{Catalog, Category, ContentItem};
