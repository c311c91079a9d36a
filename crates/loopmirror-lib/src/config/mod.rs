mod loader;
mod model;

pub use loader::{ENV_PREFIX, load_config};
pub use model::{
    Config, DEFAULT_CONTENT_ROOT, DEFAULT_MANIFEST_URL, DEFAULT_YEAR, FailurePolicy, PacingConfig,
};
