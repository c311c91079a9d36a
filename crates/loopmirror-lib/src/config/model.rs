use crate::catalog::Category;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_MANIFEST_URL: &str = "https://raw.githubusercontent.com/carlashley/appleLoops/master/com.github.carlashley.appleLoops.feeds.plist";
pub const DEFAULT_CONTENT_ROOT: &str = "http://audiocontentdownload.apple.com/";
pub const DEFAULT_YEAR: &str = "2016";

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields, default)]
pub struct Config {
    pub manifest_url: String,
    pub content_root: String,
    pub destination: PathBuf,
    pub categories: Vec<Category>,
    pub years: Vec<String>,
    pub mandatory_only: bool,
    pub optional_only: bool,
    /// Left unset on purpose: every run has to state whether it is a dry run.
    pub dry_run: Option<bool>,
    pub probe_sizes: bool,
    pub pacing: PacingConfig,
    pub failure_policy: FailurePolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            manifest_url: DEFAULT_MANIFEST_URL.to_string(),
            content_root: DEFAULT_CONTENT_ROOT.to_string(),
            destination: std::env::temp_dir().join("loopmirror"),
            categories: vec![Category::GarageBand],
            years: vec![DEFAULT_YEAR.to_string()],
            mandatory_only: false,
            optional_only: false,
            dry_run: None,
            probe_sizes: true,
            pacing: PacingConfig::default(),
            failure_policy: FailurePolicy::default(),
        }
    }
}

/// Bounds of the randomized pause taken after every completed transfer.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields, default)]
pub struct PacingConfig {
    pub min_ms: u64,
    pub max_ms: u64,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            min_ms: 1000,
            max_ms: 5000,
        }
    }
}

impl PacingConfig {
    pub const NONE: Self = Self {
        min_ms: 0,
        max_ms: 0,
    };

    pub fn range(&self) -> RangeInclusive<u64> {
        self.min_ms..=self.max_ms
    }

    pub fn sample(&self) -> Duration {
        use rand::Rng;

        if self.max_ms <= self.min_ms {
            return Duration::from_millis(self.min_ms);
        }
        Duration::from_millis(rand::rng().random_range(self.range()))
    }
}

/// What the run does when a single item cannot be probed or transferred.
#[derive(
    Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Stop the run and return the error.
    #[default]
    Abort,
    /// Log the failure, count it and move on to the next item.
    Continue,
}
