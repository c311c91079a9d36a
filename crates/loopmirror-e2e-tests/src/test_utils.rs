use eyre::Result;
use loopmirror_lib::catalog::Category;
use loopmirror_lib::cli::{RunOverrides, resolve_run_params};
use loopmirror_lib::config::{Config, PacingConfig};
use loopmirror_lib::run::RunParams;
use loopmirror_lib::transfer::{ProgressEvent, ProgressReporter};
use plist::{Dictionary, Value};
use std::collections::BTreeMap;
use std::path::Path;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const MANIFEST_PATH: &str = "/feeds.plist";

#[derive(Clone, Copy, Debug)]
pub enum PlistEncoding {
    Xml,
    Binary,
}

/// One package entry of a mocked feed document.
#[derive(Clone, Debug)]
pub struct TestPackage {
    pub id: &'static str,
    pub download_name: &'static str,
    pub is_mandatory: Option<bool>,
    pub declared_size: &'static str,
}

pub fn encode_plist(value: &Value, encoding: PlistEncoding) -> Vec<u8> {
    let mut buffer = Vec::new();
    match encoding {
        PlistEncoding::Xml => value.to_writer_xml(&mut buffer),
        PlistEncoding::Binary => value.to_writer_binary(&mut buffer),
    }
    .expect("plist encoding should not fail");
    buffer
}

/// Builds a manifest from `(category, year, feed name)` triples, keeping the
/// order of feeds within a year.
pub fn manifest_plist(feeds: &[(Category, &str, &str)], encoding: PlistEncoding) -> Vec<u8> {
    let mut by_category: BTreeMap<String, BTreeMap<String, Vec<Value>>> = BTreeMap::new();
    for (category, year, feed_name) in feeds {
        by_category
            .entry(category.to_string())
            .or_default()
            .entry(year.to_string())
            .or_default()
            .push(Value::String(feed_name.to_string()));
    }

    let mut root = Dictionary::new();
    for (category, by_year) in by_category {
        let mut years = Dictionary::new();
        for (year, feed_names) in by_year {
            years.insert(year, Value::Array(feed_names));
        }
        root.insert(category, Value::Dictionary(years));
    }
    encode_plist(&Value::Dictionary(root), encoding)
}

pub fn feed_plist(packages: &[TestPackage], encoding: PlistEncoding) -> Vec<u8> {
    let mut entries = Dictionary::new();
    for package in packages {
        let mut entry = Dictionary::new();
        entry.insert(
            "DownloadName".to_string(),
            Value::String(package.download_name.to_string()),
        );
        entry.insert(
            "DownloadSize".to_string(),
            Value::String(package.declared_size.to_string()),
        );
        if let Some(is_mandatory) = package.is_mandatory {
            entry.insert("IsMandatory".to_string(), Value::Boolean(is_mandatory));
        }
        entries.insert(package.id.to_string(), Value::Dictionary(entry));
    }

    let mut root = Dictionary::new();
    root.insert("Packages".to_string(), Value::Dictionary(entries));
    encode_plist(&Value::Dictionary(root), encoding)
}

pub async fn mount_manifest(server: &MockServer, body: Vec<u8>) {
    Mock::given(method("GET"))
        .and(path(MANIFEST_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body))
        .mount(server)
        .await;
}

pub async fn mount_feed(server: &MockServer, year: &str, feed_name: &str, body: Vec<u8>) {
    Mock::given(method("GET"))
        .and(path(format!("/lp10_ms3_content_{year}/{feed_name}")))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body))
        .mount(server)
        .await;
}

/// Serves `len` bytes of content at `url_path` for both GET and HEAD.
pub async fn mount_content(server: &MockServer, url_path: &str, len: usize) {
    for verb in ["GET", "HEAD"] {
        Mock::given(method(verb))
            .and(path(url_path))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(content_bytes(len)))
            .mount(server)
            .await;
    }
}

pub fn content_bytes(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}

/// A config pointing at the mock server, with pacing disabled.
pub fn create_test_config(server: &MockServer, destination: &Path, dry_run: bool) -> Config {
    Config {
        manifest_url: format!("{}{MANIFEST_PATH}", server.uri()),
        content_root: format!("{}/", server.uri()),
        destination: destination.to_path_buf(),
        categories: vec![Category::GarageBand, Category::LogicPro],
        years: vec!["2015".to_string(), "2016".to_string()],
        dry_run: Some(dry_run),
        pacing: PacingConfig::NONE,
        ..Config::default()
    }
}

pub fn create_run_params(
    server: &MockServer,
    destination: &Path,
    dry_run: bool,
    overrides: RunOverrides,
) -> RunParams {
    resolve_run_params(create_test_config(server, destination, dry_run), overrides)
        .expect("test config should resolve")
}

/// Writes a JSON config for the mock server into a fresh temporary directory.
pub fn setup_test_environment(server: &MockServer, dry_run: bool) -> Result<TempDir> {
    let temp_dir = tempfile::tempdir()?;

    let destination = temp_dir.path().join("mirror");
    let config = create_test_config(server, &destination, dry_run);
    let config_path = temp_dir.path().join("config.json");
    std::fs::write(&config_path, serde_json::to_string_pretty(&config)?)?;

    Ok(temp_dir)
}

/// Keeps every progress event for later inspection.
#[derive(Debug, Default)]
pub struct RecordingReporter {
    pub started: Vec<(String, u64)>,
    pub chunks: Vec<(String, u64, f64)>,
    pub finished: Vec<(String, u64)>,
}

impl RecordingReporter {
    pub fn percents_for(&self, name: &str) -> Vec<f64> {
        self.chunks
            .iter()
            .filter(|(chunk_name, _, _)| chunk_name == name)
            .map(|(_, _, percent)| *percent)
            .collect()
    }
}

impl ProgressReporter for RecordingReporter {
    fn on_event(&mut self, event: ProgressEvent<'_>) {
        match event {
            ProgressEvent::Started { name, total } => self.started.push((name.to_string(), total)),
            ProgressEvent::Chunk {
                name,
                bytes_so_far,
                percent,
                ..
            } => self.chunks.push((name.to_string(), bytes_so_far, percent)),
            ProgressEvent::Finished { name, bytes } => {
                self.finished.push((name.to_string(), bytes))
            }
        }
    }
}

pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter("loopmirror_lib=debug,loopmirror_e2e_tests=debug")
        .with_test_writer()
        .try_init()
        .ok();
}
