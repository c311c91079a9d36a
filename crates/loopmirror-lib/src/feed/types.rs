use crate::catalog::Category;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Top-level document: `category -> year -> feed document names`.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct Manifest(pub BTreeMap<String, BTreeMap<String, Vec<String>>>);

/// One feed document the catalog builder has to fetch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FeedRef<'a> {
    pub category: Category,
    pub year: &'a str,
    pub feed_name: &'a str,
}

impl Manifest {
    /// Yields every feed document listed for the given categories and years.
    ///
    /// An empty filter slice does not restrict that dimension. Category keys
    /// that do not name a known category are skipped.
    pub fn feeds<'a>(
        &'a self,
        categories: &'a [Category],
        years: &'a [String],
    ) -> impl Iterator<Item = FeedRef<'a>> + 'a {
        self.0
            .iter()
            .filter_map(|(key, by_year)| match key.parse::<Category>() {
                Ok(category) => Some((category, by_year)),
                Err(_) => {
                    tracing::debug!(category = %key, "Ignoring unknown manifest category");
                    None
                }
            })
            .filter(move |(category, _)| categories.is_empty() || categories.contains(category))
            .flat_map(move |(category, by_year)| {
                by_year
                    .iter()
                    .filter(move |(year, _)| years.is_empty() || years.contains(*year))
                    .flat_map(move |(year, feed_names)| {
                        feed_names.iter().map(move |feed_name| FeedRef {
                            category,
                            year: year.as_str(),
                            feed_name: feed_name.as_str(),
                        })
                    })
            })
    }
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct FeedDocument {
    #[serde(rename = "Packages", default)]
    pub packages: BTreeMap<String, PackageEntry>,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct PackageEntry {
    #[serde(rename = "DownloadName")]
    pub download_name: String,
    #[serde(rename = "IsMandatory", default)]
    pub is_mandatory: Option<bool>,
    #[serde(rename = "DownloadSize", default)]
    pub download_size: Option<DeclaredSize>,
}

/// Size as written in a feed document. Older feeds store it as a formatted
/// string (`"1,234,567"`), newer ones as an integer.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(untagged)]
pub enum DeclaredSize {
    Integer(u64),
    Real(f64),
    Text(String),
}

impl DeclaredSize {
    /// Normalizes the declared size, dropping every non-digit character.
    pub fn to_bytes(&self) -> Option<u64> {
        match self {
            Self::Integer(value) => Some(*value),
            Self::Real(value) if value.is_finite() && *value >= 0.0 => Some(value.trunc() as u64),
            Self::Real(_) => None,
            Self::Text(text) => {
                let digits: String = text.chars().filter(char::is_ascii_digit).collect();
                digits.parse().ok()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_manifest() -> Manifest {
        let mut manifest = Manifest::default();
        manifest.0.insert(
            "garageband".to_string(),
            BTreeMap::from([
                ("2015".to_string(), vec!["garageband1010.plist".to_string()]),
                (
                    "2016".to_string(),
                    vec![
                        "garageband1012.plist".to_string(),
                        "garageband1011.plist".to_string(),
                    ],
                ),
            ]),
        );
        manifest.0.insert(
            "logicpro".to_string(),
            BTreeMap::from([("2016".to_string(), vec!["logicpro1023.plist".to_string()])]),
        );
        manifest.0.insert(
            "soundtrackpro".to_string(),
            BTreeMap::from([("2016".to_string(), vec!["stp1.plist".to_string()])]),
        );
        manifest
    }

    #[test]
    fn test_manifest_feeds_filters_category_and_year() {
        let manifest = sample_manifest();
        let categories = [Category::GarageBand];
        let years = ["2016".to_string()];

        let feeds: Vec<_> = manifest
            .feeds(&categories, &years)
            .map(|feed| feed.feed_name)
            .collect();

        assert_eq!(feeds, vec!["garageband1012.plist", "garageband1011.plist"]);
    }

    #[test]
    fn test_manifest_feeds_empty_filters_yield_all_known_categories() {
        let manifest = sample_manifest();

        let feeds: Vec<_> = manifest.feeds(&[], &[]).collect();

        assert_eq!(feeds.len(), 4);
        assert!(feeds.iter().all(|feed| feed.feed_name != "stp1.plist"));
    }

    #[test]
    fn test_declared_size_strips_punctuation() {
        assert_eq!(
            DeclaredSize::Text("1,234,567".to_string()).to_bytes(),
            Some(1_234_567)
        );
        assert_eq!(
            DeclaredSize::Text(" 98.765 ".to_string()).to_bytes(),
            Some(98_765)
        );
        assert_eq!(DeclaredSize::Integer(42).to_bytes(), Some(42));
        assert_eq!(DeclaredSize::Text("unknown".to_string()).to_bytes(), None);
    }

    #[test]
    fn test_feed_document_from_xml_plist() {
        let xml = br#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
<plist version="1.0">
<dict>
    <key>Packages</key>
    <dict>
        <key>MAContent10_AssetPack_0001</key>
        <dict>
            <key>DownloadName</key>
            <string>MAContent10_AssetPack_0001_AlchemyPadsDigitalHolyGhost.pkg</string>
            <key>DownloadSize</key>
            <string>2,048</string>
            <key>IsMandatory</key>
            <true/>
        </dict>
        <key>MAContent10_AssetPack_0002</key>
        <dict>
            <key>DownloadName</key>
            <string>../lp10_ms3_content_2013/MAContent10_GarageBandBasicContent.pkg</string>
            <key>DownloadSize</key>
            <integer>4096</integer>
        </dict>
    </dict>
</dict>
</plist>"#;

        let document: FeedDocument = plist::from_bytes(xml).unwrap();

        assert_eq!(document.packages.len(), 2);
        let first = &document.packages["MAContent10_AssetPack_0001"];
        assert_eq!(first.is_mandatory, Some(true));
        assert_eq!(
            first.download_size.as_ref().and_then(DeclaredSize::to_bytes),
            Some(2048)
        );
        let second = &document.packages["MAContent10_AssetPack_0002"];
        assert_eq!(second.is_mandatory, None);
        assert_eq!(
            second.download_size.as_ref().and_then(DeclaredSize::to_bytes),
            Some(4096)
        );
    }
}
