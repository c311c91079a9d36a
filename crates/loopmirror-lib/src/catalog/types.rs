use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

#[derive(
    Clone,
    Copy,
    Debug,
    Hash,
    Ord,
    PartialOrd,
    Eq,
    PartialEq,
    Deserialize,
    Serialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[value(name = "garageband")]
    GarageBand,
    #[value(name = "logicpro")]
    LogicPro,
    #[value(name = "mainstage")]
    MainStage,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::GarageBand, Category::LogicPro, Category::MainStage];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::GarageBand => "garageband",
            Category::LogicPro => "logicpro",
            Category::MainStage => "mainstage",
        }
    }

    /// Infers the category from a feed document name such as
    /// `logicpro1000_en.plist` or `garageband1012.plist`.
    pub fn from_feed_name(feed_name: &str) -> Option<Category> {
        let base_name = feed_name.rsplit('/').next().unwrap_or(feed_name);
        let base_name = base_name.to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|category| base_name.starts_with(category.as_str()))
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|category| category.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown category: {s}"))
    }
}

#[derive(Clone, Debug, Hash, Eq, PartialEq)]
pub struct ContentItem {
    /// Package file name; never contains a path separator
    pub name: String,
    /// Complete download URL
    pub url: String,
    pub mandatory: bool,
    /// Size in bytes
    pub size: u64,
    /// Release year, four digits
    pub year: String,
    pub category: Category,
}

impl ContentItem {
    pub fn mandatory_dir(&self) -> &'static str {
        if self.mandatory { "mandatory" } else { "optional" }
    }
}

/// Content items in discovery order, without field-wise duplicates.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    items: Vec<ContentItem>,
    seen: HashSet<ContentItem>,
    duplicates: usize,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an item unless an identical one is already present. Returns
    /// whether the item was added.
    pub fn insert(&mut self, item: ContentItem) -> bool {
        if self.seen.contains(&item) {
            self.duplicates += 1;
            return false;
        }
        self.seen.insert(item.clone());
        self.items.push(item);
        true
    }

    pub fn items(&self) -> &[ContentItem] {
        &self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ContentItem> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of rejected duplicate inserts.
    pub fn duplicates(&self) -> usize {
        self.duplicates
    }

    pub fn total_size(&self) -> u64 {
        self.items.iter().map(|item| item.size).sum()
    }
}

impl FromIterator<ContentItem> for Catalog {
    fn from_iter<T: IntoIterator<Item = ContentItem>>(iter: T) -> Self {
        let mut catalog = Catalog::new();
        for item in iter {
            catalog.insert(item);
        }
        catalog
    }
}

impl IntoIterator for Catalog {
    type Item = ContentItem;
    type IntoIter = std::vec::IntoIter<ContentItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a ContentItem;
    type IntoIter = std::slice::Iter<'a, ContentItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
