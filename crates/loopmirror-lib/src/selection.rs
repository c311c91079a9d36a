use crate::catalog::{Catalog, Category, ContentItem};
use crate::error::LoopMirrorError;

/// Restriction on the mandatory flag of selected items.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Exclusivity {
    #[default]
    Any,
    MandatoryOnly,
    OptionalOnly,
}

impl Exclusivity {
    pub fn from_flags(mandatory_only: bool, optional_only: bool) -> Result<Self, LoopMirrorError> {
        match (mandatory_only, optional_only) {
            (false, false) => Ok(Self::Any),
            (true, false) => Ok(Self::MandatoryOnly),
            (false, true) => Ok(Self::OptionalOnly),
            (true, true) => Err(LoopMirrorError::CliArgumentValidation {
                details: "mandatory-only and optional-only are mutually exclusive".to_string(),
            }),
        }
    }

    pub fn admits(&self, mandatory: bool) -> bool {
        match self {
            Self::Any => true,
            Self::MandatoryOnly => mandatory,
            Self::OptionalOnly => !mandatory,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Selection {
    /// Empty means every category.
    pub categories: Vec<Category>,
    /// Empty means every year.
    pub years: Vec<String>,
    pub exclusivity: Exclusivity,
}

impl Selection {
    pub fn matches(&self, item: &ContentItem) -> bool {
        (self.categories.is_empty() || self.categories.contains(&item.category))
            && (self.years.is_empty() || self.years.contains(&item.year))
            && self.exclusivity.admits(item.mandatory)
    }
}

pub fn filter(catalog: &Catalog, selection: &Selection) -> Catalog {
    catalog
        .iter()
        .filter(|item| selection.matches(item))
        .cloned()
        .collect()
}
