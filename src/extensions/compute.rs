use super::filters::parse_extensions;
use super::sets::{subset_extensions, Category, ALL_CATEGORIES};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtensionMode {
    #[default]
    Categories,
    AllowAll,
    Custom,
}

impl ExtensionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtensionMode::Categories => "categories",
            ExtensionMode::AllowAll => "allow_all",
            ExtensionMode::Custom => "custom",
        }
    }
}

impl fmt::Display for ExtensionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExtensionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" | "categories" => Ok(ExtensionMode::Categories),
            "allow_all" | "allow-all" => Ok(ExtensionMode::AllowAll),
            "custom" => Ok(ExtensionMode::Custom),
            other => Err(format!(
                "unknown extension mode '{}', expected categories, allow_all or custom",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtensionSettings {
    pub mode: ExtensionMode,
    pub include_text: bool,
    pub include_data: bool,
    pub include_code: bool,
    pub excluded_subsets: BTreeMap<Category, BTreeSet<String>>,
    pub included_extensions_text: String,
    pub excluded_extensions_text: String,
    pub custom_extensions_text: String,
}

impl Default for ExtensionSettings {
    fn default() -> Self {
        ExtensionSettings {
            mode: ExtensionMode::Categories,
            include_text: true,
            include_data: true,
            include_code: true,
            excluded_subsets: BTreeMap::new(),
            included_extensions_text: String::new(),
            excluded_extensions_text: String::new(),
            custom_extensions_text: String::new(),
        }
    }
}

impl ExtensionSettings {
    pub fn category_enabled(&self, category: Category) -> bool {
        match category {
            Category::Text => self.include_text,
            Category::Data => self.include_data,
            Category::Code => self.include_code,
        }
    }

    /// Returns true when the value actually changed.
    pub fn set_category_enabled(&mut self, category: Category, enabled: bool) -> bool {
        let slot = match category {
            Category::Text => &mut self.include_text,
            Category::Data => &mut self.include_data,
            Category::Code => &mut self.include_code,
        };
        let changed = *slot != enabled;
        *slot = enabled;
        changed
    }

    /// Returns true when the exclusion set actually changed.
    pub fn set_subset_excluded(&mut self, subset: &str, excluded: bool) -> bool {
        let Some(category) = Category::of_subset(subset) else {
            return false;
        };
        if excluded {
            self.excluded_subsets
                .entry(category)
                .or_default()
                .insert(subset.to_owned())
        } else {
            let removed = self
                .excluded_subsets
                .get_mut(&category)
                .map(|set| set.remove(subset))
                .unwrap_or(false);
            self.excluded_subsets.retain(|_, set| !set.is_empty());
            removed
        }
    }
}

/// Builds the final extension allow-list. An empty list means "allow everything".
pub fn compute_extension_filters(settings: &ExtensionSettings) -> Vec<String> {
    let mut allowed: BTreeSet<String> = match settings.mode {
        ExtensionMode::AllowAll => {
            debug!("Extension mode allow_all, no filtering");
            return Vec::new();
        }
        ExtensionMode::Custom => parse_extensions(&settings.custom_extensions_text)
            .into_iter()
            .collect(),
        ExtensionMode::Categories => {
            let mut allowed = BTreeSet::new();
            for category in ALL_CATEGORIES {
                if !settings.category_enabled(category) {
                    continue;
                }
                for subset in category.subsets() {
                    allowed.extend(subset_extensions(subset).iter().map(|e| (*e).to_owned()));
                }
            }
            for subsets in settings.excluded_subsets.values() {
                for subset in subsets {
                    for ext in subset_extensions(subset) {
                        allowed.remove(*ext);
                    }
                }
            }
            allowed.extend(parse_extensions(&settings.included_extensions_text));
            allowed
        }
    };

    for denied in parse_extensions(&settings.excluded_extensions_text) {
        allowed.remove(&denied);
    }

    debug!(
        "Computed {} allowed extensions in {} mode",
        allowed.len(),
        settings.mode
    );
    allowed.into_iter().collect()
}
