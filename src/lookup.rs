use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::warn;

/// Capability interface for the reference-page lookup. One call per brand;
/// implementations may be backed by a file, a cache, or a live service.
pub trait PageIndex {
    /// Resolved page title for the brand, if any.
    fn resolve_title(&self, brand: &str) -> Result<Option<String>>;

    fn page_exists(&self, brand: &str) -> Result<bool> {
        Ok(self.resolve_title(brand)?.is_some())
    }
}

/// Lookup failures never reach the analyzer: they are logged and coerced to
/// "no page".
pub fn page_flag_or_false(index: &dyn PageIndex, brand: &str) -> bool {
    match index.page_exists(brand) {
        Ok(flag) => flag,
        Err(err) => {
            warn!(brand, error = %err, "page lookup failed; treating page as absent");
            false
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
struct PageIndexFile {
    #[serde(default)]
    aliases: HashMap<String, Vec<String>>,
    #[serde(default)]
    titles: Vec<String>,
}

/// Offline page index loaded from a JSON file of known page titles plus an
/// alias table for brands whose page title differs from the brand name
/// (e.g. "HP" -> "HP Inc.").
#[derive(Debug, Clone)]
pub struct FilePageIndex {
    aliases: HashMap<String, Vec<String>>,
    titles_by_key: HashMap<String, String>,
}

impl FilePageIndex {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read(path)
            .with_context(|| format!("failed to read page index: {}", path.display()))?;
        let file: PageIndexFile = serde_json::from_slice(&raw)
            .with_context(|| format!("failed to parse page index: {}", path.display()))?;

        let titles_by_key = file
            .titles
            .iter()
            .map(|title| (title.to_lowercase(), title.clone()))
            .collect();

        Ok(Self {
            aliases: file.aliases,
            titles_by_key,
        })
    }

    #[cfg(test)]
    fn from_parts(aliases: HashMap<String, Vec<String>>, titles: &[&str]) -> Self {
        Self {
            aliases,
            titles_by_key: titles
                .iter()
                .map(|title| (title.to_lowercase(), title.to_string()))
                .collect(),
        }
    }

    fn candidates<'a>(&'a self, brand: &'a str) -> Vec<&'a str> {
        let mut candidates: Vec<&str> = self
            .aliases
            .get(brand)
            .map(|aliases| aliases.iter().map(String::as_str).collect())
            .unwrap_or_default();
        if !candidates.contains(&brand) {
            candidates.push(brand);
        }
        candidates
    }
}

impl PageIndex for FilePageIndex {
    fn resolve_title(&self, brand: &str) -> Result<Option<String>> {
        // Aliases first, then the brand name itself, all case-insensitive.
        for candidate in self.candidates(brand) {
            if let Some(title) = self.titles_by_key.get(&candidate.to_lowercase()) {
                return Ok(Some(title.clone()));
            }
        }

        // Fall back to a containment search over known titles, preferring
        // the shortest match, as a stand-in for the encyclopedia's search.
        let needle = brand.to_lowercase();
        let hit = self
            .titles_by_key
            .iter()
            .filter(|(key, _)| key.contains(&needle))
            .min_by_key(|(key, _)| key.len())
            .map(|(_, title)| title.clone());

        Ok(hit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index() -> FilePageIndex {
        let mut aliases = HashMap::new();
        aliases.insert(
            "HP".to_string(),
            vec!["HP Inc.".to_string(), "Hewlett-Packard".to_string()],
        );
        FilePageIndex::from_parts(
            aliases,
            &["Apple Inc.", "HP Inc.", "Dell (company)", "Lenovo"],
        )
    }

    #[test]
    fn direct_title_match_is_case_insensitive() {
        let index = index();
        assert_eq!(index.resolve_title("lenovo").unwrap().as_deref(), Some("Lenovo"));
        assert!(index.page_exists("LENOVO").unwrap());
    }

    #[test]
    fn alias_resolves_before_brand_name() {
        let index = index();
        assert_eq!(index.resolve_title("HP").unwrap().as_deref(), Some("HP Inc."));
    }

    #[test]
    fn containment_fallback_picks_shortest_title() {
        let index = index();
        assert_eq!(
            index.resolve_title("Apple").unwrap().as_deref(),
            Some("Apple Inc.")
        );
        assert_eq!(
            index.resolve_title("Dell").unwrap().as_deref(),
            Some("Dell (company)")
        );
    }

    #[test]
    fn unknown_brand_resolves_to_none() {
        let index = index();
        assert_eq!(index.resolve_title("Zorin").unwrap(), None);
        assert!(!index.page_exists("Zorin").unwrap());
    }

    #[test]
    fn lookup_failure_is_coerced_to_false() {
        struct FailingIndex;

        impl PageIndex for FailingIndex {
            fn resolve_title(&self, _brand: &str) -> Result<Option<String>> {
                anyhow::bail!("index offline")
            }
        }

        assert!(!page_flag_or_false(&FailingIndex, "Apple"));
    }
}
