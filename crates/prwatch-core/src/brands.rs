//! Brand dictionary: the set of known brand/product substrings used to
//! filter noisy product candidates.
//!
//! Two on-disk formats are accepted:
//!
//! ```yaml
//! # brands.yaml
//! brands:
//!   - name: ブランドX
//!     aliases: [BrandX]
//! ```
//!
//! ```json
//! ["ブランドX", "アイテムY"]
//! ```
//!
//! The JSON form is selected by a `.json` extension.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrandEntry {
    pub name: String,
    #[serde(default)]
    pub aliases: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct BrandsFile {
    pub brands: Vec<BrandEntry>,
}

/// Ordered, de-duplicated set of dictionary terms.
///
/// Term order follows the source file so that matching is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BrandDictionary {
    terms: Vec<String>,
}

impl BrandDictionary {
    /// Builds a dictionary from raw terms, trimming each and dropping blanks
    /// and exact duplicates.
    pub fn from_terms<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let terms = terms
            .into_iter()
            .map(|t| t.as_ref().trim().to_string())
            .filter(|t| !t.is_empty())
            .filter(|t| seen.insert(t.clone()))
            .collect();
        Self { terms }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn terms(&self) -> impl Iterator<Item = &str> {
        self.terms.iter().map(String::as_str)
    }

    /// Returns the first dictionary term that occurs inside `text`.
    #[must_use]
    pub fn find_in<'a>(&'a self, text: &str) -> Option<&'a str> {
        self.terms
            .iter()
            .map(String::as_str)
            .find(|term| text.contains(term))
    }

    /// `true` when `text` contains at least one dictionary term.
    #[must_use]
    pub fn matches(&self, text: &str) -> bool {
        self.find_in(text).is_some()
    }
}

impl From<&BrandsFile> for BrandDictionary {
    fn from(file: &BrandsFile) -> Self {
        Self::from_terms(
            file.brands
                .iter()
                .flat_map(|b| std::iter::once(&b.name).chain(b.aliases.iter())),
        )
    }
}

/// Load the brand dictionary from `path`.
///
/// A missing file is not an error: the dictionary is simply empty, which
/// disables the dictionary-filtered extraction strategies.
///
/// # Errors
///
/// Returns `ConfigError` if the file exists but cannot be read, parsed, or
/// fails validation.
pub fn load_brand_dictionary(path: &Path) -> Result<BrandDictionary, ConfigError> {
    if !path.exists() {
        tracing::warn!(
            path = %path.display(),
            "brands file not found \u{2014} continuing with an empty brand dictionary"
        );
        return Ok(BrandDictionary::default());
    }

    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::BrandsFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    let dictionary = if is_json {
        parse_json_terms(&content).map_err(|reason| ConfigError::BrandsFileParse {
            path: path.display().to_string(),
            reason,
        })?
    } else {
        let brands_file: BrandsFile =
            serde_yaml::from_str(&content).map_err(|e| ConfigError::BrandsFileParse {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;
        validate_brands(&brands_file)?;
        BrandDictionary::from(&brands_file)
    };

    tracing::info!(
        path = %path.display(),
        terms = dictionary.len(),
        "loaded brand dictionary"
    );
    Ok(dictionary)
}

fn parse_json_terms(content: &str) -> Result<BrandDictionary, String> {
    let terms: Vec<String> = serde_json::from_str(content).map_err(|e| e.to_string())?;
    Ok(BrandDictionary::from_terms(terms))
}

fn validate_brands(brands_file: &BrandsFile) -> Result<(), ConfigError> {
    let mut seen_names = HashSet::new();

    for brand in &brands_file.brands {
        if brand.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "brand name must be non-empty".to_string(),
            ));
        }

        if !seen_names.insert(brand.name.trim().to_lowercase()) {
            return Err(ConfigError::Validation(format!(
                "duplicate brand name: '{}'",
                brand.name
            )));
        }

        if brand.aliases.iter().any(|a| a.trim().is_empty()) {
            return Err(ConfigError::Validation(format!(
                "brand '{}' has an empty alias",
                brand.name
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "brands_test.rs"]
mod tests;
