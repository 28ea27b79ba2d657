//! Source locators
//!
//! A `SourceList` is the fixed, ordered set of URLs the repository aggregates.
//! Order is request order only: records are collected in completion order.

use crate::error::CoreError;
use reqwest::Url;
use std::collections::HashSet;
use std::fmt;

/// Recipe documents fetched when no other source list is configured
pub const RECIPE_URLS: &[&str] = &[
    "https://adarsh249.github.io/Lab8-Starter/recipes/1_50-thanksgiving-side-dishes.json",
    "https://adarsh249.github.io/Lab8-Starter/recipes/2_roasting-turkey-breast-with-stuffing.json",
    "https://adarsh249.github.io/Lab8-Starter/recipes/3_moms-cornbread-stuffing.json",
    "https://adarsh249.github.io/Lab8-Starter/recipes/4_50-indulgent-thanksgiving-side-dishes-for-any-holiday-gathering.json",
    "https://adarsh249.github.io/Lab8-Starter/recipes/5_healthy-thanksgiving-recipe-crockpot-turkey-breast.json",
    "https://adarsh249.github.io/Lab8-Starter/recipes/6_one-pot-thanksgiving-dinner.json",
];

/// A validated absolute http(s) URL
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Locator(Url);

impl Locator {
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        let url = Url::parse(raw.trim()).map_err(|e| CoreError::InvalidSource {
            locator: raw.to_string(),
            reason: e.to_string(),
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(CoreError::InvalidSource {
                locator: raw.to_string(),
                reason: format!("unsupported scheme '{}'", url.scheme()),
            });
        }

        Ok(Self(url))
    }

    pub fn url(&self) -> &Url {
        &self.0
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}

/// Ordered sequence of unique locators
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceList {
    locators: Vec<Locator>,
}

impl SourceList {
    /// Build from raw strings, rejecting malformed URLs and duplicates
    pub fn new<I, S>(raw: I) -> Result<Self, CoreError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let mut locators = Vec::new();

        for item in raw {
            let locator = Locator::parse(item.as_ref())?;
            if !seen.insert(locator.clone()) {
                return Err(CoreError::DuplicateSource {
                    locator: locator.to_string(),
                });
            }
            locators.push(locator);
        }

        Ok(Self { locators })
    }

    /// The built-in recipe list
    pub fn recipes() -> Self {
        Self {
            locators: RECIPE_URLS
                .iter()
                .map(|raw| Locator(Url::parse(raw).expect("built-in recipe URL is valid")))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.locators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locators.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Locator> {
        self.locators.iter()
    }
}

impl Default for SourceList {
    fn default() -> Self {
        Self::recipes()
    }
}

impl<'a> IntoIterator for &'a SourceList {
    type Item = &'a Locator;
    type IntoIter = std::slice::Iter<'a, Locator>;

    fn into_iter(self) -> Self::IntoIter {
        self.locators.iter()
    }
}
