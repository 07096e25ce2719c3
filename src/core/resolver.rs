//! Free-form name lookup against the configured catalog
//!
//! Lookup is tiered. Each tier is a plain function over the catalog and the
//! first tier that yields an entry wins:
//!
//! 1. exact name (or alias) match
//! 2. substring of the name, first entry in file order
//! 3. abbreviation table: a query starting with a known prefix is expanded
//!    to a canonical term, which is then substring-matched
//!
//! All comparisons are case-insensitive on the trimmed query. Within a tier
//! the first entry in catalog order wins; there is no scoring.

use crate::core::config::{PipelineEntry, RepositoryEntry};
use crate::core::ToolError;
use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;
use tracing::{debug, warn};

/// Something that can be looked up by name
pub trait CatalogEntry {
    /// Label used in "not found" messages
    const KIND: &'static str;

    fn name(&self) -> &str;

    fn aliases(&self) -> &[String] {
        &[]
    }
}

impl CatalogEntry for PipelineEntry {
    const KIND: &'static str = "Pipeline";

    fn name(&self) -> &str {
        &self.name
    }
}

impl CatalogEntry for RepositoryEntry {
    const KIND: &'static str = "Repository";

    fn name(&self) -> &str {
        &self.name
    }

    fn aliases(&self) -> &[String] {
        &self.aliases
    }
}

/// Which tier produced a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchTier {
    Exact,
    Substring,
    Abbreviation,
}

/// A successful lookup
#[derive(Debug, PartialEq, Eq)]
pub struct Resolved<'a, T> {
    pub entry: &'a T,
    pub tier: MatchTier,
}

type Matcher<T> = for<'a> fn(&str, &'a [T]) -> Option<&'a T>;

/// Leading-prefix patterns and the term each one expands to
const ABBREVIATIONS: &[(&str, &str)] = &[
    (r"^int", "integration"),
    (r"^deploy", "deploy"),
    (r"^test", "test"),
    (r"^build", "build"),
];

fn abbreviation_table() -> &'static [(Regex, &'static str)] {
    static TABLE: OnceLock<Vec<(Regex, &'static str)>> = OnceLock::new();
    TABLE.get_or_init(|| {
        ABBREVIATIONS
            .iter()
            .filter_map(|(pattern, term)| match Regex::new(pattern) {
                Ok(regex) => Some((regex, *term)),
                Err(e) => {
                    warn!("Skipping abbreviation pattern {}: {}", pattern, e);
                    None
                }
            })
            .collect()
    })
}

fn exact<'a, T: CatalogEntry>(query: &str, catalog: &'a [T]) -> Option<&'a T> {
    catalog.iter().find(|entry| {
        entry.name().to_lowercase() == query
            || entry.aliases().iter().any(|alias| alias.to_lowercase() == query)
    })
}

fn substring<'a, T: CatalogEntry>(query: &str, catalog: &'a [T]) -> Option<&'a T> {
    catalog
        .iter()
        .find(|entry| entry.name().to_lowercase().contains(query))
}

fn abbreviation<'a, T: CatalogEntry>(query: &str, catalog: &'a [T]) -> Option<&'a T> {
    abbreviation_table()
        .iter()
        .filter(|(pattern, _)| pattern.is_match(query))
        .find_map(|(_, term)| substring(term, catalog))
}

fn tiers<T: CatalogEntry>() -> [(MatchTier, Matcher<T>); 3] {
    [
        (MatchTier::Exact, exact::<T>),
        (MatchTier::Substring, substring::<T>),
        (MatchTier::Abbreviation, abbreviation::<T>),
    ]
}

/// Resolve `query` against `catalog`.
///
/// # Errors
/// `ToolError::NotFound` carrying every catalog name when no tier matches.
pub fn resolve<'a, T: CatalogEntry>(query: &str, catalog: &'a [T]) -> Result<Resolved<'a, T>, ToolError> {
    let normalized = query.trim().to_lowercase();

    if !normalized.is_empty() {
        for (tier, matcher) in tiers::<T>() {
            if let Some(entry) = matcher(&normalized, catalog) {
                debug!("{} '{}' resolved to '{}' via {:?} match", T::KIND, query, entry.name(), tier);
                return Ok(Resolved { entry, tier });
            }
        }
    }

    Err(ToolError::NotFound {
        kind: T::KIND,
        query: query.to_string(),
        available: catalog.iter().map(|e| e.name().to_string()).collect(),
    })
}
