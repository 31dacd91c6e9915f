//! Categorical dimensions used to tag events.
//!
//! Dimension names come from `categories.json`. While events are transformed,
//! each dimension accumulates the distinct values seen on the agenda; the
//! accumulated sets are written to the filter document once the pass is done.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ConfcalError, ConfcalResult};

/// Value recorded for a dimension an event does not specify.
pub const UNDEFINED_VALUE: &str = "Undefined";

const KEY_SEPARATOR: char = '|';
const LABEL_SEPARATOR: &str = ": ";

#[derive(Debug, Clone, PartialEq)]
pub struct TaxonomyDimension {
    pub name: String,
    /// Prefix of the calendar property names, e.g. `grade-levels-addressed|`
    pub key: String,
    /// Label the agenda page prints before the values, e.g. `Grade Levels Addressed: `
    pub label: String,
    pub values: BTreeSet<String>,
}

/// Property-name prefix for a dimension: lowercased, spaces to hyphens, then `|`.
pub fn dimension_key(name: &str) -> String {
    format!("{}{}", name.to_lowercase().replace(' ', "-"), KEY_SEPARATOR)
}

impl TaxonomyDimension {
    pub fn new(name: &str) -> Self {
        TaxonomyDimension {
            name: name.to_string(),
            key: dimension_key(name),
            label: format!("{}{}", name, LABEL_SEPARATOR),
            values: BTreeSet::new(),
        }
    }

    /// Calendar property name for one value of this dimension.
    pub fn property_name(&self, value: &str) -> String {
        format!("{}{}", self.key, value)
    }
}

/// The run's accumulator: every configured dimension with the values seen so far.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Taxonomy {
    dimensions: Vec<TaxonomyDimension>,
}

impl Taxonomy {
    pub fn new(dimensions: Vec<TaxonomyDimension>) -> Self {
        Taxonomy { dimensions }
    }

    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Self {
        Taxonomy::new(
            names
                .iter()
                .map(|n| TaxonomyDimension::new(n.as_ref()))
                .collect(),
        )
    }

    pub fn dimensions(&self) -> &[TaxonomyDimension] {
        &self.dimensions
    }

    pub fn dimension(&self, name: &str) -> Option<&TaxonomyDimension> {
        self.dimensions.iter().find(|d| d.name == name)
    }

    pub fn is_empty(&self) -> bool {
        self.dimensions.is_empty()
    }

    /// Union `values` into the named dimension's set. Unknown names are ignored.
    pub fn observe<S: AsRef<str>>(&mut self, name: &str, values: &[S]) {
        if let Some(dimension) = self.dimensions.iter_mut().find(|d| d.name == name) {
            dimension
                .values
                .extend(values.iter().map(|v| v.as_ref().to_string()));
        }
    }

    pub fn to_document(&self) -> TaxonomyDocument {
        TaxonomyDocument(
            self.dimensions
                .iter()
                .map(|d| {
                    (
                        d.name.clone(),
                        DimensionRecord {
                            key: d.key.clone(),
                            label: d.label.clone(),
                            values: d.values.iter().cloned().collect(),
                        },
                    )
                })
                .collect(),
        )
    }

    pub fn from_document(document: TaxonomyDocument) -> Self {
        Taxonomy::new(
            document
                .0
                .into_iter()
                .map(|(name, record)| TaxonomyDimension {
                    name,
                    key: record.key,
                    label: record.label,
                    values: record.values.into_iter().collect(),
                })
                .collect(),
        )
    }
}

/// Persisted filter options, keyed by dimension name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaxonomyDocument(pub BTreeMap<String, DimensionRecord>);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionRecord {
    pub key: String,
    pub label: String,
    #[serde(default)]
    pub values: Vec<String>,
}

/// One entry of `categories.json`.
#[derive(Debug, Deserialize)]
struct CategoryConfig {
    name: String,
}

/// Reads dimension names from `categories.json`, writes accumulated values to the filter document.
#[derive(Debug, Clone)]
pub struct TaxonomyStore {
    categories_path: PathBuf,
    filter_path: PathBuf,
}

impl TaxonomyStore {
    pub fn new(categories_path: impl Into<PathBuf>, filter_path: impl Into<PathBuf>) -> Self {
        TaxonomyStore {
            categories_path: categories_path.into(),
            filter_path: filter_path.into(),
        }
    }

    pub fn categories_path(&self) -> &Path {
        &self.categories_path
    }

    pub fn filter_path(&self) -> &Path {
        &self.filter_path
    }

    /// Load the configured dimensions with empty value sets.
    pub fn load(&self) -> ConfcalResult<Taxonomy> {
        let content = std::fs::read_to_string(&self.categories_path).map_err(|e| {
            ConfcalError::Taxonomy(format!(
                "Could not read categories from {}: {e}",
                self.categories_path.display()
            ))
        })?;

        let categories: Vec<CategoryConfig> = serde_json::from_str(&content).map_err(|e| {
            ConfcalError::Taxonomy(format!(
                "Could not parse categories in {}: {e}",
                self.categories_path.display()
            ))
        })?;

        let names: Vec<String> = categories.into_iter().map(|c| c.name).collect();
        debug!(count = names.len(), "Loaded taxonomy dimensions");

        Ok(Taxonomy::from_names(&names))
    }

    /// Overwrite the filter document with the current value sets.
    pub fn persist(&self, taxonomy: &Taxonomy) -> ConfcalResult<()> {
        let content = serde_json::to_string_pretty(&taxonomy.to_document())
            .map_err(|e| ConfcalError::Serialization(e.to_string()))?;

        if let Some(parent) = self.filter_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.filter_path, content)?;

        debug!(path = %self.filter_path.display(), "Persisted taxonomy");
        Ok(())
    }

    /// Read back a previously persisted filter document.
    pub fn read_persisted(&self) -> ConfcalResult<Taxonomy> {
        let content = std::fs::read_to_string(&self.filter_path)?;
        let document: TaxonomyDocument = serde_json::from_str(&content)
            .map_err(|e| ConfcalError::Serialization(e.to_string()))?;
        Ok(Taxonomy::from_document(document))
    }
}
