//! Catalog: validated part records grouped by category.
//!
//! Records inside a category are ordered by price ascending. The sort is
//! stable, so equally priced records keep their source order; "first
//! encountered" tie-breaks downstream are therefore deterministic.

use std::collections::BTreeMap;
use thiserror::Error;

use crate::domain::{Category, PartRecord};

/// Why a category has no usable records.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MissingCategoryError {
    #[error("source not found: {path}")]
    NotFound { path: String },

    #[error("source unreadable: {reason}")]
    Unreadable { reason: String },

    #[error("source lacks required columns: {}", columns.join(", "))]
    MissingColumns { columns: Vec<String> },

    #[error("no records with a valid price")]
    Empty,
}

/// In-memory catalog. Read-only once handed to an engine.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    parts: BTreeMap<Category, Vec<PartRecord>>,
    missing: BTreeMap<Category, MissingCategoryError>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Group loose records by their own category.
    pub fn from_parts(records: impl IntoIterator<Item = PartRecord>) -> Self {
        let mut grouped: BTreeMap<Category, Vec<PartRecord>> = BTreeMap::new();
        for record in records {
            grouped.entry(record.category).or_default().push(record);
        }
        let mut catalog = Self::new();
        for (category, records) in grouped {
            catalog.insert_category(category, records);
        }
        catalog
    }

    /// Install the records for one category, replacing any previous ones.
    ///
    /// Records with a missing, non-finite or negative price are dropped. If
    /// nothing survives, the category is recorded as `Empty`. Returns the
    /// number of records dropped.
    pub fn insert_category(&mut self, category: Category, records: Vec<PartRecord>) -> usize {
        let before = records.len();
        let mut kept: Vec<PartRecord> = records
            .into_iter()
            .filter(PartRecord::has_valid_price)
            .map(|mut r| {
                r.category = category;
                r
            })
            .collect();
        let dropped = before - kept.len();

        kept.sort_by(|a, b| a.price.total_cmp(&b.price));

        if kept.is_empty() {
            self.parts.remove(&category);
            self.missing.insert(category, MissingCategoryError::Empty);
        } else {
            self.missing.remove(&category);
            self.parts.insert(category, kept);
        }
        dropped
    }

    /// Record that a category could not be loaded at all.
    pub fn record_missing(&mut self, category: Category, error: MissingCategoryError) {
        self.parts.remove(&category);
        self.missing.insert(category, error);
    }

    /// Records for `category`, cheapest first. Empty when unavailable.
    pub fn parts(&self, category: Category) -> &[PartRecord] {
        self.parts.get(&category).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn cheapest(&self, category: Category) -> Option<&PartRecord> {
        self.parts(category).first()
    }

    pub fn find(&self, category: Category, name: &str) -> Option<&PartRecord> {
        self.parts(category).iter().find(|p| p.name == name)
    }

    pub fn is_available(&self, category: Category) -> bool {
        !self.parts(category).is_empty()
    }

    /// Records for `category`, or why there are none.
    pub fn require(&self, category: Category) -> Result<&[PartRecord], MissingCategoryError> {
        match self.parts.get(&category) {
            Some(records) if !records.is_empty() => Ok(records),
            _ => Err(self
                .missing
                .get(&category)
                .cloned()
                .unwrap_or(MissingCategoryError::Empty)),
        }
    }

    /// First category from `required` with no records.
    pub fn first_missing(&self, required: &[Category]) -> Option<Category> {
        required.iter().copied().find(|c| !self.is_available(*c))
    }

    pub fn missing(&self) -> &BTreeMap<Category, MissingCategoryError> {
        &self.missing
    }

    /// Categories that have at least one record, in declaration order.
    pub fn categories(&self) -> impl Iterator<Item = Category> + '_ {
        self.parts.keys().copied()
    }

    /// Total record count across all categories.
    pub fn len(&self) -> usize {
        self.parts.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}
