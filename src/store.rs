//! In-memory record store and the active filtered subset.

use serde::Serialize;
use std::collections::BTreeSet;
use tracing::debug;

use crate::filter::{FilterCriteria, filter};
use crate::record::Record;

/// Distinct values used to populate the filter selectors.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FilterOptions {
    /// In order of first appearance.
    pub diseases: Vec<String>,
    pub districts: Vec<String>,
    pub years: Vec<i32>,
}

/// Owns the full dataset and the subset selected by the current criteria.
#[derive(Debug, Default)]
pub struct RecordStore {
    records: Vec<Record>,
    criteria: FilterCriteria,
    filtered: Vec<Record>,
}

impl RecordStore {
    /// Creates a store whose filtered subset starts as the whole dataset.
    pub fn new(records: Vec<Record>) -> Self {
        let filtered = records.clone();
        Self {
            records,
            criteria: FilterCriteria::all(),
            filtered,
        }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn filtered(&self) -> &[Record] {
        &self.filtered
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Replaces the active criteria and recomputes the subset.
    pub fn apply(&mut self, criteria: FilterCriteria) -> &[Record] {
        self.filtered = filter(&self.records, &criteria);
        debug!(
            matched = self.filtered.len(),
            total = self.records.len(),
            "Filter applied"
        );
        self.criteria = criteria;
        &self.filtered
    }

    pub fn options(&self) -> FilterOptions {
        let mut diseases: Vec<String> = Vec::new();
        for r in &self.records {
            if !r.disease_clean.is_empty() && !diseases.contains(&r.disease_clean) {
                diseases.push(r.disease_clean.clone());
            }
        }

        let districts: BTreeSet<&str> = self
            .records
            .iter()
            .map(|r| r.district.as_str())
            .filter(|d| !d.is_empty())
            .collect();

        let years: BTreeSet<i32> = self
            .records
            .iter()
            .map(|r| r.year)
            .filter(|y| *y != 0)
            .collect();

        FilterOptions {
            diseases,
            districts: districts.into_iter().map(String::from).collect(),
            years: years.into_iter().collect(),
        }
    }
}
