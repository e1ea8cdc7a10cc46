//! Box preference scoring.
//!
//! `score = volume × length_penalty`, lower is better. Volume alone would favour
//! long, thin boxes that are efficient on paper but awkward and expensive to
//! ship; the length penalty pushes those to the back of the queue unless the
//! items actually need them.

use crate::catalog::BoxCatalog;
use crate::model::BoxRecord;
use crate::optimizer::PackingConfig;
use crate::types::{Dimensional, EPSILON_GENERAL};

/// Ranks catalog boxes for a given longest item dimension.
#[derive(Clone, Copy, Debug)]
pub struct PreferenceScorer<'a> {
    config: &'a PackingConfig,
    /// Longest box at or below the extreme-length threshold, if any.
    compact_limit: Option<f64>,
}

impl<'a> PreferenceScorer<'a> {
    pub fn new(catalog: &BoxCatalog, config: &'a PackingConfig) -> Self {
        Self {
            config,
            compact_limit: catalog.longest_length_up_to(config.extreme_length_mm),
        }
    }

    /// Whether an item this long cannot go into any box below the extreme threshold.
    pub fn requires_extreme_length(&self, longest_item_mm: f64) -> bool {
        match self.compact_limit {
            Some(limit) => longest_item_mm > limit + EPSILON_GENERAL,
            None => true,
        }
    }

    pub fn is_extremely_long(&self, record: &BoxRecord) -> bool {
        record.length_mm > self.config.extreme_length_mm
    }

    /// An extremely long box the items do not need.
    pub fn is_unnecessarily_long(&self, record: &BoxRecord, longest_item_mm: f64) -> bool {
        self.is_extremely_long(record) && !self.requires_extreme_length(longest_item_mm)
    }

    /// Multiplier applied to the box volume.
    ///
    /// # Parameters
    /// * `record` - Candidate box
    /// * `longest_item_mm` - Longest measurement across the units being packed
    ///
    /// # Returns
    /// `1.0` up to the preferred length, a polynomial in `length / preferred`
    /// beyond it, and the steep exponent for unnecessary extremely long boxes.
    pub fn length_penalty(&self, record: &BoxRecord, longest_item_mm: f64) -> f64 {
        let preferred = self.config.preferred_length_mm;
        if record.length_mm <= preferred {
            return 1.0;
        }

        let ratio = record.length_mm / preferred;
        if self.is_unnecessarily_long(record, longest_item_mm) {
            ratio.powf(self.config.extreme_penalty_exponent)
        } else {
            ratio.powf(self.config.length_penalty_exponent)
        }
    }

    pub fn score(&self, record: &BoxRecord, longest_item_mm: f64) -> f64 {
        record.volume() * self.length_penalty(record, longest_item_mm)
    }

    /// Catalog boxes ordered by ascending score; ties keep catalog order.
    pub fn rank<'c>(&self, catalog: &'c BoxCatalog, longest_item_mm: f64) -> Vec<&'c BoxRecord> {
        let mut scored: Vec<(f64, &BoxRecord)> = catalog
            .boxes()
            .iter()
            .map(|record| (self.score(record, longest_item_mm), record))
            .collect();
        scored.sort_by(|a, b| a.0.total_cmp(&b.0));
        scored.into_iter().map(|(_, record)| record).collect()
    }
}
