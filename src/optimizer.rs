//! Box selection and packing logic.
//!
//! Two entry points:
//! - [`pack_single_box`] tries to fit every unit into one catalog box, trying
//!   boxes in preference order and committing to the first one that holds all.
//! - [`pack_multi_box`] runs the single-box attempt first and falls back to a
//!   greedy multi-box allocation when one box is not enough (or would be an
//!   unnecessarily long box).
//!
//! Placement is greedy: for each unit the first extreme point / orientation
//! combination that passes the placement test is taken. Packing is NP-hard,
//! results are good, not optimal.

use std::fmt;

use crate::catalog::BoxCatalog;
use crate::extreme_points::ExtremePointTracker;
use crate::geometry::{fits_at, orientations};
use crate::grouping::{distinct_keys, group_units, total_quantity};
use crate::model::{BoxRecord, ItemRecord, PlacedItem, UnitItem, ValidationError};
use crate::scoring::PreferenceScorer;
use crate::types::{Dimensional, Weighted};

/// Configuration for the box selection heuristics.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PackingConfig {
    /// Boxes up to this length carry no length penalty (mm)
    pub preferred_length_mm: f64,
    /// Boxes beyond this length are "extremely long" (mm)
    pub extreme_length_mm: f64,
    /// Exponent of the penalty for boxes beyond the preferred length
    pub length_penalty_exponent: f64,
    /// Exponent for extremely long boxes the items do not need
    pub extreme_penalty_exponent: f64,
    /// Keep a single-box result as one shipment for uniform stock
    pub force_single_for_uniform_stock: bool,
    /// Upper bound on the units one call may expand to
    pub max_units: u32,
}

impl PackingConfig {
    pub const DEFAULT_PREFERRED_LENGTH_MM: f64 = 1200.0;
    pub const DEFAULT_EXTREME_LENGTH_MM: f64 = 1500.0;
    pub const DEFAULT_LENGTH_PENALTY_EXPONENT: f64 = 3.0;
    pub const DEFAULT_EXTREME_PENALTY_EXPONENT: f64 = 10.0;
    pub const DEFAULT_FORCE_SINGLE_FOR_UNIFORM_STOCK: bool = true;
    pub const DEFAULT_MAX_UNITS: u32 = 10_000;

    /// Creates a builder for custom configuration.
    pub fn builder() -> PackingConfigBuilder {
        PackingConfigBuilder::default()
    }
}

impl Default for PackingConfig {
    fn default() -> Self {
        Self {
            preferred_length_mm: Self::DEFAULT_PREFERRED_LENGTH_MM,
            extreme_length_mm: Self::DEFAULT_EXTREME_LENGTH_MM,
            length_penalty_exponent: Self::DEFAULT_LENGTH_PENALTY_EXPONENT,
            extreme_penalty_exponent: Self::DEFAULT_EXTREME_PENALTY_EXPONENT,
            force_single_for_uniform_stock: Self::DEFAULT_FORCE_SINGLE_FOR_UNIFORM_STOCK,
            max_units: Self::DEFAULT_MAX_UNITS,
        }
    }
}

/// Builder for PackingConfig.
#[derive(Clone, Debug, Default)]
pub struct PackingConfigBuilder {
    config: PackingConfig,
}

impl PackingConfigBuilder {
    pub fn preferred_length_mm(mut self, length: f64) -> Self {
        self.config.preferred_length_mm = length;
        self
    }

    pub fn extreme_length_mm(mut self, length: f64) -> Self {
        self.config.extreme_length_mm = length;
        self
    }

    pub fn length_penalty_exponent(mut self, exponent: f64) -> Self {
        self.config.length_penalty_exponent = exponent;
        self
    }

    pub fn extreme_penalty_exponent(mut self, exponent: f64) -> Self {
        self.config.extreme_penalty_exponent = exponent;
        self
    }

    pub fn force_single_for_uniform_stock(mut self, enabled: bool) -> Self {
        self.config.force_single_for_uniform_stock = enabled;
        self
    }

    pub fn max_units(mut self, limit: u32) -> Self {
        self.config.max_units = limit;
        self
    }

    /// Creates the final configuration.
    pub fn build(self) -> PackingConfig {
        self.config
    }
}

/// Error returned by the single-box packer for unusable input.
#[derive(Debug, Clone, PartialEq)]
pub enum PackError {
    InvalidItem {
        index: usize,
        source: ValidationError,
    },
    /// Quantities expand to more units than `PackingConfig::max_units` allows.
    TooManyUnits { requested: u64, limit: u32 },
}

impl fmt::Display for PackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PackError::InvalidItem { index, source } => {
                write!(f, "item at position {} is invalid: {}", index, source)
            }
            PackError::TooManyUnits { requested, limit } => {
                write!(f, "order expands to {} units, at most {} are allowed", requested, limit)
            }
        }
    }
}

impl std::error::Error for PackError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PackError::InvalidItem { source, .. } => Some(source),
            PackError::TooManyUnits { .. } => None,
        }
    }
}

/// Working state of one box attempt.
///
/// Created fresh per attempt and dropped when the attempt is abandoned.
#[derive(Clone, Debug)]
pub struct PackingBox<'c> {
    record: &'c BoxRecord,
    placed: Vec<PlacedItem>,
    extreme_points: ExtremePointTracker,
    loaded_weight: f64,
}

impl<'c> PackingBox<'c> {
    pub fn new(record: &'c BoxRecord) -> Self {
        Self {
            record,
            placed: Vec::new(),
            extreme_points: ExtremePointTracker::new(record.inner_dims()),
            loaded_weight: 0.0,
        }
    }

    pub fn placed(&self) -> &[PlacedItem] {
        &self.placed
    }

    pub fn remaining_weight(&self) -> f64 {
        self.record.max_weight_g - self.loaded_weight
    }

    pub fn extreme_points(&self) -> &ExtremePointTracker {
        &self.extreme_points
    }

    /// Places `unit` at the first anchor / orientation that passes the placement test.
    ///
    /// Anchors are scanned in tracker order, orientations in generation order.
    /// Returns `false` (leaving the state untouched) if nothing fits.
    pub fn try_insert(&mut self, unit: &UnitItem) -> bool {
        if self.loaded_weight + unit.weight() > self.record.max_weight_g {
            return false;
        }

        let bounds = self.record.inner_dims();
        let candidates = orientations(unit.dimensions());
        let found = self.extreme_points.points().iter().find_map(|&anchor| {
            candidates
                .iter()
                .find(|&&dims| fits_at(bounds, anchor, dims, &self.placed))
                .map(|&dims| (anchor, dims))
        });

        let Some((position, dims)) = found else {
            return false;
        };

        let placed = PlacedItem {
            source: unit.source,
            dims,
            position,
            weight: unit.weight(),
        };
        self.extreme_points.record_placement(&placed);
        self.placed.push(placed);
        self.loaded_weight += unit.weight();
        true
    }

    /// Total weight of the placed units.
    pub fn total_weight(&self) -> f64 {
        self.loaded_weight
    }
}

/// Result of a single-box call.
#[derive(Clone, Debug, PartialEq)]
pub struct SingleBoxOutcome {
    pub success: bool,
    pub box_record: Option<BoxRecord>,
    pub packed_items: Vec<ItemRecord>,
    pub unfit_items: Vec<ItemRecord>,
    pub placements: Vec<PlacedItem>,
}

impl SingleBoxOutcome {
    fn packed(items: &[ItemRecord], packing: PackingBox<'_>) -> Self {
        let packed_items = group_units(items, packing.placed.iter().map(|p| p.source));
        Self {
            success: true,
            box_record: Some(packing.record.clone()),
            packed_items,
            unfit_items: Vec::new(),
            placements: packing.placed,
        }
    }

    fn unfit(items: &[ItemRecord]) -> Self {
        Self {
            success: false,
            box_record: None,
            packed_items: Vec::new(),
            unfit_items: items.to_vec(),
            placements: Vec::new(),
        }
    }
}

/// One box of a multi-box result.
#[derive(Clone, Debug, PartialEq)]
pub struct Shipment {
    pub box_record: BoxRecord,
    pub packed_items: Vec<ItemRecord>,
    pub placements: Vec<PlacedItem>,
}

impl Shipment {
    fn from_packing(items: &[ItemRecord], packing: PackingBox<'_>) -> Self {
        Self {
            box_record: packing.record.clone(),
            packed_items: group_units(items, packing.placed.iter().map(|p| p.source)),
            placements: packing.placed,
        }
    }
}

/// Result of a multi-box call.
#[derive(Clone, Debug, PartialEq)]
pub struct MultiBoxOutcome {
    pub success: bool,
    pub shipments: Vec<Shipment>,
    pub unfit_items: Vec<ItemRecord>,
}

impl MultiBoxOutcome {
    pub fn shipment_count(&self) -> usize {
        self.shipments.len()
    }
}

/// Product shortcuts that keep a single-box result as one shipment, even when
/// the general rules would split it.
///
/// Kept apart from the scorer so each rule can be revisited on its own.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SingleShipmentPolicy {
    /// Several units of one and the same item ship together.
    UniformStock,
}

impl SingleShipmentPolicy {
    pub fn code(&self) -> &'static str {
        match self {
            SingleShipmentPolicy::UniformStock => "uniform_stock",
        }
    }

    /// Returns the first enabled policy that applies to the expanded units.
    pub fn applicable(
        config: &PackingConfig,
        items: &[ItemRecord],
        units: &[UnitItem],
    ) -> Option<Self> {
        let uniform = units.len() >= 2 && distinct_keys(items, units.iter().map(|u| u.source)) == 1;
        if config.force_single_for_uniform_stock && uniform {
            return Some(SingleShipmentPolicy::UniformStock);
        }
        None
    }
}

fn longest_dimension(units: &[UnitItem]) -> f64 {
    units.iter().map(|u| u.longest_side()).fold(0.0, f64::max)
}

/// Places every unit into a fresh state for `record`, or gives up on the first miss.
fn attempt_box<'c>(record: &'c BoxRecord, units: &[UnitItem]) -> Option<PackingBox<'c>> {
    let mut packing = PackingBox::new(record);
    for unit in units {
        if !packing.try_insert(unit) {
            return None;
        }
    }
    Some(packing)
}

/// Fits all items into one box.
///
/// # Parameters
/// * `items` - Caller's items; quantities are expanded into units
/// * `catalog` - Candidate boxes
/// * `config` - Scoring configuration
///
/// # Returns
/// The first box in preference order that holds every unit, with the items
/// regrouped. If none does, `success` is false and all items are unfit.
/// An empty item list succeeds with the most preferred box and no items.
///
/// # Errors
/// `PackError::InvalidItem` when a record that contributes units has
/// non-finite or non-positive dimensions or an invalid weight.
/// `PackError::TooManyUnits` when the quantities exceed `config.max_units`.
pub fn pack_single_box(
    items: &[ItemRecord],
    catalog: &BoxCatalog,
    config: &PackingConfig,
) -> Result<SingleBoxOutcome, PackError> {
    for (index, item) in items.iter().enumerate() {
        if item.unit_count() == 0 {
            continue;
        }
        item.validate()
            .map_err(|source| PackError::InvalidItem { index, source })?;
    }

    let requested = total_quantity(items);
    if requested > u64::from(config.max_units) {
        return Err(PackError::TooManyUnits {
            requested,
            limit: config.max_units,
        });
    }

    let units = UnitItem::expand(items);
    let total_weight: f64 = units.iter().map(|u| u.weight).sum();
    let scorer = PreferenceScorer::new(catalog, config);

    for record in scorer.rank(catalog, longest_dimension(&units)) {
        if total_weight > record.max_weight_g {
            continue;
        }
        if let Some(packing) = attempt_box(record, &units) {
            return Ok(SingleBoxOutcome::packed(items, packing));
        }
    }

    Ok(SingleBoxOutcome::unfit(items))
}

/// Fits all items into as few, as compact boxes as the heuristics find.
///
/// A successful single-box result is returned as one shipment unless its box
/// is unnecessarily long (and no [`SingleShipmentPolicy`] applies). Otherwise
/// units are allocated greedily: largest volume first, into the first open
/// box that takes them, else into a newly opened box chosen by preference.
/// Units no catalog box can hold on its own are reported unfit.
pub fn pack_multi_box(
    items: &[ItemRecord],
    catalog: &BoxCatalog,
    config: &PackingConfig,
) -> MultiBoxOutcome {
    let scorer = PreferenceScorer::new(catalog, config);

    match pack_single_box(items, catalog, config) {
        Ok(single) if single.success => {
            if let Some(outcome) = accept_single(items, single, &scorer, config) {
                return outcome;
            }
        }
        Ok(_) => {}
        Err(err) => {
            eprintln!(
                "⚠️ Single-box attempt failed: {}. Falling back to multi-box packing.",
                err
            );
        }
    }

    pack_greedy(items, catalog, &scorer, config)
}

fn accept_single(
    items: &[ItemRecord],
    single: SingleBoxOutcome,
    scorer: &PreferenceScorer<'_>,
    config: &PackingConfig,
) -> Option<MultiBoxOutcome> {
    let record = single.box_record?;
    let units = UnitItem::expand(items);

    if scorer.is_unnecessarily_long(&record, longest_dimension(&units)) {
        let policy = SingleShipmentPolicy::applicable(config, items, &units)?;
        println!(
            "📦 Policy '{}' keeps {} x {} together in '{}'",
            policy.code(),
            units.len(),
            items[units[0].source].label(),
            record.name
        );
    }

    Some(MultiBoxOutcome {
        success: true,
        shipments: vec![Shipment {
            box_record: record,
            packed_items: single.packed_items,
            placements: single.placements,
        }],
        unfit_items: Vec::new(),
    })
}

fn pack_greedy(
    items: &[ItemRecord],
    catalog: &BoxCatalog,
    scorer: &PreferenceScorer<'_>,
    config: &PackingConfig,
) -> MultiBoxOutcome {
    let (mut units, over_limit) = expand_within_limit(items, config.max_units);
    // Stable: equal volumes keep input order.
    units.sort_by(|a, b| b.volume().total_cmp(&a.volume()));

    let mut open: Vec<PackingBox<'_>> = Vec::new();
    let mut unfit: Vec<usize> = Vec::new();

    for unit in &units {
        if items[unit.source].validate().is_err() {
            unfit.push(unit.source);
            continue;
        }

        if open.iter_mut().any(|packing| packing.try_insert(unit)) {
            continue;
        }

        let opened = scorer
            .rank(catalog, unit.longest_side())
            .into_iter()
            .find_map(|record| attempt_box(record, std::slice::from_ref(unit)));
        match opened {
            Some(packing) => open.push(packing),
            None => unfit.push(unit.source),
        }
    }

    let mut unfit_items = group_units(items, unfit);
    unfit_items.extend(over_limit);

    MultiBoxOutcome {
        success: unfit_items.is_empty(),
        shipments: open
            .into_iter()
            .map(|packing| Shipment::from_packing(items, packing))
            .collect(),
        unfit_items,
    }
}

/// Expands records in input order while the running unit total stays within `limit`.
///
/// Records that would exceed it are returned whole instead of being expanded.
fn expand_within_limit(items: &[ItemRecord], limit: u32) -> (Vec<UnitItem>, Vec<ItemRecord>) {
    let mut budget = u64::from(limit);
    let mut units = Vec::new();
    let mut over_limit = Vec::new();

    for (source, item) in items.iter().enumerate() {
        let count = u64::from(item.unit_count());
        if count > budget {
            over_limit.push(item.clone());
            continue;
        }
        budget -= count;
        units.extend(UnitItem::from_record(source, item));
    }

    (units, over_limit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::intersects;
    use crate::types::EPSILON_GENERAL;
    use crate::model::ItemId;

    fn item(id: i64, dims: (f64, f64, f64), weight: f64, quantity: f64) -> ItemRecord {
        ItemRecord::new(Some(ItemId::Number(id)), format!("Item {}", id), dims, weight)
            .with_quantity(quantity)
    }

    fn standard() -> (BoxCatalog, PackingConfig) {
        (BoxCatalog::standard(), PackingConfig::default())
    }

    fn assert_box_invariants(record: &BoxRecord, placements: &[PlacedItem]) {
        let bounds = record.inner_dims();
        let weight: f64 = placements.iter().map(|p| p.weight).sum();
        assert!(
            weight <= record.max_weight_g,
            "box '{}' carries {}g but allows {}g",
            record.name,
            weight,
            record.max_weight_g
        );

        for (i, a) in placements.iter().enumerate() {
            assert!(
                a.bounding_box().within_bounds(&bounds, EPSILON_GENERAL),
                "unit at {:?} with {:?} leaves box '{}'",
                a.position,
                a.dims,
                record.name
            );
            for b in &placements[i + 1..] {
                assert!(
                    !intersects(a, b),
                    "units at {:?} and {:?} overlap in '{}'",
                    a.position,
                    b.position,
                    record.name
                );
            }
        }
    }

    fn assert_multi_invariants(items: &[ItemRecord], outcome: &MultiBoxOutcome) {
        let input = total_quantity(items);
        let packed: u64 = outcome
            .shipments
            .iter()
            .map(|s| total_quantity(&s.packed_items))
            .sum();
        let unfit = total_quantity(&outcome.unfit_items);
        assert_eq!(packed + unfit, input, "quantities must be conserved");

        for shipment in &outcome.shipments {
            assert_box_invariants(&shipment.box_record, &shipment.placements);
            assert_eq!(
                total_quantity(&shipment.packed_items) as usize,
                shipment.placements.len()
            );
        }
        assert_eq!(outcome.success, outcome.unfit_items.is_empty());
    }

    #[test]
    fn small_item_selects_padded_satchel() {
        let (catalog, config) = standard();
        let items = vec![item(1, (10.0, 10.0, 10.0), 50.0, 1.0)];

        let outcome = pack_single_box(&items, &catalog, &config).unwrap();
        assert!(outcome.success);
        let chosen = outcome.box_record.as_ref().unwrap();
        assert_eq!(chosen.name, "Padded Satchel");
        assert_eq!(outcome.packed_items, vec![items[0].clone()]);
        assert!(outcome.unfit_items.is_empty());
        assert_eq!(outcome.placements[0].position, crate::types::Vec3::zero());
    }

    #[test]
    fn long_item_selects_extra_large_box() {
        let (catalog, config) = standard();
        let items = vec![item(1, (1000.0, 20.0, 40.0), 750.0, 1.0)];

        let outcome = pack_single_box(&items, &catalog, &config).unwrap();
        let chosen = outcome.box_record.unwrap();
        assert_eq!(chosen.name, "Extra Large Box");
        assert!(chosen.length_mm >= 1000.0);
        assert_box_invariants(&chosen, &outcome.placements);
    }

    #[test]
    fn oversized_item_is_unfit() {
        let (catalog, config) = standard();
        let items = vec![item(1, (2000.0, 2000.0, 2000.0), 1000.0, 1.0)];

        let outcome = pack_single_box(&items, &catalog, &config).unwrap();
        assert!(!outcome.success);
        assert!(outcome.box_record.is_none());
        assert_eq!(outcome.unfit_items, items);
    }

    #[test]
    fn overweight_item_is_unfit() {
        let (catalog, config) = standard();
        let items = vec![item(1, (10.0, 10.0, 10.0), 30000.0, 1.0)];

        let single = pack_single_box(&items, &catalog, &config).unwrap();
        assert!(!single.success);

        let multi = pack_multi_box(&items, &catalog, &config);
        assert!(!multi.success);
        assert!(multi.shipments.is_empty());
        assert_eq!(multi.unfit_items[0].identity, Some(ItemId::Number(1)));
    }

    #[test]
    fn uniform_long_stock_ships_in_one_box() {
        let (catalog, config) = standard();
        let items = vec![item(1, (1000.0, 20.0, 40.0), 750.0, 20.0)];

        let outcome = pack_multi_box(&items, &catalog, &config);
        assert!(outcome.success);
        assert_eq!(outcome.shipment_count(), 1);
        let shipment = &outcome.shipments[0];
        assert!(shipment.box_record.length_mm >= 1000.0);
        assert_eq!(shipment.packed_items.len(), 1);
        assert_eq!(shipment.packed_items[0].quantity, Some(20.0));
        assert_multi_invariants(&items, &outcome);
    }

    #[test]
    fn uniform_stock_splits_when_policy_disabled() {
        let catalog = BoxCatalog::standard();
        let config = PackingConfig::builder()
            .force_single_for_uniform_stock(false)
            .build();
        let items = vec![item(1, (1000.0, 20.0, 40.0), 750.0, 20.0)];

        let outcome = pack_multi_box(&items, &catalog, &config);
        assert!(outcome.success);
        assert!(outcome.shipment_count() >= 2);
        assert!(
            outcome
                .shipments
                .iter()
                .all(|s| s.box_record.name == "Extra Large Box"),
            "without the policy no extremely long box should be used"
        );
        assert_multi_invariants(&items, &outcome);
    }

    #[test]
    fn empty_input_returns_preferred_box_without_items() {
        let (catalog, config) = standard();

        let single = pack_single_box(&[], &catalog, &config).unwrap();
        assert!(single.success);
        assert_eq!(single.box_record.unwrap().name, "Padded Satchel");
        assert!(single.packed_items.is_empty());

        let multi = pack_multi_box(&[], &catalog, &config);
        assert!(multi.success);
        assert_eq!(multi.shipment_count(), 1);
        assert!(multi.shipments[0].packed_items.is_empty());
    }

    #[test]
    fn empty_catalog_fails_without_panicking() {
        let catalog = BoxCatalog::new(Vec::new()).unwrap();
        let config = PackingConfig::default();
        let items = vec![item(1, (10.0, 10.0, 10.0), 50.0, 2.0)];

        let single = pack_single_box(&items, &catalog, &config).unwrap();
        assert!(!single.success);

        let multi = pack_multi_box(&items, &catalog, &config);
        assert!(!multi.success);
        assert_eq!(total_quantity(&multi.unfit_items), 2);
    }

    #[test]
    fn zero_and_negative_quantities_contribute_nothing() {
        let (catalog, config) = standard();
        let items = vec![
            item(1, (10.0, 10.0, 10.0), 50.0, 0.0),
            item(2, (10.0, 10.0, 10.0), 50.0, -4.0),
            item(3, (10.0, 10.0, 10.0), 50.0, 1.9),
        ];

        let outcome = pack_single_box(&items, &catalog, &config).unwrap();
        assert!(outcome.success);
        assert_eq!(outcome.placements.len(), 1);
        assert_eq!(outcome.packed_items.len(), 1);
        assert_eq!(outcome.packed_items[0].identity, Some(ItemId::Number(3)));
        assert_eq!(outcome.packed_items[0].quantity, Some(1.0));
    }

    #[test]
    fn weight_overflow_opens_additional_boxes() {
        let (catalog, config) = standard();
        let items = vec![item(1, (10.0, 10.0, 10.0), 10000.0, 3.0)];

        let single = pack_single_box(&items, &catalog, &config).unwrap();
        assert!(!single.success, "30kg exceeds every single box");

        let outcome = pack_multi_box(&items, &catalog, &config);
        assert!(outcome.success);
        assert_eq!(outcome.shipment_count(), 2);
        assert_eq!(outcome.shipments[0].box_record.name, "Small Box");
        assert_eq!(total_quantity(&outcome.shipments[0].packed_items), 2);
        assert_eq!(total_quantity(&outcome.shipments[1].packed_items), 1);
        assert_multi_invariants(&items, &outcome);
    }

    #[test]
    fn oversized_item_is_unfit_regardless_of_company() {
        let (catalog, config) = standard();
        let giant = item(99, (3100.0, 200.0, 200.0), 1000.0, 1.0);
        let mut items = vec![
            item(1, (100.0, 50.0, 20.0), 200.0, 3.0),
            item(2, (300.0, 200.0, 100.0), 2000.0, 1.0),
        ];
        items.push(giant.clone());

        let single = pack_single_box(&items, &catalog, &config).unwrap();
        assert!(!single.success);
        assert!(single.unfit_items.contains(&giant));

        let multi = pack_multi_box(&items, &catalog, &config);
        assert!(!multi.success);
        assert_eq!(multi.unfit_items.len(), 1);
        assert_eq!(multi.unfit_items[0].identity, Some(ItemId::Number(99)));
        assert_multi_invariants(&items, &multi);
    }

    #[test]
    fn mixed_order_respects_all_invariants() {
        let (catalog, config) = standard();
        let items = vec![
            item(1, (1000.0, 20.0, 40.0), 750.0, 3.0),
            item(2, (10.0, 10.0, 10.0), 50.0, 25.0),
            item(3, (280.0, 200.0, 100.0), 4000.0, 4.0),
            item(4, (430.0, 330.0, 230.0), 24000.0, 2.0),
            item(5, (60.0, 40.0, 15.0), 120.0, 0.0),
            item(6, (3500.0, 10.0, 10.0), 100.0, 1.0),
        ];

        let outcome = pack_multi_box(&items, &catalog, &config);
        assert_multi_invariants(&items, &outcome);
        assert_eq!(total_quantity(&outcome.unfit_items), 1);
        assert_eq!(outcome.unfit_items[0].identity, Some(ItemId::Number(6)));
    }

    #[test]
    fn single_box_placements_respect_invariants() {
        let (catalog, config) = standard();
        let items = vec![
            item(1, (100.0, 60.0, 40.0), 500.0, 6.0),
            item(2, (50.0, 50.0, 50.0), 300.0, 4.0),
            item(3, (20.0, 15.0, 10.0), 30.0, 10.0),
        ];

        let outcome = pack_single_box(&items, &catalog, &config).unwrap();
        assert!(outcome.success);
        let record = outcome.box_record.as_ref().unwrap();
        assert_box_invariants(record, &outcome.placements);
        assert_eq!(total_quantity(&outcome.packed_items), 20);
    }

    #[test]
    fn repeated_calls_are_deterministic() {
        let (catalog, config) = standard();
        let items = vec![
            item(1, (120.0, 80.0, 60.0), 900.0, 5.0),
            item(2, (1000.0, 20.0, 40.0), 750.0, 2.0),
            item(3, (35.0, 35.0, 35.0), 80.0, 12.0),
        ];

        let first = pack_multi_box(&items, &catalog, &config);
        let second = pack_multi_box(&items, &catalog, &config);
        assert_eq!(first, second);

        let single_a = pack_single_box(&items, &catalog, &config).unwrap();
        let single_b = pack_single_box(&items, &catalog, &config).unwrap();
        assert_eq!(single_a, single_b);
    }

    #[test]
    fn invalid_item_is_an_error_for_single_box_only() {
        let (catalog, config) = standard();
        let items = vec![
            item(1, (10.0, 10.0, 10.0), 50.0, 1.0),
            item(2, (-5.0, 10.0, 10.0), 50.0, 2.0),
        ];

        let err = pack_single_box(&items, &catalog, &config).unwrap_err();
        assert!(matches!(err, PackError::InvalidItem { index: 1, .. }));

        let multi = pack_multi_box(&items, &catalog, &config);
        assert!(!multi.success);
        assert_eq!(total_quantity(&multi.unfit_items), 2);
        assert_eq!(multi.unfit_items[0].identity, Some(ItemId::Number(2)));
        assert_multi_invariants(&items, &multi);
    }

    #[test]
    fn unit_limit_bounds_expansion() {
        let catalog = BoxCatalog::standard();
        let config = PackingConfig::builder().max_units(5).build();
        let items = vec![
            item(1, (10.0, 10.0, 10.0), 1.0, 3.0),
            item(2, (1.0, 1.0, 1.0), 0.0, 1e12),
            item(3, (10.0, 10.0, 10.0), 1.0, 2.0),
            item(4, (10.0, 10.0, 10.0), 1.0, 1.0),
        ];

        let err = pack_single_box(&items, &catalog, &config).unwrap_err();
        assert_eq!(
            err,
            PackError::TooManyUnits {
                requested: 3 + u64::from(u32::MAX) + 2 + 1,
                limit: 5
            }
        );

        let multi = pack_multi_box(&items, &catalog, &config);
        assert!(!multi.success);
        let packed: u64 = multi
            .shipments
            .iter()
            .map(|s| total_quantity(&s.packed_items))
            .sum();
        assert_eq!(packed, 5, "records are taken in order until the limit is reached");
        assert_eq!(multi.unfit_items.len(), 2);
        assert_eq!(multi.unfit_items[0].identity, Some(ItemId::Number(2)));
        assert_eq!(multi.unfit_items[0].quantity, Some(1e12), "reported whole");
        assert_eq!(multi.unfit_items[1].identity, Some(ItemId::Number(4)));
    }

    #[test]
    fn orders_within_unit_limit_are_unaffected() {
        let catalog = BoxCatalog::standard();
        let config = PackingConfig::builder().max_units(4).build();
        let items = vec![item(1, (10.0, 10.0, 10.0), 1.0, 4.0)];

        let single = pack_single_box(&items, &catalog, &config).unwrap();
        assert!(single.success);
        assert_eq!(single.placements.len(), 4);
    }

    #[test]
    fn weight_limit_has_no_tolerance() {
        let (catalog, config) = standard();
        let items = vec![item(1, (10.0, 10.0, 10.0), 300.0000009, 1.0)];

        let single = pack_single_box(&items, &catalog, &config).unwrap();
        assert!(single.success);
        assert_ne!(
            single.box_record.as_ref().map(|b| b.name.as_str()),
            Some("Padded Satchel"),
            "a 300g box must not take more than 300g"
        );

        let satchel = &catalog.boxes()[0];
        let unit = UnitItem::expand(&items)[0];
        let mut packing = PackingBox::new(satchel);
        assert!(!packing.try_insert(&unit));

        let exact = UnitItem {
            weight: 300.0,
            ..unit
        };
        assert!(packing.try_insert(&exact), "the limit itself is allowed");
        assert_eq!(packing.remaining_weight(), 0.0);
    }

    #[test]
    fn abandoned_attempt_leaves_no_trace() {
        let record = BoxRecord::new(1, "Tiny", (20.0, 10.0, 10.0), 100.0).unwrap();
        let units = vec![
            UnitItem {
                source: 0,
                dims: crate::types::Vec3::new(10.0, 10.0, 10.0),
                weight: 60.0,
            };
            2
        ];

        assert!(attempt_box(&record, &units).is_none(), "second unit exceeds the weight limit");

        let mut packing = PackingBox::new(&record);
        assert!(packing.try_insert(&units[0]));
        assert!(!packing.try_insert(&units[1]));
        assert_eq!(packing.placed().len(), 1);
        assert!((packing.remaining_weight() - 40.0).abs() < EPSILON_GENERAL);
        assert!((packing.total_weight() - 60.0).abs() < EPSILON_GENERAL);
    }

    #[test]
    fn insert_rotates_unit_to_fit() {
        let record = BoxRecord::new(1, "Flat", (100.0, 80.0, 20.0), 300.0).unwrap();
        let unit = UnitItem {
            source: 0,
            dims: crate::types::Vec3::new(15.0, 70.0, 90.0),
            weight: 10.0,
        };

        let mut packing = PackingBox::new(&record);
        assert!(packing.try_insert(&unit));
        let placed = packing.placed()[0];
        assert!(placed.dims.fits_within(&record.inner_dims(), EPSILON_GENERAL));
        assert_eq!(packing.extreme_points().points()[0].y, 0.0);
    }

    #[test]
    fn builder_overrides_defaults() {
        let config = PackingConfig::builder()
            .preferred_length_mm(1000.0)
            .extreme_length_mm(2000.0)
            .length_penalty_exponent(2.0)
            .extreme_penalty_exponent(8.0)
            .build();
        assert_eq!(config.preferred_length_mm, 1000.0);
        assert_eq!(config.extreme_length_mm, 2000.0);
        assert_eq!(config.length_penalty_exponent, 2.0);
        assert_eq!(config.extreme_penalty_exponent, 8.0);
        assert!(config.force_single_for_uniform_stock);
    }

    #[test]
    fn policy_requires_several_units_of_one_item() {
        let config = PackingConfig::default();
        let one = vec![item(1, (10.0, 10.0, 10.0), 1.0, 1.0)];
        let many = vec![item(1, (10.0, 10.0, 10.0), 1.0, 3.0)];
        let mixed = vec![
            item(1, (10.0, 10.0, 10.0), 1.0, 2.0),
            item(2, (10.0, 10.0, 10.0), 1.0, 2.0),
        ];

        let applies = |items: &[ItemRecord]| {
            SingleShipmentPolicy::applicable(&config, items, &UnitItem::expand(items))
        };
        assert_eq!(applies(&one), None);
        assert_eq!(applies(&many), Some(SingleShipmentPolicy::UniformStock));
        assert_eq!(applies(&mixed), None);
        assert_eq!(SingleShipmentPolicy::UniformStock.code(), "uniform_stock");
    }
}
