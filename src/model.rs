//! Data models for the box selection engine.
//!
//! This module defines the records exchanged with callers and the small
//! value types the packer works with internally:
//! - `ItemRecord`: an item as supplied by the caller (with an optional quantity)
//! - `BoxRecord`: a catalog box with its inner dimensions and weight limit
//! - `UnitItem`: a single physical unit expanded from an `ItemRecord`
//! - `PlacedItem`: a unit with its chosen orientation and position inside a box

use std::fmt;

use serde::{Deserialize, Serialize, Serializer};
#[allow(unused_imports)]
use serde_json::json;
use utoipa::ToSchema;

use crate::types::{BoundingBox, Dimensional, Vec3, Weighted};

/// Validation error for item, box and catalog data.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    InvalidDimension(String),
    InvalidWeight(String),
    InvalidConfiguration(String),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::InvalidDimension(msg) => write!(f, "Invalid dimension: {}", msg),
            ValidationError::InvalidWeight(msg) => write!(f, "Invalid weight: {}", msg),
            ValidationError::InvalidConfiguration(msg) => {
                write!(f, "Invalid configuration: {}", msg)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

fn validate_dimension(value: f64, name: &str) -> Result<(), ValidationError> {
    if value <= 0.0 || value.is_nan() || value.is_infinite() {
        return Err(ValidationError::InvalidDimension(format!(
            "{} must be positive, got: {}",
            name, value
        )));
    }
    Ok(())
}

fn validate_dims(dims: (f64, f64, f64), owner: &str) -> Result<(), ValidationError> {
    validate_dimension(dims.0, &format!("{} length", owner))?;
    validate_dimension(dims.1, &format!("{} width", owner))?;
    validate_dimension(dims.2, &format!("{} height", owner))?;
    Ok(())
}

/// Caller-supplied identity of an item.
///
/// Item services hand out numeric keys, invoice imports produce SKUs, so both
/// shapes are accepted on the wire.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum ItemId {
    Number(i64),
    Text(String),
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemId::Number(n) => write!(f, "{}", n),
            ItemId::Text(s) => write!(f, "{}", s),
        }
    }
}

/// An item to ship, as supplied by the caller.
///
/// Dimensions are millimetres, weight is grams. `quantity` defaults to 1 when
/// absent; fractional values are floored and negative values count as 0.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "identity": 17,
    "name": "Aluminium rail",
    "length_mm": 1000.0,
    "width_mm": 20.0,
    "height_mm": 40.0,
    "weight_g": 750.0,
    "quantity": 2
}))]
pub struct ItemRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity: Option<ItemId>,
    #[serde(default)]
    pub name: String,
    pub length_mm: f64,
    pub width_mm: f64,
    pub height_mm: f64,
    pub weight_g: f64,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_quantity"
    )]
    pub quantity: Option<f64>,
}

/// Largest integer an `f64` represents exactly.
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Writes whole-number quantities as JSON integers, anything else as a float.
fn serialize_quantity<S>(quantity: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match *quantity {
        Some(q) if q.fract() == 0.0 && q.abs() <= MAX_EXACT_INTEGER => {
            serializer.serialize_some(&(q as i64))
        }
        other => other.serialize(serializer),
    }
}

impl ItemRecord {
    /// Creates an item with quantity 1.
    pub fn new(
        identity: Option<ItemId>,
        name: impl Into<String>,
        dims: (f64, f64, f64),
        weight_g: f64,
    ) -> Self {
        Self {
            identity,
            name: name.into(),
            length_mm: dims.0,
            width_mm: dims.1,
            height_mm: dims.2,
            weight_g,
            quantity: None,
        }
    }

    /// Sets the requested quantity (Builder pattern light).
    pub fn with_quantity(mut self, quantity: f64) -> Self {
        self.quantity = Some(quantity);
        self
    }

    /// Number of physical units this record stands for.
    ///
    /// # Examples
    /// ```
    /// use parcel_packer::model::ItemRecord;
    ///
    /// let item = ItemRecord::new(None, "Bolt", (10.0, 10.0, 10.0), 5.0);
    /// assert_eq!(item.unit_count(), 1);
    /// assert_eq!(item.clone().with_quantity(2.7).unit_count(), 2);
    /// assert_eq!(item.with_quantity(-3.0).unit_count(), 0);
    /// ```
    pub fn unit_count(&self) -> u32 {
        match self.quantity {
            None => 1,
            Some(q) if q.is_nan() || q <= 0.0 => 0,
            // `as` saturates for values beyond u32::MAX
            Some(q) => q.floor() as u32,
        }
    }

    /// Raw (length, width, height) measurements.
    pub fn dims(&self) -> (f64, f64, f64) {
        (self.length_mm, self.width_mm, self.height_mm)
    }

    /// Checks that all measurements are usable for placement.
    ///
    /// Weight may be zero but not negative.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_dims(self.dims(), "Item")?;
        if self.weight_g < 0.0 || !self.weight_g.is_finite() {
            return Err(ValidationError::InvalidWeight(format!(
                "Item weight must be zero or positive, got: {}",
                self.weight_g
            )));
        }
        Ok(())
    }

    /// Human-readable label for log lines.
    pub fn label(&self) -> String {
        match (&self.identity, self.name.is_empty()) {
            (Some(id), true) => format!("#{}", id),
            (Some(id), false) => format!("#{} {}", id, self.name),
            (None, _) => self.name.clone(),
        }
    }
}

impl Dimensional for ItemRecord {
    fn dimensions(&self) -> Vec3 {
        Vec3::new(self.length_mm, self.width_mm, self.height_mm)
    }
}

impl Weighted for ItemRecord {
    fn weight(&self) -> f64 {
        self.weight_g
    }
}

/// A shipping box from the catalog.
///
/// Inner space maps onto placement axes as x = width, y = height, z = length.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "identity": 5,
    "name": "Bigger Box",
    "length_mm": 440.0,
    "width_mm": 340.0,
    "height_mm": 240.0,
    "max_weight_g": 25000.0
}))]
pub struct BoxRecord {
    pub identity: u32,
    pub name: String,
    pub length_mm: f64,
    pub width_mm: f64,
    pub height_mm: f64,
    pub max_weight_g: f64,
}

impl BoxRecord {
    /// Creates a new box after validating the parameters.
    pub fn new(
        identity: u32,
        name: impl Into<String>,
        dims: (f64, f64, f64),
        max_weight_g: f64,
    ) -> Result<Self, ValidationError> {
        let record = Self {
            identity,
            name: name.into(),
            length_mm: dims.0,
            width_mm: dims.1,
            height_mm: dims.2,
            max_weight_g,
        };
        record.validate()?;
        Ok(record)
    }

    /// Validates dimensions and weight limit.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_dims(
            (self.length_mm, self.width_mm, self.height_mm),
            &format!("Box '{}'", self.name),
        )?;
        if self.max_weight_g <= 0.0 || !self.max_weight_g.is_finite() {
            return Err(ValidationError::InvalidWeight(format!(
                "Box '{}' max weight must be positive, got: {}",
                self.name, self.max_weight_g
            )));
        }
        Ok(())
    }

    /// Inner dimensions in placement axes (width, height, length).
    #[inline]
    pub fn inner_dims(&self) -> Vec3 {
        Vec3::new(self.width_mm, self.height_mm, self.length_mm)
    }
}

impl Dimensional for BoxRecord {
    fn dimensions(&self) -> Vec3 {
        self.inner_dims()
    }
}

/// A single physical unit expanded from an `ItemRecord`.
///
/// `source` indexes the caller's item slice so results can be regrouped.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UnitItem {
    pub source: usize,
    /// Raw (length, width, height) measurements
    pub dims: Vec3,
    pub weight: f64,
}

impl UnitItem {
    /// Expands every record into `unit_count()` units, in input order.
    pub fn expand(items: &[ItemRecord]) -> Vec<UnitItem> {
        items
            .iter()
            .enumerate()
            .flat_map(|(source, item)| Self::from_record(source, item))
            .collect()
    }

    /// The `unit_count()` units of one record; `source` is its index in the caller's slice.
    pub fn from_record(
        source: usize,
        item: &ItemRecord,
    ) -> impl Iterator<Item = UnitItem> + use<> {
        let unit = UnitItem {
            source,
            dims: item.dimensions(),
            weight: item.weight_g,
        };
        std::iter::repeat_n(unit, item.unit_count() as usize)
    }
}

impl Dimensional for UnitItem {
    fn dimensions(&self) -> Vec3 {
        self.dims
    }
}

impl Weighted for UnitItem {
    fn weight(&self) -> f64 {
        self.weight
    }
}

/// A unit with its orientation and position inside a box.
///
/// # Fields
/// * `source` - Index of the originating `ItemRecord`
/// * `dims` - Oriented extents in placement axes
/// * `position` - Minimum corner inside the box
/// * `weight` - Weight in grams
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlacedItem {
    pub source: usize,
    pub dims: Vec3,
    pub position: Vec3,
    pub weight: f64,
}

impl PlacedItem {
    /// Calculates the bounding box of the placed unit.
    #[inline]
    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::from_position_and_dims(self.position, self.dims)
    }
}

impl Dimensional for PlacedItem {
    fn dimensions(&self) -> Vec3 {
        self.dims
    }
}

impl Weighted for PlacedItem {
    fn weight(&self) -> f64 {
        self.weight
    }
}
