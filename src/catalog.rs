//! The box catalog: the fixed table of shipping boxes the packer chooses from.
//!
//! A catalog is an immutable value handed to the packer on every call. The
//! service loads it once at startup (optionally from a JSON file) and shares it
//! behind an `Arc`.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::model::{BoxRecord, ValidationError};

/// Errors while loading a catalog from disk.
#[derive(Debug)]
pub enum CatalogError {
    Io(std::io::Error),
    Parse(serde_json::Error),
    Invalid(ValidationError),
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogError::Io(err) => write!(f, "could not read catalog file: {}", err),
            CatalogError::Parse(err) => write!(f, "could not parse catalog file: {}", err),
            CatalogError::Invalid(err) => write!(f, "catalog rejected: {}", err),
        }
    }
}

impl std::error::Error for CatalogError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CatalogError::Io(err) => Some(err),
            CatalogError::Parse(err) => Some(err),
            CatalogError::Invalid(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for CatalogError {
    fn from(err: std::io::Error) -> Self {
        CatalogError::Io(err)
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(err: serde_json::Error) -> Self {
        CatalogError::Parse(err)
    }
}

impl From<ValidationError> for CatalogError {
    fn from(err: ValidationError) -> Self {
        CatalogError::Invalid(err)
    }
}

/// Read-only, ordered list of candidate boxes.
#[derive(Clone, Debug, PartialEq)]
pub struct BoxCatalog {
    boxes: Vec<BoxRecord>,
}

/// (name, length, width, height, max weight)
const STANDARD_BOXES: [(&str, f64, f64, f64, f64); 9] = [
    ("Padded Satchel", 100.0, 80.0, 20.0, 300.0),
    ("Small Satchel", 240.0, 150.0, 100.0, 5000.0),
    ("Small Box", 190.0, 150.0, 100.0, 25000.0),
    ("Medium Box", 290.0, 290.0, 190.0, 25000.0),
    ("Bigger Box", 440.0, 340.0, 240.0, 25000.0),
    ("Large Box", 500.0, 100.0, 100.0, 25000.0),
    ("Extra Large Box", 1150.0, 100.0, 100.0, 25000.0),
    ("XXL Box", 1570.0, 100.0, 100.0, 25000.0),
    ("3m Box", 3050.0, 150.0, 150.0, 25000.0),
];

impl BoxCatalog {
    /// Creates a catalog after validating every entry.
    ///
    /// Identities must be unique so results can refer back to catalog entries.
    pub fn new(boxes: Vec<BoxRecord>) -> Result<Self, ValidationError> {
        for (idx, record) in boxes.iter().enumerate() {
            record.validate()?;
            if boxes[..idx].iter().any(|b| b.identity == record.identity) {
                return Err(ValidationError::InvalidConfiguration(format!(
                    "duplicate box identity {}",
                    record.identity
                )));
            }
        }
        Ok(Self { boxes })
    }

    /// The nine standard boxes, from the padded satchel up to the 3m box.
    pub fn standard() -> Self {
        let boxes = STANDARD_BOXES
            .iter()
            .enumerate()
            .map(|(idx, &(name, length, width, height, max_weight))| BoxRecord {
                identity: idx as u32 + 1,
                name: name.to_string(),
                length_mm: length,
                width_mm: width,
                height_mm: height,
                max_weight_g: max_weight,
            })
            .collect();
        Self { boxes }
    }

    /// Parses a JSON array of box records.
    pub fn from_json(raw: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_json::from_str(raw)?;
        let boxes = match file {
            CatalogFile::Bare(boxes) => boxes,
            CatalogFile::Wrapped { boxes } => boxes,
        };
        Ok(Self::new(boxes)?)
    }

    /// Loads a catalog file (see `from_json` for the accepted shapes).
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let raw = fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    pub fn boxes(&self) -> &[BoxRecord] {
        &self.boxes
    }

    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    /// Length of the longest box whose length stays at or below `threshold`.
    ///
    /// Used to decide whether an item genuinely needs an extremely long box.
    pub fn longest_length_up_to(&self, threshold: f64) -> Option<f64> {
        self.boxes
            .iter()
            .map(|b| b.length_mm)
            .filter(|&length| length <= threshold)
            .reduce(f64::max)
    }
}

impl Default for BoxCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

/// Accepts either `[...]` or `{"boxes": [...]}`.
#[derive(Deserialize)]
#[serde(untagged)]
enum CatalogFile {
    Bare(Vec<BoxRecord>),
    Wrapped { boxes: Vec<BoxRecord> },
}
