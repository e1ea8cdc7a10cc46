//! Extreme point tracking for a single box.
//!
//! Extreme points are candidate "bottom-left-back" anchors for the next unit.
//! The set starts with the box origin. After every insertion the anchors the
//! new unit now occupies are dropped and three new anchors are derived from
//! its far faces. Only the latest unit's faces are used, not an exhaustive
//! support-point enumeration.

use crate::model::PlacedItem;
use crate::types::{EPSILON_GENERAL, Vec3};

/// Deduplicated, ordered set of anchor points.
///
/// Points are kept sorted by height, then horizontal position, then depth,
/// so iteration fills low and near positions first.
#[derive(Clone, Debug)]
pub struct ExtremePointTracker {
    bounds: Vec3,
    points: Vec<Vec3>,
}

impl ExtremePointTracker {
    /// Creates a tracker for a box with the given inner dimensions.
    pub fn new(bounds: Vec3) -> Self {
        Self {
            bounds,
            points: vec![Vec3::zero()],
        }
    }

    /// Current anchors in placement order.
    pub fn points(&self) -> &[Vec3] {
        &self.points
    }

    /// Updates the anchors after `placed` was committed.
    pub fn record_placement(&mut self, placed: &PlacedItem) {
        let occupied = placed.bounding_box();
        let Vec3 { x, y, z } = placed.position;
        let far = occupied.max;

        self.points.retain(|p| !occupied.occupies_point(p));

        let derived = [
            Vec3::new(far.x, y, z),
            Vec3::new(x, far.y, z),
            Vec3::new(x, y, far.z),
        ];
        for point in derived {
            // Anchors on or past a wall can never host a unit with positive extent.
            if point.x < self.bounds.x - EPSILON_GENERAL
                && point.y < self.bounds.y - EPSILON_GENERAL
                && point.z < self.bounds.z - EPSILON_GENERAL
            {
                self.points.push(point);
            }
        }

        self.points.sort_by(|a, b| a.cmp_height_first(b));
        self.points.dedup_by(|a, b| a == b);
    }
}
