//! Geometrische Hilfsfunktionen für Orientierungen und Platzierungsprüfung.
//!
//! Dieses Modul erzeugt die achsparallelen Orientierungen eines Artikels und
//! prüft, ob eine Orientierung an einer Kandidatenposition in eine Box passt,
//! ohne bereits platzierte Artikel zu überschneiden.

use crate::model::PlacedItem;
use crate::types::{BoundingBox, EPSILON_GENERAL, Vec3};

/// Anzahl der achsparallelen Orientierungen eines Quaders.
pub const ORIENTATION_COUNT: usize = 6;

/// Erzeugt die 6 Orientierungen eines Artikels.
///
/// Jede Orientierung ordnet (Länge, Breite, Höhe) den Box-Achsen
/// (x = Breite, y = Höhe, z = Länge) zu. Weitere Drehungen ändern die
/// Bounding Box eines Quaders nicht, daher genügen 6 statt 24.
///
/// Die Reihenfolge ist fest, da der Packer die erste passende Orientierung nimmt.
///
/// # Beispiel
/// ```
/// use parcel_packer::geometry::orientations;
/// use parcel_packer::types::Vec3;
///
/// let all = orientations(Vec3::new(1.0, 2.0, 3.0));
/// assert_eq!(all[0], Vec3::new(1.0, 2.0, 3.0));
/// assert_eq!(all[3], Vec3::new(2.0, 3.0, 1.0));
/// ```
pub fn orientations(dims: Vec3) -> [Vec3; ORIENTATION_COUNT] {
    let Vec3 { x: l, y: w, z: h } = dims;
    [
        Vec3::new(l, w, h),
        Vec3::new(l, h, w),
        Vec3::new(w, l, h),
        Vec3::new(w, h, l),
        Vec3::new(h, l, w),
        Vec3::new(h, w, l),
    ]
}

/// Prüft, ob zwei platzierte Artikel sich räumlich überschneiden.
///
/// Verwendet Axis-Aligned Bounding Box (AABB) Kollisionserkennung.
/// Zwei Boxen überschneiden sich NICHT, wenn sie in mindestens einer Achse getrennt sind.
pub fn intersects(a: &PlacedItem, b: &PlacedItem) -> bool {
    a.bounding_box().intersects(&b.bounding_box())
}

/// Platzierungstest für eine Orientierung an einer Kandidatenposition.
///
/// # Parameter
/// * `bounds` - Innenmaße der Box in Box-Achsen
/// * `position` - Kandidatenposition (untere, linke, hintere Ecke)
/// * `dims` - Orientierte Maße des Artikels
/// * `placed` - Bereits platzierte Artikel derselben Box
///
/// # Rückgabewert
/// `true`, wenn der Artikel innerhalb der Box liegt und nichts überschneidet.
/// Kosten: O(k) für k bereits platzierte Artikel.
pub fn fits_at(bounds: Vec3, position: Vec3, dims: Vec3, placed: &[PlacedItem]) -> bool {
    let candidate = BoundingBox::from_position_and_dims(position, dims);
    if !candidate.within_bounds(&bounds, EPSILON_GENERAL) {
        return false;
    }

    !placed
        .iter()
        .any(|p| p.bounding_box().intersects(&candidate))
}
