//! Regrouping of unit items into quantity-bearing records.
//!
//! The packer works on single units; callers expect their own item records
//! back with a quantity. Units are grouped by identity (or name, when no
//! identity was given) together with the length/width/height triple.

use std::collections::HashMap;

use crate::model::{ItemId, ItemRecord};

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
enum KeyLabel {
    Identity(ItemId),
    Name(String),
}

/// Grouping key of an item record.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct GroupKey {
    label: KeyLabel,
    dims: [u64; 3],
}

impl GroupKey {
    pub fn of(item: &ItemRecord) -> Self {
        let label = match &item.identity {
            Some(id) => KeyLabel::Identity(id.clone()),
            None => KeyLabel::Name(item.name.clone()),
        };
        Self {
            label,
            dims: [
                item.length_mm.to_bits(),
                item.width_mm.to_bits(),
                item.height_mm.to_bits(),
            ],
        }
    }
}

/// Builds one record per distinct key from the given unit sources.
///
/// `sources` are indices into `items`, one per unit. Groups appear in the order
/// their first unit appears; metadata is taken from that first unit's record.
pub fn group_units<I>(items: &[ItemRecord], sources: I) -> Vec<ItemRecord>
where
    I: IntoIterator<Item = usize>,
{
    let mut index: HashMap<GroupKey, usize> = HashMap::new();
    let mut groups: Vec<(usize, u32)> = Vec::new();

    for source in sources {
        let key = GroupKey::of(&items[source]);
        match index.get(&key) {
            Some(&slot) => groups[slot].1 += 1,
            None => {
                index.insert(key, groups.len());
                groups.push((source, 1));
            }
        }
    }

    groups
        .into_iter()
        .map(|(source, count)| items[source].clone().with_quantity(f64::from(count)))
        .collect()
}

/// Number of distinct grouping keys among the given unit sources.
pub fn distinct_keys<I>(items: &[ItemRecord], sources: I) -> usize
where
    I: IntoIterator<Item = usize>,
{
    let mut seen = std::collections::HashSet::new();
    for source in sources {
        seen.insert(GroupKey::of(&items[source]));
    }
    seen.len()
}

/// Total quantity across grouped records (absent quantity counts as one).
pub fn total_quantity(records: &[ItemRecord]) -> u64 {
    records.iter().map(|r| u64::from(r.unit_count())).sum()
}
