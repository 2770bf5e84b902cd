use std::collections::HashMap;

use crate::reading::ConsistentReading;
use crate::summary::types::{GroupKey, ProvinceGroup};

/// Partitions `readings` by [`GroupKey`].
///
/// Groups come out in order of first appearance and keep their members in
/// input order, so the same input always produces the same output.
pub fn group(readings: Vec<ConsistentReading>) -> Vec<ProvinceGroup> {
    let mut slots: HashMap<GroupKey, usize> = HashMap::new();
    let mut groups: Vec<ProvinceGroup> = Vec::new();

    for reading in readings {
        let key = GroupKey::of(&reading);

        match slots.get(&key) {
            Some(&slot) => groups[slot].readings.push(reading),
            None => {
                let group = ProvinceGroup::new(
                    key.province.clone(),
                    key.sensor_type_name.clone(),
                    vec![reading],
                );
                slots.insert(key, groups.len());
                groups.push(group);
            }
        }
    }

    groups
}
