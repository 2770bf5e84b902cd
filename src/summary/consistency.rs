use crate::reading::ConsistentReading;
use crate::summary::types::ProvinceGroup;

pub const EMPTY_GROUP: &str = "ProvinceData contains no readings.";
pub const INCONSISTENT_PROVINCES: &str = "Inconsistent provinces in readings.";
pub const INCONSISTENT_UNITS: &str = "Inconsistent units in readings.";
pub const INCONSISTENT_SENSOR_NAMES: &str = "Inconsistent sensor names in readings.";

/// Checks that every member of `group` shares province, unit and sensor type.
///
/// An empty group yields only [`EMPTY_GROUP`]. Otherwise each mismatch is
/// reported independently, in that order.
pub fn check_consistency(group: &ProvinceGroup) -> Vec<String> {
    let Some((first, rest)) = group.readings.split_first() else {
        return vec![EMPTY_GROUP.to_string()];
    };

    let mut violations = Vec::new();

    if !all_match(rest, |r| r.province() == first.province()) {
        violations.push(INCONSISTENT_PROVINCES.to_string());
    }
    if !all_match(rest, |r| r.unit() == first.unit()) {
        violations.push(INCONSISTENT_UNITS.to_string());
    }
    if !all_match(rest, |r| r.sensor_type_name() == first.sensor_type_name()) {
        violations.push(INCONSISTENT_SENSOR_NAMES.to_string());
    }

    violations
}

fn all_match(readings: &[ConsistentReading], same: impl Fn(&ConsistentReading) -> bool) -> bool {
    readings.iter().all(same)
}
