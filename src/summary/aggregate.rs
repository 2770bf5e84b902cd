use crate::error::{Outcome, Violations};
use crate::summary::consistency::{EMPTY_GROUP, check_consistency};
use crate::summary::types::{AverageProvinceData, GroupFailure, ProvinceGroup};
use crate::summary::utility::{mean, round_to};

/// Decimal places kept in [`AverageProvinceData::average_value`].
const VALUE_DECIMALS: i32 = 2;

/// Reduces a consistent group to a single [`AverageProvinceData`].
///
/// The average value is rounded half away from zero to two decimals; the
/// average measurement duration is truncated toward zero.
///
/// # Errors
///
/// Returns the consistency violations when the group's members disagree or
/// the group is empty.
pub fn aggregate(group: &ProvinceGroup) -> Outcome<AverageProvinceData> {
    if let Some(violations) = Violations::from_messages(check_consistency(group)) {
        return Err(violations);
    }
    let Some(first) = group.readings.first() else {
        return Err(Violations::single(EMPTY_GROUP));
    };

    let values: Vec<f64> = group.readings.iter().map(|r| r.value() as f64).collect();
    let days: Vec<f64> = group
        .readings
        .iter()
        .map(|r| r.days_of_measure() as f64)
        .collect();

    Ok(AverageProvinceData {
        province: first.province().to_string(),
        sensor_type_name: first.sensor_type_name().to_string(),
        average_value: round_to(mean(&values), VALUE_DECIMALS),
        unit: first.unit(),
        average_days_of_measure: mean(&days).trunc() as i64,
    })
}

/// Aggregates every group, collecting failures instead of stopping at the first.
pub fn aggregate_all(groups: &[ProvinceGroup]) -> (Vec<AverageProvinceData>, Vec<GroupFailure>) {
    let mut averages = Vec::new();
    let mut failures = Vec::new();

    for group in groups {
        match aggregate(group) {
            Ok(average) => averages.push(average),
            Err(violations) => failures.push(GroupFailure {
                province: group.province.clone(),
                sensor_type_name: group.sensor_type_name.clone(),
                violations,
            }),
        }
    }

    (averages, failures)
}
