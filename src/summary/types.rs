//! Data types used by the grouping and aggregation stages.

use serde::{Deserialize, Serialize};

use crate::error::Violations;
use crate::reading::{ConsistentReading, Unit};

/// Composite key readings are grouped by.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupKey {
    pub province: String,
    pub sensor_type_name: String,
    pub unit: Unit,
}

impl GroupKey {
    pub fn of(reading: &ConsistentReading) -> Self {
        Self {
            province: reading.province().to_string(),
            sensor_type_name: reading.sensor_type_name().to_string(),
            unit: reading.unit(),
        }
    }
}

/// Readings for one province and sensor type, in input order.
///
/// Members are expected to share province, sensor type and unit; this is
/// checked before aggregation rather than assumed.
#[derive(Debug, Clone, PartialEq)]
pub struct ProvinceGroup {
    pub province: String,
    pub sensor_type_name: String,
    pub readings: Vec<ConsistentReading>,
}

impl ProvinceGroup {
    pub fn new(
        province: impl Into<String>,
        sensor_type_name: impl Into<String>,
        readings: Vec<ConsistentReading>,
    ) -> Self {
        Self {
            province: province.into(),
            sensor_type_name: sensor_type_name.into(),
            readings,
        }
    }
}

/// One row of the summary output.
///
/// Field order is the column order of the exported CSV.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AverageProvinceData {
    pub province: String,
    pub sensor_type_name: String,
    pub average_value: f64,
    pub unit: Unit,
    pub average_days_of_measure: i64,
}

/// A group that could not be aggregated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupFailure {
    pub province: String,
    pub sensor_type_name: String,
    pub violations: Violations,
}
