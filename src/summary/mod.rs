//! Grouping and averaging of normalized readings.
//!
//! Readings are partitioned by province, sensor type and unit, each group is
//! checked for consistency, and every consistent group is reduced to one
//! [`AverageProvinceData`] row.

pub mod aggregate;
pub mod consistency;
pub mod grouping;
pub mod types;
pub mod utility;

pub use aggregate::{aggregate, aggregate_all};
pub use consistency::check_consistency;
pub use grouping::group;
pub use types::{AverageProvinceData, GroupFailure, GroupKey, ProvinceGroup};
