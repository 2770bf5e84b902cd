//! Sensor reading entities and the normalizer that turns a parsed row into a
//! validated, unit-normalized reading.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Outcome, Violations};
use crate::validate::{self, UNIT_NOT_SUPPORTED};

/// Concentration units accepted in the input files.
///
/// Serializes as the human-readable symbol (`"µg/m³"`), which is also the
/// form used in the source files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Unit {
    #[serde(rename = "ng/m³")]
    NgM3,
    #[serde(rename = "mg/m³")]
    MgM3,
    #[serde(rename = "µg/m³", alias = "μg/m³")]
    UgM3,
}

impl Unit {
    pub const ALL: [Unit; 3] = [Unit::NgM3, Unit::MgM3, Unit::UgM3];

    /// Translates a display symbol into a unit. The Greek small letter mu is
    /// accepted in place of the micro sign.
    pub fn from_symbol(symbol: &str) -> Option<Unit> {
        match symbol.trim() {
            "ng/m³" => Some(Unit::NgM3),
            "mg/m³" => Some(Unit::MgM3),
            "µg/m³" | "μg/m³" => Some(Unit::UgM3),
            _ => None,
        }
    }

    /// Human-readable symbol, e.g. `mg/m³`.
    pub fn symbol(&self) -> &'static str {
        match self {
            Unit::NgM3 => "ng/m³",
            Unit::MgM3 => "mg/m³",
            Unit::UgM3 => "µg/m³",
        }
    }

    /// Enumerated key, e.g. `mg_m3`.
    pub fn key(&self) -> &'static str {
        match self {
            Unit::NgM3 => "ng_m3",
            Unit::MgM3 => "mg_m3",
            Unit::UgM3 => "µg_m3",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// One parsed input row, before any business rule has been applied.
#[derive(Debug, Clone, PartialEq)]
pub struct RawReading {
    pub sensor_id: i64,
    pub sensor_type_name: String,
    pub unit: String,
    pub station_id: i64,
    pub station_name: String,
    pub value: i64,
    pub province: String,
    pub city: String,
    pub is_historic: bool,
    pub start_date: NaiveDate,
    pub stop_date: Option<NaiveDate>,
    pub utm_north: i64,
    pub utm_east: i64,
    pub latitude: String,
    pub longitude: String,
}

/// A reading that passed validation, with its unit translated and its
/// measurement duration computed. Only obtainable through [`normalize`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConsistentReading {
    sensor_id: i64,
    sensor_type_name: String,
    unit: Unit,
    station_id: i64,
    station_name: String,
    value: i64,
    province: String,
    city: String,
    is_historic: bool,
    start_date: NaiveDate,
    stop_date: Option<NaiveDate>,
    utm_north: i64,
    utm_east: i64,
    latitude: String,
    longitude: String,
    days_of_measure: i64,
}

impl ConsistentReading {
    pub fn sensor_id(&self) -> i64 {
        self.sensor_id
    }

    pub fn sensor_type_name(&self) -> &str {
        &self.sensor_type_name
    }

    pub fn unit(&self) -> Unit {
        self.unit
    }

    pub fn station_id(&self) -> i64 {
        self.station_id
    }

    pub fn station_name(&self) -> &str {
        &self.station_name
    }

    pub fn value(&self) -> i64 {
        self.value
    }

    pub fn province(&self) -> &str {
        &self.province
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    pub fn is_historic(&self) -> bool {
        self.is_historic
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    pub fn stop_date(&self) -> Option<NaiveDate> {
        self.stop_date
    }

    pub fn utm_north(&self) -> i64 {
        self.utm_north
    }

    pub fn utm_east(&self) -> i64 {
        self.utm_east
    }

    pub fn latitude(&self) -> &str {
        &self.latitude
    }

    pub fn longitude(&self) -> &str {
        &self.longitude
    }

    /// Days between start and stop date; 0 while the sensor is still active.
    pub fn days_of_measure(&self) -> i64 {
        self.days_of_measure
    }
}

impl TryFrom<RawReading> for ConsistentReading {
    type Error = Violations;

    fn try_from(raw: RawReading) -> Outcome<Self> {
        let unit = Unit::from_symbol(&raw.unit);
        let violations = Violations::from_messages(validate::check(&raw, unit.is_some()));

        let unit = match (violations, unit) {
            (None, Some(unit)) => unit,
            (Some(violations), _) => return Err(violations),
            (None, None) => return Err(Violations::single(UNIT_NOT_SUPPORTED)),
        };

        let days_of_measure = raw
            .stop_date
            .map(|stop| (stop - raw.start_date).num_days())
            .unwrap_or(0);

        Ok(ConsistentReading {
            sensor_id: raw.sensor_id,
            sensor_type_name: raw.sensor_type_name,
            unit,
            station_id: raw.station_id,
            station_name: raw.station_name,
            value: raw.value,
            province: raw.province,
            city: raw.city,
            is_historic: raw.is_historic,
            start_date: raw.start_date,
            stop_date: raw.stop_date,
            utm_north: raw.utm_north,
            utm_east: raw.utm_east,
            latitude: raw.latitude,
            longitude: raw.longitude,
            days_of_measure,
        })
    }
}

/// Validates `raw` and, if every rule holds, builds a [`ConsistentReading`].
///
/// # Errors
///
/// Returns every violated rule, in validation order. No partial reading is
/// ever produced.
pub fn normalize(raw: RawReading) -> Outcome<ConsistentReading> {
    ConsistentReading::try_from(raw)
}

/// A reading that failed normalization, identified by its sensor and station.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RejectedReading {
    pub sensor_id: i64,
    pub station_id: i64,
    pub violations: Violations,
}

/// Result of normalizing a whole batch.
#[derive(Debug, Default)]
pub struct Normalized {
    pub readings: Vec<ConsistentReading>,
    pub rejected: Vec<RejectedReading>,
}

/// Normalizes every reading in `raw`. A failing reading never stops the batch.
pub fn normalize_all(raw: Vec<RawReading>) -> Normalized {
    let mut out = Normalized::default();

    for reading in raw {
        let (sensor_id, station_id) = (reading.sensor_id, reading.station_id);
        match normalize(reading) {
            Ok(consistent) => out.readings.push(consistent),
            Err(violations) => out.rejected.push(RejectedReading {
                sensor_id,
                station_id,
                violations,
            }),
        }
    }

    out
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub(crate) fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    /// A raw reading that passes every rule.
    pub(crate) fn raw_reading() -> RawReading {
        RawReading {
            sensor_id: 10_431,
            sensor_type_name: "PM10".to_string(),
            unit: "µg/m³".to_string(),
            station_id: 501,
            station_name: "Milano - Senato".to_string(),
            value: 20,
            province: "MI".to_string(),
            city: "Milano".to_string(),
            is_historic: false,
            start_date: date(2000, 1, 1),
            stop_date: None,
            utm_north: 5_035_848,
            utm_east: 515_337,
            latitude: "45.470499".to_string(),
            longitude: "9.197460".to_string(),
        }
    }

    /// A normalized reading with the given grouping fields, value and duration.
    pub(crate) fn consistent(
        province: &str,
        sensor: &str,
        unit: &str,
        value: i64,
        days: i64,
    ) -> ConsistentReading {
        let start = date(2010, 1, 1);
        let raw = RawReading {
            province: province.to_string(),
            sensor_type_name: sensor.to_string(),
            unit: unit.to_string(),
            value,
            start_date: start,
            stop_date: Some(start + chrono::Duration::days(days)),
            ..raw_reading()
        };
        normalize(raw).unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::{date, raw_reading};
    use super::*;

    #[test]
    fn test_unit_from_symbol() {
        assert_eq!(Unit::from_symbol("ng/m³"), Some(Unit::NgM3));
        assert_eq!(Unit::from_symbol("mg/m³"), Some(Unit::MgM3));
        assert_eq!(Unit::from_symbol("µg/m³"), Some(Unit::UgM3));
        assert_eq!(Unit::from_symbol("μg/m³"), Some(Unit::UgM3));
        assert_eq!(Unit::from_symbol(" mg/m³ "), Some(Unit::MgM3));
        assert_eq!(Unit::from_symbol("mg_m3"), None);
        assert_eq!(Unit::from_symbol("°C"), None);
        assert_eq!(Unit::from_symbol(""), None);
    }

    #[test]
    fn test_unit_symbol_restores_key() {
        for unit in Unit::ALL {
            let restored = unit.key().replace('_', "/").replace('3', "³");
            assert_eq!(restored, unit.symbol());
            assert_eq!(Unit::from_symbol(unit.symbol()), Some(unit));
        }
    }

    #[test]
    fn test_normalize_valid_reading() {
        let reading = normalize(raw_reading()).unwrap();

        assert_eq!(reading.unit(), Unit::UgM3);
        assert_eq!(reading.province(), "MI");
        assert_eq!(reading.value(), 20);
        assert_eq!(reading.days_of_measure(), 0);
    }

    #[test]
    fn test_normalize_computes_days_of_measure() {
        let raw = RawReading {
            start_date: date(2020, 1, 1),
            stop_date: Some(date(2020, 3, 1)),
            ..raw_reading()
        };

        let reading = normalize(raw).unwrap();
        assert_eq!(reading.days_of_measure(), 60);
    }

    #[test]
    fn test_normalize_same_day_stop() {
        let raw = RawReading {
            stop_date: Some(date(2000, 1, 1)),
            ..raw_reading()
        };

        assert_eq!(normalize(raw).unwrap().days_of_measure(), 0);
    }

    #[test]
    fn test_normalize_unknown_unit_fails() {
        let raw = RawReading {
            unit: "ppm".to_string(),
            ..raw_reading()
        };

        let err = normalize(raw).unwrap_err();
        assert_eq!(err.messages(), &[UNIT_NOT_SUPPORTED.to_string()]);
    }

    #[test]
    fn test_normalize_reports_all_violations_in_order() {
        let raw = RawReading {
            sensor_id: 0,
            sensor_type_name: " ".to_string(),
            unit: "bogus".to_string(),
            station_id: -1,
            station_name: String::new(),
            value: -5,
            province: String::new(),
            city: String::new(),
            is_historic: true,
            start_date: date(1960, 5, 1),
            stop_date: Some(date(1950, 1, 1)),
            utm_north: 0,
            utm_east: -3,
            latitude: String::new(),
            longitude: "  ".to_string(),
        };

        let err = normalize(raw).unwrap_err();
        assert_eq!(err.len(), 14);
        assert_eq!(err.messages()[0], "Sensor ID less or equal to 0.");
        assert_eq!(err.messages()[2], "Unit not supported.");
        assert_eq!(err.messages()[13], "Null or empty longitude.");
    }

    #[test]
    fn test_normalize_all_keeps_going_after_failure() {
        let bad = RawReading {
            sensor_id: -7,
            value: -1,
            ..raw_reading()
        };
        let good = raw_reading();

        let out = normalize_all(vec![bad, good.clone(), good]);

        assert_eq!(out.readings.len(), 2);
        assert_eq!(out.rejected.len(), 1);
        assert_eq!(out.rejected[0].sensor_id, -7);
        assert_eq!(out.rejected[0].violations.len(), 2);
    }

    #[test]
    fn test_normalize_all_empty() {
        let out = normalize_all(Vec::new());
        assert!(out.readings.is_empty());
        assert!(out.rejected.is_empty());
    }
}
