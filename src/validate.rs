//! Field-level business rules for a single raw reading.
//!
//! Every rule is evaluated; violations accumulate in a fixed order so the same
//! record always yields the same message list.

use chrono::NaiveDate;

use crate::reading::{RawReading, Unit};

pub const SENSOR_ID_NOT_POSITIVE: &str = "Sensor ID less or equal to 0.";
pub const SENSOR_NAME_EMPTY: &str = "Null or empty sensor name.";
pub const UNIT_NOT_SUPPORTED: &str = "Unit not supported.";
pub const STATION_ID_NOT_POSITIVE: &str = "Station ID less or equal to 0.";
pub const STATION_NAME_EMPTY: &str = "Null or empty station name.";
pub const NEGATIVE_VALUE: &str = "Negative value.";
pub const PROVINCE_EMPTY: &str = "Null or empty province name.";
pub const CITY_EMPTY: &str = "Null or empty city name.";
pub const START_DATE_TOO_EARLY: &str = "Start date is before the possible minimum.";
pub const STOP_BEFORE_START: &str = "Stop date is before start date.";
pub const UTM_NORTH_NOT_POSITIVE: &str = "UTMNord less or equal to 0.";
pub const UTM_EAST_NOT_POSITIVE: &str = "UTMEst less or equal to 0.";
pub const LATITUDE_EMPTY: &str = "Null or empty latitude.";
pub const LONGITUDE_EMPTY: &str = "Null or empty longitude.";

/// Start dates must fall strictly after this day.
pub fn minimum_start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(1968, 1, 1).unwrap_or(NaiveDate::MIN)
}

/// Returns every rule `reading` breaks. An empty list means the reading is valid.
pub fn validate(reading: &RawReading) -> Vec<String> {
    check(reading, Unit::from_symbol(&reading.unit).is_some())
}

/// Runs the rules with the unit lookup already done by the caller.
pub(crate) fn check(reading: &RawReading, unit_supported: bool) -> Vec<String> {
    let rules: [(bool, &str); 14] = [
        (reading.sensor_id > 0, SENSOR_ID_NOT_POSITIVE),
        (!is_blank(&reading.sensor_type_name), SENSOR_NAME_EMPTY),
        (unit_supported, UNIT_NOT_SUPPORTED),
        (reading.station_id > 0, STATION_ID_NOT_POSITIVE),
        (!is_blank(&reading.station_name), STATION_NAME_EMPTY),
        (reading.value >= 0, NEGATIVE_VALUE),
        (!is_blank(&reading.province), PROVINCE_EMPTY),
        (!is_blank(&reading.city), CITY_EMPTY),
        (reading.start_date > minimum_start_date(), START_DATE_TOO_EARLY),
        (
            reading
                .stop_date
                .is_none_or(|stop| stop >= reading.start_date),
            STOP_BEFORE_START,
        ),
        (reading.utm_north > 0, UTM_NORTH_NOT_POSITIVE),
        (reading.utm_east > 0, UTM_EAST_NOT_POSITIVE),
        (!is_blank(&reading.latitude), LATITUDE_EMPTY),
        (!is_blank(&reading.longitude), LONGITUDE_EMPTY),
    ];

    rules
        .into_iter()
        .filter(|(ok, _)| !ok)
        .map(|(_, message)| message.to_string())
        .collect()
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reading::fixtures::{date, raw_reading};

    #[test]
    fn test_valid_reading_has_no_violations() {
        assert!(validate(&raw_reading()).is_empty());
    }

    fn with(change: impl FnOnce(&mut RawReading)) -> RawReading {
        let mut reading = raw_reading();
        change(&mut reading);
        reading
    }

    #[test]
    fn test_each_rule_reports_its_message() {
        let cases: Vec<(RawReading, &str)> = vec![
            (with(|r| r.sensor_id = 0), SENSOR_ID_NOT_POSITIVE),
            (with(|r| r.sensor_type_name.clear()), SENSOR_NAME_EMPTY),
            (with(|r| r.unit = "kg".into()), UNIT_NOT_SUPPORTED),
            (with(|r| r.station_id = -2), STATION_ID_NOT_POSITIVE),
            (with(|r| r.station_name = "\t".into()), STATION_NAME_EMPTY),
            (with(|r| r.value = -1), NEGATIVE_VALUE),
            (with(|r| r.province.clear()), PROVINCE_EMPTY),
            (with(|r| r.city = " ".into()), CITY_EMPTY),
            (with(|r| r.start_date = date(1968, 1, 1)), START_DATE_TOO_EARLY),
            (with(|r| r.stop_date = Some(date(1999, 12, 31))), STOP_BEFORE_START),
            (with(|r| r.utm_north = 0), UTM_NORTH_NOT_POSITIVE),
            (with(|r| r.utm_east = 0), UTM_EAST_NOT_POSITIVE),
            (with(|r| r.latitude.clear()), LATITUDE_EMPTY),
            (with(|r| r.longitude.clear()), LONGITUDE_EMPTY),
        ];

        for (reading, expected) in cases {
            assert_eq!(validate(&reading), vec![expected.to_string()]);
        }
    }

    #[test]
    fn test_zero_value_is_allowed() {
        assert!(validate(&with(|r| r.value = 0)).is_empty());
    }

    #[test]
    fn test_start_date_just_after_minimum() {
        assert!(validate(&with(|r| r.start_date = date(1968, 1, 2))).is_empty());
    }

    #[test]
    fn test_maximally_invalid_reading_lists_all_rules_in_order() {
        let reading = RawReading {
            sensor_id: -1,
            sensor_type_name: String::new(),
            unit: String::new(),
            station_id: 0,
            station_name: String::new(),
            value: -100,
            province: String::new(),
            city: String::new(),
            is_historic: false,
            start_date: date(1900, 1, 1),
            stop_date: Some(date(1899, 1, 1)),
            utm_north: -1,
            utm_east: -1,
            latitude: String::new(),
            longitude: String::new(),
        };

        let expected: Vec<String> = [
            SENSOR_ID_NOT_POSITIVE,
            SENSOR_NAME_EMPTY,
            UNIT_NOT_SUPPORTED,
            STATION_ID_NOT_POSITIVE,
            STATION_NAME_EMPTY,
            NEGATIVE_VALUE,
            PROVINCE_EMPTY,
            CITY_EMPTY,
            START_DATE_TOO_EARLY,
            STOP_BEFORE_START,
            UTM_NORTH_NOT_POSITIVE,
            UTM_EAST_NOT_POSITIVE,
            LATITUDE_EMPTY,
            LONGITUDE_EMPTY,
        ]
        .iter()
        .map(|m| m.to_string())
        .collect();

        assert_eq!(validate(&reading), expected);
    }
}
