//! Delimited parser for sensor reading files.
//!
//! The first line must carry the expected column names. Data rows that fail
//! type conversion are skipped and reported; they never stop the import.

use chrono::{NaiveDate, NaiveDateTime};
use csv::{ByteRecord, ReaderBuilder, StringRecord, Trim};
use std::io::{Read, Seek, SeekFrom};

use crate::error::{Error, Result};
use crate::reading::RawReading;

/// Column names, in the order they must appear in the header line.
pub const EXPECTED_HEADER: [&str; 16] = [
    "IdSensore",
    "NomeTipoSensore",
    "UnitaMisura",
    "Idstazione",
    "NomeStazione",
    "Quota",
    "Provincia",
    "Comune",
    "Storico",
    "DataStart",
    "DataStop",
    "Utm_Nord",
    "UTM_Est",
    "lat",
    "lng",
    "Location",
];

// Positions within EXPECTED_HEADER.
const SENSOR_ID: usize = 0;
const SENSOR_TYPE_NAME: usize = 1;
const UNIT: usize = 2;
const STATION_ID: usize = 3;
const STATION_NAME: usize = 4;
const VALUE: usize = 5;
const PROVINCE: usize = 6;
const CITY: usize = 7;
const HISTORIC: usize = 8;
const START_DATE: usize = 9;
const STOP_DATE: usize = 10;
const UTM_NORTH: usize = 11;
const UTM_EAST: usize = 12;
const LATITUDE: usize = 13;
const LONGITUDE: usize = 14;

const DATE_FORMAT: &str = "%d/%m/%Y";
const DATE_TIME_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

/// Rows parsed from one input, plus a message for every field that could not
/// be converted.
#[derive(Debug, Default)]
pub struct ImportResult {
    pub readings: Vec<RawReading>,
    pub errors: Vec<String>,
}

impl ImportResult {
    /// `true` when no row was rejected.
    pub fn success(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Parses every data row of `source`, rewinding it to the start first.
///
/// # Errors
///
/// Returns [`Error::InvalidHeader`] when the header does not match
/// [`EXPECTED_HEADER`] (including a header that is not valid UTF-8), and I/O
/// errors raised while reading the stream.
pub fn import<R: Read + Seek>(mut source: R) -> Result<ImportResult> {
    source.seek(SeekFrom::Start(0))?;

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(source);

    if !header_matches(reader.byte_headers()?) {
        return Err(Error::InvalidHeader);
    }

    let mut result = ImportResult::default();

    for record in reader.byte_records() {
        let (record, mut messages) = decode_row(&record?);

        match parse_row(&record) {
            Ok(reading) if messages.is_empty() => result.readings.push(reading),
            Ok(_) => {}
            Err(mut conversion) => messages.append(&mut conversion),
        }
        result.errors.append(&mut messages);
    }

    Ok(result)
}

fn header_matches(header: &ByteRecord) -> bool {
    header.len() == EXPECTED_HEADER.len()
        && header.iter().zip(EXPECTED_HEADER).all(|(found, expected)| {
            std::str::from_utf8(found)
                .is_ok_and(|name| name.trim_start_matches('\u{feff}').trim() == expected)
        })
}

/// Decodes every field as UTF-8. Fields that are not valid text are kept in
/// lossy form and reported, so the row is skipped.
fn decode_row(record: &ByteRecord) -> (StringRecord, Vec<String>) {
    let mut decoded = StringRecord::with_capacity(record.as_slice().len(), record.len());
    let mut errors = Vec::new();

    for field in record {
        match std::str::from_utf8(field) {
            Ok(text) => decoded.push_field(text),
            Err(_) => {
                let lossy = String::from_utf8_lossy(field);
                errors.push(format!("Error converting '{lossy}' to type String."));
                decoded.push_field(&lossy);
            }
        }
    }

    (decoded, errors)
}

/// Converts one record, collecting a message for every field that fails.
fn parse_row(record: &StringRecord) -> std::result::Result<RawReading, Vec<String>> {
    let mut row = RowParser::new(record);

    let sensor_id = row.int(SENSOR_ID);
    let station_id = row.int(STATION_ID);
    let value = row.int(VALUE);
    let is_historic = row.boolean(HISTORIC);
    let start_date = row.date(START_DATE);
    let stop_date = row.optional_date(STOP_DATE);
    let utm_north = row.int(UTM_NORTH);
    let utm_east = row.int(UTM_EAST);

    let (
        Some(sensor_id),
        Some(station_id),
        Some(value),
        Some(is_historic),
        Some(start_date),
        Some(stop_date),
        Some(utm_north),
        Some(utm_east),
    ) = (
        sensor_id,
        station_id,
        value,
        is_historic,
        start_date,
        stop_date,
        utm_north,
        utm_east,
    )
    else {
        return Err(row.errors);
    };

    Ok(RawReading {
        sensor_id,
        sensor_type_name: row.text(SENSOR_TYPE_NAME),
        unit: row.text(UNIT),
        station_id,
        station_name: row.text(STATION_NAME),
        value,
        province: row.text(PROVINCE),
        city: row.text(CITY),
        is_historic,
        start_date,
        stop_date,
        utm_north,
        utm_east,
        latitude: row.text(LATITUDE),
        longitude: row.text(LONGITUDE),
    })
}

struct RowParser<'r> {
    record: &'r StringRecord,
    errors: Vec<String>,
}

impl<'r> RowParser<'r> {
    fn new(record: &'r StringRecord) -> Self {
        Self {
            record,
            errors: Vec::new(),
        }
    }

    fn raw(&self, column: usize) -> &'r str {
        self.record.get(column).unwrap_or("")
    }

    fn fail<T>(&mut self, raw: &str, type_name: &str) -> Option<T> {
        self.errors.push(format!("Error converting '{raw}' to type {type_name}."));
        None
    }

    fn text(&self, column: usize) -> String {
        self.raw(column).to_string()
    }

    fn int(&mut self, column: usize) -> Option<i64> {
        let raw = self.raw(column);
        match raw.parse::<i64>() {
            Ok(v) => Some(v),
            Err(_) => self.fail(raw, "Int64"),
        }
    }

    fn boolean(&mut self, column: usize) -> Option<bool> {
        let raw = self.raw(column);
        match raw.to_ascii_lowercase().as_str() {
            "s" | "true" => Some(true),
            "n" | "false" => Some(false),
            _ => self.fail(raw, "Boolean"),
        }
    }

    fn date(&mut self, column: usize) -> Option<NaiveDate> {
        let raw = self.raw(column);
        match parse_date(raw) {
            Some(d) => Some(d),
            None => self.fail(raw, "Date"),
        }
    }

    /// A blank cell is a valid "absent" date; the outer `None` means failure.
    fn optional_date(&mut self, column: usize) -> Option<Option<NaiveDate>> {
        let raw = self.raw(column);
        if raw.is_empty() {
            return Some(None);
        }
        match parse_date(raw) {
            Some(d) => Some(Some(d)),
            None => self.fail(raw, "Date"),
        }
    }
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(raw, DATE_TIME_FORMAT).map(|dt| dt.date()))
        .ok()
}
