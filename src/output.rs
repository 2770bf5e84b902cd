//! CSV export of province averages.
//!
//! Rows are `province,sensor_type_name,average_value,unit,average_days_of_measure`
//! with no header line; the unit is written as its human-readable symbol.

use csv::{ReaderBuilder, WriterBuilder};
use std::io::{self, Read, Write};

use crate::error::{Error, Result};
use crate::summary::AverageProvinceData;

/// Serializes `averages` to CSV text.
///
/// # Errors
///
/// Returns [`Error::EmptyExport`] when `averages` is empty.
pub fn export(averages: &[AverageProvinceData]) -> Result<String> {
    let bytes = export_to(averages, Vec::new())?;
    String::from_utf8(bytes).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e).into())
}

/// Writes `averages` as CSV rows to `sink` and hands the sink back.
pub fn export_to<W: Write>(averages: &[AverageProvinceData], sink: W) -> Result<W> {
    if averages.is_empty() {
        return Err(Error::EmptyExport);
    }

    let mut writer = WriterBuilder::new().has_headers(false).from_writer(sink);
    for average in averages {
        writer.serialize(average)?;
    }
    writer.flush()?;

    writer.into_inner().map_err(|e| Error::Io(e.into_error()))
}

/// Parses text produced by [`export`] back into averages.
pub fn read_summary<R: Read>(source: R) -> Result<Vec<AverageProvinceData>> {
    let mut reader = ReaderBuilder::new().has_headers(false).from_reader(source);

    let mut rows = Vec::new();
    for result in reader.deserialize() {
        let row: AverageProvinceData = result?;
        rows.push(row);
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reading::Unit;

    fn average(province: &str, value: f64, unit: Unit, days: i64) -> AverageProvinceData {
        AverageProvinceData {
            province: province.to_string(),
            sensor_type_name: "PM10".to_string(),
            average_value: value,
            unit,
            average_days_of_measure: days,
        }
    }

    #[test]
    fn test_export_empty_is_error() {
        assert!(matches!(export(&[]), Err(Error::EmptyExport)));
    }

    #[test]
    fn test_export_row_format() {
        let text = export(&[average("MI", 15.25, Unit::UgM3, 30)]).unwrap();
        assert_eq!(text, "MI,PM10,15.25,µg/m³,30\n");
    }

    #[test]
    fn test_export_one_line_per_record_with_symbols() {
        let text = export(&[
            average("MI", 1.5, Unit::NgM3, 1),
            average("BG", 2.75, Unit::MgM3, 2),
        ])
        .unwrap();

        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines, vec!["MI,PM10,1.5,ng/m³,1", "BG,PM10,2.75,mg/m³,2"]);
    }

    #[test]
    fn test_export_then_read_preserves_fields() {
        let averages = vec![
            average("MI", 15.0, Unit::UgM3, 30),
            average("LO", 0.33, Unit::NgM3, 0),
            average("SO", 1234.57, Unit::MgM3, 9000),
        ];

        let text = export(&averages).unwrap();
        let parsed = read_summary(text.as_bytes()).unwrap();

        assert_eq!(parsed, averages);
    }

    #[test]
    fn test_export_to_writer() {
        let sink = export_to(&[average("MI", 3.0, Unit::UgM3, 4)], Vec::new()).unwrap();
        let text = String::from_utf8(sink).unwrap();
        assert!(text.starts_with("MI,PM10,3"));
    }

    #[test]
    fn test_export_to_borrowed_writer() {
        let mut sink = Vec::new();
        export_to(&[average("BG", 1.5, Unit::MgM3, 2)], &mut sink).unwrap();
        export_to(&[average("MI", 3.0, Unit::UgM3, 4)], &mut sink).unwrap();

        let text = String::from_utf8(sink).unwrap();
        assert_eq!(text.lines().count(), 2);
        assert!(text.ends_with("MI,PM10,3.0,µg/m³,4\n"));
    }

    #[test]
    fn test_read_summary_rejects_unknown_unit() {
        assert!(read_summary("MI,PM10,1.0,ppm,3\n".as_bytes()).is_err());
    }
}
