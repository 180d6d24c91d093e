//! CSV parsing into typed [`Record`]s.
//!
//! Headers are trimmed and resolved against the known [`Column`] schema;
//! unknown headers land in [`Record::extra`]. Every cell goes through
//! [`FieldValue::parse`], so numeric-looking text becomes a number and empty
//! cells become absent.

use std::io::Read;

use enforcement_dash_dataset_models::{Column, FieldValue, Record};

use crate::DatasetError;

/// Where a CSV column's values are stored on the record.
#[derive(Debug, Clone)]
enum Slot {
    Known(Column),
    Extra(String),
}

/// Parses every row of a headered CSV stream.
///
/// Rows with fewer cells than the header leave the trailing columns unset.
///
/// # Errors
///
/// Returns [`DatasetError::MissingColumn`] if a required header is absent,
/// or [`DatasetError::Csv`] if the stream is not valid CSV.
pub fn parse_records<R: Read>(reader: R) -> Result<Vec<Record>, DatasetError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let slots: Vec<Slot> = reader
        .headers()?
        .iter()
        .map(|h| {
            Column::from_header(h).map_or_else(|| Slot::Extra(h.trim().to_owned()), Slot::Known)
        })
        .collect();

    for required in Column::REQUIRED {
        if !slots
            .iter()
            .any(|slot| matches!(slot, Slot::Known(c) if c == required))
        {
            return Err(DatasetError::MissingColumn { column: *required });
        }
    }

    let mut records = Vec::new();

    for row in reader.records() {
        let row = row?;
        let mut record = Record::default();

        for (slot, cell) in slots.iter().zip(row.iter()) {
            let value = FieldValue::parse(cell);
            match slot {
                Slot::Known(column) => record.set(*column, value),
                Slot::Extra(header) => {
                    if let Some(value) = value {
                        record.extra.insert(header.clone(), value);
                    }
                }
            }
        }

        records.push(record);
    }

    log::debug!("Parsed {} records across {} columns", records.len(), slots.len());

    Ok(records)
}

/// Parses CSV text. Convenience wrapper around [`parse_records`].
///
/// # Errors
///
/// See [`parse_records`].
pub fn parse_str(csv: &str) -> Result<Vec<Record>, DatasetError> {
    parse_records(csv.as_bytes())
}

#[cfg(test)]
mod tests {
    use enforcement_dash_dataset_models::{Dimension, Measure};

    use super::*;

    #[test]
    fn parses_known_and_extra_columns() {
        let records = parse_str(
            "YEAR,JURISDICTION,LOCATION,AGE_GROUP,FINES\n\
             2023,NSW,Major Cities,17-25,10\n",
        )
        .unwrap();

        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.year, Some(2023));
        assert_eq!(record.text(Dimension::Jurisdiction), Some("NSW"));
        assert_eq!(record.text(Dimension::AgeGroup), Some("17-25"));
        assert!((record.measure(Measure::Fines) - 10.0).abs() < f64::EPSILON);
        assert_eq!(
            record.extra.get("LOCATION"),
            Some(&FieldValue::Text("Major Cities".to_string()))
        );
    }

    #[test]
    fn trims_headers_and_treats_empty_cells_as_absent() {
        let records = parse_str(" YEAR , JURISDICTION ,ARRESTS\n2023,VIC,\n").unwrap();
        assert_eq!(records[0].year, Some(2023));
        assert_eq!(records[0].text(Dimension::Jurisdiction), Some("VIC"));
        assert_eq!(records[0].arrests, None);
    }

    #[test]
    fn short_rows_leave_trailing_columns_unset() {
        let records = parse_str("YEAR,JURISDICTION,COUNT\n2023,NSW\n").unwrap();
        assert_eq!(records[0].count, None);
        assert_eq!(records[0].text(Dimension::Jurisdiction), Some("NSW"));
    }

    #[test]
    fn preserves_file_order() {
        let records = parse_str("YEAR,JURISDICTION\n2021,A\n2022,B\n2023,C\n").unwrap();
        let years: Vec<_> = records.iter().map(|r| r.year).collect();
        assert_eq!(years, vec![Some(2021), Some(2022), Some(2023)]);
    }

    #[test]
    fn rejects_file_without_required_column() {
        let err = parse_str("JURISDICTION,COUNT\nNSW,1\n").unwrap_err();
        assert!(matches!(
            err,
            DatasetError::MissingColumn {
                column: Column::Year
            }
        ));
    }
}
