//! Row loading and schema validation for delimited employee tables.
//!
//! This module defines `Record` and `LoadedDataset` and contains the loader
//! that turns delimited text into typed records, keeping only allow-listed
//! attributes and tolerating malformed rows.
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SchemaError};
use crate::schema::{self, CATEGORICAL_ATTRIBUTES, LABEL_ATTRIBUTE};

/// One input row: attribute name to raw value, restricted to the allow-list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    values: HashMap<String, String>,
}

impl Record {
    pub fn new(values: HashMap<String, String>) -> Self {
        Record { values }
    }

    pub fn get(&self, attribute: &str) -> Option<&str> {
        self.values.get(attribute).map(String::as_str)
    }

    /// Parse a numeric attribute. Missing or non-numeric values default to 0.
    pub fn numeric(&self, attribute: &str) -> f32 {
        self.get(attribute)
            .and_then(|v| v.parse::<f32>().ok())
            .filter(|v| v.is_finite())
            .unwrap_or(0.0)
    }

    /// `Yes` maps to 1, anything else (including a missing value) to 0.
    pub fn label(&self) -> u8 {
        match self.get(LABEL_ATTRIBUTE) {
            Some("Yes") => 1,
            _ => 0,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Counts recorded while loading, for reporting.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoadSummary {
    pub rows: usize,
    pub skipped_rows: usize,
    pub categorical_attributes: Vec<String>,
    pub ignored_columns: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct LoadedDataset {
    pub header: Vec<String>,
    pub records: Vec<Record>,
    pub summary: LoadSummary,
}

impl LoadedDataset {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.header.iter().any(|h| h == name)
    }

    /// Known categorical attributes present in the header, in canonical order.
    pub fn categorical_attributes(&self) -> Vec<&'static str> {
        CATEGORICAL_ATTRIBUTES
            .iter()
            .copied()
            .filter(|name| self.has_column(name))
            .collect()
    }

    pub fn labels(&self) -> Vec<u8> {
        self.records.iter().map(Record::label).collect()
    }

    pub fn log_input_data_summary(&self) {
        let positives = self.records.iter().filter(|r| r.label() == 1).count();
        log::info!("----- Input Data Summary -----");
        log::info!(
            "{} rows loaded ({} left, {} stayed), {} malformed rows skipped",
            self.summary.rows,
            positives,
            self.summary.rows - positives,
            self.summary.skipped_rows
        );
        log::info!(
            "Categorical attributes: {:?}",
            self.summary.categorical_attributes
        );
        if !self.summary.ignored_columns.is_empty() {
            log::info!("Ignored columns: {:?}", self.summary.ignored_columns);
        }
        log::info!("-------------------------------");
    }
}

/// Parse delimited text into records.
///
/// # Errors
///
/// `SchemaError::MissingLabelColumn` when the header lacks `Attrition`,
/// `SchemaError::EmptyDataset` when no data row survives parsing.
pub fn load_records(text: &str, delimiter: u8) -> Result<LoadedDataset> {
    load_records_from_reader(text.as_bytes(), delimiter)
}

/// Load a `.csv` or `.tsv` file, picking the delimiter from the extension.
pub fn load_records_from_path<P: AsRef<Path>>(path: P) -> Result<LoadedDataset> {
    let is_tsv = path
        .as_ref()
        .extension()
        .map(|e| e.eq_ignore_ascii_case("tsv"))
        .unwrap_or(false);
    let delimiter = if is_tsv { b'\t' } else { b',' };
    let file = File::open(path.as_ref())?;
    load_records_from_reader(BufReader::new(file), delimiter)
}

pub fn load_records_from_reader<R: Read>(reader: R, delimiter: u8) -> Result<LoadedDataset> {
    let mut rdr = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let header: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
    if !header.iter().any(|h| h == LABEL_ATTRIBUTE) {
        return Err(SchemaError::MissingLabelColumn(LABEL_ATTRIBUTE.to_string()).into());
    }

    // Column positions that survive the allow-list.
    let retained: Vec<(usize, &str)> = header
        .iter()
        .enumerate()
        .filter(|(_, name)| schema::is_allowed(name))
        .map(|(i, name)| (i, name.as_str()))
        .collect();
    let ignored_columns: Vec<String> = header
        .iter()
        .filter(|name| !schema::is_allowed(name))
        .cloned()
        .collect();

    let mut records = Vec::new();
    let mut skipped_rows = 0;
    let mut row = StringRecord::new();
    loop {
        match rdr.read_record(&mut row) {
            Ok(true) => {}
            Ok(false) => break,
            Err(e) if e.is_io_error() => return Err(e.into()),
            Err(e) => {
                log::trace!("Skipping unreadable row: {}", e);
                skipped_rows += 1;
                continue;
            }
        }
        if row.len() != header.len() {
            skipped_rows += 1;
            continue;
        }
        let values = retained
            .iter()
            .map(|&(i, name)| (name.to_string(), row[i].to_string()))
            .collect::<HashMap<_, _>>();
        records.push(Record::new(values));
    }

    if skipped_rows > 0 {
        log::warn!("Skipped {} rows with a mismatched field count", skipped_rows);
    }
    if records.is_empty() {
        return Err(SchemaError::EmptyDataset.into());
    }

    let summary = LoadSummary {
        rows: records.len(),
        skipped_rows,
        categorical_attributes: Vec::new(),
        ignored_columns,
    };
    let mut dataset = LoadedDataset {
        header,
        records,
        summary,
    };
    dataset.summary.categorical_attributes = dataset
        .categorical_attributes()
        .into_iter()
        .map(String::from)
        .collect();

    Ok(dataset)
}
