//! Column-oriented suburb table.
//!
//! A [`FeatureTable`] holds one row per suburb: an identity code, an
//! optional display name, and any number of named numeric columns.
//! Numeric cells are `Option<f64>`; anything non-numeric or non-finite is
//! stored as `None` so NaN and ±Infinity never travel further than the
//! table boundary.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::path::Path;

use tracing::debug;

use crate::error::{Result, RoiError};

pub type Column = Vec<Option<f64>>;

#[derive(Debug, Clone, Default)]
pub struct FeatureTable {
    codes: Vec<String>,
    names: Vec<Option<String>>,
    /// Column names in insertion order
    order: Vec<String>,
    columns: HashMap<String, Column>,
}

/// Coerce a raw cell to a finite number, or None.
pub fn parse_numeric(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed
        .replace(',', "")
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

fn sanitize(values: Column) -> Column {
    values
        .into_iter()
        .map(|v| v.filter(|x| x.is_finite()))
        .collect()
}

impl FeatureTable {
    pub fn new(codes: Vec<String>, names: Vec<Option<String>>) -> Result<Self> {
        if codes.len() != names.len() {
            return Err(RoiError::Schema(format!(
                "identity length mismatch: {} codes, {} names",
                codes.len(),
                names.len()
            )));
        }
        Ok(Self {
            codes,
            names,
            order: Vec::new(),
            columns: HashMap::new(),
        })
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn codes(&self) -> &[String] {
        &self.codes
    }

    pub fn names(&self) -> &[Option<String>] {
        &self.names
    }

    pub fn column_names(&self) -> &[String] {
        &self.order
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    pub fn column(&self, name: &str) -> Option<&[Option<f64>]> {
        self.columns.get(name).map(|c| c.as_slice())
    }

    pub fn value(&self, column: &str, row: usize) -> Option<f64> {
        self.columns.get(column).and_then(|c| c.get(row).copied().flatten())
    }

    /// Add or replace a column. Replacing keeps the original position.
    pub fn insert_column(&mut self, name: impl Into<String>, values: Column) -> Result<()> {
        let name = name.into();
        if values.len() != self.len() {
            return Err(RoiError::Schema(format!(
                "column '{}' has {} values, table has {} rows",
                name,
                values.len(),
                self.len()
            )));
        }
        if !self.columns.contains_key(&name) {
            self.order.push(name.clone());
        }
        self.columns.insert(name, sanitize(values));
        Ok(())
    }

    /// First row whose name equals `name`, ignoring case.
    pub fn find_by_name(&self, name: &str) -> Option<usize> {
        let needle = name.to_lowercase();
        self.names
            .iter()
            .position(|n| n.as_deref().map(|s| s.to_lowercase() == needle).unwrap_or(false))
    }

    /// Keep only the listed rows, in the given order.
    pub fn select_rows(&self, rows: &[usize]) -> Self {
        let mut columns = HashMap::with_capacity(self.columns.len());
        for (name, col) in &self.columns {
            columns.insert(name.clone(), rows.iter().map(|&r| col[r]).collect());
        }
        Self {
            codes: rows.iter().map(|&r| self.codes[r].clone()).collect(),
            names: rows.iter().map(|&r| self.names[r].clone()).collect(),
            order: self.order.clone(),
            columns,
        }
    }

    /// Keep only the listed columns that exist, in the listed order.
    pub fn project(&self, columns: &[&str]) -> Self {
        let mut out = Self {
            codes: self.codes.clone(),
            names: self.names.clone(),
            order: Vec::new(),
            columns: HashMap::new(),
        };
        for name in columns {
            if let Some(col) = self.columns.get(*name) {
                out.order.push(name.to_string());
                out.columns.insert(name.to_string(), col.clone());
            }
        }
        out
    }

    pub fn set_codes(&mut self, codes: Vec<String>) -> Result<()> {
        if codes.len() != self.len() {
            return Err(RoiError::Schema(format!(
                "{} codes supplied for {} rows",
                codes.len(),
                self.len()
            )));
        }
        self.codes = codes;
        Ok(())
    }

    /// Read a headed CSV. `code_column` is required; `name_column`, when
    /// given, must exist too. Every other column is parsed as numeric.
    pub fn from_csv_reader<R: Read>(
        reader: R,
        code_column: &str,
        name_column: Option<&str>,
    ) -> Result<Self> {
        Self::from_csv_reader_mapped(reader, code_column, name_column, |headers| headers)
    }

    /// Like [`from_csv_reader`](Self::from_csv_reader), with the header row
    /// rewritten by `map_headers` before columns are resolved.
    pub fn from_csv_reader_mapped<R, F>(
        reader: R,
        code_column: &str,
        name_column: Option<&str>,
        map_headers: F,
    ) -> Result<Self>
    where
        R: Read,
        F: FnOnce(Vec<String>) -> Vec<String>,
    {
        let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
        let headers: Vec<String> =
            map_headers(rdr.headers()?.iter().map(|h| h.trim().to_string()).collect());

        let code_idx = headers
            .iter()
            .position(|h| h == code_column)
            .ok_or_else(|| RoiError::Schema(format!("missing identity column '{}'", code_column)))?;
        let name_idx = match name_column {
            Some(col) => Some(
                headers
                    .iter()
                    .position(|h| h == col)
                    .ok_or_else(|| RoiError::Schema(format!("missing identity column '{}'", col)))?,
            ),
            None => None,
        };

        let value_cols: Vec<(usize, &String)> = headers
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != code_idx && Some(*i) != name_idx)
            .collect();

        let mut codes = Vec::new();
        let mut names = Vec::new();
        let mut values: Vec<Column> = vec![Vec::new(); value_cols.len()];

        for record in rdr.records() {
            let record = record?;
            codes.push(record.get(code_idx).unwrap_or("").trim().to_string());
            names.push(
                name_idx
                    .and_then(|i| record.get(i))
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty()),
            );
            for (slot, (idx, _)) in value_cols.iter().enumerate() {
                values[slot].push(record.get(*idx).and_then(parse_numeric));
            }
        }

        let mut table = Self::new(codes, names)?;
        for ((_, header), column) in value_cols.into_iter().zip(values) {
            table.insert_column(header.clone(), column)?;
        }
        Ok(table)
    }

    pub fn from_csv_path(
        path: impl AsRef<Path>,
        code_column: &str,
        name_column: Option<&str>,
    ) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(RoiError::MissingInput(path.display().to_string()));
        }
        let file = std::fs::File::open(path)?;
        let table = Self::from_csv_reader(file, code_column, name_column)?;
        debug!("Read {} rows, {} columns from {:?}", table.len(), table.order.len(), path);
        Ok(table)
    }

    /// Write identity columns followed by `columns` (those absent from the
    /// table are skipped). Missing cells are written empty.
    pub fn write_csv<W: Write>(
        &self,
        writer: W,
        code_column: &str,
        name_column: &str,
        columns: &[&str],
    ) -> Result<()> {
        let present: Vec<&str> = columns.iter().copied().filter(|c| self.has_column(c)).collect();

        let mut wtr = csv::Writer::from_writer(writer);
        let mut header = vec![code_column, name_column];
        header.extend(present.iter().copied());
        wtr.write_record(&header)?;

        for row in 0..self.len() {
            let mut record = Vec::with_capacity(header.len());
            record.push(self.codes[row].clone());
            record.push(self.names[row].clone().unwrap_or_default());
            for col in &present {
                record.push(self.value(col, row).map(|v| v.to_string()).unwrap_or_default());
            }
            wtr.write_record(&record)?;
        }
        wtr.flush()?;
        Ok(())
    }
}
