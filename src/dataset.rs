use std::{fs::File, io, path::Path};

use ndarray::{Array1, Array2};

use crate::{
    config::Columns,
    error::{InputErr, Result},
};

/// One row of the benchmark table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Record {
    pub height: f64,
    pub num_entities: f64,
    pub memory_mb: f64,
}

impl Record {
    pub fn new(height: f64, num_entities: f64, memory_mb: f64) -> Self {
        Self {
            height,
            num_entities,
            memory_mb,
        }
    }
}

/// An immutable, fully loaded benchmark table.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    records: Vec<Record>,
}

impl Dataset {
    /// Wraps already validated records.
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    /// Loads the table at `path`.
    ///
    /// # Errors
    /// Returns `InputErr::Open` if the file cannot be opened, and any error of
    /// `Dataset::from_reader` otherwise.
    pub fn from_path<P: AsRef<Path>>(path: P, columns: &Columns) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| InputErr::Open {
            path: path.to_path_buf(),
            source,
        })?;

        let dataset = Self::from_reader(file, columns)?;
        log::info!("loaded {} record(s) from {}", dataset.len(), path.display());
        Ok(dataset)
    }

    /// Reads a comma separated table with a header row.
    ///
    /// Only the three columns named in `columns` are read, every other column
    /// is ignored. Cells are trimmed before parsing.
    ///
    /// # Errors
    /// * `InputErr::Csv` if the reader fails (ragged rows, invalid UTF-8).
    /// * `InputErr::MissingColumn` if a required header is absent.
    /// * `InputErr::NonNumeric` if a required cell is not a finite number.
    /// * `InputErr::Empty` if there are no data rows.
    pub fn from_reader<R: io::Read>(reader: R, columns: &Columns) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new().from_reader(reader);

        let headers = rdr.headers()?.clone();
        let index_of = |column: &str| {
            headers
                .iter()
                .position(|h| h.trim() == column)
                .ok_or_else(|| InputErr::MissingColumn {
                    column: column.to_string(),
                })
        };
        let cols = [
            (index_of(columns.height())?, columns.height()),
            (index_of(columns.num_entities())?, columns.num_entities()),
            (index_of(columns.memory())?, columns.memory()),
        ];

        let mut records = Vec::new();
        for (i, result) in rdr.records().enumerate() {
            let record = result?;
            let row = i + 1;

            let mut values = [0.0; 3];
            for (value, &(idx, column)) in values.iter_mut().zip(&cols) {
                let cell = record.get(idx).unwrap_or_default();
                *value = parse_cell(cell, row, column)?;
            }

            let [height, num_entities, memory_mb] = values;
            records.push(Record::new(height, num_entities, memory_mb));
        }

        if records.is_empty() {
            return Err(InputErr::Empty.into());
        }

        Ok(Self::new(records))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Builds the `N×3` design matrix with rows `[height, num_entities, 1]`.
    pub fn design_matrix(&self) -> Array2<f64> {
        Array2::from_shape_fn((self.len(), 3), |(i, j)| {
            let r = &self.records[i];
            match j {
                0 => r.height,
                1 => r.num_entities,
                _ => 1.0,
            }
        })
    }

    /// Returns the memory column as the target vector.
    pub fn targets(&self) -> Array1<f64> {
        self.records.iter().map(|r| r.memory_mb).collect()
    }
}

fn parse_cell(cell: &str, row: usize, column: &str) -> std::result::Result<f64, InputErr> {
    let non_numeric = || InputErr::NonNumeric {
        row,
        column: column.to_string(),
        value: cell.to_string(),
    };

    let value: f64 = cell.trim().parse().map_err(|_| non_numeric())?;
    if !value.is_finite() {
        return Err(non_numeric());
    }

    Ok(value)
}
