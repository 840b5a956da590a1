use crate::error::{BetaBinomialError, Result};
use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use log::debug;
use std::io::{Read, Write};

/// An `n × r` table of trial outcomes.
///
/// Each row is one observational unit, each column one Bernoulli trial. All
/// rows share the same trial count `r`, and every cell is 0 or 1.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SampleMatrix {
    n_trials: usize,
    n_units: usize,
    cells: Vec<u8>,
}

impl SampleMatrix {
    /// An empty matrix with `n_trials` columns and no rows.
    pub fn new(n_trials: usize) -> Self {
        Self {
            n_trials,
            n_units: 0,
            cells: Vec::new(),
        }
    }

    pub fn with_capacity(n_units: usize, n_trials: usize) -> Self {
        Self {
            n_trials,
            n_units: 0,
            cells: Vec::with_capacity(n_units * n_trials),
        }
    }

    /// Build a matrix from rows of outcomes. The first row fixes the trial
    /// count; an empty input yields a `0 × 0` matrix.
    pub fn from_rows(rows: &[Vec<u32>]) -> Result<Self> {
        let n_trials = rows.first().map(|row| row.len()).unwrap_or(0);
        let mut matrix = Self::with_capacity(rows.len(), n_trials);
        for row in rows {
            matrix.push_row(row)?;
        }
        Ok(matrix)
    }

    /// Append one unit. Fails with `ShapeMismatch` if the row length differs
    /// from the matrix trial count and with `NonBinaryCell` for values above 1.
    pub fn push_row(&mut self, row: &[u32]) -> Result<()> {
        if row.len() != self.n_trials {
            return Err(BetaBinomialError::ShapeMismatch {
                row: self.n_units,
                expected: self.n_trials,
                actual: row.len(),
            });
        }
        if let Some((col, &value)) = row.iter().enumerate().find(|&(_, &v)| v > 1) {
            return Err(BetaBinomialError::NonBinaryCell {
                row: self.n_units,
                col,
                value,
            });
        }
        self.cells.extend(row.iter().map(|&v| v as u8));
        self.n_units += 1;
        Ok(())
    }

    pub(crate) fn push_outcomes<I>(&mut self, outcomes: I)
    where
        I: IntoIterator<Item = bool>,
    {
        let before = self.cells.len();
        self.cells.extend(outcomes.into_iter().map(u8::from));
        debug_assert_eq!(self.cells.len() - before, self.n_trials);
        self.n_units += 1;
    }

    /// Number of units, `n`.
    pub fn n_units(&self) -> usize {
        self.n_units
    }

    /// Trials per unit, `r`.
    pub fn n_trials(&self) -> usize {
        self.n_trials
    }

    /// `(n, r)`
    pub fn shape(&self) -> (usize, usize) {
        (self.n_units, self.n_trials)
    }

    pub fn is_empty(&self) -> bool {
        self.n_units == 0
    }

    pub fn row(&self, idx: usize) -> Option<&[u8]> {
        if idx >= self.n_units {
            return None;
        }
        let start = idx * self.n_trials;
        Some(&self.cells[start..start + self.n_trials])
    }

    pub fn rows(&self) -> impl Iterator<Item = &[u8]> + '_ {
        (0..self.n_units).filter_map(move |idx| self.row(idx))
    }

    /// Per-unit success counts `k[i]`.
    pub fn successes(&self) -> Vec<u64> {
        self.rows()
            .map(|row| row.iter().map(|&v| v as u64).sum())
            .collect()
    }

    /// `Σ k[i]`
    pub fn total_successes(&self) -> u64 {
        self.cells.iter().map(|&v| v as u64).sum()
    }

    /// `n · r`
    pub fn total_trials(&self) -> u64 {
        (self.n_units * self.n_trials) as u64
    }

    /// Read a tab separated matrix without header, one unit per line.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut reader = ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);

        let mut matrix: Option<SampleMatrix> = None;
        let mut record = StringRecord::new();
        let mut row = Vec::new();
        while reader.read_record(&mut record)? {
            row.clear();
            let row_idx = matrix.as_ref().map(|m| m.n_units()).unwrap_or(0);
            for (col, field) in record.iter().enumerate() {
                let value = field.trim().parse::<u32>().map_err(|_| BetaBinomialError::Parse {
                    row: row_idx,
                    col,
                    field: field.to_string(),
                })?;
                row.push(value);
            }
            matrix
                .get_or_insert_with(|| SampleMatrix::new(row.len()))
                .push_row(&row)?;
        }
        let matrix = matrix.unwrap_or_else(|| SampleMatrix::new(0));
        debug!("Read sample matrix of shape {:?}", matrix.shape());
        Ok(matrix)
    }

    pub fn to_writer<W: Write>(&self, writer: W) -> Result<()> {
        let mut writer = WriterBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .from_writer(writer);
        for row in self.rows() {
            writer.write_record(row.iter().map(|v| v.to_string()))?;
        }
        writer.flush()?;
        Ok(())
    }
}
