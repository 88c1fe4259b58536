//! Table representation consumed by `embed`. CSV/file I/O lives outside the
//! core (in `edm-cli`); this type is the parsed-table boundary named in
//! spec.md §6 ("The core consumes parsed tables, not raw files.").

use crate::error::{EdmError, EdmResult};

/// A parsed time series table: an ordinal `time` column plus any number of
/// named real-valued observation columns, all the same length.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub time: Vec<f64>,
    columns: Vec<(String, Vec<f64>)>,
}

impl Dataset {
    pub fn new(time: Vec<f64>, columns: Vec<(String, Vec<f64>)>) -> EdmResult<Self> {
        for (name, col) in &columns {
            if col.len() != time.len() {
                return Err(EdmError::ShapeMismatch(format!(
                    "column '{name}' has {} rows but time has {}",
                    col.len(),
                    time.len()
                )));
            }
        }
        Ok(Self { time, columns })
    }

    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    pub fn column(&self, name: &str) -> EdmResult<&[f64]> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_slice())
            .ok_or_else(|| EdmError::InvalidParam(format!("no such column: {name}")))
    }
}
