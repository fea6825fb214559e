//! Ordered-columns table used by every pipeline stage.
//!
//! A [`Table`] is a sequence of named [`Column`]s sharing one row count.
//! All operations (`select`, `rename`, `filter`, `melt`, `unpivot`,
//! `map_column`, `drop_nulls`) are pure: they borrow the table and return a
//! new one, so each stage's output can be inspected on its own.
//!
//! Name lookups resolve to the first column carrying that name.

use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashMap;

use crate::error::{TransformError, TransformResult};

// =============================================================================
// Cells
// =============================================================================

/// A single table value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    /// Raw text as read from the source.
    Text(String),
    /// Parsed decimal.
    Number(f64),
    /// Missing value.
    Null,
}

impl Cell {
    pub fn text(value: impl Into<String>) -> Self {
        Cell::Text(value.into())
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }

    /// JSON value of this cell, `None` for NaN or infinity.
    pub fn to_json(&self) -> Option<Value> {
        match self {
            Cell::Text(s) => Some(Value::String(s.clone())),
            Cell::Number(n) => serde_json::Number::from_f64(*n).map(Value::Number),
            Cell::Null => Some(Value::Null),
        }
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

// =============================================================================
// Columns
// =============================================================================

/// A named vector of cells.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    cells: Vec<Cell>,
}

impl Column {
    pub fn new(name: impl Into<String>, cells: Vec<Cell>) -> Self {
        Self {
            name: name.into(),
            cells,
        }
    }

    /// Build a text column from string values.
    pub fn from_strings<I, S>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(name, values.into_iter().map(|v| Cell::Text(v.into())).collect())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Same cells under a different name.
    pub fn renamed(&self, name: impl Into<String>) -> Self {
        Self::new(name, self.cells.clone())
    }

    fn take(&self, rows: &[usize]) -> Self {
        Self::new(
            self.name.clone(),
            rows.iter().map(|&i| self.cells[i].clone()).collect(),
        )
    }
}

// =============================================================================
// Table
// =============================================================================

/// Ordered columns with a uniform row count.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<Column>,
    height: usize,
}

impl Table {
    /// Build a table, checking every column has the same length.
    pub fn new(columns: Vec<Column>) -> TransformResult<Self> {
        let height = columns.first().map(Column::len).unwrap_or(0);
        if let Some(bad) = columns.iter().find(|c| c.len() != height) {
            return Err(TransformError::ColumnLength {
                column: bad.name.clone(),
                expected: height,
                found: bad.len(),
            });
        }
        Ok(Self { columns, height })
    }

    /// A zero-row table with the given headers.
    pub fn empty<S: AsRef<str>>(headers: &[S]) -> Self {
        Self {
            columns: headers
                .iter()
                .map(|h| Column::new(h.as_ref(), Vec::new()))
                .collect(),
            height: 0,
        }
    }

    /// Build a table from row-major data.
    pub fn from_rows(headers: Vec<String>, rows: Vec<Vec<Cell>>) -> TransformResult<Self> {
        let width = headers.len();
        let mut columns: Vec<Vec<Cell>> = (0..width).map(|_| Vec::with_capacity(rows.len())).collect();

        for (row_idx, row) in rows.into_iter().enumerate() {
            if row.len() != width {
                return Err(TransformError::RowWidth {
                    row: row_idx + 1,
                    expected: width,
                    found: row.len(),
                });
            }
            for (col, cell) in columns.iter_mut().zip(row) {
                col.push(cell);
            }
        }

        Self::new(
            headers
                .into_iter()
                .zip(columns)
                .map(|(name, cells)| Column::new(name, cells))
                .collect(),
        )
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.height == 0
    }

    pub fn headers(&self) -> Vec<&str> {
        self.columns.iter().map(Column::name).collect()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Like [`Table::column`] but a missing column is an error.
    pub fn require(&self, name: &str) -> TransformResult<&Column> {
        self.column(name)
            .ok_or_else(|| TransformError::MissingColumn(name.to_string()))
    }

    /// Cells of row `index`, in column order.
    pub fn row(&self, index: usize) -> Option<Vec<&Cell>> {
        if index >= self.height {
            return None;
        }
        Some(self.columns.iter().map(|c| &c.cells[index]).collect())
    }

    pub fn rows(&self) -> impl Iterator<Item = Vec<&Cell>> + '_ {
        (0..self.height).map(move |i| self.columns.iter().map(|c| &c.cells[i]).collect())
    }

    /// Keep only the named columns, in the given order.
    pub fn select<S: AsRef<str>>(&self, names: &[S]) -> TransformResult<Table> {
        let columns = names
            .iter()
            .map(|n| self.require(n.as_ref()).cloned())
            .collect::<TransformResult<Vec<_>>>()?;
        Ok(Self {
            columns,
            height: self.height,
        })
    }

    /// Rename columns by `old -> new`. Names absent from the table are ignored.
    pub fn rename(&self, mapping: &HashMap<String, String>) -> Table {
        let columns = self
            .columns
            .iter()
            .map(|c| match mapping.get(&c.name) {
                Some(new_name) => c.renamed(new_name.clone()),
                None => c.clone(),
            })
            .collect();
        Self {
            columns,
            height: self.height,
        }
    }

    /// Keep the rows whose mask entry is `true`.
    pub fn filter(&self, mask: &[bool]) -> TransformResult<Table> {
        if mask.len() != self.height {
            return Err(TransformError::ColumnLength {
                column: "<mask>".to_string(),
                expected: self.height,
                found: mask.len(),
            });
        }
        let keep: Vec<usize> = mask
            .iter()
            .enumerate()
            .filter_map(|(i, &k)| k.then_some(i))
            .collect();
        Ok(self.take(&keep))
    }

    /// Keep the rows where `column` holds exactly the text `value`.
    pub fn filter_eq(&self, column: &str, value: &str) -> TransformResult<Table> {
        let mask: Vec<bool> = self
            .require(column)?
            .cells
            .iter()
            .map(|c| c.as_str() == Some(value))
            .collect();
        self.filter(&mask)
    }

    /// Replace every cell of `column` with `f(cell)`.
    pub fn map_column<F>(&self, column: &str, mut f: F) -> TransformResult<Table>
    where
        F: FnMut(&Cell) -> Cell,
    {
        let index = self
            .columns
            .iter()
            .position(|c| c.name == column)
            .ok_or_else(|| TransformError::MissingColumn(column.to_string()))?;

        let mut columns = self.columns.clone();
        columns[index].cells = self.columns[index].cells.iter().map(&mut f).collect();
        Ok(Self {
            columns,
            height: self.height,
        })
    }

    /// Drop the rows where `column` is [`Cell::Null`].
    pub fn drop_nulls(&self, column: &str) -> TransformResult<Table> {
        let mask: Vec<bool> = self
            .require(column)?
            .cells
            .iter()
            .map(|c| !c.is_null())
            .collect();
        self.filter(&mask)
    }

    /// Unpivot `value_vars` into a `var_name` / `value_name` column pair.
    ///
    /// Produces one row per (source row, value column), ordered by source row
    /// and then by the order of `value_vars`. Only `id_vars` are carried
    /// over; the output has `height * value_vars.len()` rows.
    pub fn melt<S: AsRef<str>, V: AsRef<str>>(
        &self,
        id_vars: &[S],
        value_vars: &[V],
        var_name: &str,
        value_name: &str,
    ) -> TransformResult<Table> {
        let values = self.select(value_vars)?;
        self.unpivot(id_vars, &values, var_name, value_name)
    }

    /// Like [`Table::melt`], but the value columns are every column of
    /// `values`, taken by position. Columns sharing a name stay distinct.
    pub fn unpivot<S: AsRef<str>>(
        &self,
        id_vars: &[S],
        values: &Table,
        var_name: &str,
        value_name: &str,
    ) -> TransformResult<Table> {
        if values.width() > 0 && values.height != self.height {
            return Err(TransformError::ColumnLength {
                column: values.columns[0].name.clone(),
                expected: self.height,
                found: values.height,
            });
        }

        let ids = id_vars
            .iter()
            .map(|n| self.require(n.as_ref()))
            .collect::<TransformResult<Vec<_>>>()?;
        let values = &values.columns;

        let out_height = self.height * values.len();
        let mut id_cells: Vec<Vec<Cell>> = ids.iter().map(|_| Vec::with_capacity(out_height)).collect();
        let mut var_cells = Vec::with_capacity(out_height);
        let mut value_cells = Vec::with_capacity(out_height);

        for row in 0..self.height {
            for value_col in values {
                for (out, id_col) in id_cells.iter_mut().zip(&ids) {
                    out.push(id_col.cells[row].clone());
                }
                var_cells.push(Cell::Text(value_col.name.clone()));
                value_cells.push(value_col.cells[row].clone());
            }
        }

        let mut columns: Vec<Column> = ids
            .iter()
            .zip(id_cells)
            .map(|(c, cells)| Column::new(c.name.clone(), cells))
            .collect();
        columns.push(Column::new(var_name, var_cells));
        columns.push(Column::new(value_name, value_cells));
        Table::new(columns)
    }

    /// Rows as JSON objects keyed by column name.
    ///
    /// JSON has no NaN or infinity, so a non-finite number is an error.
    pub fn to_records(&self) -> TransformResult<Vec<Value>> {
        self.rows()
            .enumerate()
            .map(|(row_idx, row)| {
                self.columns
                    .iter()
                    .zip(row)
                    .map(|(col, cell)| {
                        let value = cell.to_json().ok_or_else(|| TransformError::NonFiniteNumber {
                            column: col.name.clone(),
                            row: row_idx + 1,
                        })?;
                        Ok((col.name.clone(), value))
                    })
                    .collect::<TransformResult<Map<String, Value>>>()
                    .map(Value::Object)
            })
            .collect()
    }

    fn take(&self, rows: &[usize]) -> Table {
        Self {
            columns: self.columns.iter().map(|c| c.take(rows)).collect(),
            height: rows.len(),
        }
    }
}
