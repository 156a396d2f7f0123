use std::ops::Range;

use ndarray::{Array2, ArrayView2};

/// Column bookkeeping for a [`FeatureMatrix`].
///
/// Columns are laid out as region/lag features, then masked current
/// temperatures, then masked differences.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnLayout {
    /// Time indices (into the full series) covered by the rows.
    pub valid_range: Range<usize>,
    /// One name per region/lag column, in column order.
    pub region_columns: Vec<String>,
    /// `(lat index, lon index)` of every sea cell, in column order.
    pub sea_cells: Vec<(usize, usize)>,
}

impl ColumnLayout {
    pub fn region_width(&self) -> usize {
        self.region_columns.len()
    }

    /// Width of the raw block; the diff block has the same width.
    pub fn sea_width(&self) -> usize {
        self.sea_cells.len()
    }

    pub fn total_width(&self) -> usize {
        self.region_width() + 2 * self.sea_width()
    }

    pub fn raw_columns(&self) -> Range<usize> {
        let start = self.region_width();
        start..start + self.sea_width()
    }

    pub fn diff_columns(&self) -> Range<usize> {
        let start = self.region_width() + self.sea_width();
        start..start + self.sea_width()
    }

    pub fn column_names(&self) -> Vec<String> {
        let mut names = Vec::with_capacity(self.total_width());
        names.extend(self.region_columns.iter().cloned());
        names.extend(
            self.sea_cells
                .iter()
                .map(|(i, j)| format!("temp_y{i}_x{j}")),
        );
        names.extend(
            self.sea_cells
                .iter()
                .map(|(i, j)| format!("diff_y{i}_x{j}")),
        );
        names
    }
}

/// Dense feature table, one row per valid time step.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    values: Array2<f64>,
    layout: ColumnLayout,
}

impl FeatureMatrix {
    /// Callers are expected to have checked that `values` is
    /// `(valid_range.len(), layout.total_width())`.
    pub fn from_parts(values: Array2<f64>, layout: ColumnLayout) -> Self {
        Self { values, layout }
    }

    pub fn values(&self) -> ArrayView2<'_, f64> {
        self.values.view()
    }

    pub fn into_values(self) -> Array2<f64> {
        self.values
    }

    pub fn layout(&self) -> &ColumnLayout {
        &self.layout
    }

    pub fn nrows(&self) -> usize {
        self.values.nrows()
    }

    pub fn ncols(&self) -> usize {
        self.values.ncols()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.layout.column_names()
    }
}
