use ndarray::{concatenate, Array2, ArrayView2, Axis as ArrayAxis};
use nino_core::{NinoError, NinoResult};

/// Concatenate the region, current and diff blocks column-wise, in that order.
///
/// Row counts must agree exactly and the current/diff blocks must be equally
/// wide. The result is rejected if any entry is NaN or infinite.
pub fn assemble(
    region: ArrayView2<'_, f64>,
    current: ArrayView2<'_, f64>,
    diff: ArrayView2<'_, f64>,
) -> NinoResult<Array2<f64>> {
    let rows = [region.nrows(), current.nrows(), diff.nrows()];
    if rows.iter().any(|&r| r != rows[0]) {
        return Err(NinoError::ShapeMismatch(format!(
            "feature blocks have {} (region), {} (current) and {} (diff) rows",
            rows[0], rows[1], rows[2]
        )));
    }
    if current.ncols() != diff.ncols() {
        return Err(NinoError::ShapeMismatch(format!(
            "current block has {} columns but diff block has {}",
            current.ncols(),
            diff.ncols()
        )));
    }

    let matrix = concatenate(ArrayAxis(1), &[region.view(), current.view(), diff.view()])?;
    if let Some(((row, col), value)) = matrix.indexed_iter().find(|(_, v)| !v.is_finite()) {
        return Err(NinoError::MissingValues(format!(
            "{value} at row {row}, column {col}"
        )));
    }
    Ok(matrix)
}
