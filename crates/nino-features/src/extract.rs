//! Masked current-temperature and first-difference blocks.

use ndarray::{s, Array2, ArrayView2, Axis as ArrayAxis};
use nino_core::{NinoError, NinoResult, SeaMask, TemperatureField};

use crate::context::TransformContext;

/// The two per-cell blocks, restricted to the valid rows and the sea columns.
#[derive(Debug, Clone, PartialEq)]
pub struct MaskedBlocks {
    pub current: Array2<f64>,
    pub diff: Array2<f64>,
}

/// Difference of neighbouring rows over a whole `(time, cells)` series.
///
/// Interior rows take `temps[t-1] - temps[t+1]`. The first row is
/// `temps[0] - temps[1]` and the last is `temps[T-2] - temps[T-1]`; these edge
/// formulas are part of the feature definition and must not be replaced by a
/// generic stencil.
pub fn first_difference(temps: ArrayView2<'_, f64>) -> NinoResult<Array2<f64>> {
    let n = temps.nrows();
    if n < 2 {
        return Err(NinoError::Validation(format!(
            "first difference needs at least 2 time steps, got {n}"
        )));
    }
    let mut diff = Array2::zeros(temps.raw_dim());
    if n > 2 {
        let interior = &temps.slice(s![..n - 2, ..]) - &temps.slice(s![2.., ..]);
        diff.slice_mut(s![1..n - 1, ..]).assign(&interior);
    }
    diff.row_mut(0).assign(&(&temps.row(0) - &temps.row(1)));
    diff.row_mut(n - 1)
        .assign(&(&temps.row(n - 2) - &temps.row(n - 1)));
    Ok(diff)
}

/// Flatten space, keep the sea columns, then cut both blocks to the valid rows.
///
/// The difference block is computed on the full series before the cut, so
/// the first valid row still sees the burn-in step before it.
pub fn masked_blocks(
    field: &TemperatureField,
    mask: &SeaMask,
    ctx: &TransformContext,
) -> NinoResult<MaskedBlocks> {
    let grid = (field.lat().len(), field.lon().len());
    if mask.dim() != grid {
        return Err(NinoError::ShapeMismatch(format!(
            "sea mask is {:?} but the temperature grid is {:?}",
            mask.dim(),
            grid
        )));
    }
    if field.n_time() != ctx.total() {
        return Err(NinoError::ShapeMismatch(format!(
            "field has {} time steps, context was built for {}",
            field.n_time(),
            ctx.total()
        )));
    }

    let sea_columns = mask.sea_indices();
    let sea = field.flattened()?.select(ArrayAxis(1), &sea_columns);
    let diff = first_difference(sea.view())?;

    let rows = ctx.valid_range();
    Ok(MaskedBlocks {
        current: sea.slice(s![rows.clone(), ..]).to_owned(),
        diff: diff.slice(s![rows, ..]).to_owned(),
    })
}
