use ndarray::{Array2, Array3, ArrayView2, ArrayView3};

use crate::axis::Axis;
use crate::error::{NinoError, NinoResult};

/// Gridded temperature time series indexed `(time, lat, lon)`.
#[derive(Debug, Clone, PartialEq)]
pub struct TemperatureField {
    time: Vec<f64>,
    lat: Axis,
    lon: Axis,
    values: Array3<f64>,
}

impl TemperatureField {
    /// Build a field, checking that `values` has shape `(time, lat, lon)`.
    ///
    /// Values are stored in standard (row-major) layout so that the spatial
    /// dimensions flatten lat-major.
    pub fn new(time: Vec<f64>, lat: Axis, lon: Axis, values: Array3<f64>) -> NinoResult<Self> {
        let expected = (time.len(), lat.len(), lon.len());
        if values.dim() != expected {
            return Err(NinoError::Validation(format!(
                "temperature values have shape {:?}, axes describe {:?}",
                values.dim(),
                expected
            )));
        }
        let values = if values.is_standard_layout() {
            values
        } else {
            values.as_standard_layout().into_owned()
        };
        Ok(Self {
            time,
            lat,
            lon,
            values,
        })
    }

    pub fn time(&self) -> &[f64] {
        &self.time
    }

    pub fn lat(&self) -> &Axis {
        &self.lat
    }

    pub fn lon(&self) -> &Axis {
        &self.lon
    }

    pub fn values(&self) -> ArrayView3<'_, f64> {
        self.values.view()
    }

    pub fn n_time(&self) -> usize {
        self.time.len()
    }

    pub fn n_cells(&self) -> usize {
        self.lat.len() * self.lon.len()
    }

    /// View of the values with the spatial dimensions flattened, `(time, lat * lon)`.
    pub fn flattened(&self) -> NinoResult<ArrayView2<'_, f64>> {
        Ok(self
            .values
            .view()
            .into_shape((self.n_time(), self.n_cells()))?)
    }
}

/// Land-area fraction on its own reference grid, in percent (0 = sea, 100 = land).
#[derive(Debug, Clone, PartialEq)]
pub struct LandFraction {
    lat: Axis,
    lon: Axis,
    percent: Array2<f64>,
}

impl LandFraction {
    pub fn new(lat: Axis, lon: Axis, percent: Array2<f64>) -> NinoResult<Self> {
        let expected = (lat.len(), lon.len());
        if percent.dim() != expected {
            return Err(NinoError::Validation(format!(
                "land fraction has shape {:?}, axes describe {:?}",
                percent.dim(),
                expected
            )));
        }
        Ok(Self { lat, lon, percent })
    }

    /// A reference with no land anywhere on the given axes.
    pub fn all_sea(lat: Axis, lon: Axis) -> Self {
        let percent = Array2::zeros((lat.len(), lon.len()));
        Self { lat, lon, percent }
    }

    pub fn lat(&self) -> &Axis {
        &self.lat
    }

    pub fn lon(&self) -> &Axis {
        &self.lon
    }

    pub fn percent(&self) -> ArrayView2<'_, f64> {
        self.percent.view()
    }
}

/// Boolean `(lat, lon)` mask, `true` where a cell is treated as ocean.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeaMask {
    cells: Array2<bool>,
}

impl SeaMask {
    pub fn new(cells: Array2<bool>) -> Self {
        Self { cells }
    }

    pub fn dim(&self) -> (usize, usize) {
        self.cells.dim()
    }

    pub fn cells(&self) -> ArrayView2<'_, bool> {
        self.cells.view()
    }

    pub fn is_sea(&self, lat: usize, lon: usize) -> bool {
        self.cells.get((lat, lon)).copied().unwrap_or(false)
    }

    /// Row-major (lat-major) flattening, matching [`TemperatureField::flattened`].
    pub fn flatten(&self) -> Vec<bool> {
        self.cells.iter().copied().collect()
    }

    /// Flat indices of the sea cells, in ascending order.
    pub fn sea_indices(&self) -> Vec<usize> {
        self.cells
            .iter()
            .enumerate()
            .filter_map(|(i, &sea)| sea.then_some(i))
            .collect()
    }

    pub fn sea_count(&self) -> usize {
        self.cells.iter().filter(|&&sea| sea).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array3};

    #[test]
    fn field_rejects_shape_mismatch() {
        let lat = Axis::uniform(-5.0, 5.0, 3).unwrap();
        let lon = Axis::uniform(180.0, 5.0, 2).unwrap();
        let values = Array3::<f64>::zeros((4, 2, 3));
        let err = TemperatureField::new(vec![0.0; 4], lat, lon, values).unwrap_err();
        assert!(matches!(err, NinoError::Validation(_)));
    }

    #[test]
    fn flattening_is_lat_major() {
        let lat = Axis::new(vec![0.0, 1.0]).unwrap();
        let lon = Axis::new(vec![10.0, 20.0, 30.0]).unwrap();
        let values = Array3::from_shape_fn((2, 2, 3), |(t, i, j)| (t * 100 + i * 10 + j) as f64);
        let field = TemperatureField::new(vec![0.0, 1.0], lat, lon, values).unwrap();
        let flat = field.flattened().unwrap();
        assert_eq!(flat.dim(), (2, 6));
        assert_eq!(flat[[1, 0]], 100.0);
        assert_eq!(flat[[1, 2]], 102.0);
        assert_eq!(flat[[1, 3]], 110.0);
    }

    #[test]
    fn non_standard_layout_is_normalized() {
        let lat = Axis::new(vec![0.0, 1.0]).unwrap();
        let lon = Axis::new(vec![10.0, 20.0]).unwrap();
        let values = Array3::from_shape_fn((2, 2, 2), |(a, b, c)| (a * 4 + b * 2 + c) as f64);
        let permuted = values.clone().permuted_axes([0, 2, 1]);
        let field = TemperatureField::new(vec![0.0, 1.0], lat, lon, permuted.clone()).unwrap();
        assert_eq!(field.values(), permuted.view());
        assert!(field.flattened().is_ok());
    }

    #[test]
    fn sea_mask_counts_and_indices() {
        let mask = SeaMask::new(array![[true, false], [false, true]]);
        assert_eq!(mask.sea_count(), 2);
        assert_eq!(mask.flatten(), vec![true, false, false, true]);
        assert_eq!(mask.sea_indices(), vec![0, 3]);
        assert!(!mask.is_sea(5, 5));
    }
}
