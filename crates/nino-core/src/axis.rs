use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::error::{NinoError, NinoResult};

/// An ordered coordinate axis (latitude or longitude labels in degrees).
///
/// Labels are finite and strictly increasing, which is what label-range
/// selection and directional nearest-neighbour lookups rely on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct Axis {
    labels: Vec<f64>,
}

impl Axis {
    pub fn new(labels: Vec<f64>) -> NinoResult<Self> {
        if labels.is_empty() {
            return Err(NinoError::Validation("axis has no labels".into()));
        }
        if let Some(bad) = labels.iter().position(|v| !v.is_finite()) {
            return Err(NinoError::Validation(format!(
                "axis label at index {bad} is not finite"
            )));
        }
        if let Some(i) = labels.windows(2).position(|w| w[0] >= w[1]) {
            return Err(NinoError::Validation(format!(
                "axis labels must be strictly increasing ({} >= {} at index {})",
                labels[i],
                labels[i + 1],
                i + 1
            )));
        }
        Ok(Self { labels })
    }

    /// Evenly spaced axis: `start, start + step, ...` with `len` labels.
    pub fn uniform(start: f64, step: f64, len: usize) -> NinoResult<Self> {
        Self::new((0..len).map(|i| start + step * i as f64).collect())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    #[inline]
    pub fn labels(&self) -> &[f64] {
        &self.labels
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<f64> {
        self.labels.get(index).copied()
    }

    /// Indices of labels inside `[lo, hi]`, both ends inclusive.
    pub fn select(&self, lo: f64, hi: f64) -> Range<usize> {
        let start = self.labels.partition_point(|&v| v < lo);
        let end = self.labels.partition_point(|&v| v <= hi);
        start..end.max(start)
    }

    /// Index of the nearest label at or before `x` (forward fill).
    pub fn pad_index(&self, x: f64) -> Option<usize> {
        if x.is_nan() {
            return None;
        }
        match self.labels.partition_point(|&v| v <= x) {
            0 => None,
            n => Some(n - 1),
        }
    }

    /// Index of the nearest label at or after `x` (backward fill).
    pub fn backfill_index(&self, x: f64) -> Option<usize> {
        if x.is_nan() {
            return None;
        }
        let idx = self.labels.partition_point(|&v| v < x);
        (idx < self.labels.len()).then_some(idx)
    }
}

impl TryFrom<Vec<f64>> for Axis {
    type Error = NinoError;

    fn try_from(labels: Vec<f64>) -> Result<Self, Self::Error> {
        Axis::new(labels)
    }
}

impl From<Axis> for Vec<f64> {
    fn from(axis: Axis) -> Self {
        axis.labels
    }
}
