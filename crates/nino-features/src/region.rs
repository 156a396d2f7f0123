//! Region/lag feature grid.
//!
//! Every `(latitude band, longitude band, lag)` combination contributes two
//! columns: the band-mean temperature and a running monthly climatology of
//! that mean, rotated so it lines up with the month being predicted.
//!
//! **Algorithm** (per band):
//! 1. Average all grid cells inside the band at each time step (NaN cells skipped)
//! 2. Accumulate a per-calendar-month cumulative mean over the full series
//! 3. Rotate the climatology circularly by `lookahead - 12`
//! 4. Cut both series to the valid rows
//!
//! The lag only reaches the output under [`LagPolicy::Difference`]. With the
//! default [`LagPolicy::Ignored`] every lag of a band yields the same pair of
//! columns.

use ndarray::{s, Array1, Array2, ArrayView1, ArrayView3};
use nino_core::{Axis, DiagnosticIssue, Diagnostics, NinoError, NinoResult, Severity};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::context::TransformContext;

const MONTHS_PER_YEAR: usize = 12;

/// How the lag offset of a grid entry affects its columns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LagPolicy {
    /// The lagged series is formed but not used; all lags of a band repeat
    /// the band's value/climatology pair.
    #[default]
    Ignored,
    /// Features are built from `mean - roll(mean, lookahead - lag)` for
    /// non-zero lags (and from `roll(mean, lookahead)` for lag 0).
    Difference,
}

/// Enumeration of band starts, band widths and lags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegionGrid {
    /// Southern edge of each latitude band, degrees.
    pub lat_starts: Vec<f64>,
    pub lat_width: f64,
    /// Western edge of each longitude band, degrees east.
    pub lon_starts: Vec<f64>,
    pub lon_width: f64,
    pub lags: Vec<usize>,
}

impl Default for RegionGrid {
    /// Equatorial Pacific strip: one 10 degree latitude band from -5,
    /// 10 degree longitude bands every 5 degrees from 180 to 295 east, lags 0..120.
    fn default() -> Self {
        Self {
            lat_starts: vec![-5.0],
            lat_width: 10.0,
            lon_starts: (180..300).step_by(5).map(f64::from).collect(),
            lon_width: 10.0,
            lags: (0..120).collect(),
        }
    }
}

impl RegionGrid {
    pub fn validate(&self) -> NinoResult<()> {
        for (name, width) in [("lat_width", self.lat_width), ("lon_width", self.lon_width)] {
            if !width.is_finite() || width < 0.0 {
                return Err(NinoError::Config(format!(
                    "{name} must be a non-negative number, got {width}"
                )));
            }
        }
        if let Some(bad) = self
            .lat_starts
            .iter()
            .chain(&self.lon_starts)
            .find(|v| !v.is_finite())
        {
            return Err(NinoError::Config(format!(
                "band starts must be finite, got {bad}"
            )));
        }
        Ok(())
    }

    /// Bands in enumeration order: latitude outer, longitude inner.
    pub fn bands(&self) -> impl Iterator<Item = Band> + '_ {
        self.lat_starts.iter().flat_map(move |&lat| {
            self.lon_starts.iter().map(move |&lon| Band {
                lat_lo: lat,
                lat_hi: lat + self.lat_width,
                lon_lo: lon,
                lon_hi: lon + self.lon_width,
            })
        })
    }

    pub fn n_bands(&self) -> usize {
        self.lat_starts.len() * self.lon_starts.len()
    }

    /// Two columns per `(lat, lon, lag)` combination.
    pub fn n_columns(&self) -> usize {
        self.n_bands() * self.lags.len() * 2
    }
}

/// A latitude/longitude box, inclusive on all edges.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band {
    pub lat_lo: f64,
    pub lat_hi: f64,
    pub lon_lo: f64,
    pub lon_hi: f64,
}

impl Band {
    pub fn label(&self) -> String {
        format!("lat{}_lon{}", self.lat_lo, self.lon_lo)
    }

    fn describe(&self) -> String {
        format!(
            "lat {}..{}, lon {}..{}",
            self.lat_lo, self.lat_hi, self.lon_lo, self.lon_hi
        )
    }
}

/// Circular shift with numpy `roll` semantics: `out[i] = series[(i - shift) mod n]`.
pub fn roll(series: ArrayView1<'_, f64>, shift: isize) -> Array1<f64> {
    let n = series.len();
    if n == 0 {
        return Array1::zeros(0);
    }
    let k = shift.rem_euclid(n as isize) as usize;
    Array1::from_shape_fn(n, |i| series[(i + n - k) % n])
}

/// Running mean per calendar month: the value at `t` averages the series at
/// `t % 12, t % 12 + 12, ..., t`.
///
/// Equivalent to reshaping into `(years, 12)`, dividing the cumulative sum down
/// each month column by the cumulative count of a ones matrix, and flattening
/// back. A trailing partial year follows the same rule.
pub fn monthly_cumulative_mean(series: ArrayView1<'_, f64>) -> Array1<f64> {
    let mut sums = [0.0_f64; MONTHS_PER_YEAR];
    let mut counts = [0.0_f64; MONTHS_PER_YEAR];
    series
        .iter()
        .enumerate()
        .map(|(t, &value)| {
            let month = t % MONTHS_PER_YEAR;
            sums[month] += value;
            counts[month] += 1.0;
            sums[month] / counts[month]
        })
        .collect()
}

/// Lagged band series: `roll(mean, lookahead - lag)`, differenced against the
/// mean itself when `lag != 0`.
pub fn lagged_series(mean: ArrayView1<'_, f64>, ctx: &TransformContext, lag: usize) -> Array1<f64> {
    let rolled = roll(mean, ctx.lag_shift(lag));
    if lag != 0 {
        &mean - &rolled
    } else {
        rolled
    }
}

/// Band-mean series with a record of the NaN cells left out of it.
#[derive(Debug, Clone, PartialEq)]
pub struct BandMean {
    pub series: Array1<f64>,
    /// NaN cell values skipped over all time steps.
    pub skipped: usize,
    /// First time index at which a cell was skipped.
    pub first_skipped: Option<usize>,
}

/// Mean over the cells of one band at every time step, skipping NaN cells.
pub fn band_mean(
    values: ArrayView3<'_, f64>,
    lat: &Axis,
    lon: &Axis,
    band: &Band,
) -> NinoResult<BandMean> {
    let rows = lat.select(band.lat_lo, band.lat_hi);
    let cols = lon.select(band.lon_lo, band.lon_hi);
    if rows.is_empty() || cols.is_empty() {
        return Err(NinoError::EmptyRegion(format!(
            "{} selects no grid cells",
            band.describe()
        )));
    }

    let window = values.slice(s![.., rows, cols]);
    let mut skipped = 0;
    let mut first_skipped = None;
    let mut mean = Array1::zeros(values.dim().0);
    for (t, frame) in window.outer_iter().enumerate() {
        let (sum, count) = frame
            .iter()
            .filter(|v| !v.is_nan())
            .fold((0.0, 0usize), |(acc, n), &v| (acc + v, n + 1));
        if count == 0 {
            return Err(NinoError::EmptyRegion(format!(
                "{} has no valid cells at time index {t}",
                band.describe()
            )));
        }
        if count < frame.len() {
            skipped += frame.len() - count;
            first_skipped.get_or_insert(t);
        }
        mean[t] = sum / count as f64;
    }
    Ok(BandMean {
        series: mean,
        skipped,
        first_skipped,
    })
}

/// Value and rotated-climatology columns for one series, cut to the valid rows.
pub fn feature_pair(
    series: ArrayView1<'_, f64>,
    ctx: &TransformContext,
) -> (Array1<f64>, Array1<f64>) {
    let climatology = roll(
        monthly_cumulative_mean(series).view(),
        ctx.climatology_shift(),
    );
    let rows = ctx.valid_range();
    (
        series.slice(s![rows.clone()]).to_owned(),
        climatology.slice(s![rows]).to_owned(),
    )
}

/// The region/lag block, `(valid rows, grid.n_columns())`, with its column names.
pub fn region_block(
    values: ArrayView3<'_, f64>,
    lat: &Axis,
    lon: &Axis,
    grid: &RegionGrid,
    policy: LagPolicy,
    ctx: &TransformContext,
    diagnostics: &mut Diagnostics,
) -> NinoResult<(Array2<f64>, Vec<String>)> {
    let mut block = Array2::zeros((ctx.valid_len(), grid.n_columns()));
    let mut names = Vec::with_capacity(grid.n_columns());
    let mut column = 0;

    for band in grid.bands() {
        let BandMean {
            series: mean,
            skipped,
            first_skipped,
        } = band_mean(values, lat, lon, &band)?;
        if let Some(t) = first_skipped {
            diagnostics.add(
                DiagnosticIssue::new(
                    Severity::Warning,
                    "region",
                    format!("{skipped} NaN cell values skipped in band means"),
                )
                .with_region(band.describe())
                .with_time_index(t),
            );
        }

        // Under `Ignored` the pair does not depend on the lag: build it once.
        let shared = match policy {
            LagPolicy::Ignored => Some(feature_pair(mean.view(), ctx)),
            LagPolicy::Difference => None,
        };

        for &lag in &grid.lags {
            let owned;
            let (value, climatology) = match &shared {
                Some(pair) => pair,
                None => {
                    let lagged = lagged_series(mean.view(), ctx, lag);
                    owned = feature_pair(lagged.view(), ctx);
                    &owned
                }
            };
            block.column_mut(column).assign(value);
            block.column_mut(column + 1).assign(climatology);
            names.push(format!("{}_lag{lag}_value", band.label()));
            names.push(format!("{}_lag{lag}_climatology", band.label()));
            column += 2;
        }
    }

    debug!(
        bands = grid.n_bands(),
        lags = grid.lags.len(),
        columns = column,
        "built region/lag block"
    );
    Ok((block, names))
}
