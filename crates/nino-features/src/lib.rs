//! # nino-features: El Niño Feature Matrix
//!
//! Turns a gridded sea-surface temperature series into the feature table used
//! by a downstream El Niño predictor.
//!
//! ## Pipeline
//!
//! | Step | Module | Output |
//! |------|--------|--------|
//! | Resample land fraction onto the grid | [`mask`] | [`nino_core::SeaMask`] |
//! | Band means and monthly climatology | [`region`] | region/lag block |
//! | Sea-cell temperatures and differences | [`extract`] | current + diff blocks |
//! | Column-wise concatenation | [`assemble`] | dense matrix |
//!
//! [`FeatureTransformer`] runs the whole pipeline for one
//! `(n_burn_in, n_lookahead)` pair. Per-call parameters are bundled in an
//! immutable [`TransformContext`].
//!
//! ## Example
//!
//! ```rust
//! use ndarray::Array3;
//! use nino_core::{Axis, LandFraction, TemperatureField};
//! use nino_features::{EvalIndices, FeatureTransformer};
//!
//! let lat = Axis::uniform(-4.5, 3.0, 4).unwrap();
//! let lon = Axis::uniform(180.0, 10.0, 13).unwrap();
//! let values = Array3::from_shape_fn((48, 4, 13), |(t, _, _)| 26.0 + (t % 12) as f64 * 0.1);
//! let field = TemperatureField::new((0..48).map(f64::from).collect(), lat.clone(), lon.clone(), values).unwrap();
//!
//! let transformer = FeatureTransformer::with_defaults(LandFraction::all_sea(lat, lon));
//! let x = transformer.transform(&field, 12, 6, &EvalIndices::default()).unwrap();
//! assert_eq!(x.nrows(), 30);
//! assert_eq!(x.ncols(), 5760 + 52 + 52);
//! ```

pub mod assemble;
pub mod context;
pub mod extract;
pub mod mask;
pub mod region;
pub mod transformer;

pub use assemble::assemble;
pub use context::{EvalIndices, TransformContext};
pub use extract::{first_difference, masked_blocks, MaskedBlocks};
pub use mask::{resolve_sea_mask, FULL_LAND_PERCENT};
pub use region::{
    band_mean, feature_pair, lagged_series, monthly_cumulative_mean, region_block, roll, Band,
    BandMean, LagPolicy, RegionGrid,
};
pub use transformer::{FeatureConfig, FeatureTransformer};
