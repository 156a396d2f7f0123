//! # nino-core: Gridded Temperature Data Model
//!
//! Provides the data structures shared by the nino crates: coordinate axes,
//! the `(time, lat, lon)` temperature field, the land-fraction reference, the
//! sea mask and the assembled feature matrix.
//!
//! ## Quick Start
//!
//! ```rust
//! use ndarray::Array3;
//! use nino_core::*;
//!
//! let lat = Axis::uniform(-4.5, 3.0, 4).unwrap();
//! let lon = Axis::uniform(180.0, 120.0, 2).unwrap();
//! let values = Array3::from_elem((24, 4, 2), 27.0);
//! let time = (0..24).map(f64::from).collect();
//!
//! let field = TemperatureField::new(time, lat, lon, values).unwrap();
//! assert_eq!(field.n_cells(), 8);
//! ```
//!
//! ## Core Data Structures
//!
//! - [`Axis`] - strictly increasing coordinate labels with inclusive range
//!   selection and pad/backfill lookups
//! - [`TemperatureField`] - temperatures with time, latitude and longitude axes
//! - [`LandFraction`] - land percentage on an independent reference grid
//! - [`SeaMask`] - boolean ocean mask aligned to a temperature grid
//! - [`FeatureMatrix`] / [`ColumnLayout`] - the dense output table
//!
//! ## Modules
//!
//! - [`diagnostics`] - non-fatal issues collected during a transform
//! - [`error`] - the unified [`NinoError`] type

pub mod axis;
pub mod diagnostics;
pub mod error;
pub mod field;
pub mod matrix;

pub use axis::Axis;
pub use diagnostics::{DiagnosticIssue, Diagnostics, Severity};
pub use error::{NinoError, NinoResult};
pub use field::{LandFraction, SeaMask, TemperatureField};
pub use matrix::{ColumnLayout, FeatureMatrix};
