//! # nino-io: Data Loading for the El Niño Feature Pipeline
//!
//! File and network I/O around [`nino_features`]: configuration, the
//! land-fraction reference download, and readers/writers for gridded data.
//!
//! ## Supported Formats
//!
//! | Format | Extension | Feature | Notes |
//! |--------|-----------|---------|-------|
//! | Long-format CSV | `.csv` | always | one grid point per row |
//! | NetCDF | `.nc` | `netcdf` | `(time, lat, lon)` and `(lat, lon)` variables, CF-decoded |
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use nino_features::EvalIndices;
//! use nino_io::{load_temperature, prepare_transformer, write_feature_matrix_csv, NinoConfig};
//!
//! fn main() -> nino_core::NinoResult<()> {
//!     let config = NinoConfig::load("nino.toml")?;
//!     let transformer = prepare_transformer(&config)?;
//!     let field = load_temperature("tas.csv".as_ref(), &config.dataset)?;
//!     let x = transformer.transform(&field, 120, 6, &EvalIndices::default())?;
//!     write_feature_matrix_csv(&x, "features.csv".as_ref())?;
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! - `native-io` (default): download the reference with `ureq`
//! - `netcdf`: read `.nc` files through the system netCDF library

use std::path::Path;

use nino_core::{LandFraction, NinoError, NinoResult, TemperatureField};
use nino_features::FeatureTransformer;

pub mod cf;
pub mod config;
#[cfg(feature = "netcdf")]
pub mod netcdf_io;
pub mod reference;
pub mod tabular;

pub use cf::{decode_cf, CfEncoding};
pub use config::{DatasetNames, MaskSource, NinoConfig, DEFAULT_MASK_URL};
pub use reference::{ensure_reference, write_atomically};
pub use tabular::{read_land_fraction_csv, read_temperature_csv, write_feature_matrix_csv};

/// File formats recognised by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Csv,
    NetCdf,
}

impl Format {
    pub fn from_path(path: &Path) -> NinoResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("csv") => Ok(Format::Csv),
            Some("nc") | Some("nc4") => Ok(Format::NetCdf),
            _ => Err(NinoError::Parse(format!(
                "unrecognised file type '{}', expected .csv or .nc",
                path.display()
            ))),
        }
    }

    /// Fail if this build has no reader for the format.
    pub fn ensure_supported(self) -> NinoResult<Self> {
        match self {
            Format::NetCdf if !cfg!(feature = "netcdf") => {
                Err(NinoError::FeatureDisabled("NetCDF", "netcdf"))
            }
            _ => Ok(self),
        }
    }
}

/// Load a temperature field, choosing the reader from the file extension.
pub fn load_temperature(path: &Path, names: &DatasetNames) -> NinoResult<TemperatureField> {
    match Format::from_path(path)?.ensure_supported()? {
        Format::Csv => read_temperature_csv(path, names),
        #[cfg(feature = "netcdf")]
        Format::NetCdf => netcdf_io::read_temperature_netcdf(path, names),
        #[cfg(not(feature = "netcdf"))]
        Format::NetCdf => Err(NinoError::FeatureDisabled("NetCDF", "netcdf")),
    }
}

/// Load a land-area fraction, choosing the reader from the file extension.
pub fn load_land_fraction(path: &Path, source: &MaskSource) -> NinoResult<LandFraction> {
    match Format::from_path(path)?.ensure_supported()? {
        Format::Csv => read_land_fraction_csv(path, source),
        #[cfg(feature = "netcdf")]
        Format::NetCdf => netcdf_io::read_land_fraction_netcdf(path, source),
        #[cfg(not(feature = "netcdf"))]
        Format::NetCdf => Err(NinoError::FeatureDisabled("NetCDF", "netcdf")),
    }
}

/// Ensure the reference is present, load it and build a transformer.
///
/// The reference format is checked before anything is downloaded.
pub fn prepare_transformer(config: &NinoConfig) -> NinoResult<FeatureTransformer> {
    config.validate()?;
    Format::from_path(&config.mask.path)?.ensure_supported()?;
    let path = ensure_reference(&config.mask)?;
    let reference = load_land_fraction(&path, &config.mask)?;
    FeatureTransformer::new(config.features.clone(), reference)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_are_detected_by_extension() {
        assert_eq!(Format::from_path(Path::new("a/b.CSV")).unwrap(), Format::Csv);
        assert_eq!(
            Format::from_path(Path::new("mask.nc")).unwrap(),
            Format::NetCdf
        );
        assert!(Format::from_path(Path::new("mask")).is_err());
        assert!(Format::from_path(Path::new("mask.parquet")).is_err());
    }

    #[cfg(not(feature = "netcdf"))]
    #[test]
    fn netcdf_without_feature_is_reported() {
        let err = load_land_fraction(Path::new("mask.nc"), &MaskSource::default()).unwrap_err();
        assert!(matches!(err, NinoError::FeatureDisabled("NetCDF", "netcdf")));
        assert!(err.to_string().contains("'netcdf' feature"));
    }

    #[cfg(not(feature = "netcdf"))]
    #[test]
    fn unreadable_reference_format_is_rejected_before_download() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = NinoConfig::default();
        config.mask.path = dir.path().join("mask.nc");
        config.mask.url = "http://127.0.0.1:9/mask.nc".to_string();

        // a fetch attempt would surface as a Fetch error instead
        let err = prepare_transformer(&config).unwrap_err();
        assert!(matches!(err, NinoError::FeatureDisabled("NetCDF", "netcdf")));
        assert!(!config.mask.path.exists());
    }

    #[test]
    fn unknown_reference_extension_is_rejected_before_download() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = NinoConfig::default();
        config.mask.path = dir.path().join("mask.parquet");
        config.mask.url = "http://127.0.0.1:9/mask.parquet".to_string();

        let err = prepare_transformer(&config).unwrap_err();
        assert!(matches!(err, NinoError::Parse(_)));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
