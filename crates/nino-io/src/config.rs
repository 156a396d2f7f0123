//! Configuration for loading data and building features.
//!
//! A [`NinoConfig`] names the variables to read, where the land-fraction
//! reference lives and how the feature grid is laid out. It is stored as TOML
//! and every section is optional; unspecified values take the defaults below.
//!
//! ```toml
//! [dataset]
//! variable = "tas"
//!
//! [mask]
//! path = "data/mask.nc"
//!
//! [features]
//! lag_policy = "difference"
//!
//! [features.regions]
//! lags = [0, 6, 12]
//! ```

use std::path::{Path, PathBuf};

use nino_core::{NinoError, NinoResult};
use nino_features::FeatureConfig;
use serde::{Deserialize, Serialize};

/// Public location of the CMIP5 land-area fraction (`sftlf`) file.
pub const DEFAULT_MASK_URL: &str =
    "https://drive.google.com/uc?export=download&id=0B-CxJMRyTT32el85MFRSYnU5TGM";

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NinoConfig {
    /// Column and variable names of the temperature input.
    pub dataset: DatasetNames,

    /// Where the land-fraction reference comes from.
    pub mask: MaskSource,

    /// Region grid, lag policy and land threshold.
    pub features: FeatureConfig,
}

/// Names of the coordinate and data variables in the temperature input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetNames {
    pub time: String,
    pub lat: String,
    pub lon: String,
    /// Surface temperature variable.
    pub variable: String,
}

impl Default for DatasetNames {
    fn default() -> Self {
        Self {
            time: "time".to_string(),
            lat: "lat".to_string(),
            lon: "lon".to_string(),
            variable: "tas".to_string(),
        }
    }
}

/// Source of the land-fraction reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaskSource {
    /// Download location used when `path` does not exist yet.
    pub url: String,

    /// Local file, `.nc` or `.csv`.
    pub path: PathBuf,

    /// Land-area fraction variable, in percent.
    pub variable: String,

    pub lat: String,
    pub lon: String,
}

impl Default for MaskSource {
    fn default() -> Self {
        Self {
            url: DEFAULT_MASK_URL.to_string(),
            path: PathBuf::from("mask.nc"),
            variable: "sftlf".to_string(),
            lat: "lat".to_string(),
            lon: "lon".to_string(),
        }
    }
}

impl NinoConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> NinoResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
            .map_err(|err| NinoError::Config(format!("{}: {err}", path.display())))
    }

    pub fn from_toml_str(contents: &str) -> NinoResult<Self> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> NinoResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> NinoResult<()> {
        let names = [
            ("dataset.time", &self.dataset.time),
            ("dataset.lat", &self.dataset.lat),
            ("dataset.lon", &self.dataset.lon),
            ("dataset.variable", &self.dataset.variable),
            ("mask.variable", &self.mask.variable),
            ("mask.lat", &self.mask.lat),
            ("mask.lon", &self.mask.lon),
        ];
        if let Some((key, _)) = names.iter().find(|(_, value)| value.trim().is_empty()) {
            return Err(NinoError::Config(format!("{key} must not be empty")));
        }
        if self.mask.path.as_os_str().is_empty() {
            return Err(NinoError::Config("mask.path must not be empty".into()));
        }
        self.features.validate()
    }
}
