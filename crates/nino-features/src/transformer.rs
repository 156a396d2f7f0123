use nino_core::{
    ColumnLayout, Diagnostics, FeatureMatrix, LandFraction, NinoError, NinoResult, SeaMask,
    TemperatureField,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::assemble::assemble;
use crate::context::{EvalIndices, TransformContext};
use crate::extract::masked_blocks;
use crate::mask::{resolve_sea_mask, FULL_LAND_PERCENT};
use crate::region::{region_block, LagPolicy, RegionGrid};

/// Settings for [`FeatureTransformer`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureConfig {
    pub lag_policy: LagPolicy,
    /// Land percentage at or above which a reference cell is land.
    pub land_threshold: f64,
    pub regions: RegionGrid,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            lag_policy: LagPolicy::default(),
            land_threshold: FULL_LAND_PERCENT,
            regions: RegionGrid::default(),
        }
    }
}

impl FeatureConfig {
    pub fn validate(&self) -> NinoResult<()> {
        self.regions.validate()?;
        if self.land_threshold.is_nan() {
            return Err(NinoError::Config("land_threshold must be a number".into()));
        }
        Ok(())
    }
}

/// Builds the El Niño feature matrix from a temperature field.
///
/// **Output layout**, one row per time step in `[n_burn_in, T - n_lookahead)`:
///
/// 1. Region/lag grid: two columns (band mean, rotated monthly climatology)
///    for every `(lat band, lon band, lag)` of [`RegionGrid`]
/// 2. Temperatures at every sea cell (row-major over lat, lon)
/// 3. First differences at every sea cell, same column order
///
/// The transformer holds only configuration and the land-fraction reference.
/// Everything that depends on a call lives in a [`TransformContext`], so two
/// calls with the same inputs produce identical matrices.
///
/// **Example Usage:**
/// ```ignore
/// let reference = nino_io::load_land_fraction(&path, &config.mask)?;
/// let transformer = FeatureTransformer::new(config.features, reference)?;
/// let x = transformer.transform(&field, 120, 6, &EvalIndices::default())?;
/// ```
#[derive(Debug, Clone)]
pub struct FeatureTransformer {
    config: FeatureConfig,
    reference: LandFraction,
}

impl FeatureTransformer {
    pub fn new(config: FeatureConfig, reference: LandFraction) -> NinoResult<Self> {
        config.validate()?;
        Ok(Self { config, reference })
    }

    pub fn with_defaults(reference: LandFraction) -> Self {
        Self {
            config: FeatureConfig::default(),
            reference,
        }
    }

    pub fn config(&self) -> &FeatureConfig {
        &self.config
    }

    pub fn reference(&self) -> &LandFraction {
        &self.reference
    }

    /// Sea mask of the reference resampled onto the field's grid.
    pub fn sea_mask(&self, field: &TemperatureField) -> SeaMask {
        resolve_sea_mask(
            &self.reference,
            field.lat(),
            field.lon(),
            self.config.land_threshold,
        )
    }

    pub fn transform(
        &self,
        field: &TemperatureField,
        n_burn_in: usize,
        n_lookahead: usize,
        eval_indices: &EvalIndices,
    ) -> NinoResult<FeatureMatrix> {
        self.transform_with_diagnostics(field, n_burn_in, n_lookahead, eval_indices)
            .map(|(matrix, _)| matrix)
    }

    pub fn transform_with_diagnostics(
        &self,
        field: &TemperatureField,
        n_burn_in: usize,
        n_lookahead: usize,
        eval_indices: &EvalIndices,
    ) -> NinoResult<(FeatureMatrix, Diagnostics)> {
        let ctx = TransformContext::new(
            field.n_time(),
            n_burn_in,
            n_lookahead,
            eval_indices.clone(),
        )?;
        let mut diagnostics = Diagnostics::new();
        debug!(
            valid = ?ctx.valid_range(),
            eval_rows = ctx.eval_indices().len(),
            "transform context"
        );

        if ctx.total() % 12 != 0 {
            let message = format!(
                "{} time steps is not a whole number of years; the last {} month(s) form a partial year",
                ctx.total(),
                ctx.total() % 12
            );
            warn!("{message}");
            diagnostics.add_warning("climatology", &message);
        }
        if self.config.lag_policy == LagPolicy::Ignored && self.config.regions.lags.len() > 1 {
            diagnostics.add_note(
                "lag",
                "lag offsets do not reach the output; each lag repeats its band's columns",
            );
        }

        let mask = self.sea_mask(field);
        debug!(
            sea_cells = mask.sea_count(),
            grid_cells = field.n_cells(),
            "resolved sea mask"
        );

        let (region, region_columns) = region_block(
            field.values(),
            field.lat(),
            field.lon(),
            &self.config.regions,
            self.config.lag_policy,
            &ctx,
            &mut diagnostics,
        )?;
        let blocks = masked_blocks(field, &mask, &ctx)?;
        let values = assemble(region.view(), blocks.current.view(), blocks.diff.view())?;

        let lon_len = field.lon().len();
        let layout = ColumnLayout {
            valid_range: ctx.valid_range(),
            region_columns,
            sea_cells: mask
                .sea_indices()
                .into_iter()
                .map(|flat| (flat / lon_len, flat % lon_len))
                .collect(),
        };

        info!(
            rows = values.nrows(),
            region_columns = layout.region_width(),
            sea_columns = layout.sea_width(),
            total_columns = values.ncols(),
            "feature matrix assembled"
        );
        if diagnostics.has_warnings() {
            warn!(summary = %diagnostics.summary(), "feature matrix built with warnings");
        }
        Ok((FeatureMatrix::from_parts(values, layout), diagnostics))
    }
}
