//! NetCDF readers, enabled with the `netcdf` feature.
//!
//! Variables are read whole as `f64` and decoded with their CF attributes
//! (`_FillValue`, `missing_value`, `scale_factor`, `add_offset`). The
//! temperature variable must be laid out `(time, lat, lon)` and the land
//! fraction `(lat, lon)`, using the dimension names from the configuration.

use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use ndarray::{Array2, Array3};
use nino_core::{Axis, LandFraction, NinoError, NinoResult, TemperatureField};
use netcdf::AttributeValue;
use tracing::debug;

use crate::cf::{decode_cf, CfEncoding};
use crate::config::{DatasetNames, MaskSource};

pub fn read_temperature_netcdf(path: &Path, names: &DatasetNames) -> NinoResult<TemperatureField> {
    read_temperature(path, names).map_err(|err| NinoError::Parse(format!("{err:#}")))
}

pub fn read_land_fraction_netcdf(path: &Path, source: &MaskSource) -> NinoResult<LandFraction> {
    read_land_fraction(path, source).map_err(|err| NinoError::Parse(format!("{err:#}")))
}

fn read_temperature(path: &Path, names: &DatasetNames) -> Result<TemperatureField> {
    let file = netcdf::open(path).with_context(|| format!("opening {}", path.display()))?;
    let var = file
        .variable(&names.variable)
        .ok_or_else(|| anyhow!("{}: no variable '{}'", path.display(), names.variable))?;
    check_dimensions(&var, &[&names.time, &names.lat, &names.lon])?;

    let time = read_coord(&file, &names.time)?;
    let lat = Axis::new(read_coord(&file, &names.lat)?)?;
    let lon = Axis::new(read_coord(&file, &names.lon)?)?;
    let data = read_decoded(&var)?;
    let values = Array3::from_shape_vec((time.len(), lat.len(), lon.len()), data)?;
    debug!(path = %path.display(), shape = ?values.dim(), "read temperature field");
    Ok(TemperatureField::new(time, lat, lon, values)?)
}

fn read_land_fraction(path: &Path, source: &MaskSource) -> Result<LandFraction> {
    let file = netcdf::open(path).with_context(|| format!("opening {}", path.display()))?;
    let var = file
        .variable(&source.variable)
        .ok_or_else(|| anyhow!("{}: no variable '{}'", path.display(), source.variable))?;
    check_dimensions(&var, &[&source.lat, &source.lon])?;

    let lat = Axis::new(read_coord(&file, &source.lat)?)?;
    let lon = Axis::new(read_coord(&file, &source.lon)?)?;
    let data = read_decoded(&var)?;
    let percent = Array2::from_shape_vec((lat.len(), lon.len()), data)?;
    debug!(path = %path.display(), shape = ?percent.dim(), "read land fraction");
    Ok(LandFraction::new(lat, lon, percent)?)
}

fn read_decoded(var: &netcdf::Variable) -> Result<Vec<f64>> {
    let encoding = cf_encoding(var)?;
    let mut data: Vec<f64> = var
        .get_values(..)
        .with_context(|| format!("reading '{}'", var.name()))?;
    let masked = decode_cf(&mut data, &encoding);
    if masked > 0 {
        debug!(variable = %var.name(), masked, "fill values read as NaN");
    }
    Ok(data)
}

fn cf_encoding(var: &netcdf::Variable) -> Result<CfEncoding> {
    let single = |name: &str| -> Result<Option<f64>> {
        Ok(numeric_attr(var, name)?.and_then(|values| values.first().copied()))
    };
    Ok(CfEncoding {
        fill_value: single("_FillValue")?,
        missing_values: numeric_attr(var, "missing_value")?.unwrap_or_default(),
        scale_factor: single("scale_factor")?,
        add_offset: single("add_offset")?,
    })
}

fn numeric_attr(var: &netcdf::Variable, name: &str) -> Result<Option<Vec<f64>>> {
    let Some(value) = var.attribute_value(name) else {
        return Ok(None);
    };
    let value = value.with_context(|| format!("reading '{}:{name}'", var.name()))?;
    let values = match value {
        AttributeValue::Double(v) => vec![v],
        AttributeValue::Doubles(v) => v,
        AttributeValue::Float(v) => vec![f64::from(v)],
        AttributeValue::Floats(v) => v.into_iter().map(f64::from).collect(),
        AttributeValue::Int(v) => vec![f64::from(v)],
        AttributeValue::Ints(v) => v.into_iter().map(f64::from).collect(),
        AttributeValue::Short(v) => vec![f64::from(v)],
        AttributeValue::Shorts(v) => v.into_iter().map(f64::from).collect(),
        AttributeValue::Schar(v) => vec![f64::from(v)],
        AttributeValue::Uchar(v) => vec![f64::from(v)],
        AttributeValue::Ushort(v) => vec![f64::from(v)],
        AttributeValue::Uint(v) => vec![f64::from(v)],
        _ => bail!("attribute '{}:{name}' is not numeric", var.name()),
    };
    Ok(Some(values))
}

fn read_coord(file: &netcdf::File, name: &str) -> Result<Vec<f64>> {
    let var = file
        .variable(name)
        .ok_or_else(|| anyhow!("no coordinate variable '{name}'"))?;
    var.get_values(..)
        .with_context(|| format!("reading coordinate '{name}'"))
}

fn check_dimensions(var: &netcdf::Variable, expected: &[&String]) -> Result<()> {
    let found: Vec<String> = var.dimensions().iter().map(|d| d.name()).collect();
    if found.len() != expected.len() || found.iter().zip(expected).any(|(f, e)| f != *e) {
        bail!(
            "variable '{}' has dimensions ({}), expected ({})",
            var.name(),
            found.join(", "),
            expected
                .iter()
                .map(|e| e.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );
    }
    Ok(())
}
