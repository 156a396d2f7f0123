//! Long-format CSV readers and the feature-matrix writer.
//!
//! Gridded inputs are stored one cell per row, with a column per coordinate
//! and one for the value:
//!
//! | File | Columns |
//! |------|---------|
//! | temperature | `time,lat,lon,<variable>` |
//! | land fraction | `lat,lon,<variable>` |
//!
//! Column names come from [`DatasetNames`] and [`MaskSource`]; extra columns
//! are ignored. Axes are rebuilt from the distinct coordinate labels in
//! ascending order and every grid point must appear exactly once. Empty or
//! `NaN` values are read as missing.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use ndarray::{Array2, Array3};
use nino_core::{Axis, FeatureMatrix, LandFraction, NinoError, NinoResult, TemperatureField};
use tracing::debug;

use crate::config::{DatasetNames, MaskSource};
use crate::reference::{persist, staging_file};

/// Read a `(time, lat, lon)` temperature field from a long-format CSV file.
pub fn read_temperature_csv(path: &Path, names: &DatasetNames) -> NinoResult<TemperatureField> {
    let table = LongTable::read(
        path,
        &[names.time.as_str(), names.lat.as_str(), names.lon.as_str()],
        &names.variable,
    )
    .map_err(|err| NinoError::Parse(format!("{err:#}")))?;

    let (time, lat, lon) = (&table.axes[0], &table.axes[1], &table.axes[2]);
    let values = Array3::from_shape_vec((time.len(), lat.len(), lon.len()), table.values)?;
    debug!(
        path = %path.display(),
        shape = ?values.dim(),
        "read temperature field"
    );
    TemperatureField::new(
        time.labels().to_vec(),
        lat.clone(),
        lon.clone(),
        values,
    )
}

/// Read a land-area fraction in percent from a long-format CSV file.
pub fn read_land_fraction_csv(path: &Path, source: &MaskSource) -> NinoResult<LandFraction> {
    let table = LongTable::read(
        path,
        &[source.lat.as_str(), source.lon.as_str()],
        &source.variable,
    )
    .map_err(|err| NinoError::Parse(format!("{err:#}")))?;

    let (lat, lon) = (&table.axes[0], &table.axes[1]);
    let percent = Array2::from_shape_vec((lat.len(), lon.len()), table.values)?;
    debug!(path = %path.display(), shape = ?percent.dim(), "read land fraction");
    LandFraction::new(lat.clone(), lon.clone(), percent)
}

/// Write the matrix as CSV with a header of [`FeatureMatrix::column_names`].
///
/// The file is staged beside `path` and renamed into place once complete.
pub fn write_feature_matrix_csv(matrix: &FeatureMatrix, path: &Path) -> NinoResult<()> {
    let staged = staging_file(path)?;
    {
        let mut writer = csv::Writer::from_writer(staged.as_file());
        write_rows(&mut writer, matrix)
            .with_context(|| format!("writing feature matrix to {}", path.display()))?;
    }
    persist(staged, path)?;
    debug!(
        path = %path.display(),
        rows = matrix.nrows(),
        columns = matrix.ncols(),
        "wrote feature matrix"
    );
    Ok(())
}

fn write_rows<W: std::io::Write>(writer: &mut csv::Writer<W>, matrix: &FeatureMatrix) -> Result<()> {
    writer.write_record(matrix.column_names())?;
    for row in matrix.values().rows() {
        writer.write_record(row.iter().map(|v| v.to_string()))?;
    }
    writer.flush()?;
    Ok(())
}

/// A dense grid rebuilt from long-format rows, values in row-major order.
struct LongTable {
    axes: Vec<Axis>,
    values: Vec<f64>,
}

impl LongTable {
    fn read(path: &Path, coords: &[&str], variable: &str) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(path)
            .with_context(|| format!("opening {}", path.display()))?;

        let headers = reader.headers()?.clone();
        let column = |name: &str| {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| anyhow!("{}: missing column '{name}'", path.display()))
        };
        let coord_cols = coords
            .iter()
            .map(|name| column(name))
            .collect::<Result<Vec<_>>>()?;
        let value_col = column(variable)?;

        let mut points: Vec<(Vec<f64>, f64)> = Vec::new();
        for (i, record) in reader.records().enumerate() {
            let line = i + 2;
            let record = record.with_context(|| format!("{}: line {line}", path.display()))?;
            let coords = coord_cols
                .iter()
                .zip(coords)
                .map(|(&col, name)| parse_coordinate(record.get(col), name, line))
                .collect::<Result<Vec<_>>>()?;
            let value = parse_value(record.get(value_col), variable, line)?;
            points.push((coords, value));
        }
        if points.is_empty() {
            bail!("{}: no data rows", path.display());
        }

        let axes = (0..coords.len())
            .map(|d| {
                let mut labels: Vec<f64> = points.iter().map(|(c, _)| c[d]).collect();
                labels.sort_by(f64::total_cmp);
                labels.dedup();
                Axis::new(labels).map_err(|err| anyhow!("column '{}': {err}", coords[d]))
            })
            .collect::<Result<Vec<_>>>()?;

        let positions: Vec<HashMap<u64, usize>> = axes
            .iter()
            .map(|axis| {
                axis.labels()
                    .iter()
                    .enumerate()
                    .map(|(i, v)| (v.to_bits(), i))
                    .collect()
            })
            .collect();
        let dims: Vec<usize> = axes.iter().map(Axis::len).collect();
        let size: usize = dims.iter().product();

        let mut values = vec![f64::NAN; size];
        let mut seen = vec![false; size];
        for (coord, value) in points {
            let flat = coord
                .iter()
                .zip(&positions)
                .zip(&dims)
                .fold(0, |acc, ((c, index), &dim)| acc * dim + index[&c.to_bits()]);
            if std::mem::replace(&mut seen[flat], true) {
                bail!(
                    "{}: duplicate row for {}",
                    path.display(),
                    describe(coords, &coord)
                );
            }
            values[flat] = value;
        }

        let missing = seen.iter().filter(|s| !**s).count();
        if missing > 0 {
            bail!(
                "{}: {missing} of {size} grid points have no row ({} x {})",
                path.display(),
                coords.join(" x "),
                dims.iter()
                    .map(usize::to_string)
                    .collect::<Vec<_>>()
                    .join(" x ")
            );
        }
        Ok(Self { axes, values })
    }
}

fn parse_coordinate(field: Option<&str>, name: &str, line: usize) -> Result<f64> {
    let raw = field.ok_or_else(|| anyhow!("line {line}: missing '{name}'"))?;
    let value: f64 = raw
        .parse()
        .with_context(|| format!("line {line}: invalid {name} '{raw}'"))?;
    // -0.0 and 0.0 must land on the same label
    let value = value + 0.0;
    if !value.is_finite() {
        bail!("line {line}: {name} must be finite, got '{raw}'");
    }
    Ok(value)
}

fn parse_value(field: Option<&str>, name: &str, line: usize) -> Result<f64> {
    match field {
        None | Some("") => Ok(f64::NAN),
        Some(raw) => raw
            .parse()
            .with_context(|| format!("line {line}: invalid {name} '{raw}'")),
    }
}

fn describe(names: &[&str], coord: &[f64]) -> String {
    names
        .iter()
        .zip(coord)
        .map(|(n, v)| format!("{n}={v}"))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use nino_core::ColumnLayout;
    use std::io::Write;

    fn write_file(dir: &Path, name: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn temperature_grid_is_rebuilt_in_ascending_order() {
        let dir = tempfile::tempdir().unwrap();
        // rows deliberately shuffled, with an extra column
        let path = write_file(
            dir.path(),
            "tas.csv",
            "lon,time,lat,tas,source\n\
             190,1,2,4.0,m\n\
             180,0,-2,1.0,m\n\
             190,0,2,2.0,m\n\
             180,1,-2,5.0,m\n\
             190,0,-2,3.0,m\n\
             180,0,2,0.0,m\n\
             190,1,-2,7.0,m\n\
             180,1,2,6.0,m\n",
        );
        let field = read_temperature_csv(&path, &DatasetNames::default()).unwrap();

        assert_eq!(field.time(), &[0.0, 1.0]);
        assert_eq!(field.lat().labels(), &[-2.0, 2.0]);
        assert_eq!(field.lon().labels(), &[180.0, 190.0]);
        let v = field.values();
        assert_eq!(v[[0, 0, 0]], 1.0);
        assert_eq!(v[[0, 0, 1]], 3.0);
        assert_eq!(v[[0, 1, 0]], 0.0);
        assert_eq!(v[[0, 1, 1]], 2.0);
        assert_eq!(v[[1, 0, 1]], 7.0);
        assert_eq!(v[[1, 1, 1]], 4.0);
    }

    #[test]
    fn custom_names_are_honoured() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            dir.path(),
            "tos.csv",
            "month,y,x,tos\n0,0,180,25.5\n1,0,180,\n",
        );
        let names = DatasetNames {
            time: "month".into(),
            lat: "y".into(),
            lon: "x".into(),
            variable: "tos".into(),
        };
        let field = read_temperature_csv(&path, &names).unwrap();
        assert_eq!(field.values()[[0, 0, 0]], 25.5);
        assert!(field.values()[[1, 0, 0]].is_nan());
    }

    #[test]
    fn missing_grid_points_are_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            dir.path(),
            "tas.csv",
            "time,lat,lon,tas\n0,0,180,1\n0,0,190,1\n1,0,180,1\n",
        );
        let err = read_temperature_csv(&path, &DatasetNames::default()).unwrap_err();
        assert!(matches!(err, NinoError::Parse(_)));
        assert!(err.to_string().contains("1 of 4 grid points"));
    }

    #[test]
    fn duplicate_rows_are_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            dir.path(),
            "mask.csv",
            "lat,lon,sftlf\n0,180,0\n0,180,100\n",
        );
        let err = read_land_fraction_csv(&path, &MaskSource::default()).unwrap_err();
        assert!(err.to_string().contains("duplicate row for lat=0, lon=180"));
    }

    #[test]
    fn missing_column_is_named() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "mask.csv", "lat,lon,frac\n0,180,0\n");
        let err = read_land_fraction_csv(&path, &MaskSource::default()).unwrap_err();
        assert!(err.to_string().contains("missing column 'sftlf'"));
    }

    #[test]
    fn land_fraction_reads_percentages() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            dir.path(),
            "mask.csv",
            "lat,lon,sftlf\n-5,180,0\n-5,185,100\n5,180,37.5\n5,185,0\n",
        );
        let reference = read_land_fraction_csv(&path, &MaskSource::default()).unwrap();
        assert_eq!(reference.lat().labels(), &[-5.0, 5.0]);
        assert_eq!(
            reference.percent(),
            ndarray::array![[0.0, 100.0], [37.5, 0.0]]
        );
    }

    #[test]
    fn matrix_is_written_with_header() {
        let dir = tempfile::tempdir().unwrap();
        let layout = ColumnLayout {
            valid_range: 2..4,
            region_columns: vec!["lat-5_lon180_lag0_value".into()],
            sea_cells: vec![(0, 1)],
        };
        let matrix = FeatureMatrix::from_parts(
            ndarray::array![[1.5, 2.0, -0.25], [3.0, 4.0, 0.1]],
            layout,
        );
        let path = dir.path().join("out").join("features.csv");
        write_feature_matrix_csv(&matrix, &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("lat-5_lon180_lag0_value,temp_y0_x1,diff_y0_x1")
        );
        assert_eq!(lines.next(), Some("1.5,2,-0.25"));
        assert_eq!(lines.next(), Some("3,4,0.1"));
        assert_eq!(lines.next(), None);
    }
}
