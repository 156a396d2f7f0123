//! Sea mask resolution.
//!
//! The land-fraction reference lives on its own grid. It is resampled onto the
//! temperature grid twice, once carrying the nearest preceding reference cell
//! forward (pad) and once carrying the nearest following cell backward
//! (backfill), in both latitude and longitude. A target cell is sea only when
//! both resamplings land on a reference cell that is not fully land.

use ndarray::Array2;
use nino_core::{Axis, LandFraction, SeaMask};

/// Land percentage at or above which a reference cell counts as land.
pub const FULL_LAND_PERCENT: f64 = 100.0;

pub fn resolve_sea_mask(
    reference: &LandFraction,
    lat: &Axis,
    lon: &Axis,
    threshold: f64,
) -> SeaMask {
    let percent = reference.percent();
    let lookup = |lat_idx: Option<usize>, lon_idx: Option<usize>| -> bool {
        match (lat_idx, lon_idx) {
            // NaN compares false, so a missing land fraction is never sea
            (Some(i), Some(j)) => percent[[i, j]] < threshold,
            _ => false,
        }
    };

    let lat_pad: Vec<_> = lat.labels().iter().map(|&y| reference.lat().pad_index(y)).collect();
    let lat_back: Vec<_> = lat
        .labels()
        .iter()
        .map(|&y| reference.lat().backfill_index(y))
        .collect();
    let lon_pad: Vec<_> = lon.labels().iter().map(|&x| reference.lon().pad_index(x)).collect();
    let lon_back: Vec<_> = lon
        .labels()
        .iter()
        .map(|&x| reference.lon().backfill_index(x))
        .collect();

    let cells = Array2::from_shape_fn((lat.len(), lon.len()), |(i, j)| {
        lookup(lat_pad[i], lon_pad[j]) && lookup(lat_back[i], lon_back[j])
    });
    SeaMask::new(cells)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn reference() -> LandFraction {
        // 3x3 reference at 10 degree spacing, one fully land cell in the middle
        let lat = Axis::new(vec![-10.0, 0.0, 10.0]).unwrap();
        let lon = Axis::new(vec![170.0, 180.0, 190.0]).unwrap();
        let percent = array![
            [0.0, 0.0, 0.0],
            [0.0, 100.0, 40.0],
            [0.0, 99.9, 0.0],
        ];
        LandFraction::new(lat, lon, percent).unwrap()
    }

    #[test]
    fn identical_grids_threshold_each_cell() {
        let reference = reference();
        let mask = resolve_sea_mask(
            &reference,
            reference.lat(),
            reference.lon(),
            FULL_LAND_PERCENT,
        );
        assert_eq!(
            mask.cells(),
            array![
                [true, true, true],
                [true, false, true],
                [true, true, true],
            ]
        );
    }

    #[test]
    fn both_directional_neighbours_must_be_sea() {
        let reference = reference();
        // 5 lies between reference labels: pad -> 0, backfill -> 10
        let lat = Axis::new(vec![-5.0, 5.0]).unwrap();
        // 175 pads to 170, backfills to 180; 185 pads to 180, backfills to 190
        let lon = Axis::new(vec![175.0, 185.0]).unwrap();
        let mask = resolve_sea_mask(&reference, &lat, &lon, FULL_LAND_PERCENT);

        // (-5, 175): pad (-10,170)=0, back (0,180)=100 -> land
        assert!(!mask.is_sea(0, 0));
        // (-5, 185): pad (-10,180)=0, back (0,190)=40 -> sea
        assert!(mask.is_sea(0, 1));
        // (5, 175): pad (0,170)=0, back (10,180)=99.9 -> sea
        assert!(mask.is_sea(1, 0));
        // (5, 185): pad (0,180)=100 -> land
        assert!(!mask.is_sea(1, 1));
    }

    #[test]
    fn cells_outside_the_reference_are_not_sea() {
        let reference = reference();
        let lat = Axis::new(vec![-20.0, 0.0, 20.0]).unwrap();
        let lon = Axis::new(vec![170.0]).unwrap();
        let mask = resolve_sea_mask(&reference, &lat, &lon, FULL_LAND_PERCENT);
        assert_eq!(mask.flatten(), vec![false, true, false]);
    }

    #[test]
    fn nan_land_fraction_is_not_sea() {
        let lat = Axis::new(vec![0.0]).unwrap();
        let lon = Axis::new(vec![0.0, 1.0]).unwrap();
        let reference =
            LandFraction::new(lat.clone(), lon.clone(), array![[f64::NAN, 0.0]]).unwrap();
        let mask = resolve_sea_mask(&reference, &lat, &lon, FULL_LAND_PERCENT);
        assert_eq!(mask.flatten(), vec![false, true]);
    }

    #[test]
    fn threshold_is_configurable() {
        let reference = reference();
        let mask = resolve_sea_mask(&reference, reference.lat(), reference.lon(), 50.0);
        assert_eq!(mask.sea_count(), 7);
        assert!(mask.is_sea(1, 2));
        assert!(!mask.is_sea(2, 1));
    }
}
