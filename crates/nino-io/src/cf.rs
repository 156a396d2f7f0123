//! CF-convention decoding of stored variable values.
//!
//! Gridded files often store packed integers or mark gaps with a sentinel
//! such as `1e20`. Before values reach the transform they are decoded the
//! CF way:
//!
//! 1. Stored values equal to `_FillValue` or any `missing_value` become NaN
//! 2. The rest are unpacked as `stored * scale_factor + add_offset`
//!
//! Sentinels are compared against the stored (packed) values, before
//! unpacking.

/// Decoding attributes of one variable. Absent attributes are `None`/empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CfEncoding {
    pub fill_value: Option<f64>,
    pub missing_values: Vec<f64>,
    pub scale_factor: Option<f64>,
    pub add_offset: Option<f64>,
}

impl CfEncoding {
    /// True when decoding would leave every value unchanged.
    pub fn is_identity(&self) -> bool {
        self.fill_value.is_none()
            && self.missing_values.is_empty()
            && self.scale_factor.is_none()
            && self.add_offset.is_none()
    }

    fn is_sentinel(&self, stored: f64) -> bool {
        self.fill_value == Some(stored) || self.missing_values.contains(&stored)
    }
}

/// Decode `values` in place and return how many became missing.
pub fn decode_cf(values: &mut [f64], encoding: &CfEncoding) -> usize {
    if encoding.is_identity() {
        return 0;
    }
    let scale = encoding.scale_factor.unwrap_or(1.0);
    let offset = encoding.add_offset.unwrap_or(0.0);
    let mut masked = 0;
    for value in values.iter_mut() {
        if encoding.is_sentinel(*value) {
            *value = f64::NAN;
            masked += 1;
        } else {
            *value = *value * scale + offset;
        }
    }
    masked
}
