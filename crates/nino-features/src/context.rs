use std::ops::Range;

use nino_core::{NinoError, NinoResult};
use serde::{Deserialize, Serialize};

/// Row indices of the evaluation split chosen by the caller.
///
/// The transform carries them through untouched; they only matter to the
/// cross-validation bookkeeping of whoever calls it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EvalIndices(Vec<usize>);

impl EvalIndices {
    pub fn new(indices: Vec<usize>) -> Self {
        Self(indices)
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<usize>> for EvalIndices {
    fn from(indices: Vec<usize>) -> Self {
        Self(indices)
    }
}

/// Per-call parameters of one transform, fixed before any block is derived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformContext {
    total: usize,
    burn_in: usize,
    lookahead: usize,
    valid: Range<usize>,
    eval: EvalIndices,
}

impl TransformContext {
    /// Rows are produced for `[burn_in, total - lookahead)`; an empty range is an error.
    pub fn new(
        total: usize,
        burn_in: usize,
        lookahead: usize,
        eval: EvalIndices,
    ) -> NinoResult<Self> {
        if burn_in >= total || lookahead >= total - burn_in {
            return Err(NinoError::EmptyValidRange {
                burn_in,
                lookahead,
                total,
            });
        }
        Ok(Self {
            total,
            burn_in,
            lookahead,
            valid: burn_in..total - lookahead,
            eval,
        })
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn burn_in(&self) -> usize {
        self.burn_in
    }

    pub fn lookahead(&self) -> usize {
        self.lookahead
    }

    pub fn valid_range(&self) -> Range<usize> {
        self.valid.clone()
    }

    pub fn valid_len(&self) -> usize {
        self.valid.len()
    }

    pub fn eval_indices(&self) -> &EvalIndices {
        &self.eval
    }

    /// Rotation applied to the monthly climatology: `lookahead - 12`.
    pub fn climatology_shift(&self) -> isize {
        self.lookahead as isize - 12
    }

    /// Rotation applied to a band series for a given lag: `lookahead - lag`.
    pub fn lag_shift(&self, lag: usize) -> isize {
        self.lookahead as isize - lag as isize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_range_strips_burn_in_and_lookahead() {
        let ctx = TransformContext::new(150, 10, 5, EvalIndices::default()).unwrap();
        assert_eq!(ctx.valid_range(), 10..145);
        assert_eq!(ctx.valid_len(), 135);
        assert_eq!(ctx.climatology_shift(), -7);
        assert_eq!(ctx.lag_shift(30), -25);
    }

    #[test]
    fn zero_lookahead_keeps_the_tail() {
        let ctx = TransformContext::new(24, 0, 0, EvalIndices::default()).unwrap();
        assert_eq!(ctx.valid_range(), 0..24);
    }

    #[test]
    fn empty_or_negative_range_is_rejected() {
        for (burn_in, lookahead) in [(10, 140), (10, 200), (150, 0), (200, 0)] {
            let err = TransformContext::new(150, burn_in, lookahead, EvalIndices::default())
                .unwrap_err();
            assert!(matches!(err, NinoError::EmptyValidRange { .. }));
        }
    }

    #[test]
    fn eval_indices_pass_through() {
        let eval = EvalIndices::new(vec![3, 4, 5]);
        let ctx = TransformContext::new(20, 2, 2, eval.clone()).unwrap();
        assert_eq!(ctx.eval_indices(), &eval);
        assert_eq!(serde_json::to_string(&eval).unwrap(), "[3,4,5]");
    }
}
