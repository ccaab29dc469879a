//! Grid level generation around a checkpoint

use rust_decimal::Decimal;
use thiserror::Error;

/// Default number of levels generated on each side of a checkpoint
pub const DEFAULT_RANGE_WIDTH: usize = 5;

/// Invalid arguments to the grid functions
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    #[error("grid gap must be positive, got {0}")]
    NonPositiveGap(Decimal),

    #[error("grid range width must be at least 1")]
    ZeroWidth,

    #[error("grid level overflowed decimal range")]
    Overflow,
}

/// Levels below (`prevs`) and above (`nexts`) a reference checkpoint
///
/// Both sequences are ascending and exclude the reference itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridRange {
    pub prevs: Vec<Decimal>,
    pub nexts: Vec<Decimal>,
}

impl GridRange {
    /// Closest level below the reference
    pub fn prev(&self) -> Option<Decimal> {
        self.prevs.last().copied()
    }

    /// Closest level above the reference
    pub fn next(&self) -> Option<Decimal> {
        self.nexts.first().copied()
    }
}

/// Compute `width` levels on each side of `reference`, spaced `gap` apart
pub fn generate_range(reference: Decimal, gap: Decimal, width: usize) -> Result<GridRange, GridError> {
    if gap <= Decimal::ZERO {
        return Err(GridError::NonPositiveGap(gap));
    }
    if width == 0 {
        return Err(GridError::ZeroWidth);
    }

    let mut prevs = Vec::with_capacity(width);
    let mut nexts = Vec::with_capacity(width);

    for step in 1..=width {
        let offset = gap
            .checked_mul(Decimal::from(step))
            .ok_or(GridError::Overflow)?;
        prevs.push(reference.checked_sub(offset).ok_or(GridError::Overflow)?);
        nexts.push(reference.checked_add(offset).ok_or(GridError::Overflow)?);
    }
    prevs.reverse();

    Ok(GridRange { prevs, nexts })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    #[test]
    fn test_range_around_checkpoint() {
        let range = generate_range(dec!(10), dec!(2), 5).unwrap();
        assert_eq!(range.prevs, vec![dec!(0), dec!(2), dec!(4), dec!(6), dec!(8)]);
        assert_eq!(range.nexts, vec![dec!(12), dec!(14), dec!(16), dec!(18), dec!(20)]);
        assert_eq!(range.prev(), Some(dec!(8)));
        assert_eq!(range.next(), Some(dec!(12)));
    }

    #[test]
    fn test_range_spacing_and_straddle() {
        for (reference, gap, width) in [
            (dec!(1), dec!(0.25), 3),
            (dec!(150), dec!(7), 5),
            (dec!(-4), dec!(1.5), 8),
            (dec!(0), dec!(0.0001), 1),
        ] {
            let range = generate_range(reference, gap, width).unwrap();
            assert_eq!(range.prevs.len(), width);
            assert_eq!(range.nexts.len(), width);

            let all: Vec<Decimal> = range.prevs.iter().chain(range.nexts.iter()).copied().collect();
            for pair in range.prevs.windows(2).chain(range.nexts.windows(2)) {
                assert_eq!(pair[1] - pair[0], gap);
            }
            for pair in all.windows(2) {
                assert!(pair[0] < pair[1], "levels must be strictly ascending");
            }
            assert_eq!(range.nexts[0] - range.prevs[width - 1], gap * dec!(2));
        }
    }

    #[test]
    fn test_non_positive_gap_rejected() {
        assert_eq!(generate_range(dec!(10), dec!(0), 5), Err(GridError::NonPositiveGap(dec!(0))));
        assert_eq!(generate_range(dec!(10), dec!(-1), 5), Err(GridError::NonPositiveGap(dec!(-1))));
    }

    #[test]
    fn test_zero_width_rejected() {
        assert_eq!(generate_range(dec!(10), dec!(2), 0), Err(GridError::ZeroWidth));
    }
}
