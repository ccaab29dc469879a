//! Nearest grid level search

use rust_decimal::Decimal;

use crate::common::types::Side;

/// A grid level selected for a price, with the side implied by crossing it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocatedLevel {
    pub level: Decimal,
    pub direction: Side,
}

impl LocatedLevel {
    fn buy(level: Decimal) -> Self {
        Self { level, direction: Side::Buy }
    }

    fn sell(level: Decimal) -> Self {
        Self { level, direction: Side::Sell }
    }
}

/// Find the grid level relevant to `price`
///
/// Exact hits win over boundary extrapolation, which wins over the
/// nearest-neighbour fallbacks. Returns `None` when the price sits between
/// the checkpoint's immediate neighbours or either side is empty.
pub fn locate(price: Decimal, prevs: &[Decimal], nexts: &[Decimal]) -> Option<LocatedLevel> {
    if nexts.contains(&price) {
        return Some(LocatedLevel::buy(price));
    }
    if prevs.contains(&price) {
        return Some(LocatedLevel::sell(price));
    }

    let lowest_prev = prevs.iter().min().copied()?;
    let highest_next = nexts.iter().max().copied()?;

    if price < lowest_prev {
        return Some(LocatedLevel::sell(lowest_prev));
    }
    if price > highest_next {
        return Some(LocatedLevel::buy(highest_next));
    }

    if let Some(lower_next) = nexts.iter().filter(|n| **n < price).max() {
        return Some(LocatedLevel::buy(*lower_next));
    }
    if let Some(upper_prev) = prevs.iter().filter(|p| **p > price).min() {
        return Some(LocatedLevel::sell(*upper_prev));
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::grid::generate_range;
    use rust_decimal_macros::dec;

    fn grid() -> (Vec<Decimal>, Vec<Decimal>) {
        let range = generate_range(dec!(10), dec!(2), 5).unwrap();
        (range.prevs, range.nexts)
    }

    #[test]
    fn test_exact_next_is_buy() {
        let (prevs, nexts) = grid();
        assert_eq!(locate(dec!(14), &prevs, &nexts), Some(LocatedLevel::buy(dec!(14))));
    }

    #[test]
    fn test_exact_prev_is_sell() {
        let (prevs, nexts) = grid();
        assert_eq!(locate(dec!(4), &prevs, &nexts), Some(LocatedLevel::sell(dec!(4))));
    }

    #[test]
    fn test_extrapolates_beyond_boundaries() {
        let (prevs, nexts) = grid();
        assert_eq!(locate(dec!(-7), &prevs, &nexts), Some(LocatedLevel::sell(dec!(0))));
        assert_eq!(locate(dec!(35), &prevs, &nexts), Some(LocatedLevel::buy(dec!(20))));
    }

    #[test]
    fn test_exact_hit_on_boundary_beats_extrapolation() {
        let (prevs, nexts) = grid();
        assert_eq!(locate(dec!(20), &prevs, &nexts), Some(LocatedLevel::buy(dec!(20))));
        assert_eq!(locate(dec!(0), &prevs, &nexts), Some(LocatedLevel::sell(dec!(0))));
    }

    #[test]
    fn test_between_nexts_picks_lower_next() {
        let (prevs, nexts) = grid();
        assert_eq!(locate(dec!(13), &prevs, &nexts), Some(LocatedLevel::buy(dec!(12))));
        assert_eq!(locate(dec!(19), &prevs, &nexts), Some(LocatedLevel::buy(dec!(18))));
    }

    #[test]
    fn test_between_prevs_picks_upper_prev() {
        let (prevs, nexts) = grid();
        assert_eq!(locate(dec!(7), &prevs, &nexts), Some(LocatedLevel::sell(dec!(8))));
        assert_eq!(locate(dec!(1), &prevs, &nexts), Some(LocatedLevel::sell(dec!(2))));
    }

    #[test]
    fn test_inside_neighbour_gap_is_none() {
        let (prevs, nexts) = grid();
        assert_eq!(locate(dec!(9), &prevs, &nexts), None);
        assert_eq!(locate(dec!(10), &prevs, &nexts), None);
        assert_eq!(locate(dec!(11), &prevs, &nexts), None);
    }

    #[test]
    fn test_empty_sides_are_none() {
        assert_eq!(locate(dec!(10), &[], &[]), None);
        assert_eq!(locate(dec!(10), &[dec!(8)], &[]), None);
    }

    #[test]
    fn test_locate_is_total_over_a_price_sweep() {
        let (prevs, nexts) = grid();
        let mut price = dec!(-20);
        while price <= dec!(40) {
            if let Some(found) = locate(price, &prevs, &nexts) {
                assert!(prevs.contains(&found.level) || nexts.contains(&found.level));
                match found.direction {
                    Side::Buy => assert!(nexts.contains(&found.level)),
                    Side::Sell => assert!(prevs.contains(&found.level)),
                }
            } else {
                assert!(price > dec!(8) && price < dec!(12));
            }
            price += dec!(0.5);
        }
    }
}
