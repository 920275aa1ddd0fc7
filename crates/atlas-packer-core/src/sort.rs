//! Deterministic orderings over `(key, width, height)` triples.
//!
//! Mirrors the strategy set of the original generator's `_sort_images`: all comparisons are
//! stable, ties are broken by key so re-running with the same inputs always yields the same
//! order.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SortStrategy {
    None,
    Area,
    AreaAsc,
    Height,
    HeightAsc,
    Width,
    WidthAsc,
    Perimeter,
    MaxSide,
    MinSide,
    Ratio,
    RatioInv,
    Diagonal,
    Pathological,
}

impl SortStrategy {
    /// The strategies tried by the single-atlas search grid, in the original's order.
    pub const SEARCH_GRID: [SortStrategy; 12] = [
        SortStrategy::Area,
        SortStrategy::Height,
        SortStrategy::Width,
        SortStrategy::Perimeter,
        SortStrategy::MaxSide,
        SortStrategy::MinSide,
        SortStrategy::Ratio,
        SortStrategy::RatioInv,
        SortStrategy::Diagonal,
        SortStrategy::HeightAsc,
        SortStrategy::WidthAsc,
        SortStrategy::Pathological,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortStrategy::None => "none",
            SortStrategy::Area => "area",
            SortStrategy::AreaAsc => "area_asc",
            SortStrategy::Height => "height",
            SortStrategy::HeightAsc => "height_asc",
            SortStrategy::Width => "width",
            SortStrategy::WidthAsc => "width_asc",
            SortStrategy::Perimeter => "perimeter",
            SortStrategy::MaxSide => "max_side",
            SortStrategy::MinSide => "min_side",
            SortStrategy::Ratio => "ratio",
            SortStrategy::RatioInv => "ratio_inv",
            SortStrategy::Diagonal => "diagonal",
            SortStrategy::Pathological => "pathological",
        }
    }
}

impl FromStr for SortStrategy {
    type Err = ();
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match s {
            "area" => SortStrategy::Area,
            "area_asc" => SortStrategy::AreaAsc,
            "height" => SortStrategy::Height,
            "height_asc" => SortStrategy::HeightAsc,
            "width" => SortStrategy::Width,
            "width_asc" => SortStrategy::WidthAsc,
            "perimeter" => SortStrategy::Perimeter,
            "max_side" => SortStrategy::MaxSide,
            "min_side" => SortStrategy::MinSide,
            "ratio" => SortStrategy::Ratio,
            "ratio_inv" => SortStrategy::RatioInv,
            "diagonal" => SortStrategy::Diagonal,
            "pathological" => SortStrategy::Pathological,
            // Unknown names behave as identity copy, matching the original.
            _ => SortStrategy::None,
        })
    }
}

/// A lightweight item for sorting: the caller maps indices back to its own image records.
#[derive(Debug, Clone, Copy)]
pub struct SortItem {
    pub index: usize,
    pub width: u32,
    pub height: u32,
}

/// Returns a new ordering of `items` (by index) for the given strategy. Stable; ties keep the
/// original relative order of `items`, which callers should have seeded with a deterministic
/// (e.g. filename-sorted) order.
pub fn sorted_order(items: &[SortItem], strategy: SortStrategy) -> Vec<usize> {
    let mut v: Vec<SortItem> = items.to_vec();
    match strategy {
        SortStrategy::None => {}
        SortStrategy::Area => v.sort_by(|a, b| area(b).cmp(&area(a))),
        SortStrategy::AreaAsc => v.sort_by(|a, b| area(a).cmp(&area(b))),
        SortStrategy::Height => v.sort_by(|a, b| b.height.cmp(&a.height)),
        SortStrategy::HeightAsc => v.sort_by(|a, b| a.height.cmp(&b.height)),
        SortStrategy::Width => v.sort_by(|a, b| b.width.cmp(&a.width)),
        SortStrategy::WidthAsc => v.sort_by(|a, b| a.width.cmp(&b.width)),
        SortStrategy::Perimeter => {
            v.sort_by(|a, b| (b.width + b.height).cmp(&(a.width + a.height)))
        }
        SortStrategy::MaxSide => v.sort_by(|a, b| max_side(b).cmp(&max_side(a))),
        SortStrategy::MinSide => v.sort_by(|a, b| min_side(b).cmp(&min_side(a))),
        SortStrategy::Ratio => v.sort_by(|a, b| ratio(b).total_cmp(&ratio(a))),
        SortStrategy::RatioInv => v.sort_by(|a, b| ratio_inv(b).total_cmp(&ratio_inv(a))),
        SortStrategy::Diagonal => v.sort_by(|a, b| diagonal(b).total_cmp(&diagonal(a))),
        SortStrategy::Pathological => return pathological_order(items),
    }
    v.into_iter().map(|it| it.index).collect()
}

fn area(it: &SortItem) -> u64 {
    it.width as u64 * it.height as u64
}
fn max_side(it: &SortItem) -> u32 {
    it.width.max(it.height)
}
fn min_side(it: &SortItem) -> u32 {
    it.width.min(it.height)
}
fn ratio(it: &SortItem) -> f64 {
    it.width as f64 / (it.height.max(1)) as f64
}
fn ratio_inv(it: &SortItem) -> f64 {
    it.height as f64 / (it.width.max(1)) as f64
}
fn diagonal(it: &SortItem) -> f64 {
    ((it.width as f64).powi(2) + (it.height as f64).powi(2)).sqrt()
}

/// Sort by area descending, then interleave front/back: positions 0, N-1, 1, N-2, ...
fn pathological_order(items: &[SortItem]) -> Vec<usize> {
    let mut by_area = sorted_order(items, SortStrategy::Area);
    let mut result = Vec::with_capacity(by_area.len());
    let (mut left, mut right) = (0usize, by_area.len());
    while left < right {
        right -= 1;
        result.push(by_area[left]);
        if left != right {
            result.push(by_area[right]);
        }
        left += 1;
    }
    // `by_area` is consumed just for indices; avoid an unused-mut warning on the edge case
    // of a single-element input.
    by_area.clear();
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(i: usize, w: u32, h: u32) -> SortItem {
        SortItem {
            index: i,
            width: w,
            height: h,
        }
    }

    #[test]
    fn area_desc_orders_largest_first() {
        let items = vec![item(0, 10, 10), item(1, 50, 50), item(2, 5, 5)];
        assert_eq!(sorted_order(&items, SortStrategy::Area), vec![1, 0, 2]);
    }

    #[test]
    fn unknown_strategy_name_parses_as_none() {
        assert_eq!(
            "bogus".parse::<SortStrategy>().unwrap(),
            SortStrategy::None
        );
    }

    #[test]
    fn pathological_interleaves_front_and_back() {
        // areas: 0=100, 1=81, 2=64, 3=49, 4=36 -> area-desc order is [0,1,2,3,4]
        let items = vec![
            item(0, 10, 10),
            item(1, 9, 9),
            item(2, 8, 8),
            item(3, 7, 7),
            item(4, 6, 6),
        ];
        assert_eq!(
            sorted_order(&items, SortStrategy::Pathological),
            vec![0, 4, 1, 3, 2]
        );
    }

    #[test]
    fn pathological_handles_odd_and_even_lengths() {
        let two = vec![item(0, 10, 10), item(1, 5, 5)];
        assert_eq!(sorted_order(&two, SortStrategy::Pathological), vec![0, 1]);
        let one = vec![item(0, 10, 10)];
        assert_eq!(sorted_order(&one, SortStrategy::Pathological), vec![0]);
    }
}
