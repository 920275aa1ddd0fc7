//! Free-rectangle (MAXRECTS-style) bin packer and its placement heuristics.

pub mod maxrects;

use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub use maxrects::MaxRectsPacker;

/// Heuristic used to choose among candidate free rectangles when inserting a new one.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PlacementHeuristic {
    BestAreaFit,
    BestShortSideFit,
    BestLongSideFit,
    BottomLeft,
    ContactPoint,
}

impl PlacementHeuristic {
    pub const ALL: [PlacementHeuristic; 5] = [
        PlacementHeuristic::BestAreaFit,
        PlacementHeuristic::BestShortSideFit,
        PlacementHeuristic::BestLongSideFit,
        PlacementHeuristic::BottomLeft,
        PlacementHeuristic::ContactPoint,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PlacementHeuristic::BestAreaFit => "best_area_fit",
            PlacementHeuristic::BestShortSideFit => "best_short_side_fit",
            PlacementHeuristic::BestLongSideFit => "best_long_side_fit",
            PlacementHeuristic::BottomLeft => "bottom_left",
            PlacementHeuristic::ContactPoint => "contact_point",
        }
    }
}

impl FromStr for PlacementHeuristic {
    type Err = ();
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match s {
            "best_area_fit" => PlacementHeuristic::BestAreaFit,
            "best_short_side_fit" => PlacementHeuristic::BestShortSideFit,
            "best_long_side_fit" => PlacementHeuristic::BestLongSideFit,
            "bottom_left" => PlacementHeuristic::BottomLeft,
            "contact_point" => PlacementHeuristic::ContactPoint,
            _ => return Err(()),
        })
    }
}
