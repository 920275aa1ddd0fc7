//! Single-atlas search: for a residual set of images, enumerate canvas size, placement
//! heuristic and sort order (plus randomized perturbations) and return the best-scoring
//! single-atlas packing.
//!
//! Grounded on the adaptive generator's grid + block-shuffle + global-random-shuffle search:
//! the same three stages run here, just expressed against this crate's packer and sort
//! modules instead of the original's plain Python loops.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::debug;

use crate::config::AtlasConfig;
use crate::model::{Atlas, Placement};
use crate::packer::{MaxRectsPacker, PlacementHeuristic};
use crate::sort::{sorted_order, SortItem, SortStrategy};

/// One candidate image to place: a stable key plus its (unpadded) pixel dimensions.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub key: String,
    pub width: u32,
    pub height: u32,
}

/// Score tuple used for lexicographic comparison: more placed, then smaller area, then
/// higher efficiency all win. Represented so that a plain tuple comparison is correct.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Score {
    placed: usize,
    area: u64,
    efficiency: f64,
}

impl Score {
    fn of(atlas: &Atlas, total_candidates: usize) -> Self {
        Score {
            placed: atlas.placed_count().min(total_candidates),
            area: atlas.area(),
            efficiency: atlas.efficiency(),
        }
    }

    /// True if `self` is strictly better than `other`.
    fn beats(&self, other: &Score) -> bool {
        if self.placed != other.placed {
            return self.placed > other.placed;
        }
        if self.area != other.area {
            // Smaller area wins, but only among equally-placed results; a lower placed
            // count never wins on area alone.
            return self.area < other.area;
        }
        self.efficiency > other.efficiency
    }
}

/// Runs one packer pass over `order` (indices into `candidates`) with the given heuristic and
/// canvas size. Stops at the first insertion failure: placed images are returned, in a
/// cropped-to-bounding-box atlas.
fn pack_order(
    candidates: &[Candidate],
    order: &[usize],
    canvas: u32,
    heuristic: PlacementHeuristic,
    sort_strategy: SortStrategy,
    padding: u32,
) -> Option<Atlas> {
    let mut packer = MaxRectsPacker::new(canvas, canvas, heuristic);
    let mut placements = Vec::new();
    let mut max_right = 0u32;
    let mut max_bottom = 0u32;

    for &idx in order {
        let c = &candidates[idx];
        let pw = c.width + 2 * padding;
        let ph = c.height + 2 * padding;
        let Some(rect) = packer.insert(pw, ph) else {
            break;
        };
        max_right = max_right.max(rect.right());
        max_bottom = max_bottom.max(rect.bottom());
        placements.push(Placement {
            key: c.key.clone(),
            reserved: rect,
            padding,
        });
    }

    if placements.is_empty() {
        return None;
    }

    Some(Atlas {
        width: max_right,
        height: max_bottom,
        placements,
        sort_strategy,
        placement_heuristic: heuristic,
    })
}

/// Builds the base filename-order candidate indices (0..len), used as the identity order
/// every sort strategy starts from.
fn base_sort_items(candidates: &[Candidate]) -> Vec<SortItem> {
    candidates
        .iter()
        .enumerate()
        .map(|(i, c)| SortItem {
            index: i,
            width: c.width,
            height: c.height,
        })
        .collect()
}

/// Splits `order` into overlapping windows of size `max(3, n/10)` advancing by half the block,
/// shuffling within each window using `rng`. Mirrors the adaptive generator's block-shuffle
/// perturbation.
fn block_shuffle(order: &[usize], rng: &mut StdRng) -> Vec<usize> {
    let n = order.len();
    if n < 2 {
        return order.to_vec();
    }
    let block = (n / 10).max(3);
    let step = (block / 2).max(1);
    let mut result = order.to_vec();
    let mut start = 0;
    while start < n {
        let end = (start + block).min(n);
        result[start..end].shuffle(rng);
        start += step;
    }
    result
}

fn seed_for_block_shuffle(canvas: u32, config_counter: u64, perm_index: usize) -> u64 {
    canvas as u64 + config_counter + perm_index as u64 * 1000
}

/// Runs the full single-atlas search described above and returns the best atlas found, or
/// `None` if even a single candidate could not be placed in the largest canvas.
pub fn search_single_atlas(candidates: &[Candidate], cfg: &AtlasConfig) -> Option<Atlas> {
    if candidates.is_empty() {
        return None;
    }

    let max_side = cfg.max_padded_side();
    if candidates
        .iter()
        .any(|c| c.width + 2 * cfg.padding > max_side || c.height + 2 * cfg.padding > max_side)
    {
        debug!("a residual candidate's padded size exceeds the largest canvas; reporting unpackable for this batch");
        return None;
    }

    let mut best: Option<(Atlas, Score)> = None;
    let mut config_counter: u64 = 0;

    let consider = |atlas: Atlas, best: &mut Option<(Atlas, Score)>| {
        let score = Score::of(&atlas, candidates.len());
        let is_better = match best {
            Some((_, best_score)) => score.beats(best_score),
            None => true,
        };
        if is_better {
            *best = Some((atlas, score));
        }
    };

    for &canvas in &cfg.canvas_sizes {
        for &heuristic in &PlacementHeuristic::ALL {
            for &sort_strategy in &SortStrategy::SEARCH_GRID {
                let base_order = sorted_order(&base_sort_items(candidates), sort_strategy);

                if let Some(atlas) = pack_order(
                    candidates,
                    &base_order,
                    canvas,
                    heuristic,
                    sort_strategy,
                    cfg.padding,
                ) {
                    consider(atlas, &mut best);
                }

                for perm_index in 0..cfg.perms_per_config {
                    let seed = seed_for_block_shuffle(canvas, config_counter, perm_index);
                    let mut rng = StdRng::seed_from_u64(seed);
                    let perturbed = block_shuffle(&base_order, &mut rng);
                    if let Some(atlas) = pack_order(
                        candidates,
                        &perturbed,
                        canvas,
                        heuristic,
                        sort_strategy,
                        cfg.padding,
                    ) {
                        consider(atlas, &mut best);
                    }
                }
                config_counter += 1;
            }
        }
    }

    if let Some((best_atlas, _)) = &best {
        let canvas = best_atlas.width.max(best_atlas.height);
        let heuristic = best_atlas.placement_heuristic;
        let identity_order: Vec<usize> = (0..candidates.len()).collect();

        for i in 0..cfg.global_random_trials {
            let seed = 5000 + i as u64;
            let mut rng = StdRng::seed_from_u64(seed);
            let mut shuffled = identity_order.clone();
            shuffled.shuffle(&mut rng);
            if let Some(atlas) = pack_order(
                candidates,
                &shuffled,
                canvas,
                heuristic,
                SortStrategy::None,
                cfg.padding,
            ) {
                consider(atlas, &mut best);
            }
        }
    } else {
        debug!("single-atlas search grid produced no placeable result; skipping global random shuffle stage");
    }

    best.map(|(atlas, _)| atlas)
}
