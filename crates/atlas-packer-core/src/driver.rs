//! Adaptive multi-atlas driver: repeatedly runs the single-atlas search against whatever
//! images remain, and the per-image fallback used when the driver cannot place anything at
//! all.
//!
//! Grounded on the adaptive generator's repeat-until-empty-or-stuck loop and its
//! one-image-per-atlas fallback.

use std::collections::HashSet;

use tracing::{instrument, warn};

use crate::config::AtlasConfig;
use crate::model::{Atlas, AtlasSet, Placement};
use crate::packer::PlacementHeuristic;
use crate::search::{search_single_atlas, Candidate};
use crate::sort::SortStrategy;

/// Runs the adaptive multi-atlas driver over `candidates`, returning every atlas produced
/// plus the keys of any images that remain unplaced (the search got stuck before placing
/// everything, or hit the safety cap).
#[instrument(skip(candidates, cfg), fields(total = candidates.len()))]
pub fn pack_all(candidates: &[Candidate], cfg: &AtlasConfig) -> (AtlasSet, Vec<String>) {
    let mut remaining: Vec<Candidate> = candidates.to_vec();
    let mut atlases = AtlasSet::new();

    while !remaining.is_empty() && atlases.len() < cfg.max_atlas_count {
        let Some(atlas) = search_single_atlas(&remaining, cfg) else {
            break;
        };
        let placed: HashSet<&str> = atlas.placements.iter().map(|p| p.key.as_str()).collect();
        remaining.retain(|c| !placed.contains(c.key.as_str()));
        atlases.push(atlas);
    }

    if !remaining.is_empty() && atlases.len() >= cfg.max_atlas_count {
        warn!(
            remaining = remaining.len(),
            cap = cfg.max_atlas_count,
            "adaptive multi-atlas driver hit its safety cap with images still unplaced"
        );
    }

    let leftover_keys = remaining.into_iter().map(|c| c.key).collect();
    (atlases, leftover_keys)
}

/// Builds one tight atlas per candidate, downscaling any image whose padded size still
/// exceeds `max_atlas_size` so it fits `max_atlas_size - 2*padding`. Used when the driver
/// placed nothing at all for a downscale level.
///
/// Returns, for each candidate, the atlas it was placed into alongside the scale factor the
/// image itself needed to additionally shrink by (1 if no extra shrink was needed), so the
/// caller can report which images needed the fallback's own downscale step.
pub fn per_image_fallback(
    candidates: &[Candidate],
    cfg: &AtlasConfig,
) -> Vec<(Atlas, Candidate)> {
    let usable_side = cfg.max_atlas_size.saturating_sub(2 * cfg.padding).max(1);

    candidates
        .iter()
        .map(|c| {
            let (w, h) = fit_within(c.width, c.height, usable_side);
            let canvas_w = w + 2 * cfg.padding;
            let canvas_h = h + 2 * cfg.padding;
            let placement = Placement {
                key: c.key.clone(),
                reserved: crate::geometry::Rect::new(0, 0, canvas_w, canvas_h),
                padding: cfg.padding,
            };
            let atlas = Atlas {
                width: canvas_w,
                height: canvas_h,
                placements: vec![placement],
                sort_strategy: SortStrategy::None,
                placement_heuristic: PlacementHeuristic::BestAreaFit,
            };
            (
                atlas,
                Candidate {
                    key: c.key.clone(),
                    width: w,
                    height: h,
                },
            )
        })
        .collect()
}

/// Shrinks `(w, h)` proportionally, if needed, so both sides are `<= max_side`. Never
/// upscales and never returns a side below 1.
fn fit_within(w: u32, h: u32, max_side: u32) -> (u32, u32) {
    if w <= max_side && h <= max_side {
        return (w, h);
    }
    let scale = (max_side as f64 / w.max(h) as f64).min(1.0);
    (
        ((w as f64 * scale).floor() as u32).max(1),
        ((h as f64 * scale).floor() as u32).max(1),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidates(n: usize, w: u32, h: u32) -> Vec<Candidate> {
        (0..n)
            .map(|i| Candidate {
                key: format!("img_{i}.png"),
                width: w,
                height: h,
            })
            .collect()
    }

    #[test]
    fn packs_everything_into_one_atlas_when_it_fits() {
        let cfg = AtlasConfig::default();
        let cands = candidates(5, 16, 16);
        let (atlases, leftover) = pack_all(&cands, &cfg);
        assert!(leftover.is_empty());
        let total: usize = atlases.iter().map(|a| a.placed_count()).sum();
        assert_eq!(total, 5);
    }

    #[test]
    fn per_image_fallback_downscales_oversized_images() {
        let cfg = AtlasConfig::builder().max_atlas_size(100).padding(2).build();
        let cands = vec![Candidate {
            key: "huge.png".into(),
            width: 500,
            height: 200,
        }];
        let results = per_image_fallback(&cands, &cfg);
        assert_eq!(results.len(), 1);
        let (atlas, shrunk) = &results[0];
        assert!(shrunk.width <= 96);
        assert!(shrunk.height <= 96);
        assert_eq!(atlas.placements.len(), 1);
    }

    #[test]
    fn fit_within_preserves_aspect_ratio() {
        let (w, h) = fit_within(400, 100, 100);
        assert_eq!(w, 100);
        assert_eq!(h, 25);
    }
}
