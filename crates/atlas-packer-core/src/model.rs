//! Atlas/placement data model: the records the packer, driver and manifest assembler pass
//! between each other.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::geometry::Rect;
use crate::packer::PlacementHeuristic;
use crate::sort::SortStrategy;

/// One image placed into a canvas, including its padding reservation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Placement {
    pub key: String,
    /// Reserved rectangle including padding on all sides.
    pub reserved: Rect,
    pub padding: u32,
}

impl Placement {
    /// The image's own pixel rectangle, i.e. `reserved` shrunk by `padding` on each side.
    pub fn image_rect(&self) -> Rect {
        Rect::new(
            self.reserved.x + self.padding,
            self.reserved.y + self.padding,
            self.reserved.w.saturating_sub(2 * self.padding),
            self.reserved.h.saturating_sub(2 * self.padding),
        )
    }
}

/// A canvas cropped to the tight bounding box of its placements.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Atlas {
    pub width: u32,
    pub height: u32,
    pub placements: Vec<Placement>,
    pub sort_strategy: SortStrategy,
    pub placement_heuristic: PlacementHeuristic,
}

impl Atlas {
    pub fn placed_count(&self) -> usize {
        self.placements.len()
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Sum of placed image areas (unpadded) over cropped canvas area.
    pub fn efficiency(&self) -> f64 {
        if self.area() == 0 {
            return 0.0;
        }
        let used: u64 = self
            .placements
            .iter()
            .map(|p| {
                let r = p.image_rect();
                r.w as u64 * r.h as u64
            })
            .sum();
        used as f64 / self.area() as f64
    }
}

/// Atlases produced at one scale factor, ordered by descending placement count on emission.
pub type AtlasSet = Vec<Atlas>;

pub fn sort_atlas_set_by_placement_count_desc(set: &mut AtlasSet) {
    set.sort_by(|a, b| b.placed_count().cmp(&a.placed_count()));
}

/// Per-filename record combining user-authored fields with a computed content hash.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ImageMetadata {
    pub sha256: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Pixel-space UV rectangle, the intermediate form before normalization.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PixelUv {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Normalized UV rectangle with a bottom-left origin, as emitted in the manifest.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct UvRecord {
    pub width: u32,
    pub height: u32,
    pub rect_x: f64,
    pub rect_y: f64,
    pub rect_width: f64,
    pub rect_height: f64,
}

/// Converts a pixel-space UV rect (top-left origin) into the normalized, bottom-left-origin
/// form emitted in the manifest.
pub fn normalize_uv(pixel: &PixelUv, canvas_width: u32, canvas_height: u32) -> UvRecord {
    let cw = canvas_width.max(1) as f64;
    let ch = canvas_height.max(1) as f64;
    let px = pixel.x as f64;
    let py = pixel.y as f64;
    let pw = pixel.width as f64;
    let ph = pixel.height as f64;
    UvRecord {
        width: pixel.width,
        height: pixel.height,
        rect_x: px / cw,
        rect_y: 1.0 - (py + ph) / ch,
        rect_width: pw / cw,
        rect_height: ph / ch,
    }
}

/// One atlas entry in the emitted manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AtlasRecord {
    pub filename: String,
    pub scale: u32,
    pub index: usize,
    pub width: u32,
    pub height: u32,
    pub sha: String,
    pub uv: IndexMap<String, UvRecord>,
    pub sort_strategy: String,
    pub placement_heuristic: String,
    pub efficiency: f64,
}

/// Output manifest: the crate's final packing result, ready for `serde_json` serialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    pub version: u32,
    pub padding: u32,
    pub max_atlas_size: u32,
    pub max_image_size: u32,
    pub total_images: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
    pub images_metadata: IndexMap<String, ImageMetadata>,
    pub atlases: Vec<AtlasRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_uv_flips_to_bottom_left_origin() {
        let uv = normalize_uv(
            &PixelUv {
                x: 0,
                y: 0,
                width: 10,
                height: 10,
            },
            100,
            100,
        );
        // Top-left pixel placement should land at the top of the normalized space,
        // i.e. rect_y close to 1.0 minus its own height fraction.
        assert!((uv.rect_y - 0.9).abs() < 1e-9);
        assert!((uv.rect_x - 0.0).abs() < 1e-9);
    }

    #[test]
    fn placement_image_rect_shrinks_by_padding() {
        let p = Placement {
            key: "a.png".into(),
            reserved: Rect::new(0, 0, 14, 24),
            padding: 2,
        };
        let r = p.image_rect();
        assert_eq!((r.w, r.h), (10, 20));
        assert_eq!((r.x, r.y), (2, 2));
    }
}
