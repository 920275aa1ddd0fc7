//! Core library for the adaptive multi-atlas texture packer.
//!
//! The hard engineering lives in [`search`] (single-atlas search: canvas size × placement
//! heuristic × sort order, plus randomized perturbations) and [`packer`] (the MAXRECTS
//! free-rectangle engine it drives). [`driver`] repeats the search across whatever images
//! remain unplaced, and [`pipeline`] repeats that across a sequence of downscale factors,
//! assembling the final manifest via [`manifest`].
//!
//! Quick example:
//! ```ignore
//! use atlas_packer_core::config::AtlasConfig;
//! use atlas_packer_core::manifest::UserManifest;
//! use atlas_packer_core::pipeline::{pack_images, ImageInput};
//!
//! # fn main() -> atlas_packer_core::error::Result<()> {
//! let a = image::open("a.png").unwrap();
//! let inputs = vec![ImageInput {
//!     key: "a.png".into(),
//!     image: a,
//!     raw_bytes: std::fs::read("a.png").unwrap(),
//! }];
//! let cfg = AtlasConfig::default();
//! let out = pack_images(&inputs, &cfg, &UserManifest::default(), None)?;
//! println!("atlases: {}", out.atlas_files.len());
//! # Ok(()) }
//! ```

pub mod compositing;
pub mod config;
pub mod discovery;
pub mod driver;
pub mod error;
pub mod geometry;
pub mod manifest;
pub mod model;
pub mod packer;
pub mod pipeline;
pub mod publish;
pub mod search;
pub mod sort;

/// Convenience prelude bringing the primary API surface into scope.
pub mod prelude {
    pub use crate::config::{AtlasConfig, AtlasConfigBuilder};
    pub use crate::error::{AtlasError, Result};
    pub use crate::geometry::Rect;
    pub use crate::model::{
        Atlas, AtlasRecord, AtlasSet, ImageMetadata, Manifest, Placement, PixelUv, UvRecord,
    };
    pub use crate::packer::{MaxRectsPacker, PlacementHeuristic};
    pub use crate::pipeline::{pack_directory, pack_images, ImageInput, Phase, PipelineOutput};
    pub use crate::sort::SortStrategy;
}
