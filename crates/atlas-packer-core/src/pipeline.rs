//! Downscale pipeline: the top-level entry point that drives the multi-resolution pack loop
//! and assembles the final manifest.
//!
//! Grounded on the adaptive generator's `generate_atlases` (scale loop, early-stop-on-
//! single-atlas) and structurally on the teacher's `prepare_inputs` → pack → compose shape.

use std::borrow::Cow;
use std::io::Cursor;
use std::path::Path;

use image::imageops::FilterType;
use image::{DynamicImage, RgbaImage};
use indexmap::IndexMap;
use tracing::{debug, info, instrument, warn};

use crate::config::AtlasConfig;
use crate::discovery;
use crate::driver;
use crate::error::{AtlasError, Result};
use crate::manifest::{self, UserManifest};
use crate::model::{Atlas, AtlasRecord, Manifest};
use crate::search::Candidate;

/// An in-memory image to pack: decoded pixels plus the raw bytes of the file it came from
/// (needed for the manifest's per-file SHA-256).
pub struct ImageInput {
    pub key: String,
    pub image: DynamicImage,
    pub raw_bytes: Vec<u8>,
}

/// Coarse phase boundaries a caller can observe via a progress callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Init,
    Load,
    Pack,
    Save,
    Done,
}

/// A progress callback invoked synchronously from the pipeline thread. Must not block
/// meaningfully and is never invoked concurrently with another call from the same run.
pub type ProgressCallback<'a> = dyn Fn(Phase, &str) + 'a;

fn notify(progress: Option<&ProgressCallback>, phase: Phase, message: &str) {
    if let Some(cb) = progress {
        cb(phase, message);
    }
}

/// Everything the pipeline produced: the manifest and each atlas's PNG bytes, keyed by the
/// filename recorded in the manifest.
pub struct PipelineOutput {
    pub manifest: Manifest,
    pub atlas_files: Vec<(String, Vec<u8>)>,
}

/// Packs `inputs` across the configured downscale factors and assembles the final manifest.
/// Pure in-memory: writing atlas PNGs and `manifest.json` to disk is the caller's job (see
/// `pack_directory` for the filesystem-backed convenience wrapper).
#[instrument(skip_all, fields(images = inputs.len()))]
pub fn pack_images(
    inputs: &[ImageInput],
    cfg: &AtlasConfig,
    user: &UserManifest,
    progress: Option<&ProgressCallback>,
) -> Result<PipelineOutput> {
    cfg.validate()?;
    if inputs.is_empty() {
        return Err(AtlasError::Empty);
    }

    notify(progress, Phase::Init, "configuration validated");

    let discovered_keys: Vec<String> = inputs.iter().map(|i| i.key.clone()).collect();
    let file_hashes: IndexMap<String, String> = inputs
        .iter()
        .map(|i| (i.key.clone(), manifest::sha256_hex(&i.raw_bytes)))
        .collect();

    notify(progress, Phase::Pack, "starting multi-scale pack loop");

    let mut atlas_records: Vec<AtlasRecord> = Vec::new();
    let mut atlas_files: Vec<(String, Vec<u8>)> = Vec::new();

    for &factor in &cfg.downscale_factors {
        info!(factor, "packing downscale level");
        let scaled = downscale_all(inputs, factor);
        let candidates: Vec<Candidate> = scaled
            .iter()
            .map(|(key, img)| {
                let (w, h) = img.dimensions();
                Candidate {
                    key: key.clone(),
                    width: w,
                    height: h,
                }
            })
            .collect();

        let (mut atlases, leftover) = driver::pack_all(&candidates, cfg);

        if atlases.is_empty() {
            debug!(factor, "driver placed nothing; applying per-image fallback to every candidate");
            atlases = driver::per_image_fallback(&candidates, cfg)
                .into_iter()
                .map(|(atlas, _)| atlas)
                .collect();
        } else if !leftover.is_empty() {
            debug!(
                factor,
                remaining = leftover.len(),
                "driver got stuck with images left over; falling back for the remainder"
            );
            let leftover_candidates: Vec<Candidate> = candidates
                .iter()
                .filter(|c| leftover.contains(&c.key))
                .cloned()
                .collect();
            let fallback_atlases = driver::per_image_fallback(&leftover_candidates, cfg)
                .into_iter()
                .map(|(atlas, _)| atlas);
            atlases.extend(fallback_atlases);
        }

        crate::model::sort_atlas_set_by_placement_count_desc(&mut atlases);

        let single_atlas = atlases.len() == 1;

        for (index, atlas) in atlases.iter().enumerate() {
            let filename = format!("atlas_x{factor:02}_{index:02}.png");
            let canvas = render_atlas(atlas, &scaled);
            let png_bytes = encode_png(&canvas)?;
            let record =
                manifest::build_atlas_record(atlas, &png_bytes, factor, index, filename.clone());
            atlas_records.push(record);
            atlas_files.push((filename, png_bytes));
        }

        if single_atlas {
            info!(factor, "single atlas produced at this scale; stopping early");
            break;
        }
    }

    notify(progress, Phase::Save, "assembling manifest");

    let images_metadata = manifest::build_images_metadata(&discovered_keys, &file_hashes, user);
    let manifest = manifest::assemble_manifest(
        cfg,
        inputs.len(),
        images_metadata,
        atlas_records,
        user.metadata.clone(),
    );

    notify(progress, Phase::Done, "pack complete");

    Ok(PipelineOutput {
        manifest,
        atlas_files,
    })
}

fn downscale_all(inputs: &[ImageInput], factor: u32) -> IndexMap<String, RgbaImage> {
    inputs
        .iter()
        .map(|input| {
            let rgba = input.image.to_rgba8();
            let resized = if factor <= 1 {
                rgba
            } else {
                let (w, h) = rgba.dimensions();
                let nw = (w / factor).max(1);
                let nh = (h / factor).max(1);
                image::imageops::resize(&rgba, nw, nh, FilterType::Lanczos3)
            };
            (input.key.clone(), resized)
        })
        .collect()
}

/// Renders one atlas's canvas by blitting each placement's source image (re-resized to the
/// placement's target size when the fallback's own downscale shrunk it further).
fn render_atlas(atlas: &Atlas, scaled: &IndexMap<String, RgbaImage>) -> RgbaImage {
    let mut canvas = RgbaImage::new(atlas.width.max(1), atlas.height.max(1));
    for placement in &atlas.placements {
        let Some(source) = scaled.get(&placement.key) else {
            warn!(key = %placement.key, "placement referenced an image missing from this scale's set");
            continue;
        };
        let rect = placement.image_rect();
        let image = if source.dimensions() == (rect.w, rect.h) {
            Cow::Borrowed(source)
        } else {
            Cow::Owned(image::imageops::resize(
                source,
                rect.w.max(1),
                rect.h.max(1),
                FilterType::Lanczos3,
            ))
        };
        crate::compositing::blit_rgba(&image, &mut canvas, rect.x, rect.y);
    }
    canvas
}

fn encode_png(canvas: &RgbaImage) -> Result<Vec<u8>> {
    let mut bytes: Vec<u8> = Vec::new();
    DynamicImage::ImageRgba8(canvas.clone()).write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)?;
    Ok(bytes)
}

/// Filesystem-backed convenience wrapper: discovers images in `input_dir`, loads the
/// optional input manifest, packs, then writes the atlas PNGs and `manifest.json` into
/// `output_dir`.
#[instrument(skip(cfg, progress))]
pub fn pack_directory(
    input_dir: &Path,
    output_dir: &Path,
    cfg: &AtlasConfig,
    progress: Option<&ProgressCallback>,
) -> Result<Manifest> {
    notify(progress, Phase::Load, "discovering input images");
    let paths = discovery::discover_images(input_dir)?;
    let user = manifest::load_user_manifest(input_dir);

    let mut inputs = Vec::with_capacity(paths.len());
    for path in &paths {
        let raw_bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(?path, error = %e, "failed to read image file; skipping");
                continue;
            }
        };
        let image = match image::load_from_memory(&raw_bytes) {
            Ok(img) => img,
            Err(e) => {
                warn!(?path, error = %e, "failed to decode image file; skipping");
                continue;
            }
        };
        let key = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        inputs.push(ImageInput {
            key,
            image,
            raw_bytes,
        });
    }

    if inputs.is_empty() {
        return Err(AtlasError::NoValidImages(input_dir.display().to_string()));
    }

    let output = pack_images(&inputs, cfg, &user, progress)?;

    std::fs::create_dir_all(output_dir)?;
    for (filename, bytes) in &output.atlas_files {
        std::fs::write(output_dir.join(filename), bytes)?;
    }
    std::fs::write(
        output_dir.join("manifest.json"),
        serde_json::to_vec_pretty(&output.manifest)?,
    )?;

    Ok(output.manifest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage as Raw};

    fn solid_image(w: u32, h: u32, color: [u8; 4]) -> DynamicImage {
        let mut img = Raw::new(w, h);
        for px in img.pixels_mut() {
            *px = Rgba(color);
        }
        DynamicImage::ImageRgba8(img)
    }

    fn input(key: &str, w: u32, h: u32) -> ImageInput {
        ImageInput {
            key: key.to_string(),
            image: solid_image(w, h, [10, 20, 30, 255]),
            raw_bytes: vec![1, 2, 3],
        }
    }

    #[test]
    fn packs_small_set_into_single_atlas_and_stops_early() {
        let cfg = AtlasConfig::default();
        let inputs = vec![input("a.png", 16, 16), input("b.png", 16, 16)];
        let user = UserManifest::default();
        let out = pack_images(&inputs, &cfg, &user, None).unwrap();
        assert_eq!(out.manifest.total_images, 2);
        assert_eq!(out.manifest.images_metadata.len(), 2);
        // Everything fits at scale 1, so only scale-1 atlases should be present.
        assert!(out.manifest.atlases.iter().all(|a| a.scale == 1));
        assert!(!out.atlas_files.is_empty());
    }

    #[test]
    fn rejects_empty_input() {
        let cfg = AtlasConfig::default();
        let user = UserManifest::default();
        assert!(matches!(
            pack_images(&[], &cfg, &user, None),
            Err(AtlasError::Empty)
        ));
    }

    #[test]
    fn atlas_png_bytes_decode_back_to_declared_dimensions() {
        let cfg = AtlasConfig::default();
        let inputs = vec![input("a.png", 12, 8)];
        let user = UserManifest::default();
        let out = pack_images(&inputs, &cfg, &user, None).unwrap();
        let (filename, bytes) = &out.atlas_files[0];
        let record = out
            .manifest
            .atlases
            .iter()
            .find(|a| &a.filename == filename)
            .unwrap();
        let decoded = image::load_from_memory(bytes).unwrap();
        assert_eq!(decoded.width(), record.width);
        assert_eq!(decoded.height(), record.height);
    }
}
