//! Static publisher: compresses a generated manifest (filename keys) into an integer-indexed
//! form suitable for HTTP delivery, and renames/copies the atlas PNGs to match.
//!
//! Grounded directly on the Python generator's static-publish step (`compress_atlas_data`,
//! `copy_and_rename_images`).

use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{AtlasError, Result};
use crate::model::{Manifest, UvRecord};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompressedAtlasRecord {
    pub scale: u32,
    pub width: u32,
    pub height: u32,
    pub sha: String,
    pub uv: IndexMap<String, UvRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompressedManifest {
    pub version: u32,
    pub mapping: Vec<serde_json::Value>,
    pub atlases: Vec<CompressedAtlasRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

/// Compresses `manifest`'s filename-keyed records into index-keyed ones. `mapping[i]` is the
/// per-image metadata record for whichever filename was the `i`-th entry of
/// `manifest.images_metadata` (insertion order, which is why that map must be an
/// `IndexMap`).
pub fn compress_atlas_data(manifest: &Manifest) -> CompressedManifest {
    let index_of: IndexMap<&str, usize> = manifest
        .images_metadata
        .keys()
        .enumerate()
        .map(|(i, k)| (k.as_str(), i))
        .collect();

    let mapping = manifest
        .images_metadata
        .values()
        .map(|m| serde_json::to_value(m).unwrap_or(serde_json::Value::Null))
        .collect();

    let atlases = manifest
        .atlases
        .iter()
        .map(|a| {
            let uv = a
                .uv
                .iter()
                .filter_map(|(key, rect)| {
                    index_of.get(key.as_str()).map(|i| (i.to_string(), *rect))
                })
                .collect();
            CompressedAtlasRecord {
                scale: a.scale,
                width: a.width,
                height: a.height,
                sha: a.sha.clone(),
                uv,
            }
        })
        .collect();

    CompressedManifest {
        version: manifest.version,
        mapping,
        atlases,
        metadata: manifest.metadata.clone(),
    }
}

/// Copies each atlas PNG named in `manifest.atlases` from `input_dir` to
/// `output_dir/atlas/{position}.png`, using the atlas's position within `manifest.atlases`
/// (not its scale/index-within-scale) as the new filename. A missing source file is logged
/// and skipped; the rest still publish.
pub fn copy_and_rename_images(manifest: &Manifest, input_dir: &Path, output_dir: &Path) -> Result<()> {
    let atlas_dir = output_dir.join("atlas");
    std::fs::create_dir_all(&atlas_dir)?;

    for (position, record) in manifest.atlases.iter().enumerate() {
        let src = input_dir.join(&record.filename);
        let dst = atlas_dir.join(format!("{position}.png"));
        if let Err(e) = std::fs::copy(&src, &dst) {
            warn!(
                file = %record.filename,
                error = %e,
                "atlas file missing at static publish time; skipping"
            );
            continue;
        }
    }
    Ok(())
}

/// Loads the generated manifest from `input_dir/manifest.json`, compresses it, and writes
/// `output_dir/atlas.json` plus the renamed atlas PNGs.
pub fn publish(input_dir: &Path, output_dir: &Path) -> Result<CompressedManifest> {
    let manifest_path = input_dir.join("manifest.json");
    let raw = std::fs::read_to_string(&manifest_path)
        .map_err(|_| AtlasError::MissingManifest(manifest_path.display().to_string()))?;
    let manifest: Manifest = serde_json::from_str(&raw)?;

    std::fs::create_dir_all(output_dir)?;
    copy_and_rename_images(&manifest, input_dir, output_dir)?;

    let compressed = compress_atlas_data(&manifest);
    let out_path = output_dir.join("atlas.json");
    std::fs::write(out_path, serde_json::to_vec_pretty(&compressed)?)?;

    Ok(compressed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AtlasRecord, ImageMetadata};

    fn sample_manifest() -> Manifest {
        let mut images_metadata = IndexMap::new();
        images_metadata.insert(
            "b.png".to_string(),
            ImageMetadata {
                sha256: Some("bbb".into()),
                extra: Default::default(),
            },
        );
        images_metadata.insert(
            "a.png".to_string(),
            ImageMetadata {
                sha256: Some("aaa".into()),
                extra: Default::default(),
            },
        );

        let mut uv = IndexMap::new();
        uv.insert(
            "a.png".to_string(),
            UvRecord {
                width: 10,
                height: 10,
                rect_x: 0.0,
                rect_y: 0.0,
                rect_width: 0.1,
                rect_height: 0.1,
            },
        );

        Manifest {
            version: 1,
            padding: 2,
            max_atlas_size: 2048,
            max_image_size: 2048,
            total_images: 2,
            metadata: None,
            images_metadata,
            atlases: vec![AtlasRecord {
                filename: "atlas_x01_00.png".into(),
                scale: 1,
                index: 0,
                width: 64,
                height: 64,
                sha: "sha-atlas".into(),
                uv,
                sort_strategy: "area".into(),
                placement_heuristic: "best_area_fit".into(),
                efficiency: 0.5,
            }],
        }
    }

    #[test]
    fn compresses_uv_keys_to_mapping_indices() {
        let manifest = sample_manifest();
        let compressed = compress_atlas_data(&manifest);
        assert_eq!(compressed.mapping.len(), 2);
        // "a.png" was inserted second, so its index is 1.
        assert!(compressed.atlases[0].uv.contains_key("1"));
    }
}
