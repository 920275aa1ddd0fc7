//! Manifest assembly: per-file content hashing, input manifest ingestion, and output
//! manifest construction.
//!
//! Grounded on the adaptive generator's manifest building (SHA enrichment, atlas record
//! shape) and the metadata tool's input-manifest normalization, including its
//! parse-error-means-absent fallback.

use std::path::Path;

use indexmap::IndexMap;
use sha2::{Digest, Sha256};
use tracing::warn;

use crate::config::AtlasConfig;
use crate::model::{AtlasRecord, ImageMetadata, Manifest, PixelUv};
use crate::model::{normalize_uv, Atlas};

pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let digest = hasher.finalize();
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

/// Normalized shape of an optional input-side `manifest.json`.
#[derive(Debug, Clone, Default)]
pub struct UserManifest {
    pub images: IndexMap<String, serde_json::Map<String, serde_json::Value>>,
    pub metadata: Option<serde_json::Value>,
}

/// Loads `manifest.json` from `input_dir` if present. A missing file yields an empty
/// manifest. Malformed JSON is logged and treated as absent, mirroring the ingestion tool's
/// `except JSONDecodeError` fallback to "start fresh" semantics, so packing can still
/// proceed.
pub fn load_user_manifest(input_dir: &Path) -> UserManifest {
    let path = input_dir.join("manifest.json");
    let Ok(raw) = std::fs::read_to_string(&path) else {
        return UserManifest::default();
    };

    let value: serde_json::Value = match serde_json::from_str(&raw) {
        Ok(v) => v,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "manifest.json is not valid JSON; treating as absent");
            return UserManifest::default();
        }
    };

    parse_user_manifest(value)
}

fn parse_user_manifest(value: serde_json::Value) -> UserManifest {
    let serde_json::Value::Object(mut root) = value else {
        return UserManifest::default();
    };

    // New shape: {"version":.., "images": {...}, "metadata": {...}}.
    if let Some(serde_json::Value::Object(images)) = root.remove("images") {
        let images = images
            .into_iter()
            .filter_map(|(k, v)| match v {
                serde_json::Value::Object(m) => Some((k, m)),
                _ => None,
            })
            .collect();
        return UserManifest {
            images,
            metadata: root.remove("metadata"),
        };
    }

    // Legacy shape: the bare map itself is the per-filename dict.
    let images = root
        .into_iter()
        .filter_map(|(k, v)| match v {
            serde_json::Value::Object(m) => Some((k, m)),
            _ => None,
        })
        .collect();
    UserManifest {
        images,
        metadata: None,
    }
}

/// Builds the `images_metadata` map: every discovered file gets a SHA-256 of its raw bytes,
/// merged with any user-authored fields from `user.images` (unknown fields pass through).
/// Iteration order follows `discovered_keys`, since the static publisher's index assignment
/// depends on it.
pub fn build_images_metadata(
    discovered_keys: &[String],
    file_hashes: &IndexMap<String, String>,
    user: &UserManifest,
) -> IndexMap<String, ImageMetadata> {
    discovered_keys
        .iter()
        .map(|key| {
            let extra = user.images.get(key).cloned().unwrap_or_default();
            let sha256 = file_hashes.get(key).cloned();
            (key.clone(), ImageMetadata { sha256, extra })
        })
        .collect()
}

/// Builds one manifest atlas record from a packed `Atlas`, its rendered PNG bytes, scale
/// factor and index-within-scale.
pub fn build_atlas_record(
    atlas: &Atlas,
    png_bytes: &[u8],
    scale: u32,
    index: usize,
    filename: String,
) -> AtlasRecord {
    let sha = sha256_hex(png_bytes);
    let uv = atlas
        .placements
        .iter()
        .map(|p| {
            let r = p.image_rect();
            let pixel = PixelUv {
                x: r.x,
                y: r.y,
                width: r.w,
                height: r.h,
            };
            (p.key.clone(), normalize_uv(&pixel, atlas.width, atlas.height))
        })
        .collect();

    AtlasRecord {
        filename,
        scale,
        index,
        width: atlas.width,
        height: atlas.height,
        sha,
        uv,
        sort_strategy: atlas.sort_strategy.as_str().to_string(),
        placement_heuristic: atlas.placement_heuristic.as_str().to_string(),
        efficiency: atlas.efficiency(),
    }
}

pub fn assemble_manifest(
    cfg: &AtlasConfig,
    total_images: usize,
    images_metadata: IndexMap<String, ImageMetadata>,
    atlases: Vec<AtlasRecord>,
    metadata: Option<serde_json::Value>,
) -> Manifest {
    Manifest {
        version: 1,
        padding: cfg.padding,
        max_atlas_size: cfg.max_atlas_size,
        max_image_size: cfg.max_image_size,
        total_images,
        metadata,
        images_metadata,
        atlases,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha256_hex_matches_known_vector() {
        // SHA-256("") per FIPS 180-4 test vectors.
        assert_eq!(
            sha256_hex(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b85"
        );
    }

    #[test]
    fn legacy_bare_map_is_normalized_into_images() {
        let raw = serde_json::json!({"a.png": {"title": "A"}, "b.png": {}});
        let um = parse_user_manifest(raw);
        assert_eq!(um.images.len(), 2);
        assert!(um.metadata.is_none());
    }

    #[test]
    fn new_shape_splits_images_and_metadata() {
        let raw = serde_json::json!({
            "version": 1,
            "images": {"a.png": {"title": "A"}},
            "metadata": {"author": "me"}
        });
        let um = parse_user_manifest(raw);
        assert_eq!(um.images.len(), 1);
        assert!(um.metadata.is_some());
    }

    #[test]
    fn missing_manifest_file_yields_empty() {
        let um = load_user_manifest(Path::new("/nonexistent/does-not-exist-9f8"));
        assert!(um.images.is_empty());
        assert!(um.metadata.is_none());
    }
}
