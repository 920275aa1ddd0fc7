//! Filesystem discovery of input images. Non-recursive, matching the Python generator's
//! `os.listdir` scan; walked with `walkdir` (as the teacher CLI's `gather_paths` does) capped
//! to depth 1, so the crate is used for the traversal even though this spec's input
//! directories are flat.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{AtlasError, Result};

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "tiff"];

pub fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Lists immediate image files under `input_dir`, sorted by filename for a deterministic,
/// reproducible iteration order.
pub fn discover_images(input_dir: &Path) -> Result<Vec<PathBuf>> {
    if !input_dir.is_dir() {
        return Err(AtlasError::MissingInput(input_dir.display().to_string()));
    }

    let mut paths: Vec<PathBuf> = WalkDir::new(input_dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.into_path())
        .filter(|p| p.is_file() && is_image(p))
        .collect();
    paths.sort();

    if paths.is_empty() {
        return Err(AtlasError::NoValidImages(input_dir.display().to_string()));
    }
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_case_insensitive_extensions() {
        assert!(is_image(Path::new("a.PNG")));
        assert!(is_image(Path::new("a.Jpeg")));
        assert!(!is_image(Path::new("a.txt")));
        assert!(!is_image(Path::new("a")));
    }

    #[test]
    fn missing_directory_is_reported() {
        let err = discover_images(Path::new("/nonexistent/does-not-exist-9f8")).unwrap_err();
        assert!(matches!(err, AtlasError::MissingInput(_)));
    }
}
