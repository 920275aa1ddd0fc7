use serde::{Deserialize, Serialize};

use crate::error::{AtlasError, Result};

/// Packing configuration shared by the single-atlas search, the adaptive multi-atlas
/// driver and the downscale pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AtlasConfig {
    /// Largest canvas side in pixels (also the cap used by the per-image fallback).
    pub max_atlas_size: u32,
    /// Symmetric gutter (in pixels) reserved around each placed image.
    pub padding: u32,
    /// Images larger than this on either side are downscaled (aspect-preserving) before
    /// packing. Defaults to `max_atlas_size`.
    pub max_image_size: u32,

    /// Canvas sizes tried by the single-atlas search, largest first.
    #[serde(default = "default_canvas_sizes")]
    pub canvas_sizes: Vec<u32>,
    /// Downscale factors applied by the multi-resolution pipeline, in order.
    #[serde(default = "default_downscale_factors")]
    pub downscale_factors: Vec<u32>,
    /// Safety cap on atlases produced per downscale level.
    #[serde(default = "default_max_atlas_count")]
    pub max_atlas_count: usize,
    /// Block-shuffled perturbations tried per (placement, sort) combination.
    #[serde(default = "default_perms_per_config")]
    pub perms_per_config: usize,
    /// Global random shuffles tried against the best grid result.
    #[serde(default = "default_global_random_trials")]
    pub global_random_trials: usize,
}

fn default_canvas_sizes() -> Vec<u32> {
    vec![2048, 1536, 1024]
}
fn default_downscale_factors() -> Vec<u32> {
    vec![1, 2, 4, 8, 16]
}
fn default_max_atlas_count() -> usize {
    100
}
fn default_perms_per_config() -> usize {
    2
}
fn default_global_random_trials() -> usize {
    10
}

impl Default for AtlasConfig {
    fn default() -> Self {
        Self {
            max_atlas_size: 2048,
            padding: 2,
            max_image_size: 2048,
            canvas_sizes: default_canvas_sizes(),
            downscale_factors: default_downscale_factors(),
            max_atlas_count: default_max_atlas_count(),
            perms_per_config: default_perms_per_config(),
            global_random_trials: default_global_random_trials(),
        }
    }
}

impl AtlasConfig {
    pub fn builder() -> AtlasConfigBuilder {
        AtlasConfigBuilder::new()
    }

    /// Largest padded dimension a single image may have before it is considered unpackable.
    pub fn max_padded_side(&self) -> u32 {
        self.canvas_sizes
            .iter()
            .copied()
            .max()
            .unwrap_or(self.max_atlas_size)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_atlas_size == 0 {
            return Err(AtlasError::InvalidConfig(
                "max_atlas_size must be greater than 0".into(),
            ));
        }
        if self.max_image_size == 0 {
            return Err(AtlasError::InvalidConfig(
                "max_image_size must be greater than 0".into(),
            ));
        }
        if self.canvas_sizes.is_empty() {
            return Err(AtlasError::InvalidConfig(
                "canvas_sizes must not be empty".into(),
            ));
        }
        if self.downscale_factors.is_empty() {
            return Err(AtlasError::InvalidConfig(
                "downscale_factors must not be empty".into(),
            ));
        }
        if self.padding.saturating_mul(2) >= self.max_padded_side() {
            return Err(AtlasError::InvalidConfig(format!(
                "padding ({}) * 2 leaves no usable space in the largest canvas ({})",
                self.padding,
                self.max_padded_side()
            )));
        }
        Ok(())
    }
}

/// Builder for `AtlasConfig` for ergonomic construction.
#[derive(Debug, Default, Clone)]
pub struct AtlasConfigBuilder {
    cfg: AtlasConfig,
}

impl AtlasConfigBuilder {
    pub fn new() -> Self {
        Self {
            cfg: AtlasConfig::default(),
        }
    }
    pub fn max_atlas_size(mut self, v: u32) -> Self {
        self.cfg.max_atlas_size = v;
        self
    }
    pub fn padding(mut self, v: u32) -> Self {
        self.cfg.padding = v;
        self
    }
    pub fn max_image_size(mut self, v: u32) -> Self {
        self.cfg.max_image_size = v;
        self
    }
    pub fn canvas_sizes(mut self, v: Vec<u32>) -> Self {
        self.cfg.canvas_sizes = v;
        self
    }
    pub fn downscale_factors(mut self, v: Vec<u32>) -> Self {
        self.cfg.downscale_factors = v;
        self
    }
    pub fn build(self) -> AtlasConfig {
        self.cfg
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        assert!(AtlasConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_atlas_size_is_rejected() {
        let cfg = AtlasConfig::builder().max_atlas_size(0).build();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn excessive_padding_is_rejected() {
        let cfg = AtlasConfig::builder()
            .canvas_sizes(vec![10])
            .padding(6)
            .build();
        assert!(cfg.validate().is_err());
    }
}
