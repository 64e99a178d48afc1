//! Simulation parameters.
//!
//! A [`GrowthConfig`] is produced once, before the first step, and then
//! only read. It can come from three places:
//!
//! 1. [`GrowthConfig::default`], the tuned parameter set.
//! 2. A mesh's average edge length, via [`GrowthConfig::for_edge_length`]
//!    or [`GrowthConfig::randomized`].
//! 3. TOML text, via [`GrowthConfig::from_toml`]:
//!
//! ```toml
//! link_rest_length = 1.0
//! radius_of_influence = 1.3
//! split_threshold = 50.0
//! max_step_distance = 0.25
//! ```

use crate::error::{GrowthError, Result};
use crate::sampler::UniformSampler;
use serde::{Deserialize, Serialize};

const TUNED_REST_LENGTH: f32 = 0.991549;
const TUNED_RADIUS_OF_INFLUENCE: f32 = 1.2939;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrowthConfig {
    /// Target distance between linked cells.
    pub link_rest_length: f32,
    /// Distance below which non-linked cells repel each other.
    pub radius_of_influence: f32,
    /// Weight of the spring target in the position update.
    pub spring_factor: f32,
    /// Weight of the neighbor centroid in the position update.
    pub planar_factor: f32,
    /// Weight of the displacement along the normal.
    pub bulge_factor: f32,
    /// Weight of the summed repulsion vector.
    pub repulsion_factor: f32,
    /// Food level above which a cell divides.
    pub split_threshold: f32,
    /// Longest allowed displacement per step, if any.
    pub max_step_distance: Option<f32>,
}

impl Default for GrowthConfig {
    fn default() -> Self {
        Self {
            link_rest_length: TUNED_REST_LENGTH,
            radius_of_influence: TUNED_RADIUS_OF_INFLUENCE,
            spring_factor: 0.188446,
            planar_factor: 0.276574,
            bulge_factor: 0.139144,
            repulsion_factor: 0.0938309,
            split_threshold: 100.0,
            max_step_distance: None,
        }
    }
}

impl GrowthConfig {
    /// Tuned parameters scaled to a mesh whose edges average `avg_edge`.
    ///
    /// The rest length becomes `avg_edge` and the radius of influence
    /// keeps its tuned ratio to it. Factors and threshold are unchanged.
    pub fn for_edge_length(avg_edge: f32) -> Self {
        Self {
            link_rest_length: avg_edge,
            radius_of_influence: avg_edge * (TUNED_RADIUS_OF_INFLUENCE / TUNED_REST_LENGTH),
            ..Self::default()
        }
    }

    /// Random parameter set for exploring growth styles.
    ///
    /// The rest length lands in `[0.5, 2)` times `avg_edge`, the radius of
    /// influence in `[1, 2)` times the rest length, and every factor is a
    /// shared strength in `[0.01, 0.3)` scaled by its own `[0, 1)` draw.
    pub fn randomized(avg_edge: f32, sampler: &mut impl UniformSampler) -> Self {
        let link_rest_length = avg_edge * sampler.uniform(0.5, 2.0);
        let radius_of_influence = sampler.uniform(link_rest_length, link_rest_length * 2.0);
        let pct = sampler.uniform(0.01, 0.3);
        let cfg = Self {
            link_rest_length,
            radius_of_influence,
            repulsion_factor: pct * sampler.uniform(0.0, 1.0),
            spring_factor: pct * sampler.uniform(0.0, 1.0),
            planar_factor: pct * sampler.uniform(0.0, 1.0),
            bulge_factor: pct * sampler.uniform(0.0, 1.0),
            ..Self::default()
        };
        tracing::info!(
            link_rest_length = cfg.link_rest_length,
            radius_of_influence = cfg.radius_of_influence,
            spring_factor = cfg.spring_factor,
            planar_factor = cfg.planar_factor,
            bulge_factor = cfg.bulge_factor,
            repulsion_factor = cfg.repulsion_factor,
            "randomized growth parameters"
        );
        cfg
    }

    /// Parses and validates a TOML document. Missing keys keep their
    /// default values.
    pub fn from_toml(content: &str) -> Result<Self> {
        let cfg = toml::from_str::<Self>(content)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Checks that every parameter is usable.
    ///
    /// Lengths and the split threshold must be finite and positive, the
    /// factors finite and non-negative, and the optional step clamp
    /// finite and positive.
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("link_rest_length", self.link_rest_length),
            ("radius_of_influence", self.radius_of_influence),
            ("split_threshold", self.split_threshold),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(GrowthError::invalid_config(format!(
                    "{name} must be finite and positive, got {value}"
                )));
            }
        }

        let factors = [
            ("spring_factor", self.spring_factor),
            ("planar_factor", self.planar_factor),
            ("bulge_factor", self.bulge_factor),
            ("repulsion_factor", self.repulsion_factor),
        ];
        for (name, value) in factors {
            if !value.is_finite() || value < 0.0 {
                return Err(GrowthError::invalid_config(format!(
                    "{name} must be finite and non-negative, got {value}"
                )));
            }
        }

        if let Some(max) = self.max_step_distance
            && (!max.is_finite() || max <= 0.0)
        {
            return Err(GrowthError::invalid_config(format!(
                "max_step_distance must be finite and positive, got {max}"
            )));
        }

        Ok(())
    }

    /// Bucket width for the spatial index: wide enough that every
    /// repulsion query stays within the 27 buckets around a cell.
    pub fn index_cell_size(&self) -> f32 {
        (self.link_rest_length * 2.0).max(self.radius_of_influence)
    }
}
