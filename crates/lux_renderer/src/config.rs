//! Render configuration.
//!
//! A [`RenderConfig`] is a plain value handed to the renderer; there is no
//! process-wide state. Every field has a default so partial JSON files work.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};
use crate::Color;

/// Which light-transport algorithm shades the primary rays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Integrator {
    /// Recursive reflection/refraction with point-light direct lighting.
    Whitted,
    /// Monte Carlo path tracing with next-event estimation, 1 spp per frame.
    #[default]
    PathTraced,
}

/// Joint bilateral filter settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpatialFilterConfig {
    pub enabled: bool,
    /// Kernel spans `2 * half_size + 1` pixels per side.
    pub half_size: u32,
    pub sigma_position: f32,
    pub sigma_color: f32,
    pub sigma_normal: f32,
    pub sigma_coplanarity: f32,
}

impl Default for SpatialFilterConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            half_size: 7,
            sigma_position: 32.0,
            sigma_color: 0.6,
            sigma_normal: 0.1,
            sigma_coplanarity: 0.1,
        }
    }
}

/// Temporal reprojection filter settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemporalFilterConfig {
    pub enabled: bool,
    /// Half size of the neighborhood used for the history clamp.
    pub half_size: u32,
    /// History is clamped to `mean +/- tolerance * stddev`.
    pub tolerance: f32,
    /// Weight of the current frame when history is available.
    pub current_frame_weight: f32,
}

impl Default for TemporalFilterConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            half_size: 3,
            tolerance: 1.0,
            current_frame_weight: 0.2,
        }
    }
}

/// Everything the renderer needs besides the scene and the camera.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub integrator: Integrator,
    /// Recursion cap for the Whitted shader.
    pub max_depth: u32,
    /// Survival probability of a path at each bounce.
    pub russian_roulette: f32,
    /// Offset applied along the normal to every spawned ray origin.
    pub intersection_epsilon: f32,
    /// Radiance returned by rays that leave the scene.
    pub background: Color,
    /// Clamp the spatial filter output to [0, 1] before the temporal stage.
    pub immediate_clamp: bool,
    /// Average successive Whitted frames while the view is unchanged.
    pub accumulate: bool,
    /// Display gamma; 1.0 leaves values linear.
    pub gamma: f32,
    pub seed: u64,
    pub spatial: SpatialFilterConfig,
    pub temporal: TemporalFilterConfig,
}

/// Night sky used by the path-traced pipeline.
pub const NIGHT_SKY: Color = Color::new(12.0 / 255.0, 20.0 / 255.0, 69.0 / 255.0);

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            integrator: Integrator::default(),
            max_depth: 5,
            russian_roulette: 0.8,
            intersection_epsilon: 1e-5,
            background: NIGHT_SKY,
            immediate_clamp: true,
            accumulate: true,
            gamma: 1.0,
            seed: 0,
            spatial: SpatialFilterConfig::default(),
            temporal: TemporalFilterConfig::default(),
        }
    }
}

impl RenderConfig {
    /// Parse a configuration from JSON and validate it.
    pub fn from_json_str(json: &str) -> ConfigResult<Self> {
        let config: RenderConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&json)?;
        log::info!("Loaded render config from {}", path.display());
        Ok(config)
    }

    /// Check the numeric ranges the integrators and filters rely on.
    pub fn validate(&self) -> ConfigResult<()> {
        check(
            "russian_roulette",
            self.russian_roulette,
            self.russian_roulette > 0.0 && self.russian_roulette < 1.0,
            "(0, 1)",
        )?;
        check(
            "intersection_epsilon",
            self.intersection_epsilon,
            self.intersection_epsilon >= 0.0,
            "[0, inf)",
        )?;
        check("gamma", self.gamma, self.gamma > 0.0, "(0, inf)")?;
        check(
            "temporal.current_frame_weight",
            self.temporal.current_frame_weight,
            (0.0..=1.0).contains(&self.temporal.current_frame_weight),
            "[0, 1]",
        )?;
        check(
            "temporal.tolerance",
            self.temporal.tolerance,
            self.temporal.tolerance >= 0.0,
            "[0, inf)",
        )?;

        let sigmas = [
            ("spatial.sigma_position", self.spatial.sigma_position),
            ("spatial.sigma_color", self.spatial.sigma_color),
            ("spatial.sigma_normal", self.spatial.sigma_normal),
            ("spatial.sigma_coplanarity", self.spatial.sigma_coplanarity),
        ];
        for (field, value) in sigmas {
            check(field, value, value > 0.0, "(0, inf)")?;
        }
        Ok(())
    }
}

fn check(field: &'static str, value: f32, ok: bool, expected: &'static str) -> ConfigResult<()> {
    if ok {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            value,
            expected,
        })
    }
}
