//! Configuration options for the picking subsystem.

use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::{PickError, Result};

/// Side length, in texels, of the square identity buffer.
///
/// Only the majority color inside the pick frustum matters, so a handful of
/// texels is enough. Larger values make thin objects easier to hit at the
/// cost of a bigger readback.
pub const IDENTITY_BUFFER_DIM: u32 = 8;

/// Largest identity buffer accepted by [`PickOptions::validate`].
pub const MAX_IDENTITY_BUFFER_DIM: u32 = 64;

/// Tunables for the picking subsystem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PickOptions {
    /// Side length of the identity buffer (D in a D×D surface).
    pub identity_buffer_dim: u32,

    /// Field of view of the synthetic pick camera, in degrees.
    pub pick_fov_degrees: f32,

    /// Up vector used to orient the pick camera.
    pub pick_up: Vec3,

    /// Whether renderables are culled against the pick frustum before drawing.
    pub cull_with_frustum: bool,
}

impl Default for PickOptions {
    fn default() -> Self {
        Self {
            identity_buffer_dim: IDENTITY_BUFFER_DIM,
            pick_fov_degrees: 1.0,
            pick_up: Vec3::Y,
            cull_with_frustum: true,
        }
    }
}

impl PickOptions {
    /// Parses options from a JSON document. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let options: Self = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    /// Loads options from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Serializes the options to pretty-printed JSON.
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Checks that every field is in its usable range.
    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_IDENTITY_BUFFER_DIM).contains(&self.identity_buffer_dim) {
            return Err(PickError::InvalidOptions(format!(
                "identity_buffer_dim must be in 1..={MAX_IDENTITY_BUFFER_DIM}, got {}",
                self.identity_buffer_dim
            )));
        }
        if !(self.pick_fov_degrees > 0.0 && self.pick_fov_degrees < 179.0) {
            return Err(PickError::InvalidOptions(format!(
                "pick_fov_degrees must be in (0, 179), got {}",
                self.pick_fov_degrees
            )));
        }
        if !self.pick_up.is_finite() || self.pick_up.length_squared() < 1e-12 {
            return Err(PickError::InvalidOptions(
                "pick_up must be a finite, non-zero vector".to_string(),
            ));
        }
        Ok(())
    }
}
