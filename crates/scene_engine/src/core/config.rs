//! # Configuration System
//!
//! Configuration for engine subsystems: strongly typed structures with
//! defaults, builder-style setters, and RON file loading.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::foundation::math::Vec3;

/// Errors raised while loading a configuration file
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// The file contents could not be parsed
    #[error("failed to parse config: {0}")]
    Parse(#[from] ron::error::SpannedError),
}

/// # Physics Simulation Configuration
///
/// Controls gravity and the fixed simulation timestep of a
/// [`PhysicsWorld`](crate::physics::PhysicsWorld).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhysicsConfig {
    /// World-space gravity applied to dynamic bodies
    pub gravity: Vec3,

    /// Fixed timestep for the simulation step, in seconds
    pub fixed_timestep: f32,
}

impl PhysicsConfig {
    /// Set the gravity vector
    pub fn with_gravity(mut self, gravity: Vec3) -> Self {
        self.gravity = gravity;
        self
    }

    /// Set the fixed simulation timestep
    pub fn with_fixed_timestep(mut self, fixed_timestep: f32) -> Self {
        self.fixed_timestep = fixed_timestep;
        self
    }

    /// Parse a configuration from a RON string
    pub fn from_ron_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(ron::from_str(contents)?)
    }

    /// Load a configuration from a RON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_ron_str(&contents)
    }
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: Vec3::new(0.0, -9.81, 0.0),
            fixed_timestep: 1.0 / 60.0,
        }
    }
}
