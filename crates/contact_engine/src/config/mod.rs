//! Configuration system
//!
//! Tunables for the collision pipeline, loadable from TOML or RON files.

pub use serde::{Serialize, Deserialize};

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from file
    fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(ConfigError::Io)?;

        // Try different formats
        if path.ends_with(".toml") {
            toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else if path.ends_with(".ron") {
            ron::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else {
            Err(ConfigError::UnsupportedFormat(path.to_string()))
        }
    }

    /// Save configuration to file
    fn save_to_file(&self, path: &str) -> Result<(), ConfigError> {
        let contents = if path.ends_with(".toml") {
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else if path.ends_with(".ron") {
            ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else {
            return Err(ConfigError::UnsupportedFormat(path.to_string()));
        };

        std::fs::write(path, contents).map_err(ConfigError::Io)
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// A value is outside its allowed range
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Tunables for hitbox construction, GJK, EPA and contact resolution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Upper bound on GJK iterations; hitting it reports no intersection
    pub gjk_max_iterations: usize,

    /// Upper bound on EPA expansions; hitting it returns the best face so far
    pub epa_max_iterations: usize,

    /// EPA stops once a new support point improves the closest face by less than this
    pub epa_tolerance: f32,

    /// Vertices closer than this on every axis are merged into one hitbox vertex
    pub vertex_merge_epsilon: f32,

    /// Extra distance added to positional correction so resolved bodies end up apart
    pub penetration_slop: f32,

    /// 0 removes the approaching velocity along the contact normal, 1 reflects it
    pub restitution: f32,

    /// Build 8-corner bounding hitboxes instead of full vertex hulls
    pub use_simple_hitbox: bool,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gjk_max_iterations: 64,
            epa_max_iterations: 64,
            epa_tolerance: 1.0e-4,
            vertex_merge_epsilon: 1.0e-5,
            penetration_slop: 1.0e-3,
            restitution: 0.0,
            use_simple_hitbox: true,
        }
    }
}

impl Config for PhysicsConfig {}

impl PhysicsConfig {
    /// Check that every value is usable by the collision pipeline
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.gjk_max_iterations == 0 {
            return Err(ConfigError::Invalid("gjk_max_iterations must be at least 1".into()));
        }
        if self.epa_max_iterations == 0 {
            return Err(ConfigError::Invalid("epa_max_iterations must be at least 1".into()));
        }
        if !(self.epa_tolerance >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "epa_tolerance must be non-negative, got {}",
                self.epa_tolerance
            )));
        }
        if !(self.vertex_merge_epsilon >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "vertex_merge_epsilon must be non-negative, got {}",
                self.vertex_merge_epsilon
            )));
        }
        if !(self.penetration_slop >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "penetration_slop must be non-negative, got {}",
                self.penetration_slop
            )));
        }
        if !(0.0..=1.0).contains(&self.restitution) {
            return Err(ConfigError::Invalid(format!(
                "restitution must be within [0, 1], got {}",
                self.restitution
            )));
        }
        Ok(())
    }

    /// Load from file and validate in one go
    pub fn load_validated(path: &str) -> Result<Self, ConfigError> {
        let config = Self::load_from_file(path)?;
        config.validate()?;
        Ok(config)
    }
}
