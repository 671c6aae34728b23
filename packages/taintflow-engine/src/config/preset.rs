//! Preset configurations
//!
//! Presets provide complete default configurations for common use cases.

use super::error::ConfigError;
use serde::{Deserialize, Serialize};

/// Configuration preset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    /// CI/CD: minimal fast analysis
    ///
    /// - widening after 2 joins, summaries 1 level deep
    Fast,

    /// Development: balanced analysis (default)
    ///
    /// - widening after 4 joins, summaries 3 levels deep
    Balanced,

    /// Security audit: most precise within deterministic bounds
    ///
    /// - widening after 8 joins, summaries 6 levels deep
    Thorough,
}

impl std::str::FromStr for Preset {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fast" => Ok(Self::Fast),
            "balanced" => Ok(Self::Balanced),
            "thorough" => Ok(Self::Thorough),
            other => Err(ConfigError::UnknownPreset(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_from_str() {
        assert_eq!("fast".parse::<Preset>().unwrap(), Preset::Fast);
        assert_eq!("Thorough".parse::<Preset>().unwrap(), Preset::Thorough);
        assert!("paranoid".parse::<Preset>().is_err());
    }
}
