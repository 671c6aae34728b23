//! Engine configuration
//!
//! Configuration is constructed once per compilation/session, validated, and
//! then passed by reference into every analysis. All bounds are deterministic
//! (iteration counts, depths, sizes), never wall-clock based, so results are
//! reproducible regardless of scheduling.

mod error;
mod preset;

pub use error::{ConfigError, ConfigResult};
pub use preset::Preset;

use serde::{Deserialize, Serialize};

/// Engine configuration
///
/// Bounds that guarantee termination:
/// - `widening_threshold` caps join iterations per block before the lattice
///   value is widened to `Unknown`
/// - `max_summary_depth` / `max_summary_blocks` bound interprocedural
///   summarization
/// - `worklist_max_iterations` is a last-resort safety valve for the
///   fixpoint loop
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Join iterations on one block before widening to Unknown (1..=64)
    pub widening_threshold: u32,

    /// Maximum callee inlining depth for summaries (0..=32); 0 disables
    /// recursive summarization entirely
    pub max_summary_depth: u32,

    /// Largest callee CFG (in blocks) eligible for recursive summarization
    /// (1..=4096)
    pub max_summary_blocks: usize,

    /// LRU capacity of the per-session summary cache (1..=1_000_000)
    pub summary_cache_size: usize,

    /// Safety limit on worklist pops per body (1..=1_000_000)
    pub worklist_max_iterations: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::from_preset(Preset::Balanced)
    }
}

impl EngineConfig {
    /// Build the configuration for a preset
    pub fn from_preset(preset: Preset) -> Self {
        match preset {
            Preset::Fast => Self {
                widening_threshold: 2,
                max_summary_depth: 1,
                max_summary_blocks: 16,
                summary_cache_size: 1_000,
                worklist_max_iterations: 2_000,
            },
            Preset::Balanced => Self {
                widening_threshold: 4,
                max_summary_depth: 3,
                max_summary_blocks: 64,
                summary_cache_size: 10_000,
                worklist_max_iterations: 10_000,
            },
            Preset::Thorough => Self {
                widening_threshold: 8,
                max_summary_depth: 6,
                max_summary_blocks: 256,
                summary_cache_size: 100_000,
                worklist_max_iterations: 100_000,
            },
        }
    }

    /// Validate configuration bounds
    pub fn validate(&self) -> ConfigResult<()> {
        if self.widening_threshold == 0 || self.widening_threshold > 64 {
            return Err(ConfigError::range_with_hint(
                "widening_threshold",
                self.widening_threshold,
                1,
                64,
                "Widening must trigger after a small, finite number of joins",
            ));
        }

        if self.max_summary_depth > 32 {
            return Err(ConfigError::range_with_hint(
                "max_summary_depth",
                self.max_summary_depth,
                0,
                32,
                "Summarization depth must be bounded",
            ));
        }

        if self.max_summary_blocks == 0 || self.max_summary_blocks > 4096 {
            return Err(ConfigError::range_with_hint(
                "max_summary_blocks",
                self.max_summary_blocks,
                1,
                4096,
                "Callee size budget must be positive and bounded",
            ));
        }

        if self.summary_cache_size == 0 || self.summary_cache_size > 1_000_000 {
            return Err(ConfigError::range_with_hint(
                "summary_cache_size",
                self.summary_cache_size,
                1,
                1_000_000,
                "Summary cache must hold at least one entry",
            ));
        }

        if self.worklist_max_iterations == 0 || self.worklist_max_iterations > 1_000_000 {
            return Err(ConfigError::range_with_hint(
                "worklist_max_iterations",
                self.worklist_max_iterations,
                1,
                1_000_000,
                "Worklist iterations must be finite",
            ));
        }

        Ok(())
    }

    /// Load and validate a configuration from YAML
    pub fn from_yaml_str(yaml: &str) -> ConfigResult<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to YAML
    pub fn to_yaml_string(&self) -> ConfigResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_balanced() {
        assert_eq!(EngineConfig::default(), EngineConfig::from_preset(Preset::Balanced));
    }

    #[test]
    fn test_presets_validate() {
        for preset in [Preset::Fast, Preset::Balanced, Preset::Thorough] {
            EngineConfig::from_preset(preset).validate().unwrap();
        }
    }

    #[test]
    fn test_zero_widening_rejected() {
        let config = EngineConfig {
            widening_threshold: 0,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("widening_threshold"));
    }

    #[test]
    fn test_yaml_round_trip() {
        let config = EngineConfig::from_preset(Preset::Thorough);
        let yaml = config.to_yaml_string().unwrap();
        let parsed = EngineConfig::from_yaml_str(&yaml).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn test_yaml_partial_override() {
        let parsed = EngineConfig::from_yaml_str("widening_threshold: 6\n").unwrap();
        assert_eq!(parsed.widening_threshold, 6);
        assert_eq!(
            parsed.max_summary_depth,
            EngineConfig::default().max_summary_depth
        );
    }

    #[test]
    fn test_yaml_unknown_field_rejected() {
        assert!(EngineConfig::from_yaml_str("widening_bound: 6\n").is_err());
    }
}
