//! Codec configuration.

use logic_codec_interaction::IdLayout;
use logic_codec_manifest::{CoderConfig, DEFAULT_MAX_DEPTH};

/// Configuration for a [`Codec`](crate::Codec).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodecConfig {
    /// Maximum nesting of arrays, maps and classes in a resolved type.
    pub max_depth: usize,
    /// Discriminant prefix lengths of asset and logic ids.
    pub id_layout: IdLayout,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            id_layout: IdLayout::default(),
        }
    }
}

impl CodecConfig {
    /// The part of the configuration the manifest coder uses.
    pub fn coder_config(&self) -> CoderConfig {
        CoderConfig {
            max_depth: self.max_depth,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CodecConfig::default();
        assert_eq!(config.max_depth, 64);
        assert_eq!(config.id_layout.asset_prefix_len, 4);
        assert_eq!(config.id_layout.logic_prefix_len, 3);
        assert_eq!(config.coder_config(), CoderConfig::default());
    }
}
