//! Configuration module.
//!
//! Settings for the interactive tree shell, loaded from environment
//! variables.
//!
//! # Environment Variables
//!
//! - `AVLTREE_SNAPSHOT_PATH`: Snapshot file used by `save`/`load` (default: `data/saved_tree.bst`)
//! - `AVLTREE_RENDER_MAX_DEPTH`: Levels drawn by `show` (default: `7`)
//! - `AVLTREE_RENDER_WIDTH`: Widest framed diagram line (default: `160`)
//! - `AVLTREE_SEED`: Seed for `generate` (default: seeded from the OS)
//! - `AVLTREE_LOAD_ON_START`: Load the snapshot before the first prompt (default: `false`)
//!
//! # Invariants
//!
//! - `render_max_depth` is at least 1
//! - `render_width` is at least [`Config::MIN_RENDER_WIDTH`]

use std::path::PathBuf;

use crate::render::RenderOptions;

/// Shell configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Snapshot file used when `save` or `load` is given no path.
    pub snapshot_path: PathBuf,
    /// Levels drawn by the tree diagram.
    pub render_max_depth: u32,
    /// Widest framed diagram line.
    pub render_width: usize,
    /// Seed for the random record generator. `None` draws from the OS.
    pub seed: Option<u64>,
    /// Load `snapshot_path` before accepting commands.
    pub load_on_start: bool,
}

/// Error returned when loading configuration fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// An environment variable has an invalid value.
    InvalidValue { name: String, message: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue { name, message } => {
                write!(f, "invalid value for {name}: {message}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl Default for Config {
    fn default() -> Self {
        Self {
            snapshot_path: PathBuf::from(Self::DEFAULT_SNAPSHOT_PATH),
            render_max_depth: Self::DEFAULT_RENDER_MAX_DEPTH,
            render_width: Self::DEFAULT_RENDER_WIDTH,
            seed: None,
            load_on_start: false,
        }
    }
}

impl Config {
    /// Default snapshot file.
    pub const DEFAULT_SNAPSHOT_PATH: &'static str = "data/saved_tree.bst";
    /// Default number of diagram levels.
    pub const DEFAULT_RENDER_MAX_DEPTH: u32 = RenderOptions::DEFAULT_MAX_DEPTH;
    /// Default diagram width.
    pub const DEFAULT_RENDER_WIDTH: usize = RenderOptions::DEFAULT_MAX_WIDTH;
    /// Narrowest accepted diagram width.
    pub const MIN_RENDER_WIDTH: usize = 20;

    /// Load configuration from environment variables.
    ///
    /// Every variable is optional; unset variables take their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set to a value that does not parse
    /// or is out of range.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through `lookup`, which maps a variable name to its
    /// value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let snapshot_path = lookup("AVLTREE_SNAPSHOT_PATH")
            .filter(|value| !value.is_empty())
            .map_or_else(|| PathBuf::from(Self::DEFAULT_SNAPSHOT_PATH), PathBuf::from);
        let render_max_depth = Self::load_render_max_depth(&lookup)?;
        let render_width = Self::load_render_width(&lookup)?;
        let seed = Self::load_seed(&lookup)?;
        let load_on_start = Self::load_on_start(&lookup)?;

        Ok(Self {
            snapshot_path,
            render_max_depth,
            render_width,
            seed,
            load_on_start,
        })
    }

    /// Render options derived from this configuration.
    #[must_use]
    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            max_depth: self.render_max_depth,
            max_width: self.render_width,
            ..RenderOptions::default()
        }
    }

    fn load_render_max_depth(lookup: &impl Fn(&str) -> Option<String>) -> Result<u32, ConfigError> {
        const NAME: &str = "AVLTREE_RENDER_MAX_DEPTH";
        match lookup(NAME) {
            Some(value) => match value.parse::<u32>() {
                Ok(depth) if depth >= 1 => Ok(depth),
                _ => Err(invalid(NAME, format!("'{value}' is not a positive integer"))),
            },
            None => Ok(Self::DEFAULT_RENDER_MAX_DEPTH),
        }
    }

    fn load_render_width(lookup: &impl Fn(&str) -> Option<String>) -> Result<usize, ConfigError> {
        const NAME: &str = "AVLTREE_RENDER_WIDTH";
        match lookup(NAME) {
            Some(value) => match value.parse::<usize>() {
                Ok(width) if width >= Self::MIN_RENDER_WIDTH => Ok(width),
                _ => Err(invalid(
                    NAME,
                    format!("'{value}' is not a width of at least {}", Self::MIN_RENDER_WIDTH),
                )),
            },
            None => Ok(Self::DEFAULT_RENDER_WIDTH),
        }
    }

    fn load_seed(lookup: &impl Fn(&str) -> Option<String>) -> Result<Option<u64>, ConfigError> {
        const NAME: &str = "AVLTREE_SEED";
        lookup(NAME)
            .map(|value| {
                value.parse::<u64>().map_err(|_| {
                    invalid(NAME, format!("'{value}' is not an unsigned 64-bit integer"))
                })
            })
            .transpose()
    }

    fn load_on_start(lookup: &impl Fn(&str) -> Option<String>) -> Result<bool, ConfigError> {
        const NAME: &str = "AVLTREE_LOAD_ON_START";
        match lookup(NAME).as_deref() {
            None | Some("false") => Ok(false),
            Some("true") => Ok(true),
            Some(other) => Err(invalid(NAME, format!("'{other}' is not 'true' or 'false'"))),
        }
    }
}

fn invalid(name: &str, message: String) -> ConfigError {
    ConfigError::InvalidValue {
        name: name.to_string(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn from_pairs(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_default_values() {
        let config = from_pairs(&[]).expect("defaults");
        assert_eq!(config, Config::default());
        assert_eq!(config.snapshot_path, PathBuf::from("data/saved_tree.bst"));
        assert_eq!(config.render_max_depth, 7);
        assert_eq!(config.render_width, 160);
        assert_eq!(config.seed, None);
        assert!(!config.load_on_start);
    }

    #[test]
    fn test_overrides() {
        let config = from_pairs(&[
            ("AVLTREE_SNAPSHOT_PATH", "/tmp/tree.bst"),
            ("AVLTREE_RENDER_MAX_DEPTH", "3"),
            ("AVLTREE_RENDER_WIDTH", "80"),
            ("AVLTREE_SEED", "42"),
            ("AVLTREE_LOAD_ON_START", "true"),
        ])
        .expect("overrides");

        assert_eq!(config.snapshot_path, PathBuf::from("/tmp/tree.bst"));
        assert_eq!(config.render_max_depth, 3);
        assert_eq!(config.render_width, 80);
        assert_eq!(config.seed, Some(42));
        assert!(config.load_on_start);

        let options = config.render_options();
        assert_eq!(options.max_depth, 3);
        assert_eq!(options.max_width, 80);
        assert!(options.frame);
    }

    #[test]
    fn test_invalid_values() {
        for (name, value) in [
            ("AVLTREE_RENDER_MAX_DEPTH", "0"),
            ("AVLTREE_RENDER_MAX_DEPTH", "deep"),
            ("AVLTREE_RENDER_WIDTH", "19"),
            ("AVLTREE_SEED", "-1"),
            ("AVLTREE_LOAD_ON_START", "yes"),
        ] {
            match from_pairs(&[(name, value)]) {
                Err(ConfigError::InvalidValue { name: reported, .. }) => assert_eq!(reported, name),
                other => panic!("{name}={value} should be rejected, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_config_error_display_invalid() {
        let error = ConfigError::InvalidValue {
            name: "AVLTREE_SEED".to_string(),
            message: "bad value".to_string(),
        };
        assert_eq!(error.to_string(), "invalid value for AVLTREE_SEED: bad value");
    }
}
